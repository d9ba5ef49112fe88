//! The per-domain intelligence record and score aggregation.

use chrono::Utc;
use serde::Serialize;

use crate::metrics::{
    AccessibilityMetrics, BusinessSignals, PerformanceMetrics, SecurityMetrics, SeoMetrics,
};

/// Everything learned about one domain in a single analysis pass.
///
/// Analyzers populate their own sections; `calculate_overall_scores`
/// folds the section scores into the composite and the buyer priority.
#[derive(Debug, Clone, Serialize)]
pub struct WebsiteIntelligence {
    pub domain: String,
    pub status_code: Option<u16>,
    pub final_url: Option<String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub cms_detected: Option<String>,
    pub cms_version: Option<String>,
    pub is_outdated_cms: bool,
    pub technologies: Vec<String>,
    pub is_mobile_friendly: bool,
    pub has_viewport_meta: bool,
    pub performance: PerformanceMetrics,
    pub seo: SeoMetrics,
    pub security: SecurityMetrics,
    pub accessibility: AccessibilityMetrics,
    pub business: BusinessSignals,
    pub overall_score: u32,
    pub buyer_priority_score: u32,
    pub error: Option<String>,
    pub analysis_timestamp: String,
}

impl WebsiteIntelligence {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            status_code: None,
            final_url: None,
            title: None,
            meta_description: None,
            cms_detected: None,
            cms_version: None,
            is_outdated_cms: false,
            technologies: Vec::new(),
            is_mobile_friendly: false,
            has_viewport_meta: false,
            performance: PerformanceMetrics::default(),
            seo: SeoMetrics::default(),
            security: SecurityMetrics::default(),
            accessibility: AccessibilityMetrics::default(),
            business: BusinessSignals::default(),
            overall_score: 0,
            buyer_priority_score: 0,
            error: None,
            analysis_timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Recompute every section score, then the weighted composite and the
    /// buyer priority. Safe to call repeatedly.
    pub fn calculate_overall_scores(&mut self) {
        self.performance.calculate_grade();
        self.seo.calculate_score();
        self.security.calculate_score();
        self.accessibility.calculate_score();
        self.business.calculate_score();

        let weighted = f64::from(self.performance.grade.numeric_score()) * 0.25
            + f64::from(self.seo.seo_score) * 0.20
            + f64::from(self.security.security_headers_score) * 0.20
            + f64::from(self.accessibility.accessibility_score) * 0.15
            + f64::from(self.business.business_legitimacy_score) * 0.20;
        self.overall_score = weighted as u32;

        self.buyer_priority_score = self.calculate_buyer_priority();
    }

    /// High when the site has fixable problems and the business behind it
    /// looks real. Issue points scaled by legitimacy over 100.
    fn calculate_buyer_priority(&self) -> u32 {
        let mut issue_points: u32 = 0;

        let trimmed = self.performance.load_time.trimmed_mean;
        if trimmed > 3.0 {
            issue_points += 20;
        } else if trimmed > 2.0 {
            issue_points += 10;
        }
        if !self.security.has_ssl {
            issue_points += 25;
        }
        if self.security.security_headers_score < 50 {
            issue_points += 15;
        }
        if self.seo.seo_score < 50 {
            issue_points += 20;
        }
        if self.is_outdated_cms {
            issue_points += 25;
        }

        issue_points * self.business.business_legitimacy_score / 100
    }

    /// Every concrete problem found, across all sections.
    pub fn all_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(error) = &self.error {
            issues.push(format!("Analysis error: {}", error));
        }
        if self.is_outdated_cms {
            if let Some(cms) = &self.cms_detected {
                issues.push(format!("Outdated CMS version ({})", cms));
            }
        }
        if !self.is_mobile_friendly {
            issues.push("Not mobile friendly".to_string());
        }
        issues.extend(self.seo.issues());
        issues.extend(self.security.issues());
        issues.extend(self.accessibility.issues());
        issues
    }

    /// Flatten the record to ordered column/value pairs for CSV export.
    pub fn to_flat_record(&self) -> Vec<(&'static str, String)> {
        let load = &self.performance.load_time;
        vec![
            ("domain", self.domain.clone()),
            ("status_code", opt_display(&self.status_code)),
            ("final_url", opt_string(&self.final_url)),
            ("title", opt_string(&self.title)),
            ("meta_description", opt_string(&self.meta_description)),
            ("cms_detected", opt_string(&self.cms_detected)),
            ("cms_version", opt_string(&self.cms_version)),
            ("is_outdated_cms", self.is_outdated_cms.to_string()),
            ("technologies", self.technologies.join(",")),
            ("is_mobile_friendly", self.is_mobile_friendly.to_string()),
            ("has_viewport_meta", self.has_viewport_meta.to_string()),
            ("overall_score", self.overall_score.to_string()),
            (
                "buyer_priority_score",
                self.buyer_priority_score.to_string(),
            ),
            ("error", opt_string(&self.error)),
            ("analysis_timestamp", self.analysis_timestamp.clone()),
            ("load_time_median", load.median.to_string()),
            ("load_time_trimmed_mean", load.trimmed_mean.to_string()),
            ("load_time_p90", load.p90.to_string()),
            ("load_time_p95", load.p95.to_string()),
            ("load_time_std_dev", load.std_dev.to_string()),
            ("load_time_iqr", load.iqr.to_string()),
            ("load_time_cv", load.cv.to_string()),
            ("load_time_confidence", load.confidence.to_string()),
            ("load_time_samples", load.sample_count().to_string()),
            (
                "html_size_bytes",
                self.performance.html_size_bytes.to_string(),
            ),
            ("performance_grade", self.performance.grade.to_string()),
            (
                "performance_score",
                self.performance.grade.numeric_score().to_string(),
            ),
            ("seo_score", self.seo.seo_score.to_string()),
            (
                "has_meta_description",
                self.seo.has_meta_description.to_string(),
            ),
            ("has_meta_keywords", self.seo.has_meta_keywords.to_string()),
            ("has_og_tags", self.seo.has_og_tags.to_string()),
            ("has_twitter_cards", self.seo.has_twitter_cards.to_string()),
            (
                "has_structured_data",
                self.seo.has_structured_data.to_string(),
            ),
            ("has_sitemap", self.seo.has_sitemap.to_string()),
            ("has_robots_txt", self.seo.has_robots_txt.to_string()),
            ("canonical_url", opt_string(&self.seo.canonical_url)),
            ("h1_count", self.seo.h1_count.to_string()),
            ("h2_count", self.seo.h2_count.to_string()),
            ("image_count", self.seo.image_count.to_string()),
            (
                "images_without_alt",
                self.seo.images_without_alt.to_string(),
            ),
            ("internal_links", self.seo.internal_links.to_string()),
            ("external_links", self.seo.external_links.to_string()),
            ("has_ssl", self.security.has_ssl.to_string()),
            ("has_hsts", self.security.has_hsts.to_string()),
            ("has_csp", self.security.has_csp.to_string()),
            (
                "has_x_frame_options",
                self.security.has_x_frame_options.to_string(),
            ),
            (
                "has_x_content_type_options",
                self.security.has_x_content_type_options.to_string(),
            ),
            (
                "has_x_xss_protection",
                self.security.has_x_xss_protection.to_string(),
            ),
            (
                "security_headers_score",
                self.security.security_headers_score.to_string(),
            ),
            (
                "accessibility_score",
                self.accessibility.accessibility_score.to_string(),
            ),
            (
                "has_lang_attribute",
                self.accessibility.has_lang_attribute.to_string(),
            ),
            (
                "has_skip_link",
                self.accessibility.has_skip_link.to_string(),
            ),
            (
                "forms_have_labels",
                self.accessibility.forms_have_labels.to_string(),
            ),
            (
                "images_have_alt",
                self.accessibility.images_have_alt.to_string(),
            ),
            (
                "has_aria_landmarks",
                self.accessibility.has_aria_landmarks.to_string(),
            ),
            (
                "business_legitimacy_score",
                self.business.business_legitimacy_score.to_string(),
            ),
            (
                "has_contact_page",
                self.business.has_contact_page.to_string(),
            ),
            (
                "has_contact_form",
                self.business.has_contact_form.to_string(),
            ),
            (
                "has_phone_number",
                self.business.has_phone_number.to_string(),
            ),
            ("has_email", self.business.has_email.to_string()),
            (
                "has_physical_address",
                self.business.has_physical_address.to_string(),
            ),
            (
                "has_social_links",
                self.business.has_social_links.to_string(),
            ),
            ("social_platforms", self.business.social_platforms.join(",")),
            (
                "social_platforms_count",
                self.business.social_platforms.len().to_string(),
            ),
            ("has_blog", self.business.has_blog.to_string()),
            (
                "has_testimonials",
                self.business.has_testimonials.to_string(),
            ),
            (
                "has_pricing_page",
                self.business.has_pricing_page.to_string(),
            ),
            ("has_about_page", self.business.has_about_page.to_string()),
            (
                "has_privacy_policy",
                self.business.has_privacy_policy.to_string(),
            ),
            (
                "has_terms_of_service",
                self.business.has_terms_of_service.to_string(),
            ),
            ("copyright_year", opt_display(&self.business.copyright_year)),
        ]
    }
}

fn opt_string(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_display<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}
