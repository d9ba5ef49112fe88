//! SEO facts and scoring.

use serde::Serialize;

/// SEO-related facts extracted from the landing page plus probe results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeoMetrics {
    pub has_meta_description: bool,
    pub has_meta_keywords: bool,
    pub has_og_tags: bool,
    pub has_twitter_cards: bool,
    /// JSON-LD script or microdata itemscope present.
    pub has_structured_data: bool,
    pub has_sitemap: bool,
    pub has_robots_txt: bool,
    pub canonical_url: Option<String>,
    pub h1_count: usize,
    pub h2_count: usize,
    pub image_count: usize,
    pub images_without_alt: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub seo_score: u32,
}

impl SeoMetrics {
    /// Additive rubric clamped to [0, 100]. Exactly one H1 is rewarded;
    /// zero or multiple H1s are penalized.
    pub fn calculate_score(&mut self) {
        let mut score: i32 = 0;

        if self.has_meta_description {
            score += 15;
        }
        if self.has_og_tags {
            score += 10;
        }
        if self.has_twitter_cards {
            score += 5;
        }
        if self.has_structured_data {
            score += 15;
        }
        if self.has_sitemap {
            score += 10;
        }
        if self.has_robots_txt {
            score += 5;
        }
        if self.h1_count == 1 {
            score += 10;
        }
        if self.h2_count > 0 {
            score += 5;
        }
        if self.image_count > 0 {
            if self.images_without_alt == 0 {
                score += 10;
            } else {
                let alt_ratio = 1.0 - self.images_without_alt as f64 / self.image_count as f64;
                score += (10.0 * alt_ratio) as i32;
            }
        }
        if self.canonical_url.is_some() {
            score += 5;
        }

        if self.h1_count > 1 {
            score -= 5;
        }
        if self.h1_count == 0 {
            score -= 10;
        }

        self.seo_score = score.clamp(0, 100) as u32;
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.has_meta_description {
            issues.push("Missing meta description".to_string());
        }
        if !self.has_og_tags {
            issues.push("Missing Open Graph tags".to_string());
        }
        if !self.has_structured_data {
            issues.push("No structured data (JSON-LD/microdata)".to_string());
        }
        if !self.has_sitemap {
            issues.push("Missing sitemap.xml".to_string());
        }
        if !self.has_robots_txt {
            issues.push("Missing robots.txt".to_string());
        }
        if self.h1_count == 0 {
            issues.push("No H1 heading found".to_string());
        }
        if self.h1_count > 1 {
            issues.push(format!("Multiple H1 headings ({})", self.h1_count));
        }
        if self.images_without_alt > 0 {
            issues.push(format!("{} images missing alt text", self.images_without_alt));
        }
        if self.canonical_url.is_none() {
            issues.push("Missing canonical URL".to_string());
        }
        issues
    }
}
