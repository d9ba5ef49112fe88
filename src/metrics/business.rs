//! Business-presence signals used to qualify a domain as a real company.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct BusinessSignals {
    pub has_contact_page: bool,
    pub has_contact_form: bool,
    pub has_phone_number: bool,
    pub has_email: bool,
    pub has_physical_address: bool,
    pub has_social_links: bool,
    pub social_platforms: Vec<String>,
    pub has_blog: bool,
    pub has_testimonials: bool,
    pub has_pricing_page: bool,
    pub has_about_page: bool,
    pub has_privacy_policy: bool,
    pub has_terms_of_service: bool,
    pub copyright_year: Option<u32>,
    pub business_legitimacy_score: u32,
}

impl BusinessSignals {
    /// Additive rubric capped at 100. A recent copyright year counts as a
    /// maintenance signal.
    pub fn calculate_score(&mut self) {
        let mut score = 0;

        if self.has_contact_page {
            score += 10;
        }
        if self.has_contact_form {
            score += 5;
        }
        if self.has_phone_number {
            score += 15;
        }
        if self.has_email {
            score += 10;
        }
        if self.has_physical_address {
            score += 15;
        }
        if self.has_social_links {
            score += 5;
        }
        if self.social_platforms.len() >= 3 {
            score += 5;
        }
        if self.has_about_page {
            score += 10;
        }
        if self.has_privacy_policy {
            score += 10;
        }
        if self.has_terms_of_service {
            score += 5;
        }
        if matches!(self.copyright_year, Some(year) if year >= 2023) {
            score += 10;
        }

        self.business_legitimacy_score = score.min(100);
    }

    pub fn missing_signals(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.has_phone_number {
            missing.push("No phone number".to_string());
        }
        if !self.has_physical_address {
            missing.push("No physical address".to_string());
        }
        if !self.has_privacy_policy {
            missing.push("Missing privacy policy".to_string());
        }
        if !self.has_about_page {
            missing.push("No about page".to_string());
        }
        if !self.has_social_links {
            missing.push("No social media links".to_string());
        }
        missing
    }
}
