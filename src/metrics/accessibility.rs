//! Basic accessibility signals detectable without a browser.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AccessibilityMetrics {
    pub has_lang_attribute: bool,
    pub has_skip_link: bool,
    /// All-or-nothing: false as soon as one labelable input lacks a label.
    pub forms_have_labels: bool,
    pub images_have_alt: bool,
    pub has_aria_landmarks: bool,
    pub accessibility_score: u32,
}

impl Default for AccessibilityMetrics {
    fn default() -> Self {
        // Labels and alt text default to true: a page with no forms and no
        // images has nothing to get wrong.
        Self {
            has_lang_attribute: false,
            has_skip_link: false,
            forms_have_labels: true,
            images_have_alt: true,
            has_aria_landmarks: false,
            accessibility_score: 0,
        }
    }
}

impl AccessibilityMetrics {
    pub fn calculate_score(&mut self) {
        let mut score = 0;
        if self.has_lang_attribute {
            score += 20;
        }
        if self.has_skip_link {
            score += 15;
        }
        if self.forms_have_labels {
            score += 20;
        }
        if self.images_have_alt {
            score += 25;
        }
        if self.has_aria_landmarks {
            score += 20;
        }
        self.accessibility_score = score;
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.has_lang_attribute {
            issues.push("Missing lang attribute on <html> element".to_string());
        }
        if !self.has_skip_link {
            issues.push("No skip navigation link found".to_string());
        }
        if !self.forms_have_labels {
            issues.push("Form inputs missing associated labels".to_string());
        }
        if !self.images_have_alt {
            issues.push("Images missing alt attributes".to_string());
        }
        if !self.has_aria_landmarks {
            issues.push("No ARIA landmarks found".to_string());
        }
        issues
    }
}
