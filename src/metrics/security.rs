//! Security posture from transport and response headers.

use reqwest::header::HeaderMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityMetrics {
    pub has_ssl: bool,
    pub has_hsts: bool,
    pub has_csp: bool,
    pub has_x_frame_options: bool,
    pub has_x_content_type_options: bool,
    pub has_x_xss_protection: bool,
    pub security_headers_score: u32,
}

impl SecurityMetrics {
    /// Record which defensive headers the landing-page response carried.
    /// Header name matching is case-insensitive via `HeaderMap`.
    pub fn parse_headers(&mut self, headers: &HeaderMap) {
        self.has_hsts = headers.contains_key("strict-transport-security");
        self.has_csp = headers.contains_key("content-security-policy");
        self.has_x_frame_options = headers.contains_key("x-frame-options");
        self.has_x_content_type_options = headers.contains_key("x-content-type-options");
        self.has_x_xss_protection = headers.contains_key("x-xss-protection");
    }

    pub fn calculate_score(&mut self) {
        let mut score = 0;
        if self.has_ssl {
            score += 30;
        }
        if self.has_hsts {
            score += 20;
        }
        if self.has_csp {
            score += 20;
        }
        if self.has_x_frame_options {
            score += 10;
        }
        if self.has_x_content_type_options {
            score += 10;
        }
        if self.has_x_xss_protection {
            score += 10;
        }
        self.security_headers_score = score;
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.has_ssl {
            issues.push("No SSL/HTTPS - CRITICAL".to_string());
        }
        if !self.has_hsts {
            issues.push("Missing HSTS header".to_string());
        }
        if !self.has_csp {
            issues.push("Missing Content Security Policy".to_string());
        }
        if !self.has_x_frame_options {
            issues.push("Missing X-Frame-Options header".to_string());
        }
        if !self.has_x_content_type_options {
            issues.push("Missing X-Content-Type-Options header".to_string());
        }
        if !self.has_x_xss_protection {
            issues.push("Missing X-XSS-Protection header".to_string());
        }
        issues
    }
}
