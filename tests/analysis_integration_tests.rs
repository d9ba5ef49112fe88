mod common;

use common::wiremock_helpers::{
    mock_error_server, mock_head_rejecting_server, mock_site, mock_site_with_pages,
    mock_timeout_server,
};
use std::time::Duration;
use siteintel::analyzers::PageProber;
use siteintel::config::{AnalysisConfig, AppConfig, HttpConfig, ProbeConfig};
use siteintel::scraper::SiteAnalyzer;

fn test_config() -> AppConfig {
    AppConfig {
        http: HttpConfig {
            user_agent: "siteintel-tests/1.0".to_string(),
            request_timeout_secs: 5,
        },
        analysis: AnalysisConfig {
            max_concurrent: 4,
            measurement_rounds: 2,
            measurement_delay_ms: 0,
        },
        probe: ProbeConfig {
            timeout_secs: 2,
            max_concurrent: 10,
        },
    }
}

const OUTDATED_WORDPRESS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="generator" content="WordPress 4.9.8">
<meta name="description" content="Plumbing services for the whole metro area.">
<title>Smith Plumbing</title>
</head>
<body>
<header role="banner"><h1>Smith Plumbing</h1></header>
<main>
<img src="/wp-content/uploads/team.jpg" alt="Our team">
<p>Call us at (555) 123-4567 or email info@smithplumbing.com</p>
<form action="/contact" method="post">
  <input type="text" name="name" placeholder="Your name">
  <input type="email" name="email" placeholder="Your email">
  <textarea name="message" placeholder="Message"></textarea>
</form>
<a href="https://www.facebook.com/smithplumbing">Facebook</a>
<a href="https://www.linkedin.com/company/smithplumbing">LinkedIn</a>
</main>
<footer><p>&#169; 2024 Smith Plumbing. 123 Main Street, Springfield.</p></footer>
<script src="/wp-content/themes/plumber/app.js"></script>
</body>
</html>"#;

#[tokio::test]
async fn test_full_analysis_of_outdated_wordpress_site() {
    let server = mock_site_with_pages(
        OUTDATED_WORDPRESS_PAGE,
        &["/contact", "/privacy-policy", "/robots.txt"],
    )
    .await;

    let analyzer = SiteAnalyzer::new(&test_config()).unwrap();
    let intel = analyzer.analyze_website(&server.uri()).await;

    assert_eq!(intel.status_code, Some(200));
    assert!(intel.error.is_none());
    // The mock serves plain HTTP.
    assert!(!intel.security.has_ssl);

    assert_eq!(intel.title.as_deref(), Some("Smith Plumbing"));
    assert_eq!(intel.cms_detected.as_deref(), Some("wordpress"));
    assert_eq!(intel.cms_version.as_deref(), Some("4.9.8"));
    assert!(intel.is_outdated_cms);

    assert_eq!(
        intel.performance.load_time.sample_count(),
        2,
        "one sample per measurement round"
    );
    assert!(intel.performance.html_size_bytes > 0);

    assert!(intel.seo.has_meta_description);
    assert!(intel.is_mobile_friendly);
    assert!(intel.business.has_phone_number);
    assert!(intel.business.has_email);
    assert!(intel.business.has_contact_form);

    // Found by probing, not in the HTML.
    assert!(intel.business.has_contact_page);
    assert!(intel.business.has_privacy_policy);
    assert!(intel.seo.has_robots_txt);
    assert!(!intel.business.has_pricing_page);

    // Outdated CMS plus no SSL drives priority up on a legitimate site.
    assert!(intel.business.business_legitimacy_score > 0);
    assert!(intel.buyer_priority_score > 0);
    assert!(intel.overall_score > 0);
}

#[tokio::test]
async fn test_fetches_carry_browser_headers() {
    let server = mock_site("<html><head><title>Plain</title></head><body></body></html>").await;

    let analyzer = SiteAnalyzer::new(&test_config()).unwrap();
    let intel = analyzer.analyze_website(&server.uri()).await;
    assert_eq!(intel.status_code, Some(200));

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    let first = &requests[0];

    let accept = first.headers.get("accept").unwrap().to_str().unwrap();
    assert!(accept.starts_with("text/html"), "got accept: {}", accept);
    assert_eq!(
        first
            .headers
            .get("accept-language")
            .and_then(|v| v.to_str().ok()),
        Some("en-US,en;q=0.5")
    );
    assert_eq!(
        first.headers.get("user-agent").and_then(|v| v.to_str().ok()),
        Some("siteintel-tests/1.0")
    );
}

#[tokio::test]
async fn test_unreachable_site_still_produces_record() {
    // Port 1 is never listening.
    let analyzer = SiteAnalyzer::new(&test_config()).unwrap();
    let intel = analyzer.analyze_website("http://127.0.0.1:1").await;

    assert_eq!(intel.status_code, None);
    assert_eq!(intel.error.as_deref(), Some("connection_failed"));
    assert!(intel.title.is_none());
    assert_eq!(intel.performance.load_time.sample_count(), 0);
    assert_eq!(intel.seo.seo_score, 0);
    assert_eq!(intel.business.business_legitimacy_score, 0);
    assert_eq!(intel.buyer_priority_score, 0);

    // The flat record keeps its full shape even on total failure.
    let record = intel.to_flat_record();
    assert_eq!(record[0].0, "domain");
    assert_eq!(record[0].1, "http://127.0.0.1:1");
    assert!(record.iter().any(|(name, _)| *name == "performance_grade"));
}

#[tokio::test]
async fn test_server_error_recorded_without_analysis() {
    let server = mock_error_server(500).await;

    let analyzer = SiteAnalyzer::new(&test_config()).unwrap();
    let intel = analyzer.analyze_website(&server.uri()).await;

    assert_eq!(intel.status_code, Some(500));
    assert!(intel.title.is_none());
    assert_eq!(intel.performance.load_time.sample_count(), 0);
}

#[tokio::test]
async fn test_slow_site_times_out() {
    let server = mock_timeout_server(3_000).await;

    let mut config = test_config();
    config.http.request_timeout_secs = 1;
    let analyzer = SiteAnalyzer::new(&config).unwrap();
    let intel = analyzer.analyze_website(&server.uri()).await;

    assert_eq!(intel.status_code, None);
    assert_eq!(intel.error.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn test_batch_analysis_keeps_per_domain_results() {
    let up = mock_site_with_pages("<html><head><title>Up</title></head><body></body></html>", &[])
        .await;

    let analyzer = SiteAnalyzer::new(&test_config()).unwrap();
    let domains = vec![up.uri(), "http://127.0.0.1:1".to_string()];
    let results = analyzer.analyze_batch(&domains).await;

    assert_eq!(results.len(), 2);
    let up_result = results.iter().find(|r| r.domain == up.uri()).unwrap();
    assert_eq!(up_result.status_code, Some(200));
    let down_result = results
        .iter()
        .find(|r| r.domain == "http://127.0.0.1:1")
        .unwrap();
    assert!(down_result.error.is_some());
}

#[tokio::test]
async fn test_prober_falls_back_to_get_on_405() {
    let server = mock_head_rejecting_server("/contact").await;
    let client = reqwest::Client::new();
    let prober = PageProber::new(Duration::from_secs(2), 4);

    assert!(
        prober
            .page_exists(&format!("{}/contact", server.uri()), &client)
            .await
    );
    assert!(
        !prober
            .page_exists(&format!("{}/missing", server.uri()), &client)
            .await
    );
}

#[tokio::test]
async fn test_prober_treats_errors_as_absent() {
    let client = reqwest::Client::new();
    let prober = PageProber::new(Duration::from_millis(500), 4);

    assert!(!prober.page_exists("http://127.0.0.1:1/contact", &client).await);
}
