//! Whole-domain analysis pipeline and batch orchestration.
//!
//! One `SiteAnalyzer` is shared across the run. Each domain goes through
//! the same sequence: find a working URL, take timed load samples, extract
//! signals from the HTML and response headers, probe well-known paths,
//! then aggregate scores. A semaphore bounds how many domains are in
//! flight at once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::analyzers::{html, PageProber};
use crate::config::AppConfig;
use crate::intel::WebsiteIntelligence;
use crate::metrics::LoadTimeMetrics;

static BASE_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?://[^/]+)").unwrap());

/// One successful HTTP exchange with everything analysis needs from it.
struct FetchedPage {
    status: u16,
    final_url: String,
    headers: reqwest::header::HeaderMap,
    body: String,
    elapsed_secs: f64,
}

pub struct SiteAnalyzer {
    client: reqwest::Client,
    semaphore: Semaphore,
    prober: PageProber,
    measurement_rounds: usize,
    measurement_delay: Duration,
    max_concurrent: usize,
}

/// Standard browser request headers. Accept-Encoding is left to the
/// client's gzip/deflate support so responses still decompress.
fn browser_headers() -> reqwest::header::HeaderMap {
    use reqwest::header::{
        HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS,
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

impl SiteAnalyzer {
    pub fn new(config: &AppConfig) -> anyhow::Result<Arc<Self>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .default_headers(browser_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Arc::new(Self {
            client,
            semaphore: Semaphore::new(config.analysis.max_concurrent),
            prober: PageProber::new(
                Duration::from_secs(config.probe.timeout_secs),
                config.probe.max_concurrent,
            ),
            measurement_rounds: config.analysis.measurement_rounds,
            measurement_delay: Duration::from_millis(config.analysis.measurement_delay_ms),
            max_concurrent: config.analysis.max_concurrent,
        }))
    }

    /// Analyze one domain end to end. Always returns a record; failures
    /// are captured in its `error` field rather than bubbling up.
    pub async fn analyze_website(&self, domain: &str) -> WebsiteIntelligence {
        let mut intel = WebsiteIntelligence::new(domain);

        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                intel.error = Some("analyzer shut down".to_string());
                intel.calculate_overall_scores();
                return intel;
            }
        };

        debug!(domain, "starting analysis");

        let mut working_page: Option<FetchedPage> = None;
        for url in candidate_urls(domain) {
            match self.timed_get(&url).await {
                Ok(page) if page.status == 200 => {
                    intel.status_code = Some(page.status);
                    intel.final_url = Some(page.final_url.clone());
                    intel.security.has_ssl = page.final_url.starts_with("https://");
                    intel.error = None;
                    working_page = Some(page);
                    break;
                }
                Ok(page) => {
                    intel.status_code = Some(page.status);
                    intel.final_url = Some(page.final_url);
                }
                Err(error) => {
                    debug!(domain, %url, %error, "fetch attempt failed");
                    intel.error = Some(classify_error(&error));
                }
            }
        }

        if let Some(page) = working_page {
            let mut samples = vec![round3(page.elapsed_secs)];
            for _ in 1..self.measurement_rounds {
                tokio::time::sleep(self.measurement_delay).await;
                match self.timed_get(&page.final_url).await {
                    Ok(repeat) => samples.push(round3(repeat.elapsed_secs)),
                    // A failed round shrinks the sample set; the
                    // confidence figure reflects that.
                    Err(error) => debug!(domain, %error, "measurement round failed"),
                }
            }
            intel.performance.load_time = LoadTimeMetrics::from_samples(samples);
            intel.performance.html_size_bytes = page.body.len() as u64;

            html::analyze(&page.body, &mut intel);
            intel.security.parse_headers(&page.headers);

            if let Some(base_url) = base_url(&page.final_url) {
                self.prober
                    .check_pages(&base_url, &self.client, &mut intel)
                    .await;
            }
        }

        intel.calculate_overall_scores();
        intel
    }

    async fn timed_get(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(FetchedPage {
            status,
            final_url,
            headers,
            body,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Analyze many domains with bounded concurrency, in sub-batches of
    /// twice the concurrency limit so the progress bar advances steadily.
    pub async fn analyze_batch(self: &Arc<Self>, domains: &[String]) -> Vec<WebsiteIntelligence> {
        let total = domains.len();
        info!(total, "starting batch analysis");

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} domains {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let batch_size = self.max_concurrent * 2;
        let mut results = Vec::with_capacity(total);

        for chunk in domains.chunks(batch_size.max(1)) {
            let mut handles = Vec::with_capacity(chunk.len());
            for domain in chunk {
                let analyzer = Arc::clone(self);
                let domain = domain.clone();
                handles.push((
                    domain.clone(),
                    tokio::spawn(async move { analyzer.analyze_website(&domain).await }),
                ));
            }

            for (domain, handle) in handles {
                match handle.await {
                    Ok(intel) => results.push(intel),
                    Err(error) => {
                        warn!(domain = %domain, %error, "analysis task failed; result dropped")
                    }
                }
            }
            progress.inc(chunk.len() as u64);
        }

        progress.finish_with_message("done");
        info!(
            analyzed = results.len(),
            failed = total - results.len(),
            "batch analysis complete"
        );
        results
    }
}

/// URLs to try for a bare domain: HTTPS first, then plain HTTP. Inputs
/// that already carry a scheme are used as-is.
fn candidate_urls(domain: &str) -> Vec<String> {
    if domain.contains("://") {
        vec![domain.to_string()]
    } else {
        vec![format!("https://{}", domain), format!("http://{}", domain)]
    }
}

/// Scheme plus host of a fetched URL, the root for path probes.
fn base_url(url: &str) -> Option<String> {
    BASE_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Stable error labels for the export; anything unrecognized keeps its
/// message, truncated so one bad error cannot blow up a CSV cell.
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "connection_failed".to_string()
    } else if error.is_redirect() {
        "too_many_redirects".to_string()
    } else {
        let message = error.to_string();
        message.chars().take(100).collect()
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_urls_for_bare_domain() {
        assert_eq!(
            candidate_urls("example.com"),
            vec!["https://example.com", "http://example.com"]
        );
    }

    #[test]
    fn test_candidate_urls_keep_explicit_scheme() {
        assert_eq!(
            candidate_urls("http://127.0.0.1:8080"),
            vec!["http://127.0.0.1:8080"]
        );
    }

    #[test]
    fn test_base_url_strips_path() {
        assert_eq!(
            base_url("https://www.example.com/landing?utm=x").as_deref(),
            Some("https://www.example.com")
        );
        assert_eq!(
            base_url("http://example.com:8080/a/b").as_deref(),
            Some("http://example.com:8080")
        );
        assert_eq!(base_url("ftp://example.com"), None);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.0004), 0.0);
    }
}
