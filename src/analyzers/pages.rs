//! Concurrent existence probing of well-known site paths.
//!
//! Business and SEO signals that the landing page cannot prove (does a
//! privacy policy exist?) are checked by probing conventional paths with
//! lightweight HEAD requests. Probes run under their own semaphore so a
//! burst of path checks cannot starve whole-domain analysis slots.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::intel::WebsiteIntelligence;

/// Signal a probed path contributes to when it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAttribute {
    ContactPage,
    AboutPage,
    PricingPage,
    PrivacyPolicy,
    TermsOfService,
    Sitemap,
    RobotsTxt,
}

/// Default probe catalog: conventional path to the signal it proves.
pub const PAGE_CATALOG: &[(&str, PageAttribute)] = &[
    ("/contact", PageAttribute::ContactPage),
    ("/contact-us", PageAttribute::ContactPage),
    ("/contactus", PageAttribute::ContactPage),
    ("/get-in-touch", PageAttribute::ContactPage),
    ("/reach-us", PageAttribute::ContactPage),
    ("/about", PageAttribute::AboutPage),
    ("/about-us", PageAttribute::AboutPage),
    ("/aboutus", PageAttribute::AboutPage),
    ("/company", PageAttribute::AboutPage),
    ("/who-we-are", PageAttribute::AboutPage),
    ("/our-story", PageAttribute::AboutPage),
    ("/pricing", PageAttribute::PricingPage),
    ("/prices", PageAttribute::PricingPage),
    ("/plans", PageAttribute::PricingPage),
    ("/packages", PageAttribute::PricingPage),
    ("/buy", PageAttribute::PricingPage),
    ("/privacy", PageAttribute::PrivacyPolicy),
    ("/privacy-policy", PageAttribute::PrivacyPolicy),
    ("/privacypolicy", PageAttribute::PrivacyPolicy),
    ("/privacy_policy", PageAttribute::PrivacyPolicy),
    ("/data-privacy", PageAttribute::PrivacyPolicy),
    ("/terms", PageAttribute::TermsOfService),
    ("/terms-of-service", PageAttribute::TermsOfService),
    ("/terms-and-conditions", PageAttribute::TermsOfService),
    ("/termsofservice", PageAttribute::TermsOfService),
    ("/tos", PageAttribute::TermsOfService),
    ("/legal", PageAttribute::TermsOfService),
    ("/terms-of-use", PageAttribute::TermsOfService),
    ("/sitemap.xml", PageAttribute::Sitemap),
    ("/sitemap", PageAttribute::Sitemap),
    ("/sitemap_index.xml", PageAttribute::Sitemap),
    ("/sitemap-index.xml", PageAttribute::Sitemap),
    ("/robots.txt", PageAttribute::RobotsTxt),
];

pub const BLOG_PATHS: &[&str] = &[
    "/blog",
    "/news",
    "/articles",
    "/insights",
    "/resources",
    "/posts",
    "/updates",
    "/stories",
    "/journal",
];

pub const CAREERS_PATHS: &[&str] = &[
    "/careers",
    "/jobs",
    "/join-us",
    "/work-with-us",
    "/opportunities",
    "/hiring",
];

pub const SUPPORT_PATHS: &[&str] = &[
    "/support",
    "/help",
    "/faq",
    "/faqs",
    "/knowledge-base",
    "/help-center",
    "/documentation",
    "/docs",
];

pub const ECOMMERCE_PATHS: &[&str] = &[
    "/shop",
    "/store",
    "/products",
    "/cart",
    "/checkout",
    "/catalog",
];

/// Sitemap summary from fetching the sitemap body.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapInfo {
    pub url: String,
    pub is_index: bool,
    pub url_count: usize,
    pub sitemap_count: usize,
    pub size_bytes: usize,
}

/// robots.txt summary from fetching its content.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotsInfo {
    pub url: String,
    pub has_sitemap_reference: bool,
    pub has_disallow_rules: bool,
    pub has_allow_rules: bool,
    pub user_agent_count: usize,
    pub blocks_all_bots: bool,
    pub sitemap_urls: Vec<String>,
    pub size_bytes: usize,
}

pub struct PageProber {
    timeout: Duration,
    semaphore: Semaphore,
    catalog: Vec<(&'static str, PageAttribute)>,
}

impl PageProber {
    pub fn new(timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            timeout,
            semaphore: Semaphore::new(max_concurrent),
            catalog: PAGE_CATALOG.to_vec(),
        }
    }

    /// Probe a custom catalog instead of the default one.
    pub fn with_catalog(
        timeout: Duration,
        max_concurrent: usize,
        catalog: Vec<(&'static str, PageAttribute)>,
    ) -> Self {
        Self {
            timeout,
            semaphore: Semaphore::new(max_concurrent),
            catalog,
        }
    }

    /// Probe the standard catalog plus blog paths and fold the outcomes
    /// into the intelligence record.
    pub async fn check_pages(
        &self,
        base_url: &str,
        client: &reqwest::Client,
        intel: &mut WebsiteIntelligence,
    ) {
        let (catalog_hits, blog_found) = tokio::join!(
            self.probe_catalog(base_url, client),
            self.probe_blog(base_url, client, intel.business.has_blog),
        );

        // Results are applied in catalog order; the first path that proves
        // an attribute sets it and later hits are no-ops.
        for attr in catalog_hits {
            apply_attribute(intel, attr);
        }
        if blog_found {
            intel.business.has_blog = true;
        }
    }

    async fn probe_catalog(&self, base_url: &str, client: &reqwest::Client) -> Vec<PageAttribute> {
        let checks = self.catalog.iter().map(|(path, attr)| {
            let url = format!("{}{}", base_url, path);
            async move {
                if self.page_exists(&url, client).await {
                    Some(*attr)
                } else {
                    None
                }
            }
        });

        join_all(checks).await.into_iter().flatten().collect()
    }

    /// Blog probing is skipped when the landing page already showed a blog.
    async fn probe_blog(
        &self,
        base_url: &str,
        client: &reqwest::Client,
        already_found: bool,
    ) -> bool {
        if already_found {
            return false;
        }
        self.any_path_exists(base_url, BLOG_PATHS, client).await
    }

    /// HEAD the URL, retrying with GET when the server rejects HEAD with
    /// 405. Exists means a final status of exactly 200; every failure mode
    /// (timeout, refused connection, redirect loop) reads as absent.
    pub async fn page_exists(&self, url: &str, client: &reqwest::Client) -> bool {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return false,
        };

        let head = client.head(url).timeout(self.timeout).send().await;
        match head {
            Ok(response) if response.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
                match client.get(url).timeout(self.timeout).send().await {
                    Ok(get_response) => get_response.status() == reqwest::StatusCode::OK,
                    Err(error) => {
                        debug!(url, %error, "GET fallback probe failed");
                        false
                    }
                }
            }
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(error) => {
                debug!(url, %error, "HEAD probe failed");
                false
            }
        }
    }

    /// Check a list of paths and report each one's existence.
    pub async fn check_specific_pages(
        &self,
        base_url: &str,
        paths: &[&str],
        client: &reqwest::Client,
    ) -> HashMap<String, bool> {
        let checks = paths.iter().map(|path| {
            let url = format!("{}{}", base_url, path);
            async move {
                let exists = self.page_exists(&url, client).await;
                (path.to_string(), exists)
            }
        });

        join_all(checks).await.into_iter().collect()
    }

    async fn any_path_exists(
        &self,
        base_url: &str,
        paths: &[&str],
        client: &reqwest::Client,
    ) -> bool {
        self.check_specific_pages(base_url, paths, client)
            .await
            .values()
            .any(|exists| *exists)
    }

    pub async fn check_careers_page(&self, base_url: &str, client: &reqwest::Client) -> bool {
        self.any_path_exists(base_url, CAREERS_PATHS, client).await
    }

    pub async fn check_support_page(&self, base_url: &str, client: &reqwest::Client) -> bool {
        self.any_path_exists(base_url, SUPPORT_PATHS, client).await
    }

    pub async fn check_ecommerce_pages(&self, base_url: &str, client: &reqwest::Client) -> bool {
        self.any_path_exists(base_url, ECOMMERCE_PATHS, client).await
    }

    /// Fetch the sitemap (trying index variants) and summarize its entries.
    pub async fn check_sitemap_content(
        &self,
        base_url: &str,
        client: &reqwest::Client,
    ) -> Option<SitemapInfo> {
        let candidates = [
            format!("{}/sitemap.xml", base_url),
            format!("{}/sitemap_index.xml", base_url),
            format!("{}/sitemap-index.xml", base_url),
        ];

        for url in candidates {
            let _permit = self.semaphore.acquire().await.ok()?;
            let Ok(response) = client.get(&url).timeout(self.timeout).send().await else {
                continue;
            };
            if response.status() != reqwest::StatusCode::OK {
                continue;
            }
            let Ok(body) = response.text().await else {
                continue;
            };

            // Entry tags are `<url>` and `<sitemap>`; counting the literal
            // openers avoids matching `<urlset>` / `<sitemapindex>`.
            let url_count = body.matches("<url>").count();
            let sitemap_count = body.matches("<sitemap>").count();

            return Some(SitemapInfo {
                url,
                is_index: sitemap_count > 0,
                url_count,
                sitemap_count,
                size_bytes: body.len(),
            });
        }

        None
    }

    /// Fetch robots.txt and summarize its directives.
    pub async fn check_robots_content(
        &self,
        base_url: &str,
        client: &reqwest::Client,
    ) -> Option<RobotsInfo> {
        let url = format!("{}/robots.txt", base_url);

        let _permit = self.semaphore.acquire().await.ok()?;
        let response = client.get(&url).timeout(self.timeout).send().await.ok()?;
        if response.status() != reqwest::StatusCode::OK {
            return None;
        }
        let content = response.text().await.ok()?.to_lowercase();

        let sitemap_urls: Vec<String> = content
            .lines()
            .filter_map(|line| {
                line.trim()
                    .strip_prefix("sitemap:")
                    .map(|rest| rest.trim().to_string())
            })
            .collect();

        let has_allow_rules = content
            .lines()
            .any(|line| line.trim_start().starts_with("allow:"));

        Some(RobotsInfo {
            has_sitemap_reference: !sitemap_urls.is_empty(),
            has_disallow_rules: content.contains("disallow:"),
            has_allow_rules,
            user_agent_count: content.matches("user-agent:").count(),
            blocks_all_bots: content.contains("disallow: /") && content.contains("user-agent: *"),
            sitemap_urls,
            size_bytes: content.len(),
            url,
        })
    }
}

fn apply_attribute(intel: &mut WebsiteIntelligence, attr: PageAttribute) {
    let slot = match attr {
        PageAttribute::ContactPage => &mut intel.business.has_contact_page,
        PageAttribute::AboutPage => &mut intel.business.has_about_page,
        PageAttribute::PricingPage => &mut intel.business.has_pricing_page,
        PageAttribute::PrivacyPolicy => &mut intel.business.has_privacy_policy,
        PageAttribute::TermsOfService => &mut intel.business.has_terms_of_service,
        PageAttribute::Sitemap => &mut intel.seo.has_sitemap,
        PageAttribute::RobotsTxt => &mut intel.seo.has_robots_txt,
    };
    if !*slot {
        *slot = true;
    }
}
