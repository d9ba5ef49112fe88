//! CMS detection from HTML markers and generator meta tags.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Current stable versions used for the outdated check. Update periodically.
const CURRENT_VERSIONS: &[(&str, (u32, u32))] = &[
    ("wordpress", (6, 4)),
    ("joomla", (5, 0)),
    ("drupal", (10, 0)),
];

static GENERATOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="generator"]"#).unwrap());

static WORDPRESS_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)WordPress\s*([\d.]+)").unwrap());
static JOOMLA_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Joomla!?\s*([\d.]+)").unwrap());
static DRUPAL_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Drupal\s*([\d.]+)").unwrap());

/// Detect the CMS powering a page, with version where the generator meta
/// tag reveals one. Signatures are checked in a fixed order and the first
/// match wins, so platform-specific markers must come before generic ones.
pub fn detect(html: &str, document: &Html) -> (Option<String>, Option<String>) {
    let html_lower = html.to_lowercase();

    if html_lower.contains("wp-content") || html_lower.contains("wordpress") {
        return (
            Some("wordpress".to_string()),
            generator_version(document, &WORDPRESS_VERSION_RE),
        );
    }
    if html_lower.contains("wix.com") || html_lower.contains("_wix") {
        return (Some("wix".to_string()), None);
    }
    if html_lower.contains("squarespace") {
        return (Some("squarespace".to_string()), None);
    }
    if html_lower.contains("shopify") || html_lower.contains("cdn.shopify") {
        return (Some("shopify".to_string()), None);
    }
    if html_lower.contains("webflow") {
        return (Some("webflow".to_string()), None);
    }
    if html_lower.contains("joomla") {
        return (
            Some("joomla".to_string()),
            generator_version(document, &JOOMLA_VERSION_RE),
        );
    }
    if html_lower.contains("drupal") || html_lower.contains("sites/default/files") {
        return (
            Some("drupal".to_string()),
            generator_version(document, &DRUPAL_VERSION_RE),
        );
    }
    if html_lower.contains("ghost") && html_lower.contains("content/images") {
        return (Some("ghost".to_string()), None);
    }
    if html_lower.contains("magento") || html_lower.contains("mage") {
        return (Some("magento".to_string()), None);
    }
    if html_lower.contains("prestashop") {
        return (Some("prestashop".to_string()), None);
    }

    (None, None)
}

fn generator_version(document: &Html, pattern: &Regex) -> Option<String> {
    let generator = document.select(&GENERATOR_SELECTOR).next()?;
    let content = generator.value().attr("content")?;
    pattern
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a detected CMS version is outdated relative to the current
/// stable release. A version is outdated when it is more than one major
/// behind, or exactly one major behind while the current minor has moved
/// past 5. Unknown CMSes and unparseable versions are never outdated.
pub fn is_outdated(cms: &str, version: Option<&str>) -> bool {
    let Some(version) = version else {
        return false;
    };
    let Some(&(_, (current_major, current_minor))) =
        CURRENT_VERSIONS.iter().find(|(name, _)| *name == cms)
    else {
        return false;
    };

    let mut parts = version.split('.');
    let Some(detected_major) = parts.next().and_then(|p| p.parse::<u32>().ok()) else {
        return false;
    };

    if detected_major < current_major.saturating_sub(1) {
        return true;
    }
    if detected_major == current_major.saturating_sub(1) && current_minor > 5 {
        return true;
    }

    false
}
