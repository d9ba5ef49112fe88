//! Landing-page HTML analysis.
//!
//! One pass over the parsed document populates basic page info, SEO and
//! accessibility facts, CMS/technology detection, mobile checks, and
//! business signals on the intelligence record. Extraction is heuristic
//! and infallible: malformed HTML parses to whatever tree `scraper`
//! recovers, and missing signals simply stay unset.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::analyzers::{cms, tech};
use crate::intel::WebsiteIntelligence;
use crate::metrics::{AccessibilityMetrics, BusinessSignals, SeoMetrics};

const SOCIAL_PLATFORMS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com", "fb.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("linkedin", &["linkedin.com"]),
    ("instagram", &["instagram.com"]),
    ("youtube", &["youtube.com"]),
    ("tiktok", &["tiktok.com"]),
    ("pinterest", &["pinterest.com"]),
    ("github", &["github.com"]),
    ("medium", &["medium.com"]),
];

const EMAIL_FALSE_POSITIVES: &[&str] = &[
    "example",
    "test",
    "your",
    "email",
    "domain",
    "sample",
    "user",
    "name",
    "info@example",
];

const ADDRESS_INDICATORS: &[&str] = &[
    "street",
    "avenue",
    "road",
    "blvd",
    "boulevard",
    "suite",
    "floor",
    "zip",
    "postal",
    "address",
    "ave",
    "st.",
    "rd.",
    "lane",
    "drive",
    "court",
    "plaza",
    "building",
];

const BLOG_INDICATORS: &[&str] = &[
    "/blog",
    "/news",
    "/articles",
    "/posts",
    "/insights",
    "/resources",
];

const TESTIMONIAL_INDICATORS: &[&str] = &[
    "testimonial",
    "review",
    "customer says",
    "what our clients",
    "client stories",
    "success stories",
    "case study",
    "case studies",
    "feedback",
    "what people say",
];

const CONTACT_FORM_INDICATORS: &[&str] = &[
    "contact",
    "message",
    "inquiry",
    "enquiry",
    "get in touch",
    "reach out",
    "send us",
    "write to us",
];

const PRICING_INDICATORS: &[&str] = &["/pricing", "/plans", "/packages", "pricing-table"];

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // US/Canada, optional country code and parenthesized area code
        r"\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        // UK
        r"\+44\s?\d{4}\s?\d{6}",
        // Germany
        r"\+49\s?\d{3,4}\s?\d{6,8}",
        // France
        r"\+33\s?\d\s?\d{2}\s?\d{2}\s?\d{2}\s?\d{2}",
        // Generic international
        r"\+\d{1,3}[-.\s]?\d{1,4}[-.\s]?\d{1,4}[-.\s]?\d{1,9}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static COPYRIGHT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"©\s*(\d{4})",
        r"copyright\s*(\d{4})",
        r"copyright\s*©?\s*(\d{4})",
        r"\(c\)\s*(\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LANDMARK_ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(main|navigation|banner|contentinfo|complementary|search)$").unwrap());

static SKIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)skip").unwrap());

struct Selectors {
    title: Selector,
    meta_description: Selector,
    meta_keywords: Selector,
    og_meta: Selector,
    twitter_meta: Selector,
    json_ld: Selector,
    itemscope: Selector,
    canonical: Selector,
    h1: Selector,
    h2: Selector,
    img: Selector,
    anchor: Selector,
    html_tag: Selector,
    viewport: Selector,
    role_any: Selector,
    semantic: Selector,
    form: Selector,
    form_field: Selector,
    label: Selector,
    textarea: Selector,
    input: Selector,
}

static SELECTORS: Lazy<Selectors> = Lazy::new(|| Selectors {
    title: Selector::parse("title").unwrap(),
    meta_description: Selector::parse(r#"meta[name="description"]"#).unwrap(),
    meta_keywords: Selector::parse(r#"meta[name="keywords"]"#).unwrap(),
    og_meta: Selector::parse(r#"meta[property^="og:"]"#).unwrap(),
    twitter_meta: Selector::parse(r#"meta[name^="twitter:"]"#).unwrap(),
    json_ld: Selector::parse(r#"script[type="application/ld+json"]"#).unwrap(),
    itemscope: Selector::parse("[itemscope]").unwrap(),
    canonical: Selector::parse(r#"link[rel="canonical"]"#).unwrap(),
    h1: Selector::parse("h1").unwrap(),
    h2: Selector::parse("h2").unwrap(),
    img: Selector::parse("img").unwrap(),
    anchor: Selector::parse("a").unwrap(),
    html_tag: Selector::parse("html").unwrap(),
    viewport: Selector::parse(r#"meta[name="viewport"]"#).unwrap(),
    role_any: Selector::parse("[role]").unwrap(),
    semantic: Selector::parse("main, nav, header, footer, aside").unwrap(),
    form: Selector::parse("form").unwrap(),
    form_field: Selector::parse("input, select, textarea").unwrap(),
    label: Selector::parse("label").unwrap(),
    textarea: Selector::parse("textarea").unwrap(),
    input: Selector::parse("input").unwrap(),
});

/// Populate the intelligence record from the landing-page HTML.
pub fn analyze(html: &str, intel: &mut WebsiteIntelligence) {
    let document = Html::parse_document(html);
    let html_lower = html.to_lowercase();
    let text_lower: String = document
        .root_element()
        .text()
        .collect::<String>()
        .to_lowercase();

    extract_basic_info(&document, intel);
    let domain = intel.domain.clone();
    extract_seo(&document, &domain, &mut intel.seo);

    let (cms, version) = cms::detect(html, &document);
    if let Some(ref cms_name) = cms {
        intel.is_outdated_cms = cms::is_outdated(cms_name, version.as_deref());
    }
    intel.cms_detected = cms;
    intel.cms_version = version;

    intel.technologies = tech::detect(html);

    extract_accessibility(&document, &intel.seo, &mut intel.accessibility);
    extract_mobile(&document, intel);
    extract_business(html, &html_lower, &text_lower, &document, &mut intel.business);
}

fn extract_basic_info(document: &Html, intel: &mut WebsiteIntelligence) {
    if let Some(title) = document.select(&SELECTORS.title).next() {
        let text: String = title.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            intel.title = Some(truncate(&text, 200));
        }
    }

    if let Some(meta) = document.select(&SELECTORS.meta_description).next() {
        if let Some(content) = meta.value().attr("content") {
            intel.meta_description = Some(truncate(content, 300));
        }
    }
}

fn extract_seo(document: &Html, domain: &str, seo: &mut SeoMetrics) {
    seo.has_meta_description = document
        .select(&SELECTORS.meta_description)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| !c.trim().is_empty())
        .unwrap_or(false);

    seo.has_meta_keywords = document.select(&SELECTORS.meta_keywords).next().is_some();
    seo.has_og_tags = document.select(&SELECTORS.og_meta).next().is_some();
    seo.has_twitter_cards = document.select(&SELECTORS.twitter_meta).next().is_some();
    seo.has_structured_data = document.select(&SELECTORS.json_ld).next().is_some()
        || document.select(&SELECTORS.itemscope).next().is_some();

    seo.canonical_url = document
        .select(&SELECTORS.canonical)
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(|h| h.to_string());

    seo.h1_count = document.select(&SELECTORS.h1).count();
    seo.h2_count = document.select(&SELECTORS.h2).count();

    for img in document.select(&SELECTORS.img) {
        seo.image_count += 1;
        let alt = img.value().attr("alt").unwrap_or("");
        if alt.is_empty() {
            seo.images_without_alt += 1;
        }
    }

    for link in document.select(&SELECTORS.anchor) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if (href.starts_with("http://") || href.starts_with("https://"))
            && !href.contains(domain)
        {
            seo.external_links += 1;
        } else if !href.is_empty()
            && !href.starts_with('#')
            && !href.starts_with("javascript:")
            && !href.starts_with("mailto:")
            && !href.starts_with("tel:")
        {
            seo.internal_links += 1;
        }
    }
}

fn extract_accessibility(document: &Html, seo: &SeoMetrics, a11y: &mut AccessibilityMetrics) {
    a11y.has_lang_attribute = document
        .select(&SELECTORS.html_tag)
        .next()
        .map(|e| e.value().attr("lang").is_some())
        .unwrap_or(false);

    a11y.has_skip_link = document.select(&SELECTORS.anchor).any(|a| {
        let el = a.value();
        let href_matches = matches!(
            el.attr("href"),
            Some("#main") | Some("#content") | Some("#main-content")
        );
        let class_matches = el
            .attr("class")
            .map(|c| SKIP_RE.is_match(c))
            .unwrap_or(false);
        let text_matches = SKIP_RE.is_match(&a.text().collect::<String>());
        href_matches || class_matches || text_matches
    });

    let has_role_landmark = document
        .select(&SELECTORS.role_any)
        .any(|e| match e.value().attr("role") {
            Some(role) => LANDMARK_ROLE_RE.is_match(role),
            None => false,
        });
    a11y.has_aria_landmarks =
        has_role_landmark || document.select(&SELECTORS.semantic).next().is_some();

    a11y.forms_have_labels = check_form_labels(document);
    a11y.images_have_alt = seo.images_without_alt == 0;
}

/// All-or-nothing form label check: every labelable field in every form must
/// be labeled by one of the accepted mechanisms.
fn check_form_labels(document: &Html) -> bool {
    let forms: Vec<ElementRef> = document.select(&SELECTORS.form).collect();
    if forms.is_empty() {
        return true;
    }

    // Collect every label[for] target up front.
    let labeled_ids: HashSet<String> = document
        .select(&SELECTORS.label)
        .filter_map(|l| l.value().attr("for"))
        .map(|f| f.to_string())
        .collect();

    for form in &forms {
        for field in form.select(&SELECTORS.form_field) {
            let el = field.value();
            let input_type = el.attr("type").unwrap_or("text").to_lowercase();
            if matches!(
                input_type.as_str(),
                "hidden" | "submit" | "button" | "reset" | "image"
            ) {
                continue;
            }

            let has_attr_label = el.attr("aria-label").is_some_and(|v| !v.is_empty())
                || el.attr("aria-labelledby").is_some_and(|v| !v.is_empty())
                || el.attr("placeholder").is_some_and(|v| !v.is_empty())
                || el.attr("title").is_some_and(|v| !v.is_empty());

            let has_for_label = el
                .attr("id")
                .map(|id| labeled_ids.contains(id))
                .unwrap_or(false);

            let wrapped_in_label = field
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|anc| anc.value().name() == "label");

            if !(has_attr_label || has_for_label || wrapped_in_label) {
                return false;
            }
        }
    }

    true
}

fn extract_mobile(document: &Html, intel: &mut WebsiteIntelligence) {
    match document.select(&SELECTORS.viewport).next() {
        Some(viewport) => {
            intel.has_viewport_meta = true;
            let content = viewport
                .value()
                .attr("content")
                .unwrap_or("")
                .to_lowercase();
            intel.is_mobile_friendly =
                content.contains("width=device-width") || content.contains("initial-scale");
        }
        None => {
            intel.has_viewport_meta = false;
            intel.is_mobile_friendly = false;
        }
    }
}

fn extract_business(
    html: &str,
    html_lower: &str,
    text_lower: &str,
    document: &Html,
    business: &mut BusinessSignals,
) {
    business.has_phone_number = PHONE_PATTERNS.iter().any(|p| p.is_match(html));

    business.has_email = EMAIL_RE.find_iter(html).any(|m| {
        let email = m.as_str().to_lowercase();
        !EMAIL_FALSE_POSITIVES.iter().any(|fp| email.contains(fp))
    });

    business.has_physical_address = ADDRESS_INDICATORS.iter().any(|i| text_lower.contains(i));

    for (platform, domains) in SOCIAL_PLATFORMS {
        if domains.iter().any(|d| html_lower.contains(d)) {
            let name = platform.to_string();
            if !business.social_platforms.contains(&name) {
                business.social_platforms.push(name);
            }
        }
    }
    business.has_social_links = !business.social_platforms.is_empty();

    business.has_blog = BLOG_INDICATORS.iter().any(|i| html_lower.contains(i));
    business.has_testimonials = TESTIMONIAL_INDICATORS.iter().any(|i| text_lower.contains(i));

    business.copyright_year = extract_copyright_year(html_lower);
    business.has_contact_form = detect_contact_form(document);
    business.has_pricing_page = PRICING_INDICATORS.iter().any(|i| html_lower.contains(i));
}

fn extract_copyright_year(html_lower: &str) -> Option<u32> {
    for pattern in COPYRIGHT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(html_lower) {
            if let Ok(year) = caps[1].parse::<u32>() {
                if (1990..=2030).contains(&year) {
                    return Some(year);
                }
            }
        }
    }
    None
}

/// A contact form is either one whose markup/text mentions contact keywords,
/// or one carrying the classic name/email/message field trio.
fn detect_contact_form(document: &Html) -> bool {
    for form in document.select(&SELECTORS.form) {
        let form_markup = form.html().to_lowercase();
        if CONTACT_FORM_INDICATORS.iter().any(|i| form_markup.contains(i)) {
            return true;
        }

        let has_name_field = form.select(&SELECTORS.input).any(|i| {
            i.value()
                .attr("name")
                .map(|n| n.to_lowercase().contains("name"))
                .unwrap_or(false)
        });
        let has_email_field = form.select(&SELECTORS.input).any(|i| {
            i.value().attr("type") == Some("email")
                || i.value()
                    .attr("name")
                    .map(|n| n.to_lowercase().contains("email"))
                    .unwrap_or(false)
        });
        let has_message_field = form.select(&SELECTORS.textarea).next().is_some();

        if has_name_field && has_email_field && has_message_field {
            return true;
        }
    }
    false
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
