//! Technology stack detection from HTML markers.

/// Marker tables per category. A technology is reported once if any of its
/// markers appears in the page.
const JS_FRAMEWORKS: &[(&str, &[&str])] = &[
    ("react", &["react", "reactdom", "__next_data__", "_next/"]),
    ("vue", &["vue", "vuejs", "__vue__"]),
    ("angular", &["angular", "ng-", "ng-app"]),
    ("svelte", &["svelte"]),
    ("jquery", &["jquery"]),
    ("next.js", &["__next_data__", "_next/"]),
    ("nuxt", &["__nuxt__", "_nuxt/"]),
    ("gatsby", &["gatsby"]),
    ("ember", &["ember"]),
    ("backbone", &["backbone"]),
];

const ANALYTICS: &[(&str, &[&str])] = &[
    (
        "google_analytics",
        &["google-analytics", "gtag", "ga.js", "analytics.js"],
    ),
    ("google_tag_manager", &["googletagmanager", "gtm.js"]),
    ("facebook_pixel", &["facebook.com/tr", "fbevents", "fbq("]),
    ("hotjar", &["hotjar"]),
    ("intercom", &["intercom"]),
    ("hubspot", &["hubspot", "hs-scripts"]),
    ("mailchimp", &["mailchimp"]),
    ("segment", &["segment.com", "analytics.min.js"]),
    ("mixpanel", &["mixpanel"]),
    ("amplitude", &["amplitude"]),
    ("heap", &["heap-"]),
    ("clarity", &["clarity.ms"]),
    ("plausible", &["plausible.io"]),
];

const CSS_FRAMEWORKS: &[(&str, &[&str])] = &[
    ("bootstrap", &["bootstrap"]),
    ("tailwind", &["tailwind"]),
    ("bulma", &["bulma"]),
    ("foundation", &["foundation"]),
    ("materialize", &["materialize"]),
    ("semantic_ui", &["semantic-ui", "semantic.min"]),
];

const CDNS: &[(&str, &[&str])] = &[
    ("cloudflare", &["cloudflare", "cdnjs.cloudflare"]),
    ("fastly", &["fastly"]),
    ("akamai", &["akamai"]),
    ("cloudfront", &["cloudfront.net"]),
    ("jsdelivr", &["jsdelivr"]),
    ("unpkg", &["unpkg.com"]),
];

const OTHER: &[(&str, &[&str])] = &[
    ("recaptcha", &["recaptcha", "grecaptcha"]),
    ("stripe", &["stripe.com/v", "stripe.js"]),
    ("paypal", &["paypal.com/sdk"]),
    ("google_maps", &["maps.googleapis", "maps.google"]),
    ("youtube_embed", &["youtube.com/embed", "youtube-nocookie"]),
    ("vimeo_embed", &["player.vimeo.com"]),
    ("typekit", &["use.typekit.net"]),
    ("google_fonts", &["fonts.googleapis", "fonts.gstatic"]),
    ("font_awesome", &["fontawesome", "font-awesome"]),
    ("livechat", &["livechat", "livechatinc"]),
    ("zendesk", &["zendesk"]),
    ("drift", &["drift.com"]),
    ("crisp", &["crisp.chat"]),
];

/// Detect technologies present in the page. Returns a deduplicated list in
/// table order (frameworks first, then analytics, CSS, CDNs, misc).
pub fn detect(html: &str) -> Vec<String> {
    let html_lower = html.to_lowercase();
    let mut techs = Vec::new();

    for table in [JS_FRAMEWORKS, ANALYTICS, CSS_FRAMEWORKS, CDNS, OTHER] {
        for (tech, markers) in table {
            if markers.iter().any(|m| html_lower.contains(m)) {
                let name = tech.to_string();
                if !techs.contains(&name) {
                    techs.push(name);
                }
            }
        }
    }

    techs
}
