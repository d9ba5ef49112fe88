//! Batch input handling for lead lists in CSV or JSON form
//!
//! Supports:
//! - CSV files with one domain per line or a "domain"/"website" column
//! - JSON files with an array of domain strings or objects with a "domain" field
//! - Lead tables that carry a company name alongside the domain
//! - Error resilience (invalid rows are skipped, not fatal)

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::intel::WebsiteIntelligence;

/// One row of a batch input file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainEntry {
    /// The domain to analyze
    pub domain: String,
    /// Optional label for the domain (e.g., company name from the lead table)
    #[serde(default)]
    pub label: Option<String>,
}

impl DomainEntry {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            label: None,
        }
    }

    pub fn with_label(domain: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            label: Some(label.into()),
        }
    }
}

/// Per-domain outcome kept in the batch summary
#[derive(Debug, Clone, Serialize)]
pub struct DomainAnalysisResult {
    pub domain: String,
    pub label: Option<String>,
    /// True when a working URL was found and analyzed
    pub success: bool,
    pub error: Option<String>,
    pub overall_score: u32,
    pub buyer_priority_score: u32,
    pub has_ssl: bool,
    pub is_outdated_cms: bool,
}

impl DomainAnalysisResult {
    /// Condense a full intelligence record into its summary row.
    pub fn from_intel(intel: &WebsiteIntelligence, label: Option<String>) -> Self {
        Self {
            domain: intel.domain.clone(),
            label,
            success: intel.status_code == Some(200),
            error: intel.error.clone(),
            overall_score: intel.overall_score,
            buyer_priority_score: intel.buyer_priority_score,
            has_ssl: intel.security.has_ssl,
            is_outdated_cms: intel.is_outdated_cms,
        }
    }
}

/// Summary of a batch analysis run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_domains: usize,
    pub successful: usize,
    pub failed: usize,
    /// Domains serving over HTTPS
    pub with_ssl: usize,
    /// Domains on a CMS at least one major version behind
    pub outdated_cms: usize,
    /// Domains with a buyer priority of 50 or more
    pub high_priority: usize,
    pub domain_results: Vec<DomainAnalysisResult>,
    pub total_duration_secs: f64,
    pub started_at: String,
    pub completed_at: String,
}

/// Input format for batch domain files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a domain list from a file (auto-detects format from extension)
pub fn parse_domain_file(path: &Path) -> Result<Vec<DomainEntry>> {
    let format = InputFormat::from_path(path).context(format!(
        "Cannot determine input format from file extension. Expected .csv or .json: {}",
        path.display()
    ))?;

    let content = fs::read_to_string(path)
        .context(format!("Failed to read input file: {}", path.display()))?;

    match format {
        InputFormat::Csv => parse_csv_domains(&content),
        InputFormat::Json => parse_json_domains(&content),
    }
}

/// Header names accepted as the domain column, in preference order.
pub const DOMAIN_COLUMNS: &[&str] = &["domain", "website", "url"];
/// Header names accepted as the label column.
pub const LABEL_COLUMNS: &[&str] = &["label", "company", "company_name", "name"];

/// Parse domains from CSV content
///
/// Supports two formats:
/// 1. One domain per line (no header)
/// 2. A lead table with a "domain" (or "website"/"url") column and an
///    optional company-name column
pub fn parse_csv_domains(content: &str) -> Result<Vec<DomainEntry>> {
    let mut domains = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() {
        return Ok(domains);
    }

    let first_line = lines[0].to_lowercase();
    let has_header = DOMAIN_COLUMNS.iter().any(|col| first_line.contains(col));

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read CSV headers")?.clone();

        let find_column = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h.to_lowercase() == *name))
        };
        let domain_idx = find_column(DOMAIN_COLUMNS).context(
            "CSV must have a 'domain', 'website', or 'url' column when using headers",
        )?;
        let label_idx = find_column(LABEL_COLUMNS);

        for result in reader.records() {
            let record = result.context("Failed to parse CSV record")?;

            let domain = record
                .get(domain_idx)
                .map(|s| normalize_domain(s))
                .filter(|s| !s.is_empty());

            if let Some(domain) = domain {
                if !is_valid_domain(&domain) {
                    continue;
                }

                let label = label_idx
                    .and_then(|idx| record.get(idx))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());

                domains.push(DomainEntry { domain, label });
            }
        }
    } else {
        for line in lines {
            // Comma-separated lines without a header: first column is the domain
            let raw = line.split(',').next().unwrap_or(line);

            if raw.trim().is_empty() || raw.trim_start().starts_with('#') {
                continue;
            }

            let domain = normalize_domain(raw);
            if !is_valid_domain(&domain) {
                continue;
            }

            domains.push(DomainEntry::new(domain));
        }
    }

    Ok(domains)
}

/// Parse domains from JSON content
///
/// Supports three formats:
/// 1. Array of domain strings: ["example.com", "test.org"]
/// 2. Array of objects with "domain" field: [{"domain": "example.com"}]
/// 3. Object with "domains" array: {"domains": ["example.com", "test.org"]}
pub fn parse_json_domains(content: &str) -> Result<Vec<DomainEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse JSON content")?;

    let entries = match &value {
        serde_json::Value::Array(arr) => parse_json_array(arr),

        serde_json::Value::Object(obj) => {
            if let Some(domains_value) = obj.get("domains") {
                if let serde_json::Value::Array(arr) = domains_value {
                    parse_json_array(arr)
                } else {
                    bail!("'domains' field must be an array");
                }
            } else {
                bail!("JSON object must have a 'domains' array field");
            }
        }

        _ => bail!("JSON must be an array of domains or an object with 'domains' field"),
    };

    Ok(entries)
}

fn parse_json_array(arr: &[serde_json::Value]) -> Vec<DomainEntry> {
    let mut entries = Vec::new();

    for item in arr {
        match item {
            serde_json::Value::String(raw) => {
                let domain = normalize_domain(raw);
                if !domain.is_empty() && is_valid_domain(&domain) {
                    entries.push(DomainEntry::new(domain));
                }
            }

            serde_json::Value::Object(obj) => {
                if let Some(serde_json::Value::String(raw)) = obj.get("domain") {
                    let domain = normalize_domain(raw);
                    if !domain.is_empty() && is_valid_domain(&domain) {
                        let label = obj
                            .get("label")
                            .and_then(|v| v.as_str())
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty());

                        entries.push(DomainEntry { domain, label });
                    }
                }
            }

            // Skip numbers, nulls, nested arrays
            _ => {}
        }
    }

    entries
}

/// Lead tables often store full URLs. Strip scheme, path, and a leading
/// www. so "https://www.example.com/about" keys the same site as
/// "example.com".
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    host.strip_prefix("www.")
        .unwrap_or(host)
        .to_lowercase()
}

/// Basic domain validation
pub fn is_valid_domain(domain: &str) -> bool {
    if !domain.contains('.') {
        return false;
    }

    if domain.contains("://") || domain.contains('/') {
        return false;
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return false;
    }

    if domain.contains("..") {
        return false;
    }

    domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Generate a per-domain output filename
pub fn domain_output_filename(domain: &str, format: &str) -> String {
    let domain_clean = domain.replace(['.', ':'], "_");
    format!("siteintel-{}.{}", domain_clean, format)
}

/// Export batch summary to a JSON file
pub fn export_batch_summary(summary: &BatchSummary, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summary).context("Failed to serialize batch summary")?;

    fs::write(output_path, json).context(format!(
        "Failed to write batch summary to: {}",
        output_path.display()
    ))?;

    Ok(())
}

/// Create a new batch summary stamped with the start time
pub fn new_batch_summary() -> BatchSummary {
    BatchSummary {
        total_domains: 0,
        successful: 0,
        failed: 0,
        with_ssl: 0,
        outdated_cms: 0,
        high_priority: 0,
        domain_results: Vec::new(),
        total_duration_secs: 0.0,
        started_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        completed_at: String::new(),
    }
}

/// Finalize a batch summary: stamp the end time and recompute the counts
pub fn finalize_batch_summary(summary: &mut BatchSummary) {
    summary.completed_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    summary.total_domains = summary.domain_results.len();
    summary.successful = summary.domain_results.iter().filter(|r| r.success).count();
    summary.failed = summary.domain_results.iter().filter(|r| !r.success).count();
    summary.with_ssl = summary.domain_results.iter().filter(|r| r.has_ssl).count();
    summary.outdated_cms = summary
        .domain_results
        .iter()
        .filter(|r| r.is_outdated_cms)
        .count();
    summary.high_priority = summary
        .domain_results
        .iter()
        .filter(|r| r.buyer_priority_score >= 50)
        .count();
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ CSV Parsing Tests ============

    #[test]
    fn test_parse_csv_simple_domains() {
        let content = "example.com\ntest.org\nfoo.bar.com";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
        assert_eq!(result[2].domain, "foo.bar.com");
        assert!(result.iter().all(|e| e.label.is_none()));
    }

    #[test]
    fn test_parse_csv_with_header() {
        let content = "domain,label\nexample.com,Example Inc\ntest.org,Test Corp";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[0].label, Some("Example Inc".to_string()));
        assert_eq!(result[1].domain, "test.org");
        assert_eq!(result[1].label, Some("Test Corp".to_string()));
    }

    #[test]
    fn test_parse_csv_lead_table_columns() {
        let content = "company,website,phone\nAcme Inc,https://www.acme.com,555-0100\nBeta LLC,beta.io,555-0200";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "acme.com");
        assert_eq!(result[0].label, Some("Acme Inc".to_string()));
        assert_eq!(result[1].domain, "beta.io");
        assert_eq!(result[1].label, Some("Beta LLC".to_string()));
    }

    #[test]
    fn test_parse_csv_skip_comments_and_empty() {
        let content = "example.com\n# this is a comment\n\ntest.org";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
    }

    #[test]
    fn test_parse_csv_skip_invalid_domains() {
        let content = "example.com\ninvalid\ntest.org\nno-dot";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
    }

    #[test]
    fn test_parse_csv_empty() {
        let result = parse_csv_domains("").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_parse_csv_normalizes_urls() {
        let content = "https://www.example.com/about\nHTTP://TEST.ORG";
        let result = parse_csv_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
    }

    // ============ JSON Parsing Tests ============

    #[test]
    fn test_parse_json_string_array() {
        let content = r#"["example.com", "test.org", "foo.bar.com"]"#;
        let result = parse_json_domains(content).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
        assert_eq!(result[2].domain, "foo.bar.com");
    }

    #[test]
    fn test_parse_json_object_array() {
        let content = r#"[
            {"domain": "example.com"},
            {"domain": "test.org", "label": "Test Corp"}
        ]"#;
        let result = parse_json_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert!(result[0].label.is_none());
        assert_eq!(result[1].domain, "test.org");
        assert_eq!(result[1].label, Some("Test Corp".to_string()));
    }

    #[test]
    fn test_parse_json_domains_field() {
        let content = r#"{"domains": ["example.com", "test.org"]}"#;
        let result = parse_json_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
    }

    #[test]
    fn test_parse_json_skip_invalid() {
        let content = r#"["example.com", "invalid", "test.org", 123, null]"#;
        let result = parse_json_domains(content).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].domain, "example.com");
        assert_eq!(result[1].domain, "test.org");
    }

    #[test]
    fn test_parse_json_invalid() {
        assert!(parse_json_domains("not valid json").is_err());
    }

    // ============ Domain Validation Tests ============

    #[test]
    fn test_is_valid_domain() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("sub.example.com"));
        assert!(is_valid_domain("my-site.example.com"));
        assert!(is_valid_domain("test123.org"));

        assert!(!is_valid_domain("invalid"));
        assert!(!is_valid_domain("http://example.com"));
        assert!(!is_valid_domain("example.com/path"));
        assert!(!is_valid_domain(".example.com"));
        assert!(!is_valid_domain("example.com."));
        assert!(!is_valid_domain("-example.com"));
        assert!(!is_valid_domain("example.com-"));
        assert!(!is_valid_domain("example..com"));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("https://www.example.com/about"), "example.com");
        assert_eq!(normalize_domain("  Example.COM  "), "example.com");
        assert_eq!(normalize_domain("www.example.com"), "example.com");
        assert_eq!(normalize_domain("example.com?q=1"), "example.com");
    }

    // ============ Input Format Detection Tests ============

    #[test]
    fn test_input_format_detection() {
        assert_eq!(
            InputFormat::from_path(Path::new("leads.csv")),
            Some(InputFormat::Csv)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("leads.CSV")),
            Some(InputFormat::Csv)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("leads.json")),
            Some(InputFormat::Json)
        );
        assert_eq!(InputFormat::from_path(Path::new("leads.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("leads")), None);
    }

    // ============ Summary Tests ============

    #[test]
    fn test_domain_output_filename() {
        assert_eq!(
            domain_output_filename("example.com", "csv"),
            "siteintel-example_com.csv"
        );
        assert_eq!(
            domain_output_filename("sub.example.com", "json"),
            "siteintel-sub_example_com.json"
        );
    }

    #[test]
    fn test_batch_summary_finalize() {
        let mut summary = new_batch_summary();
        summary.domain_results.push(DomainAnalysisResult {
            domain: "example.com".to_string(),
            label: None,
            success: true,
            error: None,
            overall_score: 72,
            buyer_priority_score: 55,
            has_ssl: true,
            is_outdated_cms: true,
        });
        summary.domain_results.push(DomainAnalysisResult {
            domain: "test.org".to_string(),
            label: None,
            success: false,
            error: Some("connection_failed".to_string()),
            overall_score: 0,
            buyer_priority_score: 0,
            has_ssl: false,
            is_outdated_cms: false,
        });

        finalize_batch_summary(&mut summary);

        assert_eq!(summary.total_domains, 2);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.with_ssl, 1);
        assert_eq!(summary.outdated_cms, 1);
        assert_eq!(summary.high_priority, 1);
        assert!(!summary.completed_at.is_empty());
    }

    #[test]
    fn test_result_from_intel() {
        let mut intel = WebsiteIntelligence::new("example.com");
        intel.status_code = Some(200);
        intel.security.has_ssl = true;
        intel.overall_score = 64;
        let result = DomainAnalysisResult::from_intel(&intel, Some("Acme".to_string()));
        assert!(result.success);
        assert!(result.has_ssl);
        assert_eq!(result.overall_score, 64);
        assert_eq!(result.label.as_deref(), Some("Acme"));
    }
}
