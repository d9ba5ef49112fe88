//! CSV and JSON export of analysis results.
//!
//! The flat CSV is one row per domain with every signal as its own
//! column, ready for a spreadsheet or a CRM import. When the input was a
//! lead table, the enrichment columns can also be merged back onto the
//! original rows keyed by domain.

use anyhow::{Context, Result};
use csv::Writer;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use tracing::{debug, info};

use crate::batch::{normalize_domain, DOMAIN_COLUMNS};
use crate::intel::WebsiteIntelligence;

/// Write one flat row per analyzed domain.
pub fn export_csv(results: &[WebsiteIntelligence], output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} analysis results to CSV: {}",
        results.len(),
        output_path
    );

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    // All records share the same column set; the first one defines the header.
    if let Some(first) = results.first() {
        let header: Vec<&str> = first.to_flat_record().iter().map(|(name, _)| *name).collect();
        wtr.write_record(&header)?;

        for intel in results {
            let row: Vec<String> = intel
                .to_flat_record()
                .into_iter()
                .map(|(_, value)| value)
                .collect();
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    info!(
        "Successfully exported {} analysis results to CSV: {}",
        results.len(),
        output_path
    );

    Ok(())
}

pub fn export_json(results: &[WebsiteIntelligence], output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} analysis results to JSON: {}",
        results.len(),
        output_path
    );

    let json_output = JsonExport {
        summary: ExportSummary {
            total_domains: results.len(),
            reachable: results.iter().filter(|r| r.status_code == Some(200)).count(),
            with_ssl: results.iter().filter(|r| r.security.has_ssl).count(),
            outdated_cms: results.iter().filter(|r| r.is_outdated_cms).count(),
            high_priority: results
                .iter()
                .filter(|r| r.buyer_priority_score >= 50)
                .count(),
            average_overall_score: average(results.iter().map(|r| f64::from(r.overall_score))),
        },
        results: results.to_vec(),
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;

    let mut file = File::create(output_path)?;
    file.write_all(json_string.as_bytes())?;

    info!(
        "Successfully exported {} analysis results to JSON: {}",
        results.len(),
        output_path
    );

    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport {
    summary: ExportSummary,
    results: Vec<WebsiteIntelligence>,
}

#[derive(serde::Serialize)]
struct ExportSummary {
    total_domains: usize,
    reachable: usize,
    with_ssl: usize,
    outdated_cms: usize,
    high_priority: usize,
    average_overall_score: f64,
}

/// Merge enrichment columns back onto the original lead table.
///
/// Rows are keyed by normalized domain. Lead rows with no analysis result
/// keep their original cells and get empty enrichment columns; the
/// original column order is preserved, with enrichment columns appended.
pub fn merge_with_leads(
    input_path: &Path,
    results: &[WebsiteIntelligence],
    output_path: &str,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input_path)
        .context(format!("Failed to open lead file: {}", input_path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read lead file headers")?
        .clone();
    let domain_idx = DOMAIN_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h.to_lowercase() == *name))
        .context("Lead file must have a 'domain', 'website', or 'url' column")?;

    let by_domain: HashMap<String, &WebsiteIntelligence> = results
        .iter()
        .map(|intel| (normalize_domain(&intel.domain), intel))
        .collect();

    // Enrichment columns, minus the domain key the lead table already has.
    let enrichment_columns: Vec<&'static str> = results
        .first()
        .map(|intel| {
            intel
                .to_flat_record()
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| *name != "domain")
                .collect()
        })
        .unwrap_or_default();

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    let mut header_row: Vec<&str> = headers.iter().collect();
    header_row.extend(&enrichment_columns);
    wtr.write_record(&header_row)?;

    let mut matched = 0usize;
    for record in reader.records() {
        let record = record.context("Failed to parse lead file record")?;

        let mut row: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        // Flexible parsing can leave short rows; pad to the header width.
        row.resize(headers.len(), String::new());

        let key = record
            .get(domain_idx)
            .map(normalize_domain)
            .unwrap_or_default();

        match by_domain.get(&key) {
            Some(intel) => {
                matched += 1;
                let values: HashMap<&'static str, String> =
                    intel.to_flat_record().into_iter().collect();
                for column in &enrichment_columns {
                    row.push(values.get(column).cloned().unwrap_or_default());
                }
            }
            None => row.extend(std::iter::repeat(String::new()).take(enrichment_columns.len())),
        }

        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    info!(
        "Merged {} analysis results onto lead table: {}",
        matched, output_path
    );

    Ok(())
}

pub fn print_analysis_summary(results: &[WebsiteIntelligence]) {
    if results.is_empty() {
        println!("No domains analyzed.");
        return;
    }

    let reachable = results.iter().filter(|r| r.status_code == Some(200)).count();
    let with_ssl = results.iter().filter(|r| r.security.has_ssl).count();
    let outdated = results.iter().filter(|r| r.is_outdated_cms).count();
    let high_priority = results
        .iter()
        .filter(|r| r.buyer_priority_score >= 50)
        .count();

    let mut load_times: Vec<f64> = results
        .iter()
        .filter(|r| r.performance.load_time.sample_count() > 0)
        .map(|r| r.performance.load_time.trimmed_mean)
        .collect();
    load_times.sort_by(|a, b| a.total_cmp(b));

    println!("\n=== Analysis Summary ===");
    println!("Domains analyzed: {}", results.len());
    println!("Reachable: {}", reachable);
    println!("Serving HTTPS: {}", with_ssl);
    println!("Outdated CMS: {}", outdated);
    println!("High buyer priority (>= 50): {}", high_priority);
    if !load_times.is_empty() {
        let mean = average(load_times.iter().copied());
        let median = load_times[load_times.len() / 2];
        println!("Load time mean: {:.2}s, median: {:.2}s", mean, median);
    }
    println!("========================\n");
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().sum::<f64>() / collected.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_result(domain: &str) -> WebsiteIntelligence {
        let mut intel = WebsiteIntelligence::new(domain);
        intel.status_code = Some(200);
        intel.security.has_ssl = true;
        intel.title = Some("Sample".to_string());
        intel.calculate_overall_scores();
        intel
    }

    #[test]
    fn test_export_csv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let results = vec![sample_result("example.com"), sample_result("test.org")];

        export_csv(&results, path.to_str().unwrap()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("domain"));
        assert!(headers.iter().any(|h| h == "buyer_priority_score"));

        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some("example.com"));
        assert_eq!(rows[0].len(), headers.len());
    }

    #[test]
    fn test_export_csv_empty_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_csv(&[], path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_json_summary_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut unreachable = WebsiteIntelligence::new("down.example.com");
        unreachable.error = Some("timeout".to_string());
        unreachable.calculate_overall_scores();
        let results = vec![sample_result("example.com"), unreachable];

        export_json(&results, path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["summary"]["total_domains"], 2);
        assert_eq!(value["summary"]["reachable"], 1);
        assert_eq!(value["summary"]["with_ssl"], 1);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_with_leads_keys_by_domain() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("leads.csv");
        let output = dir.path().join("enriched.csv");
        std::fs::write(
            &input,
            "company,website,phone\nAcme Inc,https://www.example.com,555-0100\nGone LLC,gone.example.net,555-0200\n",
        )
        .unwrap();

        let results = vec![sample_result("example.com")];
        merge_with_leads(&input, &results, output.to_str().unwrap()).unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("company"));
        assert!(headers.iter().any(|h| h == "overall_score"));

        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);

        let ssl_idx = headers.iter().position(|h| h == "has_ssl").unwrap();
        // Matched row carries enrichment, unmatched row gets empty cells.
        assert_eq!(rows[0].get(ssl_idx), Some("true"));
        assert_eq!(rows[1].get(ssl_idx), Some(""));
        // Original lead cells survive untouched.
        assert_eq!(rows[0].get(2), Some("555-0100"));
    }

    #[test]
    fn test_merge_requires_domain_column() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("leads.csv");
        let output = dir.path().join("enriched.csv");
        std::fs::write(&input, "company,phone\nAcme Inc,555-0100\n").unwrap();

        let results = vec![sample_result("example.com")];
        assert!(merge_with_leads(&input, &results, output.to_str().unwrap()).is_err());
    }
}
