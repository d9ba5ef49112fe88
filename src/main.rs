use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use siteintel::batch::{
    self, export_batch_summary, finalize_batch_summary, new_batch_summary, DomainAnalysisResult,
    DomainEntry,
};
use siteintel::cli::{Args, Cli};
use siteintel::config::{AppConfig, ConfigError};
use siteintel::export;
use siteintel::scraper::SiteAnalyzer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = Args::from(&cli);

    init_logging(args.verbose);

    // Handle --init flag first (before any other processing)
    if args.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run siteintel again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = args.validate() {
        eprintln!("❌ Invalid arguments: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let mut config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!(
                        "✅ Created default configuration file at: {}",
                        created_path.display()
                    );
                    println!("   Edit this file to customize settings, then run siteintel again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("❌ Configuration file not found at: {}", path.display());
                    eprintln!("   Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // CLI overrides land on top of the config file
    if let Some(rounds) = args.rounds {
        config.analysis.measurement_rounds = rounds;
    }
    if let Some(jobs) = args.parallel_jobs {
        config.analysis.max_concurrent = jobs;
    }

    // Collect the domains to analyze
    let entries: Vec<DomainEntry> = if let Some(input_file) = &args.input_file {
        let entries = match batch::parse_domain_file(Path::new(input_file)) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("❌ Failed to read input file: {}", e);
                std::process::exit(1);
            }
        };
        if entries.is_empty() {
            eprintln!("❌ No valid domains found in: {}", input_file);
            std::process::exit(1);
        }
        entries
    } else {
        // Validated above: single-domain mode requires --domain
        let raw = args.domain.clone().unwrap_or_default();
        let domain = batch::normalize_domain(&raw);
        if !batch::is_valid_domain(&domain) {
            eprintln!("❌ Not a valid domain: {}", raw);
            std::process::exit(1);
        }
        vec![DomainEntry::new(domain)]
    };

    let output_dir = args.get_output_dir();
    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!("❌ Failed to create output directory '{}': {}", output_dir, e);
        std::process::exit(1);
    }

    println!(
        "🔍 Analyzing {} domain(s) with {} measurement round(s), {} in parallel",
        entries.len(),
        config.analysis.measurement_rounds,
        config.analysis.max_concurrent
    );

    let analyzer = SiteAnalyzer::new(&config)?;
    let labels: HashMap<String, Option<String>> = entries
        .iter()
        .map(|e| (e.domain.clone(), e.label.clone()))
        .collect();
    let domains: Vec<String> = entries.iter().map(|e| e.domain.clone()).collect();

    let started = Instant::now();
    let mut summary = new_batch_summary();
    let results = analyzer.analyze_batch(&domains).await;

    for intel in &results {
        let label = labels.get(&intel.domain).cloned().flatten();
        summary
            .domain_results
            .push(DomainAnalysisResult::from_intel(intel, label));
    }
    summary.total_duration_secs = started.elapsed().as_secs_f64();
    finalize_batch_summary(&mut summary);

    // Export results
    let output_path = match args.output_format.as_str() {
        "json" => {
            let path = args.output_path("json");
            export::export_json(&results, &path)?;
            path
        }
        _ => {
            let path = args.output_path("csv");
            export::export_csv(&results, &path)?;
            path
        }
    };

    if args.is_batch_mode() {
        let summary_path = Path::new(&output_dir)
            .join(format!("{}_summary.json", args.output))
            .to_string_lossy()
            .to_string();
        export_batch_summary(&summary, Path::new(&summary_path))?;
        println!("📄 Batch summary saved to: {}", summary_path);
    }

    if args.merge_leads {
        if let Some(input_file) = &args.input_file {
            let merged_path = Path::new(&output_dir)
                .join(format!("{}_enriched.csv", args.output))
                .to_string_lossy()
                .to_string();
            export::merge_with_leads(Path::new(input_file), &results, &merged_path)?;
            println!("📄 Enriched lead table saved to: {}", merged_path);
        }
    }

    export::print_analysis_summary(&results);

    // Single-domain runs get the itemized problem list on the console
    if !args.is_batch_mode() {
        if let Some(intel) = results.first() {
            println!(
                "Overall score: {} | Buyer priority: {} | Grade: {}",
                intel.overall_score, intel.buyer_priority_score, intel.performance.grade
            );
            let issues = intel.all_issues();
            if issues.is_empty() {
                println!("No issues found.");
            } else {
                println!("Issues found:");
                for issue in issues {
                    println!("  - {}", issue);
                }
            }
        }
    }

    println!("✅ Results saved to: {}", output_path);

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("siteintel={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
