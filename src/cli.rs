use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "siteintel")]
#[command(about = "Website intelligence scraper for batches of business-lead domains")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/siteintel.toml
    #[arg(long)]
    pub init: bool,

    /// Single domain to analyze (e.g. example.com)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Path to a CSV or JSON file with multiple domains to analyze
    /// CSV: one domain per line, or a lead table with a "domain"/"website" column
    /// JSON: array of domain strings, or array of objects with a "domain" field
    #[arg(long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Timed fetches per domain (overrides analysis.measurement_rounds)
    #[arg(short = 'r', long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Number of domains analyzed in parallel (overrides analysis.max_concurrent)
    #[arg(short = 'j', long, value_name = "N")]
    pub parallel_jobs: Option<usize>,

    /// Output format: 'csv' (default) or 'json'
    #[arg(short = 'f', long, default_value = "csv")]
    pub output_format: String,

    /// Output filename (extension set from format if not provided)
    #[arg(short, long, default_value = "site_intelligence")]
    pub output: String,

    /// Output directory for result files (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Also write the enrichment columns merged back onto the input lead
    /// table (CSV input only)
    #[arg(long)]
    pub merge_leads: bool,

    /// Verbose logging (use -v for INFO, -vv for DEBUG with request details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

// Args is the validated view main() works against
#[derive(Debug)]
pub struct Args {
    pub init: bool,
    pub domain: Option<String>,
    pub input_file: Option<String>,
    pub rounds: Option<usize>,
    pub parallel_jobs: Option<usize>,
    pub output_format: String,
    pub output: String,
    pub output_dir: Option<String>,
    pub merge_leads: bool,
    pub verbose: u8,
}

impl From<&Cli> for Args {
    fn from(cli: &Cli) -> Self {
        Args {
            init: cli.init,
            domain: cli.domain.clone(),
            input_file: cli.input_file.clone(),
            rounds: cli.rounds,
            parallel_jobs: cli.parallel_jobs,
            output_format: cli.output_format.clone(),
            output: cli.output.clone(),
            output_dir: cli.output_dir.clone(),
            merge_leads: cli.merge_leads,
            verbose: cli.verbose,
        }
    }
}

impl Args {
    /// Check if running in batch mode (--input-file provided)
    pub fn is_batch_mode(&self) -> bool {
        self.input_file.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        // Domain validation only applies when not using --init and not in batch mode
        if !self.init && !self.is_batch_mode() {
            match &self.domain {
                None => {
                    return Err(
                        "Domain is required (use --domain or --input-file for batch mode)"
                            .to_string(),
                    )
                }
                Some(d) if d.is_empty() => return Err("Domain cannot be empty".to_string()),
                _ => {}
            }
        }

        if self.domain.is_some() && self.is_batch_mode() {
            return Err("Use either --domain or --input-file, not both".to_string());
        }

        if !["csv", "json"].contains(&self.output_format.as_str()) {
            return Err("Output format must be 'csv' or 'json'".to_string());
        }

        if let Some(rounds) = self.rounds {
            if rounds == 0 {
                return Err("Rounds must be greater than 0".to_string());
            }
            if rounds > 20 {
                return Err("Rounds cannot exceed 20 to keep batch runtimes sane".to_string());
            }
        }

        if let Some(jobs) = self.parallel_jobs {
            if jobs == 0 {
                return Err("Parallel jobs must be greater than 0".to_string());
            }
            if jobs > 100 {
                return Err(
                    "Parallel jobs cannot exceed 100 to avoid overwhelming target sites"
                        .to_string(),
                );
            }
        }

        if self.merge_leads {
            match &self.input_file {
                Some(path) if path.to_lowercase().ends_with(".csv") => {}
                _ => {
                    return Err(
                        "--merge-leads requires a CSV --input-file to merge onto".to_string()
                    )
                }
            }
        }

        Ok(())
    }

    pub fn get_output_dir(&self) -> String {
        self.output_dir.clone().unwrap_or_else(|| ".".to_string())
    }

    /// Full output path for the given extension, adding it only when the
    /// configured filename doesn't already carry one.
    pub fn output_path(&self, extension: &str) -> String {
        let filename = if self.output.ends_with(&format!(".{}", extension)) {
            self.output.clone()
        } else {
            format!("{}.{}", self.output, extension)
        };
        std::path::Path::new(&self.get_output_dir())
            .join(filename)
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            init: false,
            domain: Some("example.com".to_string()),
            input_file: None,
            rounds: None,
            parallel_jobs: None,
            output_format: "csv".to_string(),
            output: "site_intelligence".to_string(),
            output_dir: None,
            merge_leads: false,
            verbose: 0,
        }
    }

    #[test]
    fn test_validate_accepts_single_domain() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_domain_or_input() {
        let mut args = base_args();
        args.domain = None;
        assert!(args.validate().is_err());

        args.input_file = Some("leads.csv".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_domain_and_input_together() {
        let mut args = base_args();
        args.input_file = Some("leads.csv".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let mut args = base_args();
        args.rounds = Some(0);
        assert!(args.validate().is_err());
        args.rounds = Some(25);
        assert!(args.validate().is_err());
        args.rounds = Some(5);
        assert!(args.validate().is_ok());

        args.parallel_jobs = Some(0);
        assert!(args.validate().is_err());
        args.parallel_jobs = Some(200);
        assert!(args.validate().is_err());
        args.parallel_jobs = Some(10);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_merge_leads_needs_csv_input() {
        let mut args = base_args();
        args.merge_leads = true;
        assert!(args.validate().is_err());

        args.domain = None;
        args.input_file = Some("leads.json".to_string());
        assert!(args.validate().is_err());

        args.input_file = Some("leads.csv".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_output_path_handles_extension() {
        let mut args = base_args();
        assert_eq!(args.output_path("csv"), "./site_intelligence.csv");
        args.output = "report.csv".to_string();
        assert_eq!(args.output_path("csv"), "./report.csv");
        args.output_dir = Some("/tmp/out".to_string());
        assert_eq!(args.output_path("csv"), "/tmp/out/report.csv");
    }
}
