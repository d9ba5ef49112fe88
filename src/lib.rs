// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod analyzers;
pub mod batch;
pub mod cli;
pub mod config;
pub mod export;
pub mod intel;
pub mod metrics;
pub mod scraper;

pub use config::AppConfig;
pub use intel::WebsiteIntelligence;
pub use scraper::SiteAnalyzer;
