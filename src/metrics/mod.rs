//! Metric groups produced by website analysis.
//!
//! Each group follows the same lifecycle: the fetch/parse phase populates
//! raw facts, then `calculate_score()` (or `calculate()` for load time)
//! derives the summary value. Scoring never performs I/O and never fails.

pub mod accessibility;
pub mod business;
pub mod load_time;
pub mod performance;
pub mod security;
pub mod seo;

pub use accessibility::AccessibilityMetrics;
pub use business::BusinessSignals;
pub use load_time::LoadTimeMetrics;
pub use performance::{PerformanceGrade, PerformanceMetrics};
pub use security::SecurityMetrics;
pub use seo::SeoMetrics;
