//! Load-time statistics over repeated page-load measurements.
//!
//! A single measurement is hostage to transient network noise, so each site
//! is timed several times and summarized with statistics that tolerate
//! outliers: median, trimmed mean, IQR. The confidence score reflects both
//! how many samples were collected and how consistent they were.

use serde::Serialize;

/// Statistical summary of load-time samples, all values in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadTimeMetrics {
    pub samples: Vec<f64>,
    pub median: f64,
    /// Mean after trimming the slowest and fastest samples.
    pub trimmed_mean: f64,
    pub p90: f64,
    pub p95: f64,
    pub std_dev: f64,
    /// Interquartile range (p75 - p25).
    pub iqr: f64,
    /// Coefficient of variation (std_dev / mean); lower is more consistent.
    pub cv: f64,
    /// Measurement reliability in [0, 1], from sample count and consistency.
    pub confidence: f64,
}

impl LoadTimeMetrics {
    pub fn from_samples(samples: Vec<f64>) -> Self {
        let mut metrics = LoadTimeMetrics {
            samples,
            ..Default::default()
        };
        metrics.calculate();
        metrics
    }

    /// Recompute all statistics from `self.samples`.
    ///
    /// With fewer than two samples only the median and trimmed mean are
    /// meaningful (set to the single sample, if any); dispersion stats
    /// stay at zero.
    pub fn calculate(&mut self) {
        if self.samples.len() < 2 {
            if let Some(&only) = self.samples.first() {
                self.median = only;
                self.trimmed_mean = only;
            }
            return;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = sorted.len();

        self.median = percentile(&sorted, 50.0);
        self.p90 = percentile(&sorted, 90.0);
        self.p95 = percentile(&sorted, 95.0);
        self.iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);

        // Trim the extremes only once there are enough samples to spare.
        self.trimmed_mean = if n > 4 {
            let trim = (n / 10).max(1);
            mean(&sorted[trim..n - trim])
        } else {
            mean(&sorted)
        };

        let mean_val = mean(&sorted);
        self.std_dev = sample_std_dev(&sorted, mean_val);
        self.cv = if mean_val > 0.0 {
            self.std_dev / mean_val
        } else {
            0.0
        };

        let sample_factor = (n as f64 / 5.0).min(1.0);
        let consistency_factor = (1.0 - self.cv).max(0.0);
        self.confidence = round2(sample_factor * consistency_factor);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Linear-interpolated percentile over pre-sorted samples.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std_dev(values: &[f64], mean_val: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean_val).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
