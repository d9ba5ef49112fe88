//! Performance grading from load-time statistics and page weight.

use serde::Serialize;
use std::fmt;

use super::load_time::LoadTimeMetrics;

/// Letter grade assigned from the performance penalty rubric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PerformanceGrade {
    A,
    B,
    C,
    D,
    F,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl PerformanceGrade {
    /// Numeric equivalent used when combining grades with other 0-100 scores.
    pub fn numeric_score(&self) -> u32 {
        match self {
            PerformanceGrade::A => 100,
            PerformanceGrade::B => 85,
            PerformanceGrade::C => 70,
            PerformanceGrade::D => 55,
            PerformanceGrade::F => 40,
            PerformanceGrade::Unknown => 50,
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceGrade::A => "A",
            PerformanceGrade::B => "B",
            PerformanceGrade::C => "C",
            PerformanceGrade::D => "D",
            PerformanceGrade::F => "F",
            PerformanceGrade::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceMetrics {
    pub load_time: LoadTimeMetrics,
    pub html_size_bytes: u64,
    pub grade: PerformanceGrade,
}

impl PerformanceMetrics {
    /// Assign the letter grade: start from 100 and subtract penalties for
    /// slow load time and heavy HTML, then map score bands to A-F.
    pub fn calculate_grade(&mut self) {
        let mut score: i32 = 100;

        // Trimmed mean is the preferred figure; fall back to the median
        // when it is unset (single-sample runs leave both equal anyway).
        let load_time = if self.load_time.trimmed_mean > 0.0 {
            self.load_time.trimmed_mean
        } else {
            self.load_time.median
        };
        if load_time > 5.0 {
            score -= 40;
        } else if load_time > 3.0 {
            score -= 25;
        } else if load_time > 2.0 {
            score -= 10;
        } else if load_time > 1.0 {
            score -= 5;
        }

        if self.html_size_bytes > 500_000 {
            score -= 20;
        } else if self.html_size_bytes > 200_000 {
            score -= 10;
        }

        self.grade = if score >= 90 {
            PerformanceGrade::A
        } else if score >= 80 {
            PerformanceGrade::B
        } else if score >= 70 {
            PerformanceGrade::C
        } else if score >= 60 {
            PerformanceGrade::D
        } else {
            PerformanceGrade::F
        };
    }
}
