//! Three-tier status of a rate against its benchmark floor.

use serde::{Deserialize, Serialize};

use crate::benchmark::Benchmark;

/// Width of the grace band above the benchmark minimum.
pub const ATTENTION_BAND: f64 = 1.1;

/// Bar color of the first funnel stage, which has no incoming rate.
pub const ACCENT_COLOR: &str = "#FFAA17";

/// Ordered worst to best, so a higher value never yields a lower status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Below the benchmark minimum
    Critical,
    /// At the minimum but inside the 10% grace band
    Attention,
    Success,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Critical => "critical",
            Status::Attention => "attention",
            Status::Success => "success",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Status::Critical => "#EF4444",
            Status::Attention => ACCENT_COLOR,
            Status::Success => "#22C55E",
        }
    }
}

/// Classify `value` against the benchmark floor. `max` is display-only and
/// does not take part: anything at or above `min * 1.1` is a success.
pub fn classify(value: f64, benchmark: &Benchmark) -> Status {
    if value < benchmark.min {
        Status::Critical
    } else if value < benchmark.min * ATTENTION_BAND {
        Status::Attention
    } else {
        Status::Success
    }
}
