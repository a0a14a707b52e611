//! Derived roadmap metrics.
//!
//! Everything here is a pure function of already-fetched rows and an explicit
//! clock, so results are never persisted and tolerate empty inputs.

pub mod bottlenecks;
pub mod prediction;
pub mod progress;
pub mod streak;
pub mod velocity;

pub use bottlenecks::{BottleneckReport, Severity, detect_bottlenecks};
pub use prediction::{Confidence, Prediction, predict_completion};
pub use progress::{goal_progress, roadmap_progress};
pub use streak::{StreakInfo, calculate_streak};
pub use velocity::{Trend, VelocityReport, calculate_velocity};

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
