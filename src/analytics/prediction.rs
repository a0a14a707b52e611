use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::round2;
use super::velocity::VelocityReport;
use crate::db::models::{Milestone, Roadmap};

const HIGH_CONFIDENCE_SAMPLE: u32 = 50;
const MEDIUM_CONFIDENCE_SAMPLE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Tier for the number of tasks completed in the velocity window.
    pub fn from_sample(completed_tasks: u32) -> Self {
        if completed_tasks >= HIGH_CONFIDENCE_SAMPLE {
            Confidence::High
        } else if completed_tasks >= MEDIUM_CONFIDENCE_SAMPLE {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub roadmap_id: Uuid,
    pub remaining_hours: f64,
    pub hours_per_week: f64,
    pub weeks_needed: Option<f64>,
    pub predicted_completion_date: Option<DateTime<Utc>>,
    pub confidence: Confidence,
    /// Positive when the projection lands before the roadmap end date.
    pub days_ahead: Option<i64>,
    pub on_track: Option<bool>,
    pub sample_size: u32,
    pub message: String,
}

/// Projects a completion date from remaining milestone effort and the
/// owner's recent weekly hours.
pub fn predict_completion(
    roadmap: &Roadmap,
    milestones: &[Milestone],
    velocity: &VelocityReport,
    now: DateTime<Utc>,
) -> Prediction {
    let remaining_hours: f64 = milestones
        .iter()
        .filter(|m| m.status.is_remaining())
        .map(|m| m.estimated_effort_hours.max(0.0))
        .sum();
    let remaining_hours = round2(remaining_hours);
    let hours_per_week = velocity.averages.hours_per_week;
    let sample_size = velocity.totals.tasks_completed;

    if hours_per_week <= 0.0 {
        return Prediction {
            roadmap_id: roadmap.id,
            remaining_hours,
            hours_per_week: 0.0,
            weeks_needed: None,
            predicted_completion_date: None,
            confidence: Confidence::Low,
            days_ahead: None,
            on_track: None,
            sample_size,
            message: "Not enough recent activity to predict a completion date. \
                      Complete a few roadmap tasks to build up velocity."
                .to_string(),
        };
    }

    let weeks_needed = remaining_hours / hours_per_week;
    let Some(predicted) = project_date(now, weeks_needed) else {
        return Prediction {
            roadmap_id: roadmap.id,
            remaining_hours,
            hours_per_week,
            weeks_needed: weeks_needed.is_finite().then(|| round2(weeks_needed)),
            predicted_completion_date: None,
            confidence: Confidence::Low,
            days_ahead: None,
            on_track: Some(false),
            sample_size,
            message: format!(
                "At {:.2} hours per week the remaining {:.0} hours would not finish \
                 within any representable date.",
                hours_per_week, remaining_hours
            ),
        };
    };
    let days_ahead = (roadmap.end_date - predicted.date_naive()).num_days();
    let on_track = days_ahead >= 0;

    let message = if remaining_hours == 0.0 {
        "All milestones are done or skipped.".to_string()
    } else if on_track {
        format!(
            "At {:.1} hours per week you should finish {} days before the roadmap ends.",
            hours_per_week, days_ahead
        )
    } else {
        format!(
            "At {:.1} hours per week you would finish {} days after the roadmap ends.",
            hours_per_week, -days_ahead
        )
    };

    Prediction {
        roadmap_id: roadmap.id,
        remaining_hours,
        hours_per_week,
        weeks_needed: Some(round2(weeks_needed)),
        predicted_completion_date: Some(predicted),
        confidence: Confidence::from_sample(sample_size),
        days_ahead: Some(days_ahead),
        on_track: Some(on_track),
        sample_size,
        message,
    }
}

/// `now` plus `weeks` weeks, or `None` when the offset leaves chrono's range.
fn project_date(now: DateTime<Utc>, weeks: f64) -> Option<DateTime<Utc>> {
    let seconds = (weeks * 7.0 * 86_400.0).round();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    let offset = Duration::try_seconds(seconds as i64)?;
    now.checked_add_signed(offset)
}
