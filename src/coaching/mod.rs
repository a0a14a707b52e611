//! Coaching text and task breakdowns.
//!
//! Every result is produced either from a text-generation reply or from the
//! deterministic templates in [`rules`]; both paths yield the same shapes.

pub mod prompts;
pub mod rules;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{BottleneckReport, StreakInfo, VelocityReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Ai,
    RuleBased,
}

/// Analytics snapshot a coaching report is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingMetrics {
    pub velocity: VelocityReport,
    pub bottlenecks: BottleneckReport,
    pub streak: StreakInfo,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub average_goal_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingReport {
    pub highlights: Vec<String>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub motivation: String,
    pub metrics: CoachingMetrics,
    pub source: ContentSource,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecommendations {
    pub goal_id: Uuid,
    pub goal_title: String,
    pub completion_percentage: f64,
    pub recommendations: Vec<String>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSuggestion {
    pub title: String,
    pub description: String,
    pub estimated_effort_hours: f64,
    pub due_date: DateTime<Utc>,
}

/// A work session before it is persisted as a roadmap task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub estimated_minutes: i32,
}

/// Assigns one draft per day starting at `today`, wrapping back to `today`
/// once the next day would pass `due`.
pub fn schedule_drafts(count: usize, today: NaiveDate, due: NaiveDate) -> Vec<NaiveDate> {
    let span = (due - today).num_days().max(0) + 1;
    (0..count)
        .map(|i| today + chrono::Duration::days(i as i64 % span))
        .collect()
}
