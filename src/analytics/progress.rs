use chrono::{DateTime, Utc};

use super::{ratio, round2};
use crate::db::enums::{GoalStatus, MilestoneStatus};
use crate::db::models::{Goal, GoalProgressUpdate, Milestone};

/// Completion percentage and status of a goal from its milestones.
///
/// `completed_at` keeps its previous value unless the goal is entering or
/// leaving `completed`.
pub fn goal_progress(goal: &Goal, milestones: &[Milestone], now: DateTime<Utc>) -> GoalProgressUpdate {
    let total = milestones.len();
    let completed = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .count();

    let completion_percentage = round2(ratio(completed as f64, total as f64) * 100.0);
    // Decided on counts so rounding can never move a goal across a threshold.
    let status = if completed == 0 {
        GoalStatus::NotStarted
    } else if completed == total {
        GoalStatus::Completed
    } else {
        GoalStatus::InProgress
    };

    let completed_at = match status {
        GoalStatus::Completed => goal.completed_at.or(Some(now)),
        _ => None,
    };

    GoalProgressUpdate {
        completion_percentage,
        status,
        completed_at,
    }
}

/// Unweighted mean of the goals' completion percentages.
pub fn roadmap_progress(goals: &[Goal]) -> f64 {
    let sum: f64 = goals.iter().map(|g| g.completion_percentage).sum();
    round2(ratio(sum, goals.len() as f64))
}
