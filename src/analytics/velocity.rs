use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ratio, round2};
use crate::db::enums::MilestoneStatus;
use crate::db::models::{Milestone, RoadmapTask};

const DAYS_PER_BUCKET: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVelocity {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub tasks_completed: u32,
    pub milestones_completed: u32,
    pub hours_completed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityTotals {
    pub tasks_completed: u32,
    pub milestones_completed: u32,
    pub hours_completed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityAverages {
    pub tasks_per_week: f64,
    pub tasks_per_day: f64,
    pub milestones_per_week: f64,
    pub hours_per_week: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityReport {
    pub window_days: u32,
    /// Oldest week first.
    pub weeks: Vec<WeeklyVelocity>,
    pub totals: VelocityTotals,
    pub averages: VelocityAverages,
    pub trend: Trend,
}

/// Buckets completions from the trailing `window_days` into 7-day weeks.
///
/// Bucket `i` (0 = most recent) covers `(now - 7(i+1)d, now - 7i d]`, with the
/// oldest bucket clipped to the window start. Rows without a completion time
/// or outside the window are ignored.
pub fn calculate_velocity(
    tasks: &[RoadmapTask],
    milestones: &[Milestone],
    now: DateTime<Utc>,
    window_days: u32,
) -> VelocityReport {
    let window_start = now - Duration::days(window_days as i64);
    let bucket_count = (window_days as i64 + DAYS_PER_BUCKET - 1) / DAYS_PER_BUCKET;

    // Built most-recent first, reversed for display below.
    let mut weeks: Vec<WeeklyVelocity> = (0..bucket_count)
        .map(|i| {
            let week_end = now - Duration::days(DAYS_PER_BUCKET * i);
            let week_start = (week_end - Duration::days(DAYS_PER_BUCKET)).max(window_start);
            WeeklyVelocity {
                week_start,
                week_end,
                tasks_completed: 0,
                milestones_completed: 0,
                hours_completed: 0.0,
            }
        })
        .collect();

    let bucket_of = |at: DateTime<Utc>| {
        weeks
            .iter()
            .position(|w| at > w.week_start && at <= w.week_end)
    };

    let mut task_hits = Vec::new();
    for task in tasks.iter().filter(|t| t.is_completed()) {
        if let Some(idx) = task.completed_at.and_then(bucket_of) {
            task_hits.push((idx, task.estimated_duration.max(0) as f64 / 60.0));
        }
    }
    let milestone_hits: Vec<usize> = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .filter_map(|m| m.completed_at.and_then(bucket_of))
        .collect();

    for (idx, hours) in task_hits {
        weeks[idx].tasks_completed += 1;
        weeks[idx].hours_completed += hours;
    }
    for idx in milestone_hits {
        weeks[idx].milestones_completed += 1;
    }

    weeks.reverse();

    let totals = weeks.iter().fold(VelocityTotals::default(), |mut acc, w| {
        acc.tasks_completed += w.tasks_completed;
        acc.milestones_completed += w.milestones_completed;
        acc.hours_completed += w.hours_completed;
        acc
    });

    let buckets = weeks.len() as f64;
    let tasks_per_week = ratio(totals.tasks_completed as f64, buckets);
    let averages = VelocityAverages {
        tasks_per_week: round2(tasks_per_week),
        tasks_per_day: round2(tasks_per_week / 7.0),
        milestones_per_week: round2(ratio(totals.milestones_completed as f64, buckets)),
        hours_per_week: round2(ratio(totals.hours_completed, buckets)),
    };

    for week in &mut weeks {
        week.hours_completed = round2(week.hours_completed);
    }
    let trend = classify_trend(&weeks.iter().map(|w| w.tasks_completed).collect::<Vec<_>>());

    VelocityReport {
        window_days,
        weeks,
        totals: VelocityTotals {
            hours_completed: round2(totals.hours_completed),
            ..totals
        },
        averages,
        trend,
    }
}

/// Compares mean completions of the older and newer halves of a
/// chronological series, split at `floor(n / 2)`.
pub fn classify_trend(counts: &[u32]) -> Trend {
    if counts.len() < 2 {
        return Trend::Stable;
    }
    let (first, second) = counts.split_at(counts.len() / 2);
    let mean = |half: &[u32]| ratio(half.iter().sum::<u32>() as f64, half.len() as f64);

    let (older, newer) = (mean(first), mean(second));
    if newer > older {
        Trend::Increasing
    } else if newer < older {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
