use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ratio, round2};
use crate::db::enums::{GoalCategory, GoalStatus, MilestoneStatus};
use crate::db::models::{Goal, Milestone, RoadmapTask};

const STRUGGLING_MIN_MILESTONES: usize = 3;
const STRUGGLING_MAX_RATE: f64 = 30.0;
const CATEGORY_MIN_TASKS: usize = 5;
const CATEGORY_MAX_RATE: f64 = 50.0;

const HIGH_OVERDUE: usize = 5;
const HIGH_STRUGGLING: usize = 3;
const MEDIUM_OVERDUE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn classify(overdue: usize, struggling: usize) -> Self {
        if overdue > HIGH_OVERDUE || struggling > HIGH_STRUGGLING {
            Severity::High
        } else if overdue > MEDIUM_OVERDUE {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueMilestone {
    pub milestone_id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrugglingGoal {
    pub goal_id: Uuid,
    pub title: String,
    pub category: GoalCategory,
    pub total_milestones: usize,
    pub completed_milestones: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: GoalCategory,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckReport {
    pub overdue_milestones: Vec<OverdueMilestone>,
    pub struggling_goals: Vec<StrugglingGoal>,
    pub underperforming_categories: Vec<CategoryPerformance>,
    pub severity: Severity,
}

impl BottleneckReport {
    pub fn is_clear(&self) -> bool {
        self.overdue_milestones.is_empty()
            && self.struggling_goals.is_empty()
            && self.underperforming_categories.is_empty()
    }
}

/// Runs the overdue, struggling-goal and category scans over one user's rows.
pub fn detect_bottlenecks(
    goals: &[Goal],
    milestones: &[Milestone],
    tasks: &[RoadmapTask],
    now: DateTime<Utc>,
) -> BottleneckReport {
    let overdue_milestones = overdue(milestones, now);
    let struggling_goals = struggling(goals, milestones);
    let underperforming_categories = underperforming(goals, milestones, tasks);
    let severity = Severity::classify(overdue_milestones.len(), struggling_goals.len());

    BottleneckReport {
        overdue_milestones,
        struggling_goals,
        underperforming_categories,
        severity,
    }
}

fn overdue(milestones: &[Milestone], now: DateTime<Utc>) -> Vec<OverdueMilestone> {
    let mut rows: Vec<OverdueMilestone> = milestones
        .iter()
        .filter(|m| m.due_date < now)
        .filter(|m| m.status.is_open() || m.status == MilestoneStatus::Overdue)
        .map(|m| OverdueMilestone {
            milestone_id: m.id,
            goal_id: m.goal_id,
            title: m.title.clone(),
            due_date: m.due_date,
            days_overdue: (now - m.due_date).num_days(),
            status: m.status,
        })
        .collect();
    rows.sort_by_key(|m| m.due_date);
    rows
}

fn struggling(goals: &[Goal], milestones: &[Milestone]) -> Vec<StrugglingGoal> {
    let mut counts: HashMap<Uuid, (usize, usize)> = HashMap::new();
    for m in milestones {
        let entry = counts.entry(m.goal_id).or_default();
        entry.0 += 1;
        if m.status == MilestoneStatus::Completed {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<StrugglingGoal> = goals
        .iter()
        .filter(|g| g.status != GoalStatus::Completed)
        .filter_map(|g| {
            let (total, completed) = counts.get(&g.id).copied().unwrap_or_default();
            let rate = round2(ratio(completed as f64, total as f64) * 100.0);
            (total >= STRUGGLING_MIN_MILESTONES && rate < STRUGGLING_MAX_RATE).then(|| {
                StrugglingGoal {
                    goal_id: g.id,
                    title: g.title.clone(),
                    category: g.category,
                    total_milestones: total,
                    completed_milestones: completed,
                    completion_rate: rate,
                }
            })
        })
        .collect();
    rows.sort_by(|a, b| a.completion_rate.total_cmp(&b.completion_rate));
    rows
}

fn underperforming(
    goals: &[Goal],
    milestones: &[Milestone],
    tasks: &[RoadmapTask],
) -> Vec<CategoryPerformance> {
    let goal_category: HashMap<Uuid, GoalCategory> =
        goals.iter().map(|g| (g.id, g.category)).collect();
    let milestone_category: HashMap<Uuid, GoalCategory> = milestones
        .iter()
        .filter_map(|m| goal_category.get(&m.goal_id).map(|c| (m.id, *c)))
        .collect();

    let mut counts: HashMap<GoalCategory, (usize, usize)> = HashMap::new();
    for task in tasks {
        let Some(category) = milestone_category.get(&task.milestone_id) else {
            continue;
        };
        let entry = counts.entry(*category).or_default();
        entry.0 += 1;
        if task.is_completed() {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<CategoryPerformance> = counts
        .into_iter()
        .filter_map(|(category, (total, completed))| {
            let rate = round2(ratio(completed as f64, total as f64) * 100.0);
            (total >= CATEGORY_MIN_TASKS && rate < CATEGORY_MAX_RATE).then_some(
                CategoryPerformance {
                    category,
                    total_tasks: total,
                    completed_tasks: completed,
                    completion_rate: rate,
                },
            )
        })
        .collect();
    rows.sort_by(|a, b| {
        a.completion_rate
            .total_cmp(&b.completion_rate)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    rows
}
