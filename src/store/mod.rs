//! Entity store seam between the services and persistence.
//!
//! Every `find_*` lookup takes the requesting user's id and returns `None`
//! for rows outside that user's ownership chain, so callers cannot tell a
//! missing row from a foreign one.

pub mod memory;
pub mod pg;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::db::enums::{GoalStatus, MilestoneStatus};
use crate::db::models::{
    Goal, GoalProgressUpdate, Milestone, NewRoadmapTask, NewTask, Roadmap, RoadmapTask, Task, User,
};
use crate::error::{AppError, AppResult};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// A goal after a progress write.
#[derive(Debug, Clone)]
pub struct GoalSave {
    pub goal: Goal,
    /// Set only for the one write that moved the goal into `Completed`,
    /// however many callers race on the same row.
    pub newly_completed: bool,
}

impl GoalSave {
    pub fn new(goal: Goal, previous: GoalStatus) -> Self {
        let newly_completed =
            goal.status == GoalStatus::Completed && previous != GoalStatus::Completed;
        Self {
            goal,
            newly_completed,
        }
    }
}

/// Inclusive completion-time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Self> {
        if from > to {
            return Err(AppError::validation(format!(
                "Invalid date range: {} is after {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// The trailing `days` ending at `now`.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            from: now - chrono::Duration::days(days as i64),
            to: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }
}

pub trait EntityStore: Send + Sync {
    fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>>;
    fn list_active_users(&self) -> AppResult<Vec<User>>;

    fn find_roadmap(&self, user_id: Uuid, roadmap_id: Uuid) -> AppResult<Option<Roadmap>>;
    fn list_roadmaps(&self, user_id: Uuid) -> AppResult<Vec<Roadmap>>;
    fn save_roadmap_progress(&self, roadmap_id: Uuid, progress: f64) -> AppResult<Roadmap>;

    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<Goal>>;
    fn list_goals_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Goal>>;
    fn list_goals(&self, user_id: Uuid) -> AppResult<Vec<Goal>>;
    /// Reads the previous status and writes `update` atomically.
    fn save_goal_progress(&self, goal_id: Uuid, update: &GoalProgressUpdate)
    -> AppResult<GoalSave>;

    fn find_milestone(&self, user_id: Uuid, milestone_id: Uuid) -> AppResult<Option<Milestone>>;
    fn list_milestones_by_goal(&self, goal_id: Uuid) -> AppResult<Vec<Milestone>>;
    fn list_milestones_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Milestone>>;
    fn list_milestones(&self, user_id: Uuid) -> AppResult<Vec<Milestone>>;
    fn list_completed_milestones(&self, user_id: Uuid, range: DateRange)
    -> AppResult<Vec<Milestone>>;
    fn save_milestone_status(
        &self,
        milestone_id: Uuid,
        status: MilestoneStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Milestone>;
    /// Returns how many milestones were reclassified as overdue.
    fn mark_overdue_milestones(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<usize>;

    fn find_roadmap_task(&self, user_id: Uuid, task_id: Uuid) -> AppResult<Option<RoadmapTask>>;
    fn list_roadmap_tasks(&self, user_id: Uuid) -> AppResult<Vec<RoadmapTask>>;
    fn list_roadmap_tasks_by_milestone(&self, milestone_id: Uuid) -> AppResult<Vec<RoadmapTask>>;
    /// `None` means the whole history.
    fn list_completed_roadmap_tasks(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<RoadmapTask>>;
    fn list_roadmap_tasks_scheduled_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Vec<RoadmapTask>>;
    fn insert_roadmap_tasks(&self, tasks: &[NewRoadmapTask]) -> AppResult<Vec<RoadmapTask>>;
    fn complete_roadmap_task(&self, task_id: Uuid, at: DateTime<Utc>) -> AppResult<RoadmapTask>;
    /// Creates the planner task and links the roadmap task to it.
    fn promote_roadmap_task(&self, task_id: Uuid, planner_task: &NewTask)
    -> AppResult<(RoadmapTask, Task)>;
}
