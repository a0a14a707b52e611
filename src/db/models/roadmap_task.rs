use crate::db::enums::{Priority, RoadmapTaskStatus, TaskSource};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::roadmap_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoadmapTask {
    pub id: Uuid,
    pub milestone_id: Uuid,
    pub roadmap_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: chrono::NaiveDate,
    /// Minutes.
    pub estimated_duration: i32,
    pub priority: Priority,
    pub status: RoadmapTaskStatus,
    pub source: TaskSource,
    /// Planner task this one was promoted into.
    pub task_id: Option<Uuid>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RoadmapTask {
    pub fn is_completed(&self) -> bool {
        self.status == RoadmapTaskStatus::Completed
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadmap_tasks)]
pub struct NewRoadmapTask {
    pub milestone_id: Uuid,
    pub roadmap_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: chrono::NaiveDate,
    pub estimated_duration: i32,
    pub priority: Priority,
    pub source: TaskSource,
}
