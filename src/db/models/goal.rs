use crate::db::enums::{GoalCategory, GoalStatus, Priority};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Goal {
    pub id: Uuid,
    pub roadmap_id: Uuid,
    pub category: GoalCategory,
    pub title: String,
    pub description: Option<String>,
    /// Year of the roadmap (1-5) this goal targets.
    pub target_year: i32,
    pub priority: Priority,
    pub completion_percentage: f64,
    pub status: GoalStatus,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Derived fields written back by the progress rollup.
#[derive(AsChangeset, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(treat_none_as_null = true)]
pub struct GoalProgressUpdate {
    pub completion_percentage: f64,
    pub status: GoalStatus,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
