use diesel::prelude::*;

use crate::db::enums::GoalStatus;
use crate::db::models::goal::{Goal, GoalProgressUpdate};

pub struct GoalsRepo;

impl GoalsRepo {
    pub fn find_owned(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        goal_id: uuid::Uuid,
    ) -> Result<Option<Goal>, diesel::result::Error> {
        use crate::schema::{goals, roadmaps};
        goals::table
            .inner_join(roadmaps::table)
            .filter(goals::id.eq(goal_id))
            .filter(roadmaps::user_id.eq(owner_id))
            .select(Goal::as_select())
            .first::<Goal>(conn)
            .optional()
    }

    pub fn list_by_roadmap(
        conn: &mut PgConnection,
        roadmap_id_val: uuid::Uuid,
    ) -> Result<Vec<Goal>, diesel::result::Error> {
        use crate::schema::goals::dsl::*;
        goals
            .filter(roadmap_id.eq(roadmap_id_val))
            .select(Goal::as_select())
            .order(target_year.asc())
            .load::<Goal>(conn)
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<Goal>, diesel::result::Error> {
        use crate::schema::{goals, roadmaps};
        goals::table
            .inner_join(roadmaps::table)
            .filter(roadmaps::user_id.eq(owner_id))
            .select(Goal::as_select())
            .order(goals::created_at.asc())
            .load::<Goal>(conn)
    }

    /// Applies `update` under a row lock and returns the saved row together
    /// with the status it had before.
    pub fn update_progress(
        conn: &mut PgConnection,
        goal_id: uuid::Uuid,
        update: &GoalProgressUpdate,
    ) -> Result<(Goal, GoalStatus), diesel::result::Error> {
        use crate::schema::goals::dsl::*;
        conn.transaction(|conn| {
            let previous = goals
                .filter(id.eq(goal_id))
                .select(status)
                .for_update()
                .first::<GoalStatus>(conn)?;
            let saved = diesel::update(goals.filter(id.eq(goal_id)))
                .set((update, updated_at.eq(chrono::Utc::now())))
                .returning(Goal::as_returning())
                .get_result(conn)?;
            Ok((saved, previous))
        })
    }
}
