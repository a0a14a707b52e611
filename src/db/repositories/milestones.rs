use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db::enums::MilestoneStatus;
use crate::db::models::milestone::Milestone;

pub struct MilestonesRepo;

impl MilestonesRepo {
    pub fn find_owned(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        milestone_id: uuid::Uuid,
    ) -> Result<Option<Milestone>, diesel::result::Error> {
        use crate::schema::{goals, milestones, roadmaps};
        milestones::table
            .inner_join(goals::table.inner_join(roadmaps::table))
            .filter(milestones::id.eq(milestone_id))
            .filter(roadmaps::user_id.eq(owner_id))
            .select(Milestone::as_select())
            .first::<Milestone>(conn)
            .optional()
    }

    pub fn list_by_goal(
        conn: &mut PgConnection,
        goal_id_val: uuid::Uuid,
    ) -> Result<Vec<Milestone>, diesel::result::Error> {
        use crate::schema::milestones::dsl::*;
        milestones
            .filter(goal_id.eq(goal_id_val))
            .select(Milestone::as_select())
            .order(sort_order.asc())
            .load::<Milestone>(conn)
    }

    pub fn list_by_roadmap(
        conn: &mut PgConnection,
        roadmap_id: uuid::Uuid,
    ) -> Result<Vec<Milestone>, diesel::result::Error> {
        use crate::schema::{goals, milestones};
        milestones::table
            .inner_join(goals::table)
            .filter(goals::roadmap_id.eq(roadmap_id))
            .select(Milestone::as_select())
            .order(milestones::due_date.asc())
            .load::<Milestone>(conn)
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<Milestone>, diesel::result::Error> {
        use crate::schema::{goals, milestones, roadmaps};
        milestones::table
            .inner_join(goals::table.inner_join(roadmaps::table))
            .filter(roadmaps::user_id.eq(owner_id))
            .select(Milestone::as_select())
            .order(milestones::due_date.asc())
            .load::<Milestone>(conn)
    }

    pub fn list_completed_between(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Milestone>, diesel::result::Error> {
        use crate::schema::{goals, milestones, roadmaps};
        milestones::table
            .inner_join(goals::table.inner_join(roadmaps::table))
            .filter(roadmaps::user_id.eq(owner_id))
            .filter(milestones::status.eq(MilestoneStatus::Completed))
            .filter(milestones::completed_at.ge(from))
            .filter(milestones::completed_at.le(to))
            .select(Milestone::as_select())
            .load::<Milestone>(conn)
    }

    pub fn update_status(
        conn: &mut PgConnection,
        milestone_id: uuid::Uuid,
        new_status: MilestoneStatus,
        completed: Option<DateTime<Utc>>,
    ) -> Result<Milestone, diesel::result::Error> {
        use crate::schema::milestones::dsl::*;
        diesel::update(milestones.filter(id.eq(milestone_id)))
            .set((
                status.eq(new_status),
                completed_at.eq(completed),
                updated_at.eq(Utc::now()),
            ))
            .returning(Milestone::as_returning())
            .get_result(conn)
    }

    /// Reclassifies the user's open milestones whose due date has passed.
    pub fn mark_overdue_for_user(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::{goals, milestones, roadmaps};
        let ids: Vec<uuid::Uuid> = milestones::table
            .inner_join(goals::table.inner_join(roadmaps::table))
            .filter(roadmaps::user_id.eq(owner_id))
            .filter(
                milestones::status
                    .eq(MilestoneStatus::NotStarted)
                    .or(milestones::status.eq(MilestoneStatus::InProgress)),
            )
            .filter(milestones::due_date.lt(now))
            .select(milestones::id)
            .load(conn)?;

        if ids.is_empty() {
            return Ok(0);
        }

        diesel::update(milestones::table.filter(milestones::id.eq_any(&ids)))
            .set((
                milestones::status.eq(MilestoneStatus::Overdue),
                milestones::updated_at.eq(now),
            ))
            .execute(conn)
    }
}
