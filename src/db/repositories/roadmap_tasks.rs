use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::db::enums::RoadmapTaskStatus;
use crate::db::models::roadmap_task::{NewRoadmapTask, RoadmapTask};

pub struct RoadmapTasksRepo;

impl RoadmapTasksRepo {
    pub fn find_owned(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        task_id_val: uuid::Uuid,
    ) -> Result<Option<RoadmapTask>, diesel::result::Error> {
        use crate::schema::{roadmap_tasks, roadmaps};
        roadmap_tasks::table
            .inner_join(roadmaps::table)
            .filter(roadmap_tasks::id.eq(task_id_val))
            .filter(roadmaps::user_id.eq(owner_id))
            .select(RoadmapTask::as_select())
            .first::<RoadmapTask>(conn)
            .optional()
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<RoadmapTask>, diesel::result::Error> {
        use crate::schema::{roadmap_tasks, roadmaps};
        roadmap_tasks::table
            .inner_join(roadmaps::table)
            .filter(roadmaps::user_id.eq(owner_id))
            .select(RoadmapTask::as_select())
            .order(roadmap_tasks::scheduled_date.asc())
            .load::<RoadmapTask>(conn)
    }

    pub fn list_by_milestone(
        conn: &mut PgConnection,
        milestone_id_val: uuid::Uuid,
    ) -> Result<Vec<RoadmapTask>, diesel::result::Error> {
        use crate::schema::roadmap_tasks::dsl::*;
        roadmap_tasks
            .filter(milestone_id.eq(milestone_id_val))
            .select(RoadmapTask::as_select())
            .order(scheduled_date.asc())
            .load::<RoadmapTask>(conn)
    }

    /// Completed tasks, optionally restricted to a completion window.
    pub fn list_completed(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<RoadmapTask>, diesel::result::Error> {
        use crate::schema::{roadmap_tasks, roadmaps};
        let mut query = roadmap_tasks::table
            .inner_join(roadmaps::table)
            .filter(roadmaps::user_id.eq(owner_id))
            .filter(roadmap_tasks::status.eq(RoadmapTaskStatus::Completed))
            .filter(roadmap_tasks::completed_at.is_not_null())
            .select(RoadmapTask::as_select())
            .into_boxed();

        if let Some((from, to)) = window {
            query = query
                .filter(roadmap_tasks::completed_at.ge(from))
                .filter(roadmap_tasks::completed_at.le(to));
        }

        query
            .order(roadmap_tasks::completed_at.asc())
            .load::<RoadmapTask>(conn)
    }

    pub fn list_scheduled_on(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        day: NaiveDate,
    ) -> Result<Vec<RoadmapTask>, diesel::result::Error> {
        use crate::schema::{roadmap_tasks, roadmaps};
        roadmap_tasks::table
            .inner_join(roadmaps::table)
            .filter(roadmaps::user_id.eq(owner_id))
            .filter(roadmap_tasks::scheduled_date.eq(day))
            .filter(roadmap_tasks::status.ne(RoadmapTaskStatus::Completed))
            .select(RoadmapTask::as_select())
            .load::<RoadmapTask>(conn)
    }

    pub fn insert_many(
        conn: &mut PgConnection,
        new_tasks: &[NewRoadmapTask],
    ) -> Result<Vec<RoadmapTask>, diesel::result::Error> {
        diesel::insert_into(crate::schema::roadmap_tasks::table)
            .values(new_tasks)
            .returning(RoadmapTask::as_returning())
            .get_results(conn)
    }

    pub fn mark_completed(
        conn: &mut PgConnection,
        task_id_val: uuid::Uuid,
        at: DateTime<Utc>,
    ) -> Result<RoadmapTask, diesel::result::Error> {
        use crate::schema::roadmap_tasks::dsl::*;
        diesel::update(roadmap_tasks.filter(id.eq(task_id_val)))
            .set((
                status.eq(RoadmapTaskStatus::Completed),
                completed_at.eq(Some(at)),
            ))
            .returning(RoadmapTask::as_returning())
            .get_result(conn)
    }

    pub fn link_planner_task(
        conn: &mut PgConnection,
        task_id_val: uuid::Uuid,
        planner_task_id: uuid::Uuid,
    ) -> Result<RoadmapTask, diesel::result::Error> {
        use crate::schema::roadmap_tasks::dsl::*;
        diesel::update(roadmap_tasks.filter(id.eq(task_id_val)))
            .set(task_id.eq(Some(planner_task_id)))
            .returning(RoadmapTask::as_returning())
            .get_result(conn)
    }
}
