use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::{DateRange, EntityStore, GoalSave};
use crate::db::{DbConnection, DbPool};
use crate::db::enums::MilestoneStatus;
use crate::db::models::{
    Goal, GoalProgressUpdate, Milestone, NewRoadmapTask, NewTask, Roadmap, RoadmapTask, Task, User,
};
use crate::db::repositories::{
    goals::GoalsRepo, milestones::MilestonesRepo, roadmap_tasks::RoadmapTasksRepo,
    roadmaps::RoadmapsRepo, tasks::TasksRepo, users::UsersRepo,
};
use crate::error::{AppError, AppResult};

/// PostgreSQL-backed store over the r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<DbConnection> {
        self.pool.get().map_err(AppError::Pool)
    }
}

impl EntityStore for PgStore {
    fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(UsersRepo::find_by_id(&mut *self.conn()?, user_id)?)
    }

    fn list_active_users(&self) -> AppResult<Vec<User>> {
        Ok(UsersRepo::list_active(&mut *self.conn()?)?)
    }

    fn find_roadmap(&self, user_id: Uuid, roadmap_id: Uuid) -> AppResult<Option<Roadmap>> {
        Ok(RoadmapsRepo::find_owned(&mut *self.conn()?, user_id, roadmap_id)?)
    }

    fn list_roadmaps(&self, user_id: Uuid) -> AppResult<Vec<Roadmap>> {
        Ok(RoadmapsRepo::list_by_user(&mut *self.conn()?, user_id)?)
    }

    fn save_roadmap_progress(&self, roadmap_id: Uuid, progress: f64) -> AppResult<Roadmap> {
        Ok(RoadmapsRepo::update_progress(&mut *self.conn()?, roadmap_id, progress)?)
    }

    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<Goal>> {
        Ok(GoalsRepo::find_owned(&mut *self.conn()?, user_id, goal_id)?)
    }

    fn list_goals_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Goal>> {
        Ok(GoalsRepo::list_by_roadmap(&mut *self.conn()?, roadmap_id)?)
    }

    fn list_goals(&self, user_id: Uuid) -> AppResult<Vec<Goal>> {
        Ok(GoalsRepo::list_by_user(&mut *self.conn()?, user_id)?)
    }

    fn save_goal_progress(
        &self,
        goal_id: Uuid,
        update: &GoalProgressUpdate,
    ) -> AppResult<GoalSave> {
        let (goal, previous) = GoalsRepo::update_progress(&mut *self.conn()?, goal_id, update)?;
        Ok(GoalSave::new(goal, previous))
    }

    fn find_milestone(&self, user_id: Uuid, milestone_id: Uuid) -> AppResult<Option<Milestone>> {
        Ok(MilestonesRepo::find_owned(&mut *self.conn()?, user_id, milestone_id)?)
    }

    fn list_milestones_by_goal(&self, goal_id: Uuid) -> AppResult<Vec<Milestone>> {
        Ok(MilestonesRepo::list_by_goal(&mut *self.conn()?, goal_id)?)
    }

    fn list_milestones_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Milestone>> {
        Ok(MilestonesRepo::list_by_roadmap(&mut *self.conn()?, roadmap_id)?)
    }

    fn list_milestones(&self, user_id: Uuid) -> AppResult<Vec<Milestone>> {
        Ok(MilestonesRepo::list_by_user(&mut *self.conn()?, user_id)?)
    }

    fn list_completed_milestones(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<Milestone>> {
        Ok(MilestonesRepo::list_completed_between(
            &mut *self.conn()?,
            user_id,
            range.from,
            range.to,
        )?)
    }

    fn save_milestone_status(
        &self,
        milestone_id: Uuid,
        status: MilestoneStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Milestone> {
        Ok(MilestonesRepo::update_status(
            &mut *self.conn()?,
            milestone_id,
            status,
            completed_at,
        )?)
    }

    fn mark_overdue_milestones(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<usize> {
        Ok(MilestonesRepo::mark_overdue_for_user(&mut *self.conn()?, user_id, now)?)
    }

    fn find_roadmap_task(&self, user_id: Uuid, task_id: Uuid) -> AppResult<Option<RoadmapTask>> {
        Ok(RoadmapTasksRepo::find_owned(&mut *self.conn()?, user_id, task_id)?)
    }

    fn list_roadmap_tasks(&self, user_id: Uuid) -> AppResult<Vec<RoadmapTask>> {
        Ok(RoadmapTasksRepo::list_by_user(&mut *self.conn()?, user_id)?)
    }

    fn list_roadmap_tasks_by_milestone(&self, milestone_id: Uuid) -> AppResult<Vec<RoadmapTask>> {
        Ok(RoadmapTasksRepo::list_by_milestone(&mut *self.conn()?, milestone_id)?)
    }

    fn list_completed_roadmap_tasks(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<RoadmapTask>> {
        Ok(RoadmapTasksRepo::list_completed(
            &mut *self.conn()?,
            user_id,
            range.map(|r| (r.from, r.to)),
        )?)
    }

    fn list_roadmap_tasks_scheduled_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Vec<RoadmapTask>> {
        Ok(RoadmapTasksRepo::list_scheduled_on(&mut *self.conn()?, user_id, day)?)
    }

    fn insert_roadmap_tasks(&self, tasks: &[NewRoadmapTask]) -> AppResult<Vec<RoadmapTask>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        Ok(RoadmapTasksRepo::insert_many(&mut *self.conn()?, tasks)?)
    }

    fn complete_roadmap_task(&self, task_id: Uuid, at: DateTime<Utc>) -> AppResult<RoadmapTask> {
        Ok(RoadmapTasksRepo::mark_completed(&mut *self.conn()?, task_id, at)?)
    }

    fn promote_roadmap_task(
        &self,
        task_id: Uuid,
        planner_task: &NewTask,
    ) -> AppResult<(RoadmapTask, Task)> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let task = TasksRepo::insert(conn, planner_task)?;
            let linked = RoadmapTasksRepo::link_planner_task(conn, task_id, task.id)?;
            Ok((linked, task))
        })
    }
}
