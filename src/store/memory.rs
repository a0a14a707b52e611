use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{DateRange, EntityStore, GoalSave};
use crate::db::enums::{MilestoneStatus, RoadmapTaskStatus};
use crate::db::models::{
    Goal, GoalProgressUpdate, Milestone, NewRoadmapTask, NewTask, Roadmap, RoadmapTask, Task, User,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    roadmaps: HashMap<Uuid, Roadmap>,
    goals: HashMap<Uuid, Goal>,
    milestones: HashMap<Uuid, Milestone>,
    roadmap_tasks: HashMap<Uuid, RoadmapTask>,
    tasks: HashMap<Uuid, Task>,
    failing_users: HashSet<Uuid>,
}

impl State {
    fn roadmap_owner(&self, roadmap_id: Uuid) -> Option<Uuid> {
        self.roadmaps.get(&roadmap_id).map(|r| r.user_id)
    }

    fn goal_owner(&self, goal_id: Uuid) -> Option<Uuid> {
        self.goals
            .get(&goal_id)
            .and_then(|g| self.roadmap_owner(g.roadmap_id))
    }

    fn milestone_owner(&self, milestone_id: Uuid) -> Option<Uuid> {
        self.milestones
            .get(&milestone_id)
            .and_then(|m| self.goal_owner(m.goal_id))
    }

    fn check_user(&self, user_id: Uuid) -> AppResult<()> {
        if self.failing_users.contains(&user_id) {
            return Err(AppError::internal(format!(
                "simulated store failure for user {}",
                user_id
            )));
        }
        Ok(())
    }
}

fn sorted<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows
}

/// In-process store with the same ownership semantics as [`super::PgStore`].
///
/// Used by the test suite and for running the services without a database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }

    pub fn insert_user(&self, user: User) -> AppResult<()> {
        self.state()?.users.insert(user.id, user);
        Ok(())
    }

    pub fn insert_roadmap(&self, roadmap: Roadmap) -> AppResult<()> {
        self.state()?.roadmaps.insert(roadmap.id, roadmap);
        Ok(())
    }

    pub fn insert_goal(&self, goal: Goal) -> AppResult<()> {
        self.state()?.goals.insert(goal.id, goal);
        Ok(())
    }

    pub fn insert_milestone(&self, milestone: Milestone) -> AppResult<()> {
        self.state()?.milestones.insert(milestone.id, milestone);
        Ok(())
    }

    pub fn insert_roadmap_task(&self, task: RoadmapTask) -> AppResult<()> {
        self.state()?.roadmap_tasks.insert(task.id, task);
        Ok(())
    }

    pub fn goal(&self, goal_id: Uuid) -> AppResult<Option<Goal>> {
        Ok(self.state()?.goals.get(&goal_id).cloned())
    }

    pub fn roadmap(&self, roadmap_id: Uuid) -> AppResult<Option<Roadmap>> {
        Ok(self.state()?.roadmaps.get(&roadmap_id).cloned())
    }

    pub fn milestone(&self, milestone_id: Uuid) -> AppResult<Option<Milestone>> {
        Ok(self.state()?.milestones.get(&milestone_id).cloned())
    }

    /// Makes every user-scoped query for `user_id` fail.
    pub fn fail_user(&self, user_id: Uuid) -> AppResult<()> {
        self.state()?.failing_users.insert(user_id);
        Ok(())
    }
}

impl EntityStore for MemoryStore {
    fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state()?.users.get(&user_id).cloned())
    }

    fn list_active_users(&self) -> AppResult<Vec<User>> {
        let state = self.state()?;
        let users = state.users.values().filter(|u| u.is_active).cloned().collect();
        Ok(sorted(users, |u: &User| u.created_at))
    }

    fn find_roadmap(&self, user_id: Uuid, roadmap_id: Uuid) -> AppResult<Option<Roadmap>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        Ok(state
            .roadmaps
            .get(&roadmap_id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    fn list_roadmaps(&self, user_id: Uuid) -> AppResult<Vec<Roadmap>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        let rows = state
            .roadmaps
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |r: &Roadmap| r.start_date))
    }

    fn save_roadmap_progress(&self, roadmap_id: Uuid, progress: f64) -> AppResult<Roadmap> {
        let mut state = self.state()?;
        let roadmap = state
            .roadmaps
            .get_mut(&roadmap_id)
            .ok_or_else(|| AppError::not_found("Roadmap"))?;
        roadmap.progress_percentage = progress;
        roadmap.updated_at = Utc::now();
        Ok(roadmap.clone())
    }

    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<Goal>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        if state.goal_owner(goal_id) != Some(user_id) {
            return Ok(None);
        }
        Ok(state.goals.get(&goal_id).cloned())
    }

    fn list_goals_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Goal>> {
        let state = self.state()?;
        let rows = state
            .goals
            .values()
            .filter(|g| g.roadmap_id == roadmap_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |g: &Goal| (g.target_year, g.created_at)))
    }

    fn list_goals(&self, user_id: Uuid) -> AppResult<Vec<Goal>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        let rows = state
            .goals
            .values()
            .filter(|g| state.roadmap_owner(g.roadmap_id) == Some(user_id))
            .cloned()
            .collect();
        Ok(sorted(rows, |g: &Goal| g.created_at))
    }

    fn save_goal_progress(
        &self,
        goal_id: Uuid,
        update: &GoalProgressUpdate,
    ) -> AppResult<GoalSave> {
        let mut state = self.state()?;
        let goal = state
            .goals
            .get_mut(&goal_id)
            .ok_or_else(|| AppError::not_found("Goal"))?;
        let previous = goal.status;
        goal.completion_percentage = update.completion_percentage;
        goal.status = update.status;
        goal.completed_at = update.completed_at;
        goal.updated_at = Utc::now();
        Ok(GoalSave::new(goal.clone(), previous))
    }

    fn find_milestone(&self, user_id: Uuid, milestone_id: Uuid) -> AppResult<Option<Milestone>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        if state.milestone_owner(milestone_id) != Some(user_id) {
            return Ok(None);
        }
        Ok(state.milestones.get(&milestone_id).cloned())
    }

    fn list_milestones_by_goal(&self, goal_id: Uuid) -> AppResult<Vec<Milestone>> {
        let state = self.state()?;
        let rows = state
            .milestones
            .values()
            .filter(|m| m.goal_id == goal_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |m: &Milestone| m.sort_order))
    }

    fn list_milestones_by_roadmap(&self, roadmap_id: Uuid) -> AppResult<Vec<Milestone>> {
        let state = self.state()?;
        let rows = state
            .milestones
            .values()
            .filter(|m| {
                state
                    .goals
                    .get(&m.goal_id)
                    .is_some_and(|g| g.roadmap_id == roadmap_id)
            })
            .cloned()
            .collect();
        Ok(sorted(rows, |m: &Milestone| m.due_date))
    }

    fn list_milestones(&self, user_id: Uuid) -> AppResult<Vec<Milestone>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        let rows = state
            .milestones
            .values()
            .filter(|m| state.goal_owner(m.goal_id) == Some(user_id))
            .cloned()
            .collect();
        Ok(sorted(rows, |m: &Milestone| m.due_date))
    }

    fn list_completed_milestones(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<Milestone>> {
        Ok(self
            .list_milestones(user_id)?
            .into_iter()
            .filter(|m| m.status == MilestoneStatus::Completed)
            .filter(|m| m.completed_at.is_some_and(|at| range.contains(at)))
            .collect())
    }

    fn save_milestone_status(
        &self,
        milestone_id: Uuid,
        status: MilestoneStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Milestone> {
        let mut state = self.state()?;
        let milestone = state
            .milestones
            .get_mut(&milestone_id)
            .ok_or_else(|| AppError::not_found("Milestone"))?;
        milestone.status = status;
        milestone.completed_at = completed_at;
        milestone.updated_at = Utc::now();
        Ok(milestone.clone())
    }

    fn mark_overdue_milestones(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<usize> {
        let mut state = self.state()?;
        state.check_user(user_id)?;
        let ids: Vec<Uuid> = state
            .milestones
            .values()
            .filter(|m| m.status.is_open() && m.due_date < now)
            .filter(|m| state.goal_owner(m.goal_id) == Some(user_id))
            .map(|m| m.id)
            .collect();
        for id in &ids {
            if let Some(milestone) = state.milestones.get_mut(id) {
                milestone.status = MilestoneStatus::Overdue;
                milestone.updated_at = now;
            }
        }
        Ok(ids.len())
    }

    fn find_roadmap_task(&self, user_id: Uuid, task_id: Uuid) -> AppResult<Option<RoadmapTask>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        Ok(state
            .roadmap_tasks
            .get(&task_id)
            .filter(|t| state.roadmap_owner(t.roadmap_id) == Some(user_id))
            .cloned())
    }

    fn list_roadmap_tasks(&self, user_id: Uuid) -> AppResult<Vec<RoadmapTask>> {
        let state = self.state()?;
        state.check_user(user_id)?;
        let rows = state
            .roadmap_tasks
            .values()
            .filter(|t| state.roadmap_owner(t.roadmap_id) == Some(user_id))
            .cloned()
            .collect();
        Ok(sorted(rows, |t: &RoadmapTask| t.scheduled_date))
    }

    fn list_roadmap_tasks_by_milestone(&self, milestone_id: Uuid) -> AppResult<Vec<RoadmapTask>> {
        let state = self.state()?;
        let rows = state
            .roadmap_tasks
            .values()
            .filter(|t| t.milestone_id == milestone_id)
            .cloned()
            .collect();
        Ok(sorted(rows, |t: &RoadmapTask| t.scheduled_date))
    }

    fn list_completed_roadmap_tasks(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<RoadmapTask>> {
        let rows = self
            .list_roadmap_tasks(user_id)?
            .into_iter()
            .filter(|t| t.is_completed())
            .filter(|t| match (t.completed_at, range) {
                (Some(at), Some(range)) => range.contains(at),
                (Some(_), None) => true,
                (None, _) => false,
            })
            .collect();
        Ok(sorted(rows, |t: &RoadmapTask| t.completed_at))
    }

    fn list_roadmap_tasks_scheduled_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Vec<RoadmapTask>> {
        Ok(self
            .list_roadmap_tasks(user_id)?
            .into_iter()
            .filter(|t| t.scheduled_date == day && !t.is_completed())
            .collect())
    }

    fn insert_roadmap_tasks(&self, tasks: &[NewRoadmapTask]) -> AppResult<Vec<RoadmapTask>> {
        let mut state = self.state()?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(tasks.len());
        for new_task in tasks {
            let task = RoadmapTask {
                id: Uuid::new_v4(),
                milestone_id: new_task.milestone_id,
                roadmap_id: new_task.roadmap_id,
                title: new_task.title.clone(),
                description: new_task.description.clone(),
                scheduled_date: new_task.scheduled_date,
                estimated_duration: new_task.estimated_duration,
                priority: new_task.priority,
                status: RoadmapTaskStatus::Pending,
                source: new_task.source,
                task_id: None,
                completed_at: None,
                created_at: now,
            };
            state.roadmap_tasks.insert(task.id, task.clone());
            created.push(task);
        }
        Ok(created)
    }

    fn complete_roadmap_task(&self, task_id: Uuid, at: DateTime<Utc>) -> AppResult<RoadmapTask> {
        let mut state = self.state()?;
        let task = state
            .roadmap_tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::not_found("Roadmap task"))?;
        task.status = RoadmapTaskStatus::Completed;
        task.completed_at = Some(at);
        Ok(task.clone())
    }

    fn promote_roadmap_task(
        &self,
        task_id: Uuid,
        planner_task: &NewTask,
    ) -> AppResult<(RoadmapTask, Task)> {
        let mut state = self.state()?;
        if !state.roadmap_tasks.contains_key(&task_id) {
            return Err(AppError::not_found("Roadmap task"));
        }
        let task = Task {
            id: Uuid::new_v4(),
            user_id: planner_task.user_id,
            title: planner_task.title.clone(),
            description: planner_task.description.clone(),
            due_date: planner_task.due_date,
            is_completed: false,
            created_at: Utc::now(),
        };
        state.tasks.insert(task.id, task.clone());
        let linked = state
            .roadmap_tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::not_found("Roadmap task"))?;
        linked.task_id = Some(task.id);
        Ok((linked.clone(), task))
    }
}
