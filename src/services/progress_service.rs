use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    analytics,
    db::enums::MilestoneStatus,
    db::models::{Goal, Milestone, NewTask, Roadmap, RoadmapTask, Task},
    error::{AppError, AppResult},
    notifications::{EventSink, ProgressEvent},
    services::context::RequestContext,
    store::{EntityStore, GoalSave},
};

/// Rows touched by a milestone status change.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressChange {
    pub milestone: Milestone,
    pub goal: Goal,
    pub roadmap: Roadmap,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskCompletion {
    pub task: RoadmapTask,
    /// Present when finishing this task completed its milestone.
    pub progress: Option<ProgressChange>,
}

pub struct ProgressService;

impl ProgressService {
    pub fn recompute_goal_progress(
        store: &dyn EntityStore,
        events: &dyn EventSink,
        ctx: &RequestContext,
        goal_id: Uuid,
    ) -> AppResult<Goal> {
        let goal = store
            .find_goal(ctx.user_id, goal_id)?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        Self::rollup_goal(store, events, ctx, goal)
    }

    pub fn recompute_roadmap_progress(
        store: &dyn EntityStore,
        ctx: &RequestContext,
        roadmap_id: Uuid,
    ) -> AppResult<Roadmap> {
        let roadmap = store
            .find_roadmap(ctx.user_id, roadmap_id)?
            .ok_or_else(|| AppError::not_found("Roadmap"))?;
        let goals = store.list_goals_by_roadmap(roadmap.id)?;
        let progress = analytics::roadmap_progress(&goals);
        let saved = store.save_roadmap_progress(roadmap.id, progress)?;
        tracing::debug!(roadmap_id = %roadmap.id, progress, goals = goals.len(), "Roadmap progress recomputed");
        Ok(saved)
    }

    /// Stores the status, then rolls progress up to the goal and roadmap.
    pub fn update_milestone_status(
        store: &dyn EntityStore,
        events: &dyn EventSink,
        ctx: &RequestContext,
        milestone_id: Uuid,
        status: MilestoneStatus,
    ) -> AppResult<ProgressChange> {
        let milestone = store
            .find_milestone(ctx.user_id, milestone_id)?
            .ok_or_else(|| AppError::not_found("Milestone"))?;

        let completed_at = match status {
            MilestoneStatus::Completed => milestone.completed_at.or(Some(Utc::now())),
            _ => None,
        };
        let milestone = store.save_milestone_status(milestone.id, status, completed_at)?;

        let goal = store
            .find_goal(ctx.user_id, milestone.goal_id)?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        let goal = Self::rollup_goal(store, events, ctx, goal)?;
        let roadmap = Self::recompute_roadmap_progress(store, ctx, goal.roadmap_id)?;

        Ok(ProgressChange {
            milestone,
            goal,
            roadmap,
        })
    }

    /// Completes a roadmap task. When it was the last open task of its
    /// milestone, the milestone is completed and progress rolls up.
    pub fn complete_roadmap_task(
        store: &dyn EntityStore,
        events: &dyn EventSink,
        ctx: &RequestContext,
        task_id: Uuid,
    ) -> AppResult<TaskCompletion> {
        let task = store
            .find_roadmap_task(ctx.user_id, task_id)?
            .ok_or_else(|| AppError::not_found("Roadmap task"))?;
        if task.is_completed() {
            return Ok(TaskCompletion {
                task,
                progress: None,
            });
        }

        let task = store.complete_roadmap_task(task.id, Utc::now())?;
        let siblings = store.list_roadmap_tasks_by_milestone(task.milestone_id)?;
        if !siblings.iter().all(|t| t.is_completed()) {
            return Ok(TaskCompletion {
                task,
                progress: None,
            });
        }

        let milestone = store
            .find_milestone(ctx.user_id, task.milestone_id)?
            .ok_or_else(|| AppError::not_found("Milestone"))?;
        if milestone.status == MilestoneStatus::Completed {
            return Ok(TaskCompletion {
                task,
                progress: None,
            });
        }

        tracing::info!(milestone_id = %milestone.id, "All tasks done, completing milestone");
        let progress = Self::update_milestone_status(
            store,
            events,
            ctx,
            milestone.id,
            MilestoneStatus::Completed,
        )?;
        Ok(TaskCompletion {
            task,
            progress: Some(progress),
        })
    }

    /// Copies a roadmap task into the daily planner and links the two.
    pub fn promote_roadmap_task(
        store: &dyn EntityStore,
        ctx: &RequestContext,
        task_id: Uuid,
    ) -> AppResult<(RoadmapTask, Task)> {
        let task = store
            .find_roadmap_task(ctx.user_id, task_id)?
            .ok_or_else(|| AppError::not_found("Roadmap task"))?;
        if task.task_id.is_some() {
            return Err(AppError::validation("Roadmap task has already been promoted"));
        }

        let planner_task = NewTask {
            user_id: ctx.user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: Some(task.scheduled_date),
        };
        store.promote_roadmap_task(task.id, &planner_task)
    }

    fn rollup_goal(
        store: &dyn EntityStore,
        events: &dyn EventSink,
        ctx: &RequestContext,
        goal: Goal,
    ) -> AppResult<Goal> {
        let milestones = store.list_milestones_by_goal(goal.id)?;
        let update = analytics::goal_progress(&goal, &milestones, Utc::now());
        let GoalSave {
            goal: saved,
            newly_completed,
        } = store.save_goal_progress(goal.id, &update)?;
        tracing::debug!(
            goal_id = %saved.id,
            percentage = saved.completion_percentage,
            status = %saved.status,
            "Goal progress recomputed"
        );

        if newly_completed {
            let event = ProgressEvent::GoalCompleted {
                user_id: ctx.user_id,
                goal_id: saved.id,
                roadmap_id: saved.roadmap_id,
                title: saved.title.clone(),
                completed_at: saved.completed_at.unwrap_or_else(Utc::now),
            };
            if let Err(e) = events.emit(event) {
                tracing::warn!(goal_id = %saved.id, error = %e, "Failed to emit goal completion event");
            }
        }
        Ok(saved)
    }
}
