use chrono::{Local, Utc};
use uuid::Uuid;

use crate::{
    analytics::{self, BottleneckReport, Prediction, StreakInfo, VelocityReport},
    coaching::CoachingMetrics,
    db::enums::GoalStatus,
    error::{AppError, AppResult},
    services::context::RequestContext,
    store::{DateRange, EntityStore},
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;

pub struct AnalyticsService;

impl AnalyticsService {
    pub fn calculate_velocity(
        store: &dyn EntityStore,
        ctx: &RequestContext,
        window_days: u32,
    ) -> AppResult<VelocityReport> {
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(AppError::validation(format!(
                "window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        let now = Utc::now();
        let range = DateRange::trailing_days(now, window_days);
        let tasks = store.list_completed_roadmap_tasks(ctx.user_id, Some(range))?;
        let milestones = store.list_completed_milestones(ctx.user_id, range)?;
        Ok(analytics::calculate_velocity(&tasks, &milestones, now, window_days))
    }

    pub fn predict_completion(
        store: &dyn EntityStore,
        ctx: &RequestContext,
        roadmap_id: Uuid,
    ) -> AppResult<Prediction> {
        let roadmap = store
            .find_roadmap(ctx.user_id, roadmap_id)?
            .ok_or_else(|| AppError::not_found("Roadmap"))?;
        let milestones = store.list_milestones_by_roadmap(roadmap.id)?;
        let velocity = Self::calculate_velocity(store, ctx, DEFAULT_WINDOW_DAYS)?;
        Ok(analytics::predict_completion(
            &roadmap,
            &milestones,
            &velocity,
            Utc::now(),
        ))
    }

    pub fn detect_bottlenecks(
        store: &dyn EntityStore,
        ctx: &RequestContext,
    ) -> AppResult<BottleneckReport> {
        let goals = store.list_goals(ctx.user_id)?;
        let milestones = store.list_milestones(ctx.user_id)?;
        let tasks = store.list_roadmap_tasks(ctx.user_id)?;
        Ok(analytics::detect_bottlenecks(
            &goals,
            &milestones,
            &tasks,
            Utc::now(),
        ))
    }

    /// Streaks over server-local calendar days.
    pub fn get_streak(store: &dyn EntityStore, ctx: &RequestContext) -> AppResult<StreakInfo> {
        let tasks = store.list_completed_roadmap_tasks(ctx.user_id, None)?;
        let dates: Vec<_> = tasks
            .iter()
            .filter_map(|t| t.completed_at)
            .map(|at| at.with_timezone(&Local).date_naive())
            .collect();
        Ok(analytics::calculate_streak(&dates, Local::now().date_naive()))
    }

    /// Everything the weekly coaching report is written from.
    pub fn coaching_metrics(
        store: &dyn EntityStore,
        ctx: &RequestContext,
    ) -> AppResult<CoachingMetrics> {
        let velocity = Self::calculate_velocity(store, ctx, DEFAULT_WINDOW_DAYS)?;
        let bottlenecks = Self::detect_bottlenecks(store, ctx)?;
        let streak = Self::get_streak(store, ctx)?;
        let goals = store.list_goals(ctx.user_id)?;

        let completed_goals = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .count();
        let active_goals = goals
            .iter()
            .filter(|g| matches!(g.status, GoalStatus::NotStarted | GoalStatus::InProgress))
            .count();
        let average_goal_progress = analytics::roadmap_progress(&goals);

        Ok(CoachingMetrics {
            velocity,
            bottlenecks,
            streak,
            active_goals,
            completed_goals,
            average_goal_progress,
        })
    }
}
