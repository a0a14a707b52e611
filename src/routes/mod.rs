pub mod analytics;
pub mod coaching;
pub mod health;
pub mod progress;

use crate::AppState;
use crate::middleware::auth::auth_middleware;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Authenticated API routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/goals/:goal_id/recompute", post(progress::recompute_goal))
        .route(
            "/roadmaps/:roadmap_id/recompute",
            post(progress::recompute_roadmap),
        )
        .route(
            "/milestones/:milestone_id/status",
            put(progress::update_milestone_status),
        )
        .route(
            "/roadmap-tasks/:task_id/complete",
            post(progress::complete_roadmap_task),
        )
        .route(
            "/roadmap-tasks/:task_id/promote",
            post(progress::promote_roadmap_task),
        )
        .route("/analytics/velocity", get(analytics::velocity))
        .route("/analytics/bottlenecks", get(analytics::bottlenecks))
        .route("/analytics/streak", get(analytics::streak))
        .route(
            "/roadmaps/:roadmap_id/prediction",
            get(analytics::prediction),
        )
        .route("/coaching/weekly", get(coaching::weekly_coaching))
        .route(
            "/goals/:goal_id/recommendations",
            get(coaching::goal_recommendations),
        )
        .route(
            "/goals/:goal_id/milestone-suggestions",
            post(coaching::suggest_milestones),
        )
        .route(
            "/milestones/:milestone_id/tasks/generate",
            post(coaching::generate_tasks),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// Routes that need no authentication.
pub fn public_router() -> Router {
    Router::new().route("/health", get(health::health))
}
