use crate::{
    AppState,
    coaching::{CoachingReport, GoalRecommendations, MilestoneSuggestion},
    db::models::{ApiResponse, RoadmapTask},
    error::AppResult,
    middleware::auth::AuthUserInfo,
    services::RequestContext,
    validation::{ValidatedJson, roadmap::GenerateTasksRequest},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn weekly_coaching(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
) -> AppResult<Json<ApiResponse<CoachingReport>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let report = state
        .coaching
        .generate_weekly_coaching(state.store.as_ref(), &ctx)
        .await?;
    Ok(Json(ApiResponse::success(report, "Weekly coaching generated")))
}

pub async fn goal_recommendations(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<GoalRecommendations>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let recommendations = state
        .coaching
        .generate_goal_recommendations(state.store.as_ref(), &ctx, goal_id)
        .await?;
    Ok(Json(ApiResponse::success(recommendations, "Recommendations generated")))
}

pub async fn suggest_milestones(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<MilestoneSuggestion>>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let suggestions = state
        .coaching
        .suggest_milestones(state.store.as_ref(), &ctx, goal_id)
        .await?;
    Ok(Json(ApiResponse::success(suggestions, "Milestones suggested")))
}

pub async fn generate_tasks(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(milestone_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<GenerateTasksRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<RoadmapTask>>>)> {
    let ctx = RequestContext::for_user(auth.user_id);
    let tasks = state
        .coaching
        .generate_tasks_for_milestone(state.store.as_ref(), &ctx, milestone_id, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(tasks, "Roadmap tasks generated")),
    ))
}
