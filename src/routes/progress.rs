use crate::{
    AppState,
    db::models::{ApiResponse, Goal, Roadmap, RoadmapTask, Task},
    error::AppResult,
    middleware::auth::AuthUserInfo,
    services::{ProgressChange, ProgressService, RequestContext, TaskCompletion},
    validation::{ValidatedJson, roadmap::UpdateMilestoneStatusRequest},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
pub struct PromotedTask {
    pub roadmap_task: RoadmapTask,
    pub task: Task,
}

pub async fn recompute_goal(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Goal>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let goal = ProgressService::recompute_goal_progress(
        state.store.as_ref(),
        state.events.as_ref(),
        &ctx,
        goal_id,
    )?;
    Ok(Json(ApiResponse::success(goal, "Goal progress recomputed")))
}

pub async fn recompute_roadmap(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(roadmap_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Roadmap>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let roadmap = ProgressService::recompute_roadmap_progress(state.store.as_ref(), &ctx, roadmap_id)?;
    Ok(Json(ApiResponse::success(roadmap, "Roadmap progress recomputed")))
}

pub async fn update_milestone_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(milestone_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateMilestoneStatusRequest>,
) -> AppResult<Json<ApiResponse<ProgressChange>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let change = ProgressService::update_milestone_status(
        state.store.as_ref(),
        state.events.as_ref(),
        &ctx,
        milestone_id,
        req.status,
    )?;
    Ok(Json(ApiResponse::success(change, "Milestone status updated")))
}

pub async fn complete_roadmap_task(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TaskCompletion>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let completion = ProgressService::complete_roadmap_task(
        state.store.as_ref(),
        state.events.as_ref(),
        &ctx,
        task_id,
    )?;
    Ok(Json(ApiResponse::success(completion, "Roadmap task completed")))
}

pub async fn promote_roadmap_task(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(task_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<PromotedTask>>)> {
    let ctx = RequestContext::for_user(auth.user_id);
    let (roadmap_task, task) =
        ProgressService::promote_roadmap_task(state.store.as_ref(), &ctx, task_id)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            PromotedTask { roadmap_task, task },
            "Roadmap task added to planner",
        )),
    ))
}
