use crate::{
    AppState,
    analytics::{BottleneckReport, Prediction, StreakInfo, VelocityReport},
    db::models::ApiResponse,
    error::AppResult,
    middleware::auth::AuthUserInfo,
    services::{AnalyticsService, RequestContext},
    validation::{ValidatedQuery, roadmap::VelocityQuery},
};
use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn velocity(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    ValidatedQuery(query): ValidatedQuery<VelocityQuery>,
) -> AppResult<Json<ApiResponse<VelocityReport>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let report = AnalyticsService::calculate_velocity(state.store.as_ref(), &ctx, query.window_days())?;
    Ok(Json(ApiResponse::success(report, "Velocity calculated")))
}

pub async fn prediction(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
    Path(roadmap_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Prediction>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let prediction = AnalyticsService::predict_completion(state.store.as_ref(), &ctx, roadmap_id)?;
    Ok(Json(ApiResponse::success(prediction, "Completion predicted")))
}

pub async fn bottlenecks(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
) -> AppResult<Json<ApiResponse<BottleneckReport>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let report = AnalyticsService::detect_bottlenecks(state.store.as_ref(), &ctx)?;
    Ok(Json(ApiResponse::success(report, "Bottlenecks detected")))
}

pub async fn streak(
    State(state): State<Arc<AppState>>,
    auth: AuthUserInfo,
) -> AppResult<Json<ApiResponse<StreakInfo>>> {
    let ctx = RequestContext::for_user(auth.user_id);
    let streak = AnalyticsService::get_streak(state.store.as_ref(), &ctx)?;
    Ok(Json(ApiResponse::success(streak, "Streak calculated")))
}
