use crate::db::models::ApiResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(
        HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        "Service is healthy",
    ))
}
