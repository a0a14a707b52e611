use serde::Deserialize;
use validator::Validate;

use crate::db::enums::MilestoneStatus;
use crate::services::TaskGenerationOptions;
use crate::services::analytics_service::DEFAULT_WINDOW_DAYS;

#[derive(Debug, Deserialize, Validate)]
pub struct VelocityQuery {
    #[validate(range(min = 1, max = 365, message = "must be between 1 and 365"))]
    pub window_days: Option<u32>,
}

impl VelocityQuery {
    pub fn window_days(&self) -> u32 {
        self.window_days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateTasksRequest {
    pub use_ai: Option<bool>,
    #[validate(range(min = 15, max = 240, message = "must be between 15 and 240"))]
    pub max_task_minutes: Option<i32>,
}

impl From<GenerateTasksRequest> for TaskGenerationOptions {
    fn from(req: GenerateTasksRequest) -> Self {
        let defaults = TaskGenerationOptions::default();
        Self {
            use_ai: req.use_ai.unwrap_or(defaults.use_ai),
            max_task_minutes: req.max_task_minutes.unwrap_or(defaults.max_task_minutes),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMilestoneStatusRequest {
    pub status: MilestoneStatus,
}
