pub mod analytics_service;
pub mod coaching_service;
pub mod context;
pub mod progress_service;

pub use analytics_service::AnalyticsService;
pub use coaching_service::{CoachingService, TaskGenerationOptions};
pub use context::RequestContext;
pub use progress_service::{ProgressChange, ProgressService, TaskCompletion};
