use crate::error::{AppError, AppResult};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub database_connection_timeout: u64,

    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,

    // Text generation. Coaching falls back to templates when no key is set.
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    #[serde(default = "default_llm_max_output_tokens")]
    pub llm_max_output_tokens: u32,
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_seconds: u64,
    #[serde(default = "default_llm_total_timeout")]
    pub llm_total_timeout_seconds: u64,
    #[serde(default = "default_llm_max_attempts")]
    pub llm_max_attempts: u32,
    #[serde(default = "default_llm_initial_backoff")]
    pub llm_initial_backoff_ms: u64,

    // Chat notifications
    pub telegram_bot_token: Option<String>,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_seconds: u64,
    #[serde(default = "default_notification_max_attempts")]
    pub notification_max_attempts: u32,
    #[serde(default = "default_notification_initial_backoff")]
    pub notification_initial_backoff_ms: u64,

    // Worker schedule, hours in UTC
    #[serde(default = "default_overdue_sweep_hour")]
    pub overdue_sweep_hour: u32,
    #[serde(default = "default_daily_reminder_hour")]
    pub daily_reminder_hour: u32,
    #[serde(default = "default_weekly_coaching_weekday")]
    pub weekly_coaching_weekday: String,
    #[serde(default = "default_task_generation_hour")]
    pub task_generation_hour: u32,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
    pub total_timeout_seconds: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    pub overdue_sweep_hour: u32,
    pub daily_reminder_hour: u32,
    pub weekly_coaching_weekday: chrono::Weekday,
    pub task_generation_hour: u32,
}

fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connection_timeout() -> u64 {
    30
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_jwt_secret() -> String {
    "your-secret-key".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_temperature() -> f32 {
    0.7
}
fn default_llm_max_output_tokens() -> u32 {
    1024
}
fn default_llm_timeout() -> u64 {
    20
}
fn default_llm_total_timeout() -> u64 {
    60
}
fn default_llm_max_attempts() -> u32 {
    3
}
fn default_llm_initial_backoff() -> u64 {
    500
}
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_notification_timeout() -> u64 {
    10
}
fn default_notification_max_attempts() -> u32 {
    3
}
fn default_notification_initial_backoff() -> u64 {
    500
}
fn default_overdue_sweep_hour() -> u32 {
    0
}
fn default_daily_reminder_hour() -> u32 {
    7
}
fn default_weekly_coaching_weekday() -> String {
    "sun".to_string()
}
fn default_task_generation_hour() -> u32 {
    1
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()
            .map_err(|e| AppError::Config(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be > 0".to_string(),
            ));
        }

        if self.database_min_connections > self.database_max_connections {
            return Err(AppError::Config(
                "DATABASE_MIN_CONNECTIONS cannot be greater than DATABASE_MAX_CONNECTIONS"
                    .to_string(),
            ));
        }

        if self.jwt_secret == "your-secret-key" {
            return Err(AppError::Config(
                "JWT_SECRET must be set to a secure value".to_string(),
            ));
        }

        if self.llm_max_attempts == 0 || self.llm_max_attempts > 10 {
            return Err(AppError::Config(
                "LLM_MAX_ATTEMPTS must be between 1 and 10".to_string(),
            ));
        }

        if self.llm_timeout_seconds == 0 || self.llm_total_timeout_seconds < self.llm_timeout_seconds
        {
            return Err(AppError::Config(
                "LLM_TOTAL_TIMEOUT_SECONDS must be >= LLM_TIMEOUT_SECONDS > 0".to_string(),
            ));
        }

        if self.notification_max_attempts == 0 || self.notification_max_attempts > 10 {
            return Err(AppError::Config(
                "NOTIFICATION_MAX_ATTEMPTS must be between 1 and 10".to_string(),
            ));
        }

        if self.notification_timeout_seconds == 0 {
            return Err(AppError::Config(
                "NOTIFICATION_TIMEOUT_SECONDS must be > 0".to_string(),
            ));
        }

        for (name, hour) in [
            ("OVERDUE_SWEEP_HOUR", self.overdue_sweep_hour),
            ("DAILY_REMINDER_HOUR", self.daily_reminder_hour),
            ("TASK_GENERATION_HOUR", self.task_generation_hour),
        ] {
            if hour > 23 {
                return Err(AppError::Config(format!("{} must be between 0 and 23", name)));
            }
        }

        self.weekly_coaching_weekday
            .parse::<chrono::Weekday>()
            .map_err(|_| {
                AppError::Config(format!(
                    "WEEKLY_COACHING_WEEKDAY is not a weekday: {}",
                    self.weekly_coaching_weekday
                ))
            })?;

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }

    pub fn llm(&self) -> LlmConfig {
        LlmConfig {
            api_url: self.llm_api_url.clone(),
            api_key: self.llm_api_key.clone(),
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            max_output_tokens: self.llm_max_output_tokens,
            timeout_seconds: self.llm_timeout_seconds,
            total_timeout_seconds: self.llm_total_timeout_seconds,
            max_attempts: self.llm_max_attempts,
            initial_backoff_ms: self.llm_initial_backoff_ms,
        }
    }

    pub fn notifications(&self) -> NotificationConfig {
        NotificationConfig {
            telegram_bot_token: self.telegram_bot_token.clone(),
            telegram_api_url: self.telegram_api_url.clone(),
            timeout_seconds: self.notification_timeout_seconds,
            max_attempts: self.notification_max_attempts,
            initial_backoff_ms: self.notification_initial_backoff_ms,
        }
    }

    /// Call after `validate`; an unparsable weekday falls back to Sunday.
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            overdue_sweep_hour: self.overdue_sweep_hour,
            daily_reminder_hour: self.daily_reminder_hour,
            weekly_coaching_weekday: self
                .weekly_coaching_weekday
                .parse()
                .unwrap_or(chrono::Weekday::Sun),
            task_generation_hour: self.task_generation_hour,
        }
    }
}
