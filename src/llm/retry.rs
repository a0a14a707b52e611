use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::config::{LlmConfig, NotificationConfig};

/// Bounded retry with exponential backoff, a per-attempt timeout and an
/// absolute deadline across all attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub delay_multiplier: f64,
    pub max_delay_ms: u64,
    pub attempt_timeout: Duration,
    pub total_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            delay_multiplier: 2.0,
            max_delay_ms: 8000,
            attempt_timeout: Duration::from_secs(20),
            total_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetryError {
    #[error("'{operation}' failed after {attempts} attempts: {last_error}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },
    #[error("'{operation}' exceeded its {seconds}s deadline")]
    Deadline { operation: String, seconds: u64 },
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay_ms: config.initial_backoff_ms,
            attempt_timeout: Duration::from_secs(config.timeout_seconds),
            total_timeout: Duration::from_secs(config.total_timeout_seconds),
            ..Self::default()
        }
    }

    /// Chat sends: each attempt is bounded by the notification timeout, and
    /// the whole send by every attempt plus the longest backoff between them.
    pub fn for_notifications(config: &NotificationConfig) -> Self {
        let defaults = Self::default();
        let max_attempts = config.max_attempts.max(1);
        let attempt_timeout = Duration::from_secs(config.timeout_seconds);
        let backoff_budget = Duration::from_millis(defaults.max_delay_ms) * (max_attempts - 1);
        Self {
            max_attempts,
            initial_delay_ms: config.initial_backoff_ms,
            attempt_timeout,
            total_timeout: attempt_timeout * max_attempts + backoff_budget,
            ..defaults
        }
    }

    /// Delay before attempt `n + 1`, where `n` counts completed attempts.
    pub fn backoff(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.delay_multiplier.powi(exponent);
        Duration::from_millis((delay as u64).min(self.max_delay_ms))
    }

    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut attempt: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = async {
            let mut last_error = String::new();
            for n in 1..=self.max_attempts {
                match timeout(self.attempt_timeout, attempt()).await {
                    Ok(Ok(value)) => {
                        if n > 1 {
                            tracing::info!(operation, attempt = n, "Succeeded after retry");
                        }
                        return Ok(value);
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(operation, attempt = n, error = %e, "Attempt failed");
                        last_error = e.to_string();
                    }
                    Err(_) => {
                        tracing::warn!(
                            operation,
                            attempt = n,
                            timeout_secs = self.attempt_timeout.as_secs(),
                            "Attempt timed out"
                        );
                        last_error = format!(
                            "timed out after {}s",
                            self.attempt_timeout.as_secs()
                        );
                    }
                }

                if n < self.max_attempts {
                    let delay = self.backoff(n);
                    tracing::debug!(operation, delay_ms = delay.as_millis() as u64, "Backing off");
                    tokio::time::sleep(delay).await;
                }
            }
            Err(RetryError::Exhausted {
                operation: operation.to_string(),
                attempts: self.max_attempts,
                last_error,
            })
        };

        match timeout(self.total_timeout, attempts).await {
            Ok(result) => result,
            Err(_) => Err(RetryError::Deadline {
                operation: operation.to_string(),
                seconds: self.total_timeout.as_secs(),
            }),
        }
    }
}
