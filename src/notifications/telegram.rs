use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Notifier;
use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};

const SERVICE_NAME: &str = "telegram";

/// Telegram Bot API `sendMessage`.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotReply {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    /// `None` when no bot token is configured.
    pub fn from_config(config: &NotificationConfig) -> AppResult<Option<Self>> {
        let Some(bot_token) = config
            .telegram_bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
        else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Some(Self {
            http,
            api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            bot_token,
            timeout: Duration::from_secs(config.timeout_seconds),
        }))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, chat_handle: &str, text: &str) -> AppResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(&SendMessage {
                chat_id: chat_handle,
                text,
            })
            .send()
            .await
            .map_err(|e| AppError::external(SERVICE_NAME, e.without_url().to_string()))?;

        let status = response.status();
        let reply: BotReply = response
            .json()
            .await
            .map_err(|e| AppError::external(SERVICE_NAME, format!("HTTP {}: {}", status, e)))?;
        if !reply.ok {
            return Err(AppError::external(
                SERVICE_NAME,
                reply.description.unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
        Ok(())
    }
}
