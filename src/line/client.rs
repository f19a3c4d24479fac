//! Reply client for the LINE Messaging API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::MessageChannel;
use crate::config::LineConfig;
use crate::{Result, WeatherBotError};

/// LINE rejects text messages longer than this many characters
pub const MAX_TEXT_CHARS: usize = 5000;

pub struct LineMessagingClient {
    client: Client,
    reply_url: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [OutgoingMessage; 1],
}

#[derive(Debug, Serialize)]
struct OutgoingMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl LineMessagingClient {
    pub fn new(config: &LineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("weatherbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherBotError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            reply_url: format!(
                "{}/v2/bot/message/reply",
                config.api_base_url.trim_end_matches('/')
            ),
            access_token: config.channel_access_token.clone(),
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl MessageChannel for LineMessagingClient {
    #[instrument(level = "debug", skip(self, text))]
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        let body = ReplyRequest {
            reply_token,
            messages: [OutgoingMessage {
                kind: "text",
                text: truncate_chars(text, MAX_TEXT_CHARS),
            }],
        };

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherBotError::channel("LINE reply timed out")
                } else {
                    WeatherBotError::channel(format!("LINE reply failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("LINE reply returned {}: {}", status, detail);
            return Err(WeatherBotError::channel(format!(
                "LINE reply returned {status}: {detail}"
            )));
        }

        debug!("Reply delivered");
        Ok(())
    }
}
