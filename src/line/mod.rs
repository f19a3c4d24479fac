//! LINE Messaging API integration
//!
//! Webhook payload models, signature verification and the reply channel
//! abstraction used by the callback endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::{Result, WeatherBotError};

pub mod client;

pub use client::LineMessagingClient;

/// Header carrying the request signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

/// Sends replies back to a conversation
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Reply with plain text using a one-time reply token
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// Checks `X-Line-Signature` against the channel secret
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new<S: AsRef<[u8]>>(channel_secret: S) -> Self {
        Self {
            secret: channel_secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| WeatherBotError::signature(format!("Invalid channel secret: {e}")))?;
        mac.update(body);
        Ok(mac)
    }

    /// Base64 HMAC-SHA256 of `body`
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        Ok(STANDARD.encode(self.mac(body)?.finalize().into_bytes()))
    }

    /// Constant-time check of `signature` over `body`
    pub fn verify(&self, body: &[u8], signature: &str) -> Result<()> {
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| WeatherBotError::signature("signature is not valid base64"))?;
        self.mac(body)?
            .verify_slice(&expected)
            .map_err(|_| WeatherBotError::signature("signature does not match body"))
    }
}

/// Body of a webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for redelivered events that can no longer be answered
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

/// A text message that can be answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage<'a> {
    pub reply_token: &'a str,
    pub text: &'a str,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| WeatherBotError::validation(format!("Invalid webhook body: {e}")))
    }

    /// Text message events carrying a reply token, in delivery order
    pub fn text_messages(&self) -> impl Iterator<Item = TextMessage<'_>> {
        self.events.iter().filter_map(|event| match event {
            WebhookEvent::Message(MessageEvent {
                reply_token: Some(reply_token),
                message: MessageContent::Text { text },
            }) => Some(TextMessage {
                reply_token: reply_token.as_str(),
                text: text.as_str(),
            }),
            _ => None,
        })
    }
}
