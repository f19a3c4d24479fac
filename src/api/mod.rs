//! Webhook Endpoint
//!
//! `POST /callback` verifies the LINE signature, then answers every text
//! message event through the pipeline. Verified deliveries always get `200 OK`.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use tracing::{error, info, instrument, warn};

use crate::line::{MessageChannel, SIGNATURE_HEADER, SignatureVerifier, TextMessage, WebhookPayload};
use crate::pipeline::WeatherQueryPipeline;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub pipeline: WeatherQueryPipeline,
    pub channel: Arc<dyn MessageChannel>,
    pub verifier: SignatureVerifier,
}

impl AppState {
    pub fn new(
        pipeline: WeatherQueryPipeline,
        channel: Arc<dyn MessageChannel>,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            pipeline,
            channel,
            verifier,
        }
    }

    /// Answer one text message. Failures end here and never reach the platform response.
    async fn handle_text(&self, message: TextMessage<'_>) {
        let reply = match self.pipeline.answer(message.text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Weather query failed: {}", e);
                e.user_message()
            }
        };

        if let Err(e) = self.channel.reply_text(message.reply_token, &reply).await {
            error!("Failed to send reply: {}", e);
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/callback", post(callback))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(level = "info", skip_all)]
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook request without signature header");
            StatusCode::BAD_REQUEST
        })?;

    state.verifier.verify(&body, signature).map_err(|e| {
        warn!("Rejected webhook request: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let payload = WebhookPayload::parse(&body).map_err(|e| {
        warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;

    info!("Received {} webhook events", payload.events.len());
    for message in payload.text_messages() {
        state.handle_text(message).await;
    }

    Ok("OK")
}
