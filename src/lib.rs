//! `WeatherBot` - LINE chat bot answering weather questions
//!
//! This library provides the webhook endpoint, the location extraction
//! wrapper around a NER model, and the lookup into a static forecast dataset.

pub mod api;
pub mod config;
pub mod error;
pub mod line;
pub mod logging;
pub mod models;
pub mod ner;
pub mod pipeline;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::BotConfig;
pub use error::WeatherBotError;
pub use line::{LineMessagingClient, MessageChannel, SignatureVerifier, WebhookPayload};
pub use models::{ExtractedEntity, ForecastSnapshot, LocationLookup};
pub use ner::{EntityRecognizer, HuggingFaceClient, LocationExtractor, NerLocationExtractor};
pub use pipeline::WeatherQueryPipeline;
pub use weather::WeatherStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherBotError>;
