//! Data models for the weather bot
//!
//! This module contains the core domain models organized by concern:
//! - Dataset: the static forecast document loaded at startup
//! - Forecast: the result of a location lookup
//! - Entity: spans returned by the NER model

pub mod dataset;
pub mod entity;
pub mod forecast;

// Re-export all public types for convenient access
pub use dataset::{Location, TimeBlock, WeatherDataset, WeatherElement};
pub use entity::ExtractedEntity;
pub use forecast::{ForecastSnapshot, LocationLookup};
