//! Weather Query Pipeline
//!
//! Straight-line flow: extract locations, look up the first one, format the reply.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::models::LocationLookup;
use crate::ner::LocationExtractor;
use crate::weather::WeatherStore;

/// Reply when the message names no location
pub const NO_LOCATION_PROMPT: &str = "請輸入你想查詢天氣的地點，例如：台北今天會下雨嗎？";

/// Reply for a location absent from the dataset
#[must_use]
pub fn not_found_message(location: &str) -> String {
    format!("找不到「{location}」的天氣資訊")
}

/// Reply for a successful lookup
#[must_use]
pub fn forecast_message(location: &str, start: &str, end: &str, description: &str) -> String {
    format!("{location} {start} ~ {end} 的天氣為：{description}")
}

#[derive(Clone)]
pub struct WeatherQueryPipeline {
    extractor: Arc<dyn LocationExtractor>,
    store: Arc<WeatherStore>,
}

impl WeatherQueryPipeline {
    pub fn new(extractor: Arc<dyn LocationExtractor>, store: Arc<WeatherStore>) -> Self {
        Self { extractor, store }
    }

    /// Answer one user message.
    ///
    /// Only the first extracted location is looked up; further locations in
    /// the same message are ignored.
    #[instrument(level = "info", skip(self))]
    pub async fn answer(&self, user_text: &str) -> Result<String> {
        let locations = self.extractor.extract_locations(user_text).await?;
        let Some(location) = locations.first() else {
            debug!("No location recognised");
            return Ok(NO_LOCATION_PROMPT.to_string());
        };

        let reply = match self.store.find_location_weather(&locations[..1])? {
            LocationLookup::NotFound(candidate) => not_found_message(&candidate),
            LocationLookup::Found(snapshot) => forecast_message(
                location,
                &snapshot.start_time,
                &snapshot.end_time,
                &snapshot.description,
            ),
        };

        Ok(reply)
    }
}
