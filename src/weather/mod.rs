//! Weather Store
//!
//! Read-only view over the pre-downloaded forecast document. Locations keep
//! document order so overlapping names always resolve to the same entry.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::models::{ForecastSnapshot, Location, LocationLookup, WeatherDataset};
use crate::{Result, WeatherBotError};

/// Element holding the general weather description
pub const GENERAL_WEATHER_ELEMENT: &str = "Wx";

#[derive(Debug, Clone)]
pub struct WeatherStore {
    locations: Vec<Location>,
    element_name: String,
}

impl WeatherStore {
    /// Build a store from already parsed locations
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations,
            element_name: GENERAL_WEATHER_ELEMENT.to_string(),
        }
    }

    /// Use a different element as the weather description source
    #[must_use]
    pub fn with_element_name<S: Into<String>>(mut self, element_name: S) -> Self {
        self.element_name = element_name.into();
        self
    }

    /// Load the dataset file once at startup
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            WeatherBotError::dataset(format!("Failed to read {}: {e}", path.display()))
        })?;
        let store = Self::from_json_str(&raw)?;
        info!("Loaded {} forecast locations", store.locations.len());
        Ok(store)
    }

    /// Parse a dataset document held in memory
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let dataset: WeatherDataset = serde_json::from_str(raw)?;
        Ok(Self::new(dataset.into_locations()))
    }

    /// Look up the first window of the general weather element.
    ///
    /// Only the first candidate is tried. A dataset location matches when the
    /// candidate is a substring of its name; the first match in stored order wins.
    #[instrument(level = "debug", skip(self))]
    pub fn find_location_weather(&self, locations: &[String]) -> Result<LocationLookup> {
        let candidate = locations
            .first()
            .ok_or_else(|| WeatherBotError::validation("no candidate location given"))?;

        let Some(location) = self
            .locations
            .iter()
            .find(|l| l.location_name.contains(candidate.as_str()))
        else {
            debug!("No dataset location contains '{}'", candidate);
            return Ok(LocationLookup::NotFound(candidate.clone()));
        };

        debug!("'{}' matched '{}'", candidate, location.location_name);
        self.snapshot(location).map(LocationLookup::Found)
    }

    fn snapshot(&self, location: &Location) -> Result<ForecastSnapshot> {
        let name = &location.location_name;
        let element = location
            .element(&self.element_name)
            .ok_or_else(|| {
                WeatherBotError::malformed(name, format!("missing element '{}'", self.element_name))
            })?
            .map_err(|e| {
                WeatherBotError::malformed(name, format!("element '{}': {e}", self.element_name))
            })?;
        let block = element.time.first().ok_or_else(|| {
            WeatherBotError::malformed(name, format!("element '{}' has no time blocks", self.element_name))
        })?;
        let description = block
            .first_value()
            .ok_or_else(|| WeatherBotError::malformed(name, "time block has no values"))?;

        Ok(ForecastSnapshot {
            location_name: name.clone(),
            start_time: block.start_time.clone(),
            end_time: block.end_time.clone(),
            description: description.to_string(),
        })
    }
}
