//! Lookup outcome returned by the weather store

use serde::{Deserialize, Serialize};

/// The first general-weather window of a matched location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// Full name of the matched dataset location
    pub location_name: String,
    pub start_time: String,
    pub end_time: String,
    /// Weather description, e.g. "多雲時晴"
    pub description: String,
}

/// Result of a store lookup. Malformed entries are errors, not a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationLookup {
    Found(ForecastSnapshot),
    /// Carries the candidate string that matched nothing
    NotFound(String),
}
