//! Forecast dataset model (`F-D0047-091` township forecast document)
//!
//! The document nests everything under `cwbopendata.dataset.location`.
//! XML-to-JSON converters emit a bare object where the schema allows a
//! single repeated element, so every list accepts both shapes.
//!
//! Weather elements stay raw JSON until a lookup needs one; elements of
//! other shapes (e.g. `dataTime` blocks) never block loading.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level wrapper of the downloaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDataset {
    pub cwbopendata: OpenData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenData {
    pub dataset: Dataset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Locations in document order
    #[serde(default, deserialize_with = "one_or_many")]
    pub location: Vec<Location>,
}

/// A named area with its forecast elements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub location_name: String,
    /// Unparsed elements, see [`Location::element`]
    #[serde(default, deserialize_with = "one_or_many")]
    pub weather_element: Vec<Value>,
}

/// A named forecast attribute such as `Wx` or `T`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherElement {
    pub element_name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub time: Vec<TimeBlock>,
}

/// One forecast window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub element_value: Vec<ElementValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementValue {
    pub value: String,
    #[serde(default)]
    pub measures: Option<String>,
}

impl WeatherDataset {
    /// Locations in document order
    #[must_use]
    pub fn into_locations(self) -> Vec<Location> {
        self.cwbopendata.dataset.location
    }
}

impl Location {
    /// Find a weather element by exact name and parse it.
    ///
    /// `None` when no element carries that name, `Some(Err(_))` when it does
    /// but its shape is not a [`WeatherElement`].
    #[must_use]
    pub fn element(&self, name: &str) -> Option<serde_json::Result<WeatherElement>> {
        self.weather_element
            .iter()
            .find(|e| e.get("elementName").and_then(Value::as_str) == Some(name))
            .map(|raw| WeatherElement::deserialize(raw))
    }
}

impl TimeBlock {
    /// First textual value of this window
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.element_value.first().map(|v| v.value.as_str())
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let json = r#"{
            "cwbopendata": {
                "dataset": {
                    "location": [
                        {
                            "locationName": "臺北市",
                            "weatherElement": [
                                {
                                    "elementName": "Wx",
                                    "time": [
                                        {
                                            "startTime": "2024-01-01T00:00:00+08:00",
                                            "endTime": "2024-01-01T12:00:00+08:00",
                                            "elementValue": [
                                                { "value": "多雲", "measures": "自定義 Wx 文字" },
                                                { "value": "04", "measures": "自定義 Wx 單位" }
                                            ]
                                        }
                                    ]
                                }
                            ]
                        }
                    ]
                }
            }
        }"#;

        let dataset: WeatherDataset = serde_json::from_str(json).unwrap();
        let locations = dataset.into_locations();
        assert_eq!(locations.len(), 1);

        let wx = locations[0].element("Wx").unwrap().unwrap();
        assert_eq!(wx.time[0].first_value(), Some("多雲"));
        assert_eq!(wx.time[0].element_value[0].measures.as_deref(), Some("自定義 Wx 文字"));
        assert!(locations[0].element("T").is_none());
    }

    #[test]
    fn test_single_object_lists() {
        let json = r#"{
            "cwbopendata": {
                "dataset": {
                    "location": {
                        "locationName": "新北市",
                        "weatherElement": {
                            "elementName": "Wx",
                            "time": {
                                "startTime": "a",
                                "endTime": "b",
                                "elementValue": { "value": "晴" }
                            }
                        }
                    }
                }
            }
        }"#;

        let dataset: WeatherDataset = serde_json::from_str(json).unwrap();
        let locations = dataset.into_locations();
        assert_eq!(locations[0].location_name, "新北市");
        let wx = locations[0].element("Wx").unwrap().unwrap();
        assert_eq!(wx.time[0].first_value(), Some("晴"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = r#"{ "cwbopendata": { "dataset": {
            "location": [ { "locationName": "基隆市" } ]
        } } }"#;

        let dataset: WeatherDataset = serde_json::from_str(json).unwrap();
        let locations = dataset.into_locations();
        assert!(locations[0].weather_element.is_empty());
        assert!(locations[0].element("Wx").is_none());
    }

    #[test]
    fn test_other_element_shapes_load_and_stay_raw() {
        let json = r#"{ "cwbopendata": { "dataset": { "location": [
            { "locationName": "連江縣", "weatherElement": [
                { "elementName": "T", "time": [
                    { "dataTime": "2024-01-01T06:00:00+08:00", "elementValue": { "value": "12" } } ] },
                { "elementName": "Wx", "time": [ { "startTime": "s" } ] }
            ] }
        ] } } }"#;

        let dataset: WeatherDataset = serde_json::from_str(json).unwrap();
        let locations = dataset.into_locations();
        assert_eq!(locations[0].weather_element.len(), 2);
        assert!(locations[0].element("T").unwrap().is_err());
        assert!(locations[0].element("Wx").unwrap().is_err());
    }
}
