//! Entity span returned by a token-classification model

use serde::{Deserialize, Serialize};

/// One aggregated entity as produced by a `simple` aggregation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Entity group, e.g. `LOC`, `GPE`, `PERSON`
    #[serde(rename = "entity_group")]
    pub label: String,
    /// Decoded surface text as reported by the model
    pub word: String,
    #[serde(default)]
    pub score: f32,
    /// Character offset of the span start in the input text
    #[serde(default)]
    pub start: Option<usize>,
    /// Character offset one past the span end
    #[serde(default)]
    pub end: Option<usize>,
}

impl ExtractedEntity {
    #[must_use]
    pub fn new<L: Into<String>, W: Into<String>>(label: L, word: W, score: f32) -> Self {
        Self {
            label: label.into(),
            word: word.into(),
            score,
            start: None,
            end: None,
        }
    }

    /// Attach character offsets into the source text
    #[must_use]
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Surface text of the entity.
    ///
    /// Chinese BERT tokenizers decode `word` with spaces between characters,
    /// so the span is cut from `source` when offsets are available.
    #[must_use]
    pub fn surface_text(&self, source: &str) -> String {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start < end {
                let span: String = source.chars().skip(start).take(end - start).collect();
                if span.chars().count() == end - start {
                    return span;
                }
            }
        }
        self.word.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_text_from_offsets() {
        let entity = ExtractedEntity::new("LOC", "臺 北 市", 0.99).with_span(0, 3);
        assert_eq!(entity.surface_text("臺北市今天會下雨嗎？"), "臺北市");
    }

    #[test]
    fn test_surface_text_strips_tokenizer_spaces() {
        let entity = ExtractedEntity::new("LOC", "臺 北 市", 0.99);
        assert_eq!(entity.surface_text("whatever"), "臺北市");
    }

    #[test]
    fn test_surface_text_out_of_range_offsets_fall_back() {
        let entity = ExtractedEntity::new("LOC", "新竹", 0.9).with_span(5, 20);
        assert_eq!(entity.surface_text("新竹"), "新竹");
    }

    #[test]
    fn test_deserialize_pipeline_output() {
        let json = r#"{"entity_group":"LOC","score":0.998,"word":"花 蓮","start":2,"end":4}"#;
        let entity: ExtractedEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.label, "LOC");
        assert_eq!(entity.surface_text("明天花蓮天氣"), "花蓮");
    }
}
