//! Hugging Face inference client for token-classification models
//!
//! Posts the text to `{base_url}/models/{model}` with the aggregation
//! strategy as a pipeline parameter and returns the aggregated entities.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::EntityRecognizer;
use crate::config::NerConfig;
use crate::models::ExtractedEntity;
use crate::{Result, WeatherBotError};

pub struct HuggingFaceClient {
    client: Client,
    endpoint: String,
    hub_token: Option<String>,
    aggregation_strategy: String,
    use_gpu: bool,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    aggregation_strategy: &'a str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    use_gpu: bool,
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

impl HuggingFaceClient {
    /// Create a client for the configured model
    pub fn new(config: &NerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("weatherbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherBotError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            hub_token: config.hub_token.clone(),
            aggregation_strategy: config.aggregation_strategy.clone(),
            use_gpu: config.use_gpu,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EntityRecognizer for HuggingFaceClient {
    #[instrument(level = "debug", skip(self, text), fields(endpoint = %self.endpoint))]
    async fn recognize(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        let start_time = Instant::now();
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: &self.aggregation_strategy,
            },
            options: InferenceOptions {
                use_gpu: self.use_gpu,
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.hub_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WeatherBotError::extraction("NER inference timed out")
            } else {
                WeatherBotError::extraction(format!("NER request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<InferenceError>(&raw)
                .map(|e| e.error)
                .unwrap_or(raw);
            warn!("NER inference returned {}: {}", status, detail);
            return Err(WeatherBotError::extraction(format!(
                "NER inference returned {status}: {detail}"
            )));
        }

        let entities: Vec<ExtractedEntity> = response
            .json()
            .await
            .map_err(|e| WeatherBotError::extraction(format!("Invalid NER response: {e}")))?;

        debug!(
            "NER inference returned {} entities in {:.3}s",
            entities.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> NerConfig {
        NerConfig {
            base_url: server.uri(),
            hub_token: Some("hf_test_token".to_string()),
            timeout_seconds: 5,
            ..NerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_recognize_sends_pipeline_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/ckiplab/bert-base-chinese-ner"))
            .and(header("authorization", "Bearer hf_test_token"))
            .and(body_partial_json(json!({
                "inputs": "台北今天會下雨嗎？",
                "parameters": { "aggregation_strategy": "simple" },
                "options": { "use_gpu": false }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "entity_group": "GPE", "score": 0.99, "word": "台 北", "start": 0, "end": 2 },
                { "entity_group": "DATE", "score": 0.98, "word": "今 天", "start": 2, "end": 4 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = HuggingFaceClient::new(&config_for(&server)).unwrap();
        let entities = client.recognize("台北今天會下雨嗎？").await.unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].label, "GPE");
        assert_eq!(entities[0].start, Some(0));
        assert_eq!(entities[1].word, "今 天");
    }

    #[tokio::test]
    async fn test_recognize_surfaces_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({ "error": "Model is currently loading" })),
            )
            .mount(&server)
            .await;

        let client = HuggingFaceClient::new(&config_for(&server)).unwrap();
        let err = client.recognize("台北").await.unwrap_err();

        assert!(matches!(err, WeatherBotError::Extraction { .. }));
        assert!(err.to_string().contains("Model is currently loading"));
    }

    #[tokio::test]
    async fn test_recognize_rejects_unexpected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
            .mount(&server)
            .await;

        let client = HuggingFaceClient::new(&config_for(&server)).unwrap();
        let err = client.recognize("台北").await.unwrap_err();
        assert!(err.to_string().contains("Invalid NER response"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = NerConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..NerConfig::default()
        };
        let client = HuggingFaceClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/ckiplab/bert-base-chinese-ner"
        );
    }
}
