//! Gemini client for the on-demand insight request.
//!
//! One request per invocation, no automatic retries. An empty table
//! short-circuits before any network activity, and a missing API key fails
//! the call rather than the process.

use crate::config::InsightConfig;
use crate::errors::InsightError;
use crate::insight::prompt;
use crate::models::InteractionTable;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Gemini `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini `generateContent` response body, only the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Client for the external text-generation service.
///
/// Deliberately not `Debug`: it holds the API key.
pub struct InsightClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_seconds: u64,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl InsightClient {
    /// Build a client, resolving the API key from the configured
    /// environment variable. Fails closed when the key is absent or blank.
    pub fn from_env(config: &InsightConfig) -> Result<Self, InsightError> {
        let api_key = api_key_from_env(&config.api_key_env)?;
        Ok(Self::with_key(config, api_key))
    }

    /// Build a client with an explicit key.
    pub fn with_key(config: &InsightConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_seconds: config.timeout_seconds,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Model name the client will query.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Ask the service for a natural-language summary of recent activity.
    ///
    /// The sample is the raw tail of the table in file order. An empty
    /// table returns [`InsightError::EmptyData`] without touching the
    /// network; the generated text comes back verbatim.
    pub async fn request_insight(
        &self,
        table: &InteractionTable,
        sample_size: usize,
    ) -> Result<String, InsightError> {
        if table.is_empty() {
            debug!("Insight requested on an empty table, skipping the API call");
            return Err(InsightError::EmptyData);
        }

        let sample = prompt::sample_csv(table, sample_size)?;
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt::build_prompt(&sample),
                }],
            }],
            generation_config: self.generation_config(),
        };

        info!(
            model = %self.model,
            sample_rows = table.len().min(sample_size),
            "Requesting insight"
        );

        let response = self
            .http
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body, status.as_u16());
            return Err(InsightError::from_status(status.as_u16(), message));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;

        extract_text(payload)
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }

    fn classify_transport_error(&self, err: reqwest::Error) -> InsightError {
        if err.is_timeout() {
            InsightError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else if err.is_connect() {
            InsightError::Network(format!("cannot reach {}: {}", self.endpoint, err))
        } else {
            InsightError::Network(err.to_string())
        }
    }
}

/// Resolve the API key from the environment, failing closed.
///
/// There is no default credential anywhere in this crate; without the
/// variable the insight feature is simply unavailable.
fn api_key_from_env(var: &str) -> Result<String, InsightError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(InsightError::MissingApiKey {
            var: var.to_string(),
        }),
    }
}

/// Extract the human-readable message from a Google error body, falling
/// back to the raw payload.
fn parse_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json["error"]["message"].as_str() {
            return message.to_string();
        }
    }
    format!("HTTP {}: {}", status, body)
}

/// Pull the generated text out of the first candidate, joining its parts.
fn extract_text(payload: GenerateContentResponse) -> Result<String, InsightError> {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(InsightError::MalformedResponse(
            "response contained no candidate text".to_string(),
        ));
    }

    Ok(text)
}
