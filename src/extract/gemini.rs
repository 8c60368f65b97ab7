//! Gemini API client.
//!
//! One POST per transcript, no retries: a failed round surfaces to the
//! operator, who re-records rather than waiting on a backoff loop.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::defaults;
use crate::error::{IntakeError, Result};
use crate::normalize::normalize;
use crate::schema::IntakeRecord;

use super::prompt::build_prompt;
use super::response::parse_extraction;
use super::Extractor;

/// How much of an error body to keep in the error message.
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            top_k: defaults::TOP_K,
            top_p: defaults::TOP_P,
            max_output_tokens: defaults::MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Extracts intake fields by calling the Gemini `generateContent`
/// endpoint.
#[derive(Debug)]
pub struct GeminiExtractor {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiExtractor {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntakeError::Service {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build an extractor from the resolved configuration. Fails when no
    /// API key is configured.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| IntakeError::ConfigInvalidValue {
                key: "extraction.api_key".to_string(),
                message: format!("not set (set it or export {})", defaults::API_KEY_ENV),
            })?;
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// The key travels as a query parameter, so this value must never be
    /// logged.
    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        debug!(model = %self.model, "sending extraction request");

        let response = self
            .http
            .post(self.endpoint_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| IntakeError::Service {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
            warn!(%status, "extraction request rejected");
            return Err(IntakeError::Service {
                message: format!("status {status}: {snippet}"),
            });
        }

        let envelope: GenerateResponse =
            response.json().await.map_err(|e| IntakeError::Service {
                message: format!("malformed response envelope: {e}"),
            })?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| IntakeError::Service {
                message: "response contained no text".to_string(),
            })
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, transcript: &str) -> Result<IntakeRecord> {
        if transcript.trim().is_empty() {
            return Err(IntakeError::EmptySpeech);
        }

        let cleaned = normalize(transcript);
        debug!(chars = cleaned.len(), "transcript normalized");

        let reply = self.generate(build_prompt(&cleaned)).await?;
        parse_extraction(&reply)
    }
}
