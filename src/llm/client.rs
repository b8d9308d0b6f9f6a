//! Generation client for the Google Generative Language API
//!
//! The rest of the crate only sees [`GenerationClient`]: a prompt goes in, the
//! model's text comes out. The reply is never parsed or validated here.

use crate::config::{ApiKey, GenerationConfig};
use crate::error::{Result, SmartAtsError};
use log::{debug, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub trait GenerationClient {
    fn generate(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Model identifier recorded in reports.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationParams>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> Result<String> {
        let candidate = match self.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("prompt blocked ({})", r))
                    .unwrap_or_else(|| "response contained no candidates".to_string());
                return Err(SmartAtsError::TransientService(reason));
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(SmartAtsError::TransientService(format!(
                "model returned no text (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

/// Map a non-success HTTP reply onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> SmartAtsError {
    let api_error = serde_json::from_str::<ApiErrorEnvelope>(body).ok().map(|e| e.error);
    let message = api_error
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    let invalid_key = api_error.as_ref().is_some_and(|e| {
        e.details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"))
            || e.message.to_lowercase().contains("api key not valid")
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SmartAtsError::Authentication(format!("HTTP {}: {}", status.as_u16(), message))
        }
        StatusCode::BAD_REQUEST if invalid_key => {
            SmartAtsError::Authentication(format!("HTTP {}: {}", status.as_u16(), message))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            SmartAtsError::TransientService(format!("quota or rate limit exceeded: {}", message))
        }
        _ => {
            let api_status = api_error.and_then(|e| e.status);
            match api_status {
                Some(s) => SmartAtsError::TransientService(format!(
                    "HTTP {} ({}): {}",
                    status.as_u16(),
                    s,
                    message
                )),
                None => SmartAtsError::TransientService(format!("HTTP {}: {}", status.as_u16(), message)),
            }
        }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: ApiKey,
    model: String,
    endpoint: String,
    timeout_secs: u64,
    params: Option<GenerationParams>,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig, api_key: ApiKey) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs.max(1)))
            .build()
            .map_err(|e| SmartAtsError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let params = if config.temperature.is_some() || config.max_output_tokens.is_some() {
            Some(GenerationParams {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            })
        } else {
            None
        };

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            params,
        })
    }

    fn url(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    fn transport_error(&self, e: reqwest::Error) -> SmartAtsError {
        if e.is_timeout() {
            SmartAtsError::TransientService(format!("request timed out after {}s", self.timeout_secs))
        } else if e.is_connect() {
            SmartAtsError::TransientService(format!("could not connect to {}: {}", self.endpoint, e))
        } else {
            SmartAtsError::TransientService(e.to_string())
        }
    }
}

impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.params.clone(),
        };

        debug!("POST {} ({} prompt chars)", self.url(), prompt.len());
        let started = Instant::now();

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            SmartAtsError::TransientService(format!("unexpected response body: {}", e))
        })?;
        let text = parsed.into_text()?;

        info!(
            "Model {} answered with {} chars in {}ms",
            self.model,
            text.len(),
            started.elapsed().as_millis()
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
