//! Inference Client — the single point of entry for hosted-model calls.
//!
//! ARCHITECTURAL RULE: retry logic lives here and nowhere else. The only
//! automatically retried condition is provider backpressure (429), retried
//! exactly once after a fixed backoff. An unreachable upstream surfaces
//! immediately to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

const SERVICE: &str = "inference provider";

/// Generation cap requested from the hosted model.
pub const MAX_NEW_TOKENS: u32 = 800;
/// Fixed backoff before the single rate-limit retry.
const RATE_LIMIT_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);

/// One completion attempt against a hosted model. The pipeline depends on
/// this trait; `infer` layers the retry policy on top of it.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

/// Sends `prompt` to the backend, retrying once on rate limiting.
pub async fn infer(backend: &dyn CompletionBackend, prompt: &str) -> Result<String, AppError> {
    match backend.complete(prompt).await {
        Err(AppError::RateLimited { service }) => {
            warn!(
                "{service} rate limited the request — retrying once after {}ms",
                RATE_LIMIT_BACKOFF.as_millis()
            );
            tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
            backend.complete(prompt).await
        }
        other => other,
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
}

/// Hosted-inference responses arrive as an array of candidate generations;
/// only the first is used.
#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Production hosted-inference client.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_key: String,
    model_url: String,
    /// Independent guard against oversized prompts. The prompt builder keeps
    /// prompts under this ceiling already; disagreement is a caller bug and
    /// is rejected rather than silently truncated.
    prompt_ceiling: usize,
}

impl InferenceClient {
    pub fn new(
        api_key: String,
        model_url: String,
        prompt_ceiling: usize,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model_url,
            prompt_ceiling,
        }
    }
}

#[async_trait]
impl CompletionBackend for InferenceClient {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        if prompt.chars().count() > self.prompt_ceiling {
            return Err(AppError::Validation(format!(
                "prompt exceeds the {}-character ceiling",
                self.prompt_ceiling
            )));
        }

        let request_body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: MAX_NEW_TOKENS,
            },
        };

        let response = self
            .client
            .post(&self.model_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::from_transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(SERVICE, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_transport(SERVICE, e))?;

        let candidates: Vec<GeneratedText> =
            serde_json::from_str(&body).map_err(|e| AppError::MalformedResponse {
                service: SERVICE,
                message: format!("undecodable completion payload: {e}"),
            })?;

        let completion = candidates
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or(AppError::MalformedResponse {
                service: SERVICE,
                message: "completion payload contained no candidates".to_string(),
            })?;

        debug!("Inference returned {} chars", completion.chars().count());
        Ok(completion)
    }
}
