// src/generation/client.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::generation::prompt::ExercisePrompt;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Seam for the outbound text-generation call. The production implementation
/// talks to an OpenAI-style chat-completions endpoint; tests swap in a
/// canned generator.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Returns the raw reply text. Failures surface as
    /// `AppError::UpstreamGeneration`; there is no local retry loop beyond
    /// one transport-level retry inside the client.
    async fn generate(&self, prompt: &ExercisePrompt) -> Result<String, AppError>;
}

/// Chat-completions client. Constructed once at startup and injected through
/// `AppState`; credentials are read from `Config`, never from the
/// environment at call time.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(&self, payload: &JsonValue) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(payload)
            .send()
            .await
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &ExercisePrompt) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ]
        });

        // At most one retry, on transport errors only. Upstream error
        // statuses are final.
        let response = match self.send(&payload).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Generation request failed, retrying once: {}", e);
                self.send(&payload)
                    .await
                    .map_err(|e| AppError::UpstreamGeneration(e.to_string()))?
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamGeneration(format!(
                "upstream returned {}: {}",
                status, text
            )));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamGeneration(e.to_string()))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                AppError::UpstreamGeneration("reply carried no message content".to_string())
            })
    }
}
