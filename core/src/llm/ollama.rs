use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use super::provider::{ProviderClient, ProviderError};
use crate::chat::{CompletionRequest, CompletionResult, Message};
use async_trait::async_trait;

pub const PROVIDER_NAME: &str = "ollama";

/// Text-completion-style client for an Ollama backend.
///
/// Ollama's generate endpoint has no chat or tool-call concept, so the
/// conversation is flattened into one prompt string and the result is
/// synthesized with `finish_reason = "stop"` and no usage counters.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Flatten an ordered conversation into a single prompt: one
/// `"<Role>: <content>"` block per turn, blank-line separated, with a
/// trailing `"Assistant: "` cue for the model to continue from.
pub fn flatten_messages(messages: &[Message]) -> String {
    let mut prompt = String::new();
    for msg in messages {
        prompt.push_str(msg.role.label());
        prompt.push_str(": ");
        prompt.push_str(&msg.content);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Assistant: ");
    prompt
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ProviderClient for OllamaClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResult, ProviderError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let prompt = flatten_messages(&req.messages);
        debug!(target: "llm_ollama", model = %self.model, prompt_chars = prompt.len(), "POST {}", url);

        // Tool schemas, if any, are dropped here: the backend cannot accept them.
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": req.temperature,
                "num_predict": req.max_tokens,
            }
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target: "llm_ollama", %status, body = %text, "Generate error");
            return Err(ProviderError::Backend(format!(
                "status={} body={}",
                status, text
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Backend(format!("Failed to parse response JSON: {e}")))?;

        Ok(CompletionResult {
            text: parsed.response,
            model: self.model.clone(),
            provider: PROVIDER_NAME.to_string(),
            finish_reason: "stop".to_string(),
            usage: None,
        })
    }
}
