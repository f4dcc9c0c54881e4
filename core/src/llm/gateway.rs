use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
use super::provider::ProviderClient;
use crate::chat::{CompletionRequest, CompletionResult};
use crate::config::GatewayConfig;
use crate::AriaError;

/// Terminal gateway failure: both tiers exhausted.
///
/// Both underlying messages are carried verbatim so the caller sees exactly
/// what each provider reported.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("All LLM providers failed. Primary ({primary}): {primary_error}, Fallback ({fallback}): {fallback_error}")]
    AllProvidersFailed {
        primary: String,
        primary_error: String,
        fallback: String,
        fallback_error: String,
    },
}

/// Fallback-aware facade over two provider clients.
///
/// Strictly cross-provider: at most one attempt per tier, no same-provider
/// retry, no caching. Worst-case latency is bounded by the sum of both
/// backends' timeouts.
pub struct Gateway {
    primary: Arc<dyn ProviderClient>,
    fallback: Arc<dyn ProviderClient>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl Gateway {
    /// Wire the gateway from configuration, resolving provider names through
    /// a closed match. Unknown names fail here, not at request time.
    pub fn from_config(cfg: &GatewayConfig) -> crate::Result<Self> {
        let primary = build_client(&cfg.primary_provider, &cfg.primary_model, cfg)?;
        let fallback = build_client(&cfg.fallback_provider, &cfg.fallback_model, cfg)?;
        Ok(Self { primary, fallback })
    }

    /// Wire the gateway from pre-built clients (tests, custom backends)
    pub fn with_providers(
        primary: Arc<dyn ProviderClient>,
        fallback: Arc<dyn ProviderClient>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Complete a conversation: primary first, fallback on any failure.
    ///
    /// The fallback receives the same conversation; a backend that cannot
    /// accept tool schemas drops them itself.
    pub async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        debug!(target: "gateway", provider = %self.primary.name(), "Attempting primary provider");
        let primary_error = match self.primary.complete(req).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        warn!(
            target: "gateway",
            provider = %self.primary.name(),
            error = %primary_error,
            "Primary provider failed"
        );
        info!(target: "gateway", provider = %self.fallback.name(), "Falling back");

        match self.fallback.complete(req).await {
            Ok(result) => Ok(result),
            Err(fallback_error) => {
                warn!(
                    target: "gateway",
                    provider = %self.fallback.name(),
                    error = %fallback_error,
                    "Fallback provider also failed"
                );
                Err(GatewayError::AllProvidersFailed {
                    primary: self.primary.name().to_string(),
                    primary_error: primary_error.to_string(),
                    fallback: self.fallback.name().to_string(),
                    fallback_error: fallback_error.to_string(),
                })
            }
        }
    }
}

fn build_client(
    provider: &str,
    model: &str,
    cfg: &GatewayConfig,
) -> crate::Result<Arc<dyn ProviderClient>> {
    let timeout = Duration::from_secs(cfg.request_timeout_secs);
    match provider {
        "openai" => {
            let client = OpenAiClient::new(
                cfg.openai_base_url.clone(),
                model.to_string(),
                cfg.openai_api_key.clone(),
                timeout,
            )
            .map_err(|e| AriaError::ConfigError(e.to_string()))?;
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = OllamaClient::new(cfg.ollama_url.clone(), model.to_string(), timeout)
                .map_err(|e| AriaError::ConfigError(e.to_string()))?;
            Ok(Arc::new(client))
        }
        other => Err(AriaError::ConfigError(format!(
            "Unknown LLM provider: {other}"
        ))),
    }
}
