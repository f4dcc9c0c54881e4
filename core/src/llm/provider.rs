use async_trait::async_trait;
use thiserror::Error;

use crate::chat::{CompletionRequest, CompletionResult};

/// Failure classification for one provider attempt
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    /// Classify a reqwest failure: timeouts and connection trouble are
    /// transport, everything else (decode, body) is a backend problem.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            ProviderError::Transport(e.to_string())
        } else {
            ProviderError::Backend(e.to_string())
        }
    }
}

/// One named completion backend.
///
/// Implementations issue exactly one request per `complete` call with an
/// explicit timeout and never retry internally; retry/fallback belongs to the
/// `Gateway` alone.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The provider identifier stamped into results and failure reports
    fn name(&self) -> &str;

    /// Issue one completion request and normalize the response
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResult, ProviderError>;
}
