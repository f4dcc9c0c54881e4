use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::config::ToolBackendConfig;
use crate::AriaError;

/// One entry of the tool inventory rendered into the system prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Read-only context consumed while assembling the system prompt.
///
/// Both operations degrade gracefully: prompt assembly never fails because a
/// collaborator is down, it just renders less context.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// The {name, description} list rendered as the tool inventory
    async fn tool_catalog(&self) -> Vec<ToolDescriptor>;

    /// Free-text digest of prior corrections/feedback; empty string means omit
    async fn learning_context(&self, limit: usize) -> String;
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
struct LearningResponse {
    #[serde(default)]
    context: String,
}

/// Context provider backed by the tool backend's catalog and learning endpoints
pub struct HttpContextProvider {
    http: Client,
    base_url: String,
}

impl HttpContextProvider {
    pub fn new(cfg: &ToolBackendConfig) -> crate::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.fact_timeout_secs))
            .build()
            .map_err(|e| AriaError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.toolserver_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContextProvider for HttpContextProvider {
    async fn tool_catalog(&self) -> Vec<ToolDescriptor> {
        let url = format!("{}/tools", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<CatalogResponse>().await {
                Ok(parsed) => parsed.tools,
                Err(e) => {
                    warn!(target: "context", error = %e, "Malformed tool catalog; rendering none");
                    Vec::new()
                }
            },
            Ok(resp) => {
                warn!(target: "context", status = %resp.status(), "Tool catalog fetch failed; rendering none");
                Vec::new()
            }
            Err(e) => {
                warn!(target: "context", error = %e, "Tool catalog unreachable; rendering none");
                Vec::new()
            }
        }
    }

    async fn learning_context(&self, limit: usize) -> String {
        let url = format!("{}/learning/context", self.base_url);
        match self
            .http
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp
                .json::<LearningResponse>()
                .await
                .map(|p| p.context)
                .unwrap_or_default(),
            Ok(resp) => {
                warn!(target: "context", status = %resp.status(), "Learning context fetch failed; omitting");
                String::new()
            }
            Err(e) => {
                warn!(target: "context", error = %e, "Learning context unreachable; omitting");
                String::new()
            }
        }
    }
}
