//! Tool dispatch: executes one parsed call against its backend collaborator.
//!
//! Dispatch is a closed switch over the function name. Every failure mode,
//! including an unreachable backend, is folded into the returned
//! [`ToolResult`] so the orchestration loop always receives exactly one
//! result per call.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::grammar::ToolCall;
use crate::config::ToolBackendConfig;
use crate::AriaError;

/// Outcome of executing one tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Render the result the way it is spliced into the second-pass prompt
    pub fn render(&self) -> String {
        if self.success {
            self.result.clone().unwrap_or_default()
        } else {
            format!("error: {}", self.error.as_deref().unwrap_or("unknown"))
        }
    }
}

/// Executes one structured call; infallible by construction
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

#[derive(Debug, Deserialize)]
struct FactResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One ranked document from the search backend
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Entity {
    entity_id: String,
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    attributes: serde_json::Value,
}

/// HTTP dispatcher over the fact/search backend and the smart-home backend
pub struct ToolDispatcher {
    fact_http: Client,
    search_http: Client,
    smarthome_http: Client,
    toolserver_url: String,
    smarthome_url: String,
    n_results: usize,
    snippet_chars: usize,
}

impl ToolDispatcher {
    pub fn new(cfg: &ToolBackendConfig, snippet_chars: usize) -> crate::Result<Self> {
        Ok(Self {
            fact_http: build_http(cfg.fact_timeout_secs)?,
            search_http: build_http(cfg.search_timeout_secs)?,
            smarthome_http: build_http(cfg.smarthome_timeout_secs)?,
            toolserver_url: cfg.toolserver_url.trim_end_matches('/').to_string(),
            smarthome_url: cfg.smarthome_url.trim_end_matches('/').to_string(),
            n_results: cfg.n_results,
            snippet_chars,
        })
    }

    async fn get_fact(&self, key: &str) -> ToolResult {
        let url = format!("{}/facts/{}", self.toolserver_url, key);
        let resp = match self.fact_http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if resp.status() == StatusCode::NOT_FOUND {
            return ToolResult::fail(format!("fact '{key}' not found"));
        }
        if !resp.status().is_success() {
            return ToolResult::fail(format!("fact backend returned {}", resp.status()));
        }
        match resp.json::<FactResponse>().await {
            Ok(fact) => ToolResult::ok(fact.value),
            Err(e) => ToolResult::fail(format!("malformed fact response: {e}")),
        }
    }

    async fn set_fact(&self, key: &str, value: &str) -> ToolResult {
        let url = format!("{}/facts/{}", self.toolserver_url, key);
        let resp = match self
            .fact_http
            .put(&url)
            .json(&json!({ "value": value }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if !resp.status().is_success() {
            return ToolResult::fail(format!("fact backend returned {}", resp.status()));
        }
        ToolResult::ok("fact stored")
    }

    async fn search_docs(&self, query: &str) -> ToolResult {
        let url = format!("{}/search", self.toolserver_url);
        let resp = match self
            .search_http
            .post(&url)
            .json(&json!({ "query": query, "n_results": self.n_results }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if !resp.status().is_success() {
            return ToolResult::fail(format!("search backend returned {}", resp.status()));
        }
        match resp.json::<SearchResponse>().await {
            Ok(parsed) if parsed.results.is_empty() => ToolResult::ok("no documents found"),
            Ok(parsed) => ToolResult::ok(format_search_results(&parsed.results, self.snippet_chars)),
            Err(e) => ToolResult::fail(format!("malformed search response: {e}")),
        }
    }

    async fn list_devices(&self, domain: &str) -> ToolResult {
        let url = format!("{}/entities", self.smarthome_url);
        let resp = match self
            .smarthome_http
            .get(&url)
            .query(&[("domain", domain)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if !resp.status().is_success() {
            return ToolResult::fail(format!("smart-home backend returned {}", resp.status()));
        }
        let entities = match resp.json::<Vec<Entity>>().await {
            Ok(v) => v,
            Err(e) => return ToolResult::fail(format!("malformed entity list: {e}")),
        };
        if entities.is_empty() {
            return ToolResult::ok(format!("no devices found for domain '{domain}'"));
        }
        let lines: Vec<String> = entities
            .iter()
            .map(|e| {
                let name = e.friendly_name.as_deref().unwrap_or(&e.entity_id);
                format!("- {} ({}): {}", name, e.entity_id, e.state)
            })
            .collect();
        ToolResult::ok(lines.join("\n"))
    }

    async fn entity_action(&self, action: &str, entity_id: &str) -> ToolResult {
        let url = format!("{}/actions/{}", self.smarthome_url, action);
        let resp = match self
            .smarthome_http
            .post(&url)
            .json(&json!({ "entity_id": entity_id }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if resp.status() == StatusCode::NOT_FOUND {
            return ToolResult::fail(format!("entity '{entity_id}' not found"));
        }
        if !resp.status().is_success() {
            return ToolResult::fail(format!("smart-home backend returned {}", resp.status()));
        }
        match resp.json::<ActionResponse>().await {
            Ok(r) if r.success => ToolResult::ok(r.message),
            Ok(r) => ToolResult::fail(r.message),
            Err(e) => ToolResult::fail(format!("malformed action response: {e}")),
        }
    }

    async fn get_status(&self, entity_id: &str) -> ToolResult {
        let url = format!("{}/entities/{}", self.smarthome_url, entity_id);
        let resp = match self.smarthome_http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        if resp.status() == StatusCode::NOT_FOUND {
            return ToolResult::fail(format!("entity '{entity_id}' not found"));
        }
        if !resp.status().is_success() {
            return ToolResult::fail(format!("smart-home backend returned {}", resp.status()));
        }
        match resp.json::<Entity>().await {
            Ok(entity) => ToolResult::ok(describe_entity(&entity)),
            Err(e) => ToolResult::fail(format!("malformed entity response: {e}")),
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolDispatcher {
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        debug!(target: "dispatcher", function = %call.function, "Executing tool call");
        let result = match (call.function.as_str(), call.args.as_slice()) {
            ("get_fact", [key]) => self.get_fact(key).await,
            ("set_fact", [key, value]) => self.set_fact(key, value).await,
            ("search_docs", [query]) => self.search_docs(query).await,
            ("smarthome_list_devices", [domain]) => self.list_devices(domain).await,
            ("smarthome_turn_on", [entity_id]) => self.entity_action("turn_on", entity_id).await,
            ("smarthome_turn_off", [entity_id]) => self.entity_action("turn_off", entity_id).await,
            ("smarthome_toggle", [entity_id]) => self.entity_action("toggle", entity_id).await,
            ("smarthome_get_status", [entity_id]) => self.get_status(entity_id).await,
            (name, _) => ToolResult::fail(format!("unknown function {name}")),
        };
        if !result.success {
            warn!(
                target: "dispatcher",
                function = %call.function,
                error = result.error.as_deref().unwrap_or(""),
                "Tool call failed"
            );
        }
        result
    }
}

fn build_http(timeout_secs: u64) -> crate::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AriaError::ConfigError(format!("Failed to build HTTP client: {e}")))
}

/// Format ranked search hits for splicing into the prompt, truncating each
/// document to the configured character budget.
pub fn format_search_results(results: &[SearchHit], snippet_chars: usize) -> String {
    let lines: Vec<String> = results
        .iter()
        .map(|hit| {
            let snippet: String = hit.text.chars().take(snippet_chars).collect();
            let ellipsis = if hit.text.chars().count() > snippet_chars {
                "..."
            } else {
                ""
            };
            match hit.distance {
                Some(d) => format!("- {}{} (relevance: {:.2})", snippet, ellipsis, 1.0 - d),
                None => format!("- {}{}", snippet, ellipsis),
            }
        })
        .collect();
    lines.join("\n")
}

/// Summarize an entity's state as one human-readable line
fn describe_entity(entity: &Entity) -> String {
    let name = entity
        .friendly_name
        .as_deref()
        .unwrap_or(&entity.entity_id);
    let domain = entity.entity_id.split('.').next().unwrap_or("");
    match domain {
        "light" | "switch" => {
            let verb = if entity.state == "on" { "on" } else { "off" };
            format!("{name} is {verb}")
        }
        "sensor" => {
            let unit = entity
                .attributes
                .get("unit_of_measurement")
                .and_then(|u| u.as_str())
                .unwrap_or("");
            format!("{name}: {}{unit}", entity.state)
        }
        _ => format!("{name}: {}", entity.state),
    }
}
