//! Assistant configuration: env-driven defaults with an optional TOML overlay.
//!
//! Nothing in the core reads configuration ambiently; the loaded value is
//! passed into the gateway, dispatcher, and orchestrator at construction time.

use std::fs;
use std::path::Path;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful home assistant. When a tool can answer \
the user's request, emit a call wrapped in <tool_call></tool_call> tags, e.g. \
<tool_call>get_fact(\"insurance.home.sum\")</tool_call>. Otherwise answer directly.";

const DEFAULT_PERSONA_PROMPT: &str =
    "Keep answers short, friendly, and in the language of the user's question.";

/// Top-level configuration for the assistant core
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub gateway: GatewayConfig,
    pub tools: ToolBackendConfig,
    pub prompt: PromptConfig,
}

/// Gateway tiers and provider endpoints
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub primary_provider: String,
    pub primary_model: String,
    pub fallback_provider: String,
    pub fallback_model: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub ollama_url: String,
    /// Ceiling for one provider call; fallback makes worst case roughly twice this
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Endpoints and timeouts for the tool collaborators
#[derive(Clone, Debug)]
pub struct ToolBackendConfig {
    pub toolserver_url: String,
    pub smarthome_url: String,
    pub fact_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub smarthome_timeout_secs: u64,
    pub n_results: usize,
}

/// Prompt assembly knobs
#[derive(Clone, Debug)]
pub struct PromptConfig {
    pub system_prompt: String,
    pub persona_prompt: String,
    /// Number of feedback entries requested for the learning-context block
    pub learning_limit: usize,
    /// Character budget applied when splicing a search result into the prompt
    pub snippet_chars: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            primary_provider: std::env::var("PRIMARY_LLM_PROVIDER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "openai".to_string()),
            primary_model: std::env::var("PRIMARY_LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "gpt-4.1-mini".to_string()),
            fallback_provider: std::env::var("FALLBACK_LLM_PROVIDER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "ollama".to_string()),
            fallback_model: std::env::var("FALLBACK_LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "llama3.1".to_string()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            ollama_url: std::env::var("OLLAMA_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            request_timeout_secs: std::env::var("LLM_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(120),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.7),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(2000),
        }
    }
}

impl Default for ToolBackendConfig {
    fn default() -> Self {
        Self {
            toolserver_url: std::env::var("TOOLSERVER_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:8002".to_string()),
            smarthome_url: std::env::var("SMARTHOME_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:8008".to_string()),
            fact_timeout_secs: 5,
            search_timeout_secs: 10,
            smarthome_timeout_secs: 10,
            n_results: 3,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: std::env::var("ARIA_SYSTEM_PROMPT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            persona_prompt: std::env::var("ARIA_PERSONA_PROMPT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PERSONA_PROMPT.to_string()),
            learning_limit: 5,
            snippet_chars: 200,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            tools: ToolBackendConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file (path via ARIA_CONFIG or ./aria.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("ARIA_CONFIG").unwrap_or_else(|_| "aria.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "config", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<AssistantToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct AssistantToml {
    pub gateway: Option<GatewayToml>,
    pub tools: Option<ToolsToml>,
    pub prompt: Option<PromptToml>,
}

impl AssistantToml {
    fn overlay(self, mut base: AssistantConfig) -> AssistantConfig {
        if let Some(g) = self.gateway {
            g.apply(&mut base.gateway);
        }
        if let Some(t) = self.tools {
            t.apply(&mut base.tools);
        }
        if let Some(p) = self.prompt {
            p.apply(&mut base.prompt);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GatewayToml {
    pub primary_provider: Option<String>,
    pub primary_model: Option<String>,
    pub fallback_provider: Option<String>,
    pub fallback_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}
impl GatewayToml {
    fn apply(self, g: &mut GatewayConfig) {
        if let Some(v) = self.primary_provider {
            g.primary_provider = v;
        }
        if let Some(v) = self.primary_model {
            g.primary_model = v;
        }
        if let Some(v) = self.fallback_provider {
            g.fallback_provider = v;
        }
        if let Some(v) = self.fallback_model {
            g.fallback_model = v;
        }
        if let Some(v) = self.openai_base_url {
            g.openai_base_url = v;
        }
        if let Some(v) = self.openai_api_key {
            g.openai_api_key = Some(v);
        }
        if let Some(v) = self.ollama_url {
            g.ollama_url = v;
        }
        if let Some(v) = self.request_timeout_secs {
            g.request_timeout_secs = v;
        }
        if let Some(v) = self.temperature {
            g.temperature = v;
        }
        if let Some(v) = self.max_tokens {
            g.max_tokens = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ToolsToml {
    pub toolserver_url: Option<String>,
    pub smarthome_url: Option<String>,
    pub fact_timeout_secs: Option<u64>,
    pub search_timeout_secs: Option<u64>,
    pub smarthome_timeout_secs: Option<u64>,
    pub n_results: Option<usize>,
}
impl ToolsToml {
    fn apply(self, t: &mut ToolBackendConfig) {
        if let Some(v) = self.toolserver_url {
            t.toolserver_url = v;
        }
        if let Some(v) = self.smarthome_url {
            t.smarthome_url = v;
        }
        if let Some(v) = self.fact_timeout_secs {
            t.fact_timeout_secs = v;
        }
        if let Some(v) = self.search_timeout_secs {
            t.search_timeout_secs = v;
        }
        if let Some(v) = self.smarthome_timeout_secs {
            t.smarthome_timeout_secs = v;
        }
        if let Some(v) = self.n_results {
            t.n_results = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct PromptToml {
    pub system_prompt: Option<String>,
    pub persona_prompt: Option<String>,
    pub learning_limit: Option<usize>,
    pub snippet_chars: Option<usize>,
}
impl PromptToml {
    fn apply(self, p: &mut PromptConfig) {
        if let Some(v) = self.system_prompt {
            p.system_prompt = v;
        }
        if let Some(v) = self.persona_prompt {
            p.persona_prompt = v;
        }
        if let Some(v) = self.learning_limit {
            p.learning_limit = v;
        }
        if let Some(v) = self.snippet_chars {
            p.snippet_chars = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overlay_keeps_unset_fields() {
        let toml_str = r#"
            [gateway]
            primary_model = "gpt-4o"
            temperature = 0.2

            [prompt]
            snippet_chars = 80
        "#;
        let overlay: AssistantToml = toml::from_str(toml_str).unwrap();
        let cfg = overlay.overlay(AssistantConfig::default());

        assert_eq!(cfg.gateway.primary_model, "gpt-4o");
        assert!((cfg.gateway.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.prompt.snippet_chars, 80);
        // Untouched sections keep their defaults
        assert_eq!(cfg.tools.n_results, 3);
        assert_eq!(cfg.prompt.learning_limit, 5);
    }

    #[test]
    fn empty_toml_is_a_noop_overlay() {
        let overlay: AssistantToml = toml::from_str("").unwrap();
        let base = AssistantConfig::default();
        let expected_model = base.gateway.primary_model.clone();
        let cfg = overlay.overlay(base);
        assert_eq!(cfg.gateway.primary_model, expected_model);
    }
}
