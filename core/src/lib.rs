// Aria Core Library
// Conversational assistant runtime: LLM gateway with fallback + tool-call loop

pub mod chat;
pub mod config;
pub mod llm;
pub mod orchestrator;
pub mod telemetry;
pub mod tools;

// Export core types
pub use chat::{CompletionRequest, CompletionResult, Message, Role, Usage};
pub use config::AssistantConfig;
pub use llm::{Gateway, GatewayError, ProviderClient, ProviderError};
pub use orchestrator::{ContextProvider, OrchestrationOutcome, Orchestrator};
pub use tools::{parse_tool_calls, ToolCall, ToolDispatcher, ToolExecutor, ToolResult};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AriaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] llm::GatewayError),

    #[error("Orchestration error: {0}")]
    OrchestrationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AriaError>;
