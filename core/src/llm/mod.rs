//! LLM module: provider clients and the fallback-aware gateway
//!
//! This module provides:
//! - `ProviderClient` trait plus the `OpenAiClient` and `OllamaClient` backends
//! - `Gateway` for primary/fallback completion with aggregate error reporting

mod gateway;
mod ollama;
mod openai;
mod provider;

pub use gateway::{Gateway, GatewayError};
pub use ollama::{flatten_messages, OllamaClient};
pub use openai::OpenAiClient;
pub use provider::{ProviderClient, ProviderError};
