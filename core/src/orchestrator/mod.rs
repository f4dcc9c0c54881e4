//! Orchestration: prompt assembly and the two-pass request/tool/response loop

mod context;
mod engine;

pub use context::{ContextProvider, HttpContextProvider, ToolDescriptor};
pub use engine::{LlmMetadata, OrchestrationOutcome, Orchestrator, OrchestratorOptions};
