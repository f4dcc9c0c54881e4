use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::context::ContextProvider;
use crate::chat::{CompletionRequest, CompletionResult, Message};
use crate::config::PromptConfig;
use crate::llm::Gateway;
use crate::tools::{parse_tool_calls, ToolCall, ToolExecutor, ToolResult};
use crate::Result;

/// Options controlling each gateway pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrchestratorOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Provenance of the pass that produced the final text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmMetadata {
    pub model: String,
    pub provider: String,
}

impl LlmMetadata {
    fn from_result(result: &CompletionResult) -> Self {
        Self {
            model: result.model.clone(),
            provider: result.provider.clone(),
        }
    }
}

/// Final answer surfaced to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    /// Terminal response text shown to the user
    pub response: String,
    pub tool_calls: Vec<ToolCall>,
    /// Exactly one result per call, in call order
    pub tool_results: Vec<(ToolCall, ToolResult)>,
    /// Unmodified first-pass assistant text
    pub raw_response: String,
    pub metadata: LlmMetadata,
}

/// The loop's explicit state. `Second` is terminal by construction: its arm
/// returns, so no path re-enters tool execution and the final text is never
/// re-parsed for calls.
enum Pass {
    First,
    Tools {
        first: CompletionResult,
        calls: Vec<ToolCall>,
    },
    Second {
        first: CompletionResult,
        calls: Vec<ToolCall>,
        results: Vec<ToolResult>,
    },
}

/// Drives one query through prompt assembly, the gateway, tool dispatch, and
/// the optional refinement pass. Stateless across requests.
pub struct Orchestrator {
    gateway: Gateway,
    executor: Arc<dyn ToolExecutor>,
    context: Arc<dyn ContextProvider>,
    prompt: PromptConfig,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(
        gateway: Gateway,
        executor: Arc<dyn ToolExecutor>,
        context: Arc<dyn ContextProvider>,
        prompt: PromptConfig,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            gateway,
            executor,
            context,
            prompt,
            options,
        }
    }

    /// Answer one user query, optionally continuing a prior conversation.
    ///
    /// At most one round of tool execution happens per query; a gateway
    /// failure in either pass aborts the whole request and discards any tool
    /// progress.
    pub async fn process_query(
        &self,
        query: &str,
        history: &[Message],
    ) -> Result<OrchestrationOutcome> {
        let started = Instant::now();

        let mut conversation = Vec::with_capacity(history.len() + 2);
        conversation.push(Message::system(self.build_system_content().await));
        conversation.extend_from_slice(history);
        conversation.push(Message::user(query));

        let mut pass = Pass::First;
        loop {
            pass = match pass {
                Pass::First => {
                    let req = self.request(conversation.clone());
                    let result = self.gateway.complete(&req).await?;
                    let calls = parse_tool_calls(&result.text);
                    debug!(target: "orchestrator", calls = calls.len(), "First pass complete");

                    if calls.is_empty() {
                        info!(
                            target: "orchestrator",
                            provider = %result.provider,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Query answered without tools"
                        );
                        let metadata = LlmMetadata::from_result(&result);
                        return Ok(OrchestrationOutcome {
                            response: result.text.clone(),
                            tool_calls: Vec::new(),
                            tool_results: Vec::new(),
                            raw_response: result.text,
                            metadata,
                        });
                    }
                    Pass::Tools {
                        first: result,
                        calls,
                    }
                }
                Pass::Tools { first, calls } => {
                    let results = self.execute_calls(&calls).await;
                    Pass::Second {
                        first,
                        calls,
                        results,
                    }
                }
                Pass::Second {
                    first,
                    calls,
                    results,
                } => {
                    let pairs: Vec<(ToolCall, ToolResult)> =
                        calls.into_iter().zip(results).collect();

                    conversation.push(Message::assistant(first.text.clone()));
                    conversation.push(Message::user(render_tool_results(&pairs)));

                    let req = self.request(conversation);
                    let final_result = self.gateway.complete(&req).await?;
                    info!(
                        target: "orchestrator",
                        provider = %final_result.provider,
                        tool_calls = pairs.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Query answered after tool round"
                    );

                    let metadata = LlmMetadata::from_result(&final_result);
                    return Ok(OrchestrationOutcome {
                        response: final_result.text,
                        tool_calls: pairs.iter().map(|(c, _)| c.clone()).collect(),
                        tool_results: pairs,
                        raw_response: first.text,
                        metadata,
                    });
                }
            };
        }
    }

    fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::new(messages, self.options.temperature, self.options.max_tokens)
    }

    /// System content: the static prompts and the tool inventory, plus the
    /// learning-context block with its weighing instruction when it is
    /// non-empty.
    async fn build_system_content(&self) -> String {
        let catalog = self.context.tool_catalog().await;
        let inventory: Vec<String> = catalog
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect();

        let mut content = format!(
            "{}\n\n{}\n\nAvailable tools:\n{}",
            self.prompt.system_prompt,
            self.prompt.persona_prompt,
            inventory.join("\n")
        );

        let learning = self.context.learning_context(self.prompt.learning_limit).await;
        if !learning.is_empty() {
            content.push_str("\n\n");
            content.push_str(&learning);
            content.push_str(
                "\n\nPlease weigh these earlier corrections and feedback in your answer.",
            );
        }

        content
    }

    /// Dispatch every call concurrently; results line up positionally with
    /// the calls and one call's failure never cancels its siblings.
    async fn execute_calls(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut handles = Vec::with_capacity(calls.len());
        for call in calls {
            let executor = Arc::clone(&self.executor);
            let call = call.clone();
            handles.push(tokio::spawn(
                async move { executor.execute(&call).await },
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => ToolResult::fail(format!("tool task failed: {e}")),
            });
        }
        results
    }
}

/// Synthesized user turn summarizing every call/result pair for the second pass
fn render_tool_results(pairs: &[(ToolCall, ToolResult)]) -> String {
    let lines: Vec<String> = pairs
        .iter()
        .map(|(call, result)| format!("Tool: {} -> {}", call.function, result.render()))
        .collect();
    format!(
        "Tool results:\n{}\n\nPlease formulate a final answer for the user based on these results.",
        lines.join("\n")
    )
}
