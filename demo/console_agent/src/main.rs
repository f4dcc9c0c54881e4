use aria_core::orchestrator::{HttpContextProvider, Orchestrator, OrchestratorOptions};
use aria_core::{AssistantConfig, Gateway, Message, ToolDispatcher};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Logging / tracing (RUST_LOG overrides the "info" default)
    aria_core::telemetry::init_tracing()?;

    info!(
        target = "console_agent",
        "Starting console agent demo: query → gateway → tool loop → answer"
    );

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = AssistantConfig::load();

    let gateway = Gateway::from_config(&cfg.gateway)?;
    let dispatcher = ToolDispatcher::new(&cfg.tools, cfg.prompt.snippet_chars)?;
    let context = HttpContextProvider::new(&cfg.tools)?;

    let options = OrchestratorOptions {
        temperature: cfg.gateway.temperature,
        max_tokens: cfg.gateway.max_tokens,
    };
    let orchestrator = Orchestrator::new(
        gateway,
        Arc::new(dispatcher),
        Arc::new(context),
        cfg.prompt.clone(),
        options,
    );

    // One-shot mode: answer the query given on the command line and exit.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let query = args.join(" ");
        answer(&orchestrator, &query, &[]).await;
        return Ok(());
    }

    // Interactive mode: keep the conversation going across turns.
    let mut history: Vec<Message> = Vec::new();
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }
        if let Some(response) = answer(&orchestrator, query, &history).await {
            history.push(Message::user(query));
            history.push(Message::assistant(response));
        }
    }

    Ok(())
}

async fn answer(orchestrator: &Orchestrator, query: &str, history: &[Message]) -> Option<String> {
    match orchestrator.process_query(query, history).await {
        Ok(outcome) => {
            for (call, result) in &outcome.tool_results {
                println!("[tool] {} -> {}", call.function, result.render());
            }
            println!("{}", outcome.response);
            println!(
                "[{} via {}]",
                outcome.metadata.model, outcome.metadata.provider
            );
            Some(outcome.response)
        }
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}
