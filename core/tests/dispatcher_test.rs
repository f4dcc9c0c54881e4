use aria_core::config::ToolBackendConfig;
use aria_core::tools::{format_search_results, SearchHit, ToolCall, ToolDispatcher, ToolExecutor};
use serde_json::json;

/// Dispatcher pointed at ports nothing listens on, so every backend call
/// fails at the transport layer.
fn unreachable_dispatcher() -> ToolDispatcher {
    let cfg = ToolBackendConfig {
        toolserver_url: "http://127.0.0.1:9".to_string(),
        smarthome_url: "http://127.0.0.1:9".to_string(),
        fact_timeout_secs: 1,
        search_timeout_secs: 1,
        smarthome_timeout_secs: 1,
        n_results: 3,
    };
    ToolDispatcher::new(&cfg, 200).unwrap()
}

#[tokio::test]
async fn test_unknown_function_is_failed_result() {
    let dispatcher = unreachable_dispatcher();
    let call = ToolCall::new("order_pizza", vec!["margherita".to_string()]);
    let result = dispatcher.execute(&call).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("unknown function order_pizza"));
}

#[tokio::test]
async fn test_known_function_with_wrong_arity_is_failed_result() {
    let dispatcher = unreachable_dispatcher();
    // get_fact requires exactly one argument
    let call = ToolCall::new("get_fact", vec![]);
    let result = dispatcher.execute(&call).await;
    assert!(!result.success);
}

#[tokio::test]
async fn test_unreachable_backend_folds_into_result() {
    let dispatcher = unreachable_dispatcher();
    let call = ToolCall::new("get_fact", vec!["birthday".to_string()]);
    let result = dispatcher.execute(&call).await;
    assert!(!result.success);
    assert!(result.result.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_unreachable_smarthome_action_folds_into_result() {
    let dispatcher = unreachable_dispatcher();
    let call = ToolCall::new("smarthome_turn_on", vec!["light.kitchen".to_string()]);
    let result = dispatcher.execute(&call).await;
    assert!(!result.success);
    assert!(result.error.is_some());
}

#[test]
fn test_render_failed_result_prefixes_error() {
    let result = aria_core::ToolResult::fail("backend unreachable");
    assert_eq!(result.render(), "error: backend unreachable");
}

#[test]
fn test_render_ok_result_is_bare_text() {
    let result = aria_core::ToolResult::ok("42");
    assert_eq!(result.render(), "42");
}

#[test]
fn test_format_search_results_snippet_and_relevance() {
    let hits = vec![
        SearchHit {
            text: "Rust's ownership model prevents data races.".to_string(),
            metadata: json!({"source": "book"}),
            distance: Some(0.25),
        },
        SearchHit {
            text: "x".repeat(300),
            metadata: json!({}),
            distance: None,
        },
    ];
    let rendered = format_search_results(&hits, 200);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("- Rust's ownership model"));
    assert!(lines[0].contains("(relevance: 0.75)"));
    // Long text is cut to the snippet budget and marked as truncated
    assert!(lines[1].contains("..."));
    assert!(lines[1].contains(&"x".repeat(200)));
    assert!(!lines[1].contains(&"x".repeat(201)));
}

#[test]
fn test_format_search_results_truncation_respects_char_boundaries() {
    let hits = vec![SearchHit {
        text: "é".repeat(300),
        metadata: json!({}),
        distance: Some(0.0),
    }];
    // Must not panic splitting a multi-byte character
    let rendered = format_search_results(&hits, 200);
    assert!(rendered.contains("..."));
}
