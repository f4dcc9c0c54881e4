pub mod dispatcher;
pub mod grammar;

// Re-export common types
pub use dispatcher::{format_search_results, SearchHit, ToolDispatcher, ToolExecutor, ToolResult};
pub use grammar::{parse_tool_calls, shape_for, CallShape, ToolCall, CALL_SHAPES};
