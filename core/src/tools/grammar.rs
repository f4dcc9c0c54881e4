//! Tool-call grammar: extracts structured calls from model-generated text.
//!
//! The model emits calls wrapped in case-sensitive `<tool_call>` tags, each
//! wrapping a single function-style invocation. Recognized invocations are
//! listed in [`CALL_SHAPES`]; anything else inside a wrapper is dropped with
//! a warning rather than failing the pass, so a hallucinated call never
//! aborts the loop. Adding a shape is a table entry, not new parsing code.

use serde::{Deserialize, Serialize};
use tracing::warn;

const OPEN_TAG: &str = "<tool_call>";
const CLOSE_TAG: &str = "</tool_call>";

/// One recognized invocation shape: function name plus ordered parameter names
#[derive(Debug, Clone, Copy)]
pub struct CallShape {
    pub name: &'static str,
    pub params: &'static [&'static str],
}

/// The closed set of invocations the parser recognizes
pub const CALL_SHAPES: &[CallShape] = &[
    CallShape {
        name: "get_fact",
        params: &["key"],
    },
    CallShape {
        name: "set_fact",
        params: &["key", "value"],
    },
    CallShape {
        name: "search_docs",
        params: &["query"],
    },
    CallShape {
        name: "smarthome_list_devices",
        params: &["domain"],
    },
    CallShape {
        name: "smarthome_turn_on",
        params: &["entity_id"],
    },
    CallShape {
        name: "smarthome_turn_off",
        params: &["entity_id"],
    },
    CallShape {
        name: "smarthome_toggle",
        params: &["entity_id"],
    },
    CallShape {
        name: "smarthome_get_status",
        params: &["entity_id"],
    },
];

/// Look up the shape registered for a function name
pub fn shape_for(name: &str) -> Option<&'static CallShape> {
    CALL_SHAPES.iter().find(|s| s.name == name)
}

/// A structured call extracted from model text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    pub function: String,
    /// Positional arguments, ordered as the shape's `params`
    pub args: Vec<String>,
}

impl ToolCall {
    pub fn new(function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Fetch an argument by its parameter name in the registered shape
    pub fn arg(&self, param: &str) -> Option<&str> {
        let shape = shape_for(&self.function)?;
        let idx = shape.params.iter().position(|p| *p == param)?;
        self.args.get(idx).map(|s| s.as_str())
    }
}

/// Scan model text for wrapped tool calls, in source order.
///
/// Multiple occurrences and multi-line bodies are allowed. Bodies that do not
/// match a registered shape are skipped; the output is never an error.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(OPEN_TAG) {
        let after_open = &rest[open + OPEN_TAG.len()..];
        let Some(close) = after_open.find(CLOSE_TAG) else {
            break;
        };
        let body = after_open[..close].trim();
        match parse_invocation(body) {
            Some(call) => calls.push(call),
            None => {
                warn!(target: "tool_grammar", body = %body, "Dropping unrecognized tool call");
            }
        }
        rest = &after_open[close + CLOSE_TAG.len()..];
    }

    calls
}

/// Parse one `name("arg", ...)` invocation body against the shape table
fn parse_invocation(body: &str) -> Option<ToolCall> {
    let paren = body.find('(')?;
    let name = body[..paren].trim();
    let shape = shape_for(name)?;

    let mut cursor = Cursor::new(&body[paren + 1..]);
    let mut args = Vec::with_capacity(shape.params.len());
    for (i, _) in shape.params.iter().enumerate() {
        if i > 0 && !cursor.eat(',') {
            return None;
        }
        args.push(cursor.quoted_string()?);
    }
    if !cursor.eat(')') {
        return None;
    }

    Some(ToolCall::new(shape.name, args))
}

/// Minimal forward-only scanner over an invocation's argument list
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    /// Consume one expected punctuation character, skipping leading whitespace
    fn eat(&mut self, expected: char) -> bool {
        let trimmed = self.rest.trim_start();
        match trimmed.strip_prefix(expected) {
            Some(after) => {
                self.rest = after;
                true
            }
            None => false,
        }
    }

    /// Consume a non-empty quoted string argument. Either quote character
    /// opens an argument and either one closes it; pairing is deliberately
    /// not validated, mirroring how leniently models quote. A quote only
    /// closes the argument when `,` or `)` follows it, so apostrophes and
    /// quotes inside the text stay part of the value.
    fn quoted_string(&mut self) -> Option<String> {
        let trimmed = self.rest.trim_start();
        let mut chars = trimmed.char_indices();
        let (_, first) = chars.next()?;
        if first != '"' && first != '\'' {
            return None;
        }
        for (idx, c) in chars {
            if c != '"' && c != '\'' {
                continue;
            }
            let after = trimmed[idx + c.len_utf8()..].trim_start();
            if !after.starts_with(',') && !after.starts_with(')') {
                continue;
            }
            let value = &trimmed[first.len_utf8()..idx];
            if value.is_empty() {
                return None;
            }
            self.rest = &trimmed[idx + c.len_utf8()..];
            return Some(value.to_string());
        }
        None
    }
}
