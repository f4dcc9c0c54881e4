use aria_core::tools::{parse_tool_calls, shape_for};

#[test]
fn test_parse_single_call() {
    let text = r#"Let me look that up. <tool_call>get_fact("birthday")</tool_call>"#;
    let calls = parse_tool_calls(text);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function, "get_fact");
    assert_eq!(calls[0].args, vec!["birthday".to_string()]);
    assert_eq!(calls[0].arg("key"), Some("birthday"));
}

#[test]
fn test_parse_multiple_calls_in_source_order() {
    let text = concat!(
        "First I need two things.\n",
        "<tool_call>get_fact(\"wifi_password\")</tool_call>\n",
        "and also\n",
        "<tool_call>smarthome_turn_on(\"light.kitchen\")</tool_call>"
    );
    let calls = parse_tool_calls(text);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].function, "get_fact");
    assert_eq!(calls[1].function, "smarthome_turn_on");
    assert_eq!(calls[1].arg("entity_id"), Some("light.kitchen"));
}

#[test]
fn test_parse_two_argument_call() {
    let calls = parse_tool_calls(r#"<tool_call>set_fact("color", "blue")</tool_call>"#);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("key"), Some("color"));
    assert_eq!(calls[0].arg("value"), Some("blue"));
}

#[test]
fn test_mixed_and_mismatched_quotes_accepted() {
    // Single quotes throughout
    let calls = parse_tool_calls("<tool_call>search_docs('rust async')</tool_call>");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("query"), Some("rust async"));

    // Opening and closing quotes need not pair
    let calls = parse_tool_calls("<tool_call>get_fact(\"birthday')</tool_call>");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("key"), Some("birthday"));
}

#[test]
fn test_apostrophe_inside_double_quoted_argument() {
    let calls = parse_tool_calls(r#"<tool_call>search_docs("what's the wifi password")</tool_call>"#);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("query"), Some("what's the wifi password"));
}

#[test]
fn test_quotes_inside_arguments_stay_in_value() {
    let calls = parse_tool_calls(r#"<tool_call>set_fact("o'clock", 'say "hi"')</tool_call>"#);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("key"), Some("o'clock"));
    assert_eq!(calls[0].arg("value"), Some(r#"say "hi""#));
}

#[test]
fn test_trailing_text_after_invocation_ignored() {
    let calls = parse_tool_calls("<tool_call>get_fact(\"a\") please</tool_call>");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("key"), Some("a"));
}

#[test]
fn test_empty_argument_dropped() {
    let calls = parse_tool_calls("<tool_call>get_fact(\"\")</tool_call>");
    assert!(calls.is_empty());
}

#[test]
fn test_multiline_body() {
    let text = "<tool_call>\n  set_fact(\"name\",\n           \"Ada\")\n</tool_call>";
    let calls = parse_tool_calls(text);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec!["name".to_string(), "Ada".to_string()]);
}

#[test]
fn test_unknown_function_dropped() {
    let calls = parse_tool_calls("<tool_call>launch_rocket(\"now\")</tool_call>");
    assert!(calls.is_empty());
}

#[test]
fn test_malformed_body_dropped_without_aborting_scan() {
    let text = concat!(
        "<tool_call>get_fact(\"a\"</tool_call>",
        "<tool_call>get_fact(\"b\")</tool_call>"
    );
    let calls = parse_tool_calls(text);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg("key"), Some("b"));
}

#[test]
fn test_wrong_arity_dropped() {
    // set_fact requires two arguments
    let calls = parse_tool_calls("<tool_call>set_fact(\"only_key\")</tool_call>");
    assert!(calls.is_empty());
}

#[test]
fn test_unquoted_argument_dropped() {
    let calls = parse_tool_calls("<tool_call>get_fact(birthday)</tool_call>");
    assert!(calls.is_empty());
}

#[test]
fn test_tags_are_case_sensitive() {
    let calls = parse_tool_calls("<TOOL_CALL>get_fact(\"a\")</TOOL_CALL>");
    assert!(calls.is_empty());
}

#[test]
fn test_unterminated_wrapper_ignored() {
    let calls = parse_tool_calls("<tool_call>get_fact(\"a\")");
    assert!(calls.is_empty());
}

#[test]
fn test_plain_text_yields_no_calls() {
    assert!(parse_tool_calls("The capital of France is Paris.").is_empty());
}

#[test]
fn test_shape_table_lookup() {
    let shape = shape_for("smarthome_list_devices").unwrap();
    assert_eq!(shape.params, &["domain"][..]);
    assert!(shape_for("no_such_tool").is_none());
}
