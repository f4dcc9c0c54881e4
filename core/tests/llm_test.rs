use aria_core::llm::flatten_messages;
use aria_core::Message;

#[test]
fn test_flatten_messages_roles_and_cue() {
    let messages = vec![
        Message::system("You are helpful."),
        Message::user("hi"),
        Message::assistant("Hello!"),
        Message::user("what's 2+2?"),
    ];
    let prompt = flatten_messages(&messages);
    assert_eq!(
        prompt,
        "System: You are helpful.\n\nUser: hi\n\nAssistant: Hello!\n\nUser: what's 2+2?\n\nAssistant: "
    );
}

#[test]
fn test_flatten_messages_empty_conversation_still_cues_assistant() {
    assert_eq!(flatten_messages(&[]), "Assistant: ");
}

#[test]
fn test_role_labels() {
    assert_eq!(aria_core::Role::System.label(), "System");
    assert_eq!(aria_core::Role::User.label(), "User");
    assert_eq!(aria_core::Role::Assistant.label(), "Assistant");
}
