use super::*;
use shared::protocol::MessageKind;

#[test]
fn appends_in_order_and_resets() {
    let console = ConsoleLog::new();
    console.add_message(vec![ConsoleMessage::info("one")]);
    console.add_message(vec![
        ConsoleMessage::new(MessageKind::MissingName, "two"),
        ConsoleMessage::success("three"),
    ]);

    let contents: Vec<_> = console
        .messages()
        .into_iter()
        .map(|message| message.content)
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    console.reset_messages();
    assert!(console.messages().is_empty());
}
