use std::sync::Mutex;

use shared::protocol::ConsoleMessage;

use crate::{lock, ConsoleActions, ConsoleStore};

/// Message list shown in the studio console drawer.
#[derive(Default)]
pub struct ConsoleLog {
    messages: Mutex<Vec<ConsoleMessage>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsoleStore for ConsoleLog {
    fn messages(&self) -> Vec<ConsoleMessage> {
        lock(&self.messages).clone()
    }
}

impl ConsoleActions for ConsoleLog {
    fn reset_messages(&self) {
        lock(&self.messages).clear();
    }

    fn add_message(&self, messages: Vec<ConsoleMessage>) {
        for message in &messages {
            tracing::debug!(kind = ?message.kind, content = %message.content, "console message");
        }
        lock(&self.messages).extend(messages);
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
