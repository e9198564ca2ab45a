//! UI events, view event control, and error modeling for the studio controller.

use studio_core::{DeferredAction, DeferredHandle};

pub const KEY_ENTER: u32 = 13;
pub const KEY_ESCAPE: u32 = 27;

pub enum UiEvent {
    /// Wake-up after a pipeline config store change.
    ConfigChanged,
    Deferred {
        handle: DeferredHandle,
        action: DeferredAction,
    },
    Info(String),
    Error(UiError),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::ConfigChanged => "config_changed",
            UiEvent::Deferred { .. } => "deferred",
            UiEvent::Info(_) => "info",
            UiEvent::Error(_) => "error",
        }
    }
}

/// A key or click event from the view, with the two suppression flags the
/// view checks after a handler ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewEvent {
    pub key_code: Option<u32>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl ViewEvent {
    pub fn click() -> Self {
        Self::default()
    }

    pub fn key(key_code: u32) -> Self {
        Self {
            key_code: Some(key_code),
            ..Self::default()
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Io,
    Clipboard,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Export,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("clipboard") {
            UiErrorCategory::Clipboard
        } else if message_lower.contains("permission denied")
            || message_lower.contains("no such file")
            || message_lower.contains("i/o")
            || message_lower.contains("read-only")
        {
            UiErrorCategory::Io
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_line(&self) -> String {
        let prefix = match self.context {
            UiErrorContext::Export => "Export failed",
        };
        format!("{prefix}: {}", self.message)
    }
}
