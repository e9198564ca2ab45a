use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed pipeline json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

impl StudioError {
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }
}
