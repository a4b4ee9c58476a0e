//! Error types shared by the form pipeline
//!
//! Validation and format errors carry the exact message shown to the user.

/// Errors produced by editor, serializer, renderer and store operations
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A required input is missing or empty
    #[error("{0}")]
    Validation(String),

    /// A JSON document could not be parsed
    #[error("{0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormError {
    pub fn validation(message: impl Into<String>) -> Self {
        FormError::Validation(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        FormError::Format(message.into())
    }

    /// True for errors caused by user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(self, FormError::Validation(_) | FormError::Format(_))
    }
}

impl From<rusqlite::Error> for FormError {
    fn from(err: rusqlite::Error) -> Self {
        FormError::Storage(err.to_string())
    }
}

pub type FormResult<T> = std::result::Result<T, FormError>;
