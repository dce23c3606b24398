use thiserror::Error;

use crate::validation::ValidationErrors;

/// A single field-level rejection reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFieldError {
    pub field: String,
    pub message: String,
}

/// Unified error type for the entire trade-journal-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client-side validation ──────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // ── API / Network ───────────────────────────────────────────────
    #[error("Unauthorized: token missing, expired or rejected")]
    Unauthorized,

    #[error("API error ({}): {}", .status, .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
        field_errors: Vec<ApiFieldError>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Local state ─────────────────────────────────────────────────
    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CoreError {
    /// The message a user should see for a failed mutation.
    ///
    /// A server rejection carrying a message and field errors reads
    /// `"<message>: <field msg>, <field msg>"`; one carrying only a message
    /// shows that message. Everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CoreError::Api {
                message: Some(message),
                field_errors,
                ..
            } => {
                if field_errors.is_empty() {
                    message.clone()
                } else {
                    let details: Vec<&str> =
                        field_errors.iter().map(|e| e.message.as_str()).collect();
                    format!("{message}: {}", details.join(", "))
                }
            }
            _ => fallback.to_string(),
        }
    }

    /// True for errors the server reported as an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Unauthorized)
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(e: ValidationErrors) -> Self {
        CoreError::Validation(e)
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs; filters end up in reqwest's
        // error text and do not belong in user-facing messages or logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_builder() {
            CoreError::InvalidRequest(sanitized)
        } else if e.is_decode() {
            CoreError::Deserialization(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
