//! Error taxonomy for the analysis workbench.
//!
//! Every failure a user can trigger falls into one of three classes:
//!
//! - [`ValidationError`]: rejected locally, never reaches the network
//!   (blank input, unsupported file type, oversized file)
//! - [`TransportError`]: the request was attempted and failed (network,
//!   non-success status, malformed payload, timeout) or was refused because
//!   the pipeline already has a request in flight
//! - [`RenderingError`]: a result was needed for export but none is usable
//!
//! All of them are recoverable. The workbench funnels them through the single
//! error modal using [`WorkbenchError::user_message`].

use thiserror::Error;

/// Top-level error for workbench operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rendering(#[from] RenderingError),
}

impl WorkbenchError {
    /// Message shown in the error modal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Transport(e) => format!("Analysis error: {}", e),
            Self::Rendering(e) => e.to_string(),
        }
    }

    /// Whether trying the same action again could succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Validation(_) | Self::Rendering(_) => false,
        }
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some code to analyze.")]
    EmptyInput,

    #[error("Unsupported file type. Use only .txt or .docx files")]
    UnsupportedFileType { name: String },

    #[error("File too large. Maximum size: {}", size_text(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Could not read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

/// A request that was attempted (or refused) and did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{}", server_message(.message, .details.as_deref()))]
    Server {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// The request never produced a response.
    #[error("could not reach the analysis server: {0}")]
    Network(String),

    /// The response body could not be understood.
    #[error("malformed response from server: {0}")]
    Malformed(String),

    #[error("no response after {secs}s")]
    Timeout { secs: u64 },

    /// Single-flight guard: the pipeline already has a request outstanding.
    #[error("an analysis is already running")]
    InFlight,
}

impl TransportError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Server { status, .. } => *status >= 500,
            Self::Network(_) | Self::Timeout { .. } | Self::InFlight => true,
            Self::Malformed(_) => false,
        }
    }
}

fn size_text(limit: &u64) -> String {
    crate::ingest::format_file_size(*limit)
}

fn server_message(message: &str, details: Option<&str>) -> String {
    match details {
        Some(details) if !details.is_empty() => format!("{} ({})", message, details),
        _ => message.to_string(),
    }
}

/// Export or display requested without a usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderingError {
    #[error("No results to download.")]
    NoResult,

    #[error("The analysis produced no tokens; nothing to download.")]
    EmptyResult,

    #[error("Failed to write report: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_includes_details_when_present() {
        let err = TransportError::Server {
            status: 400,
            message: "Syntax error".into(),
            details: Some("Invalid character at position 3".into()),
        };
        assert_eq!(
            err.to_string(),
            "Syntax error (Invalid character at position 3)"
        );
    }

    #[test]
    fn server_message_without_details() {
        let err = TransportError::server(500, "Internal server error");
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn file_too_large_names_the_limit() {
        let err = ValidationError::FileTooLarge {
            size: 20 * 1024 * 1024,
            limit: 16 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File too large. Maximum size: 16 MB");
    }

    #[test]
    fn retry_classification() {
        let timeout: WorkbenchError = TransportError::Timeout { secs: 30 }.into();
        let empty: WorkbenchError = ValidationError::EmptyInput.into();
        let client: WorkbenchError = TransportError::server(400, "bad").into();
        assert!(timeout.is_retryable());
        assert!(!empty.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn transport_messages_are_prefixed_in_modal() {
        let err: WorkbenchError = TransportError::server(400, "Empty code").into();
        assert_eq!(err.user_message(), "Analysis error: Empty code");
    }
}
