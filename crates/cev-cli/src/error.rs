//! Error types for the CEV client
//!
//! Errors fall into the groups the views care about: rejections from the
//! backend (which may carry a message meant for the user), transport
//! failures, client-side validation, and local problems such as config or
//! file access.

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The backend answered with a non-2xx status
    #[error("{}", rejection_text(.status, .message))]
    Rejected { status: u16, message: Option<String> },

    /// The backend could not be reached or the connection failed mid-request
    #[error("Network request failed: {0}. Check your connection and the server URL.")]
    Http(#[from] reqwest::Error),

    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// A view that needs a session was requested without one
    #[error("Not logged in. Run 'cev login' or 'cev register' first.")]
    NotAuthenticated,

    /// A control was triggered while its previous request is still running
    #[error("{0} is already in progress")]
    Busy(&'static str),

    /// A session operation was attempted from a state that does not allow it
    #[error("{0}")]
    InvalidTransition(&'static str),

    /// An operation failed; `message` is what the user sees
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<Box<CliError>>,
    },

    /// The backend answered 2xx with a body that does not match the contract
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}. Check your environment variables or config file.")]
    Config(String),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

fn rejection_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(msg) => format!("Server rejected the request ({}): {}", status, msg),
        None => format!("Server rejected the request ({})", status),
    }
}

impl CliError {
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected { status, message }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed {
            message: msg.into(),
            source: None,
        }
    }

    /// Replace the error text with what the user should see, keeping the
    /// original as the source. Local errors are already user-facing and pass
    /// through unchanged.
    pub fn with_fallback(self, fallback: &str) -> Self {
        match self {
            CliError::Validation(_)
            | CliError::NotAuthenticated
            | CliError::Busy(_)
            | CliError::InvalidTransition(_)
            | CliError::Failed { .. } => self,
            other => CliError::Failed {
                message: other.user_message(fallback),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Message shown next to the control that failed.
    ///
    /// Server-supplied messages are shown verbatim, validation messages as
    /// written; everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CliError::Rejected {
                message: Some(msg), ..
            } => msg.clone(),
            CliError::Validation(msg) | CliError::Failed { message: msg, .. } => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    /// True for a 401/403 answer, i.e. the session is missing or expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CliError::Rejected { status: 401 | 403, .. } | CliError::NotAuthenticated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = CliError::rejected(400, Some("Missing required columns: Type".to_string()));
        assert_eq!(
            err.user_message("Upload failed. Please try again."),
            "Missing required columns: Type"
        );
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = CliError::rejected(500, None);
        assert_eq!(err.user_message("Upload failed. Please try again."), "Upload failed. Please try again.");

        let err = CliError::unexpected("missing dataset id");
        assert_eq!(err.user_message("Upload failed. Please try again."), "Upload failed. Please try again.");
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err = CliError::validation("Please select a file");
        assert_eq!(err.user_message("fallback"), "Please select a file");
        assert_eq!(err.to_string(), "Please select a file");
    }

    #[test]
    fn test_with_fallback_keeps_source() {
        let err = CliError::rejected(503, None).with_fallback("Failed to download report");
        assert_eq!(err.to_string(), "Failed to download report");
        assert!(std::error::Error::source(&err).is_some());

        let err = CliError::validation("Please select a file").with_fallback("ignored");
        assert_eq!(err.to_string(), "Please select a file");
    }

    #[test]
    fn test_rejection_display() {
        let err = CliError::rejected(401, Some("Invalid credentials".to_string()));
        assert_eq!(err.to_string(), "Server rejected the request (401): Invalid credentials");
        assert!(err.is_unauthorized());
        assert!(!CliError::rejected(404, None).is_unauthorized());
    }
}
