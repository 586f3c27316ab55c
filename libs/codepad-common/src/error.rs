//! Error taxonomy shared by the session core and its front-ends

use thiserror::Error;

/// Result type alias for session commands
pub type Result<T> = std::result::Result<T, SessionError>;

/// Rejections raised by session commands.
///
/// None of these leave partial state behind: a command that returns an
/// error has not mutated the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Cannot delete the last remaining file")]
    LastFile,

    #[error("No file is active")]
    NoActiveFile,

    #[error("A language change is already awaiting confirmation")]
    TransitionPending,

    #[error("No language change is awaiting confirmation")]
    NoPendingTransition,
}

impl SessionError {
    pub fn invalid_file_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFileName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn file_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "File",
            id: id.to_string(),
        }
    }

    pub fn test_case_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Test case",
            id: id.to_string(),
        }
    }
}

/// Lookup failures against the static language table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unsupported extension '.{0}' (use .js, .py, .cpp, .java or .c)")]
    UnsupportedExtension(String),

    #[error("Unknown language '{0}' (use javascript, python, cpp, java or c)")]
    UnknownLanguage(String),
}

/// Failure to obtain a usable response from the execution service.
///
/// These never escape the dispatcher: they are recorded into the affected
/// test case as an `Error` status with the display text as output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Execution service unreachable: {0}")]
    Unreachable(String),

    #[error("Execution service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from execution service: {0}")]
    Malformed(String),

    #[error("Execution task ended without reporting a result")]
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = SessionError::test_case_not_found(7);
        assert_eq!(err.to_string(), "Test case not found: 7");
    }

    #[test]
    fn test_transport_error_display_is_human_readable() {
        let err = TransportError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Execution service returned HTTP 502: bad gateway"
        );
    }
}
