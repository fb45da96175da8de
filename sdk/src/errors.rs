//! Error types and handling
//!
//! This module provides the error types used throughout the crop advisor.
//! All errors implement the `AdvisorErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! User hints are static strings. They never include:
//! - Secrets (API keys, bearer tokens)
//! - Corpus file paths
//! - Text returned by the remote completion service

use thiserror::Error;

/// Trait for advisor error extensions
///
/// Transports use this to decide what to show the end user and which
/// status to answer with, without matching on every variant themselves.
pub trait AdvisorErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to render into a page or print to a terminal.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried by the caller. Non-recoverable
    /// errors need an operator to fix configuration or deployment.
    fn is_recoverable(&self) -> bool;

    /// Returns true when the failure came from the remote completion service
    fn is_remote(&self) -> bool;

    /// Returns true when the failure was caused by the caller's input
    fn is_input_error(&self) -> bool;
}

/// Main advisor error type
///
/// # Error Categories
///
/// - **Input**: empty question, malformed structured fields
/// - **Corpus**: missing or unreadable document directory
/// - **Remote**: completion service failures (network, auth, malformed response)
/// - **Configuration**: invalid config file, missing credential, keychain access
///
/// # Examples
///
/// ```
/// use sdk::errors::{AdvisorError, AdvisorErrorExt};
///
/// let error = AdvisorError::RemoteService("connection reset".to_string());
/// assert!(error.is_remote());
/// assert!(!error.user_hint().contains("connection reset"));
///
/// let input_error = AdvisorError::EmptyQuestion;
/// assert!(input_error.is_input_error());
/// ```
#[derive(Debug, Error)]
pub enum AdvisorError {
    // Input errors
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Corpus errors
    #[error("Corpus read error: {0}")]
    CorpusRead(String),

    #[error("Corpus directory unavailable: {0:?}")]
    CorpusUnavailable(std::path::PathBuf),

    // Remote completion service errors
    #[error("Completion service error: {0}")]
    RemoteService(String),

    #[error("Completion service timed out")]
    RemoteTimeout,

    #[error("Completion service rejected credentials: {0}")]
    Authentication(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Keyring errors
    #[error("Keyring error: {0}")]
    KeyringError(String),

    #[error("Secret not configured: {0}")]
    SecretMissing(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdvisorErrorExt for AdvisorError {
    fn user_hint(&self) -> &str {
        match self {
            // Input errors
            Self::EmptyQuestion => "Please enter a question about crop disease or soil",
            Self::InvalidInput(_) => "Some of the form fields are invalid. Check them and retry",

            // Corpus errors
            Self::CorpusRead(_) | Self::CorpusUnavailable(_) => {
                "The local knowledge base could not be read. Contact the operator"
            }

            // Remote errors
            Self::RemoteService(_) | Self::RemoteTimeout => {
                "The crop advisor is currently unavailable. Please try again later"
            }
            Self::Authentication(_) => {
                "The crop advisor is currently unavailable. The operator must check the API key"
            }

            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",
            Self::SecretMissing(_) => "API key not configured. Run 'crop-advisor setup'",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::CorpusUnavailable(_)
            | Self::Authentication(_)
            | Self::Config(_)
            | Self::SecretMissing(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }

    fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteService(_) | Self::RemoteTimeout | Self::Authentication(_)
        )
    }

    fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyQuestion | Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_flagged() {
        assert!(AdvisorError::RemoteService("x".into()).is_remote());
        assert!(AdvisorError::RemoteTimeout.is_remote());
        assert!(AdvisorError::Authentication("401".into()).is_remote());
        assert!(!AdvisorError::EmptyQuestion.is_remote());
        assert!(!AdvisorError::CorpusRead("x".into()).is_remote());
    }

    #[test]
    fn test_input_errors_are_flagged() {
        assert!(AdvisorError::EmptyQuestion.is_input_error());
        assert!(AdvisorError::InvalidInput("temperature".into()).is_input_error());
        assert!(!AdvisorError::RemoteTimeout.is_input_error());
    }

    #[test]
    fn test_hint_does_not_leak_details() {
        let err = AdvisorError::RemoteService("gsk_secret_body".into());
        assert!(!err.user_hint().contains("gsk_secret_body"));

        let err = AdvisorError::CorpusUnavailable(std::path::PathBuf::from("/srv/data"));
        assert!(!err.user_hint().contains("/srv/data"));
    }

    #[test]
    fn test_recoverability() {
        assert!(AdvisorError::RemoteTimeout.is_recoverable());
        assert!(AdvisorError::CorpusRead("x".into()).is_recoverable());
        assert!(!AdvisorError::Authentication("x".into()).is_recoverable());
        assert!(!AdvisorError::SecretMissing("GROQ_API_KEY".into()).is_recoverable());
    }
}
