//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Input was empty or whitespace only
    #[error("Empty input: nothing to translate")]
    EmptyInput,

    /// Backend configuration could not be read or parsed
    #[error("Unreadable config: {path} - {message}")]
    UnreadableConfig {
        /// Config file that was read
        path: String,
        /// Parser or I/O failure
        message: String,
    },

    /// No provider registered under the requested identifier
    #[error("Unsupported engine '{engine}'")]
    UnsupportedEngine {
        /// Identifier that was asked for
        engine: String,
    },

    /// Provider needs a credential that is not configured
    #[error("Missing credential for {provider}: {field}")]
    MissingCredential {
        /// Provider display name
        provider: String,
        /// Credential field, e.g. `api_key`
        field: String,
    },

    /// Network error while talking to a provider
    #[error("{provider} network error: {message}")]
    NetworkError {
        /// Provider display name
        provider: String,
        /// Transport failure
        message: String,
    },

    /// Provider answered with a non-success status
    #[error("{provider} rejected request: {status} - {message}")]
    ProviderRejected {
        /// Provider display name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        message: String,
    },

    /// Provider answered with a body we could not interpret
    #[error("{provider} invalid response: {message}")]
    InvalidResponseError {
        /// Provider display name
        provider: String,
        /// What was wrong with the body
        message: String,
    },

    /// Fewer replacements than quoted spans
    #[error("Quote count mismatch: {spans} quoted spans but only {replacements} replacements")]
    QuoteCountMismatch {
        /// Quoted spans found in the text
        spans: usize,
        /// Replacements supplied
        replacements: usize,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// File involved
        path: String,
        /// Underlying failure
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Whether this error is shown in place of a translation instead of
    /// aborting the operation.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            TranslationError::UnreadableConfig { .. }
                | TranslationError::UnsupportedEngine { .. }
                | TranslationError::MissingCredential { .. }
                | TranslationError::NetworkError { .. }
                | TranslationError::ProviderRejected { .. }
                | TranslationError::InvalidResponseError { .. }
                | TranslationError::HttpError(_)
                | TranslationError::JsonError(_)
        )
    }

    /// Text payload rendered in place of the translation
    pub fn inline_payload(&self) -> String {
        format!("[Error: {}]", self)
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_payload_wraps_message() {
        let err = TranslationError::UnsupportedEngine {
            engine: "yandex".to_string(),
        };
        assert_eq!(err.inline_payload(), "[Error: Unsupported engine 'yandex']");
        assert!(err.is_inline());
    }

    #[test]
    fn test_provider_failures_are_inline() {
        let rejected = TranslationError::ProviderRejected {
            provider: "Microsoft".to_string(),
            status: 401,
            message: "invalid subscription key".to_string(),
        };
        assert!(rejected.is_inline());
        assert_eq!(
            rejected.inline_payload(),
            "[Error: Microsoft rejected request: 401 - invalid subscription key]"
        );

        let network = TranslationError::NetworkError {
            provider: "Lingvanex".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(network.is_inline());
        assert_eq!(
            network.inline_payload(),
            "[Error: Lingvanex network error: connection refused]"
        );
    }

    #[test]
    fn test_abort_kinds_are_not_inline() {
        assert!(!TranslationError::EmptyInput.is_inline());
        assert!(!TranslationError::QuoteCountMismatch {
            spans: 2,
            replacements: 1
        }
        .is_inline());
    }
}
