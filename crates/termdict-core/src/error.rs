//! Error types shared by every termdict crate.

use thiserror::Error;

/// Broad class of a failure. Callers branch on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cache or word-list storage could not be read or written, or is corrupt.
    Storage,
    /// The word has no known definition.
    NotFound,
    /// The definition source could not complete the fetch.
    SourceUnavailable,
    /// The operation was aborted by a timeout or caller cancellation.
    Cancelled,
    /// The input was rejected before touching storage (e.g. a blank word).
    InvalidInput,
}

/// The error type for all dictionary, cache and vocab operations.
#[derive(Debug, Error)]
pub enum DictError {
    /// An I/O failure in a storage backend.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A storage file exists but cannot be decoded.
    #[error("corrupt data in {context}: {source}")]
    Corrupt {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A database backend failed to run a statement or transaction.
    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No definitions exist for the word.
    #[error("no definitions found for word '{word}'")]
    NotFound { word: String },

    /// The remote source failed for a reason other than an unknown word.
    #[error("definition source unavailable for word '{word}': {reason}")]
    Unavailable { word: String, reason: String },

    /// The operation was cancelled or ran past its deadline.
    #[error("cancelled: {reason}")]
    Cancelled { reason: String },

    /// Input rejected by validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Another error, annotated with the stage and word it happened on.
    ///
    /// The wrapped error is rendered inline (`stage 'word': cause`) and is
    /// not exposed through `source()`, so a report that walks the chain
    /// prints each message once.
    #[error("{stage} '{word}': {cause}")]
    Context {
        stage: &'static str,
        word: String,
        cause: Box<DictError>,
    },
}

impl DictError {
    /// Classify the error. Context wrappers report the kind of what they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DictError::Io { .. } | DictError::Corrupt { .. } | DictError::Database { .. } => {
                ErrorKind::Storage
            }
            DictError::NotFound { .. } => ErrorKind::NotFound,
            DictError::Unavailable { .. } => ErrorKind::SourceUnavailable,
            DictError::Cancelled { .. } => ErrorKind::Cancelled,
            DictError::InvalidInput(_) => ErrorKind::InvalidInput,
            DictError::Context { cause, .. } => cause.kind(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DictError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn corrupt(context: impl Into<String>, source: serde_json::Error) -> Self {
        DictError::Corrupt {
            context: context.into(),
            source,
        }
    }

    pub fn database(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DictError::Database {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn not_found(word: impl Into<String>) -> Self {
        DictError::NotFound { word: word.into() }
    }

    /// Wrap `self` with the stage and word it failed on.
    pub fn during(self, stage: &'static str, word: impl Into<String>) -> Self {
        DictError::Context {
            stage,
            word: word.into(),
            cause: Box::new(self),
        }
    }
}

/// A convenience `Result` alias using [`DictError`].
pub type Result<T> = std::result::Result<T, DictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_preserves_kind() {
        let err = DictError::not_found("kappa").during("define via fallback", "kappa");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = DictError::Cancelled {
            reason: "deadline".into(),
        }
        .during("check cache", "kappa")
        .during("define", "kappa");
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn context_message_names_stage_and_word() {
        let err = DictError::io(
            "read cache file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .during("look up cached definitions for", "sponge");
        assert_eq!(
            err.to_string(),
            "look up cached definitions for 'sponge': read cache file: denied"
        );
        assert!(std::error::Error::source(&err).is_none());

        let nested = err.during("define", "sponge");
        assert_eq!(
            nested.to_string(),
            "define 'sponge': look up cached definitions for 'sponge': read cache file: denied"
        );
    }

    #[test]
    fn corrupt_is_storage_kind() {
        let bad = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        assert_eq!(DictError::corrupt("cache", bad).kind(), ErrorKind::Storage);
    }

    #[test]
    fn database_is_storage_kind() {
        let err = DictError::database("insert word 'kappa'", "disk I/O error");
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.to_string(), "insert word 'kappa': disk I/O error");
    }
}
