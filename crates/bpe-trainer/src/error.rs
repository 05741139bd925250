//! # Error Types

use std::path::PathBuf;

/// Errors from trainer operations.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    /// Requested vocab size is below `256 + special_tokens.len()`.
    #[error("vocab_size ({vocab_size}) must be >= {min} (256 base bytes + {specials} special tokens)")]
    VocabSizeTooSmall {
        /// The vocab size that was requested.
        vocab_size: usize,
        /// The minimum legal vocab size.
        min: usize,
        /// The number of special tokens that were requested.
        specials: usize,
    },

    /// `train_from_file` was called with no special tokens; the chunk
    /// reader has no delimiter to split the corpus on.
    #[error("train_from_file requires at least one special token")]
    NoSpecialTokens,

    /// The word-split regex failed to compile.
    #[error("invalid pre-tokenization pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),

    /// I/O error reading the corpus or persisted state.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Persisted state has an unsupported `version` field.
    #[error("unsupported tokenizer state version: {0}")]
    UnsupportedVersion(u32),

    /// Persisted state has a non-integer token id key.
    #[error("invalid token id: {0:?}")]
    InvalidTokenId(String),

    /// Persisted state has a non-hex vocab value.
    #[error("invalid hex for token {token}: {value:?}")]
    InvalidHex {
        /// The token id whose value failed to parse.
        token: u32,
        /// The offending value.
        value: String,
    },

    /// Persisted state JSON was malformed.
    #[error("malformed tokenizer state: {0}")]
    MalformedState(#[from] serde_json::Error),

    /// The output folder exists and is not a directory.
    #[error("output path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The requested state file does not exist.
    #[error("tokenizer state file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for trainer operations.
pub type Result<T> = std::result::Result<T, TrainerError>;
