//! Error types for lexicarve.
//!
//! Content-shape failures (`NoCategory`, `BlockNotFound`, `MultipleSingleBlock`,
//! `EmptyResult`, `RemainingText`) mean the layout does not match a given
//! document and are recoverable per document. `UndefinedWord` is a semantic
//! outcome, not a defect: the source confirms the headword does not exist.

/// Error type for extraction and consolidation operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source page marks the headword as not existing in this dictionary.
    ///
    /// Callers should track these separately from true failures.
    #[error("word is not defined in this source")]
    UndefinedWord,

    /// No category entry selector matched the document.
    #[error("no category layout matches the document")]
    NoCategory,

    /// A field with min-arity 1 produced no valid candidate.
    #[error("required block not found: {0}")]
    BlockNotFound(String),

    /// A field with max-arity 1 produced more than one valid candidate.
    #[error("multiple matches for single block: {0}")]
    MultipleSingleBlock(String),

    /// Every matched category produced zero entries.
    #[error("extraction produced no entries")]
    EmptyResult,

    /// Alphabetic content survived the validation pass: the layout
    /// under-specifies some field.
    #[error("unextracted text remains after validation")]
    RemainingText,

    /// The layout document violates the schema.
    #[error("invalid layout: {0}")]
    Layout(String),

    /// JSON (de)serialization failed: malformed layout document or an
    /// unserializable debug artifact.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A record store query failed.
    #[error("record store: {0}")]
    Store(String),

    /// Writing a debug artifact failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `Store` error from any displayable store-side failure.
    pub fn store(err: impl std::fmt::Display) -> Self {
        Error::Store(err.to_string())
    }

    /// True for the content-shape failures a batch driver should record
    /// as layout problems (everything except `UndefinedWord`).
    #[must_use]
    pub fn is_shape_failure(&self) -> bool {
        matches!(
            self,
            Error::NoCategory
                | Error::BlockNotFound(_)
                | Error::MultipleSingleBlock(_)
                | Error::EmptyResult
                | Error::RemainingText
        )
    }
}

/// Result type alias for lexicarve operations.
pub type Result<T> = std::result::Result<T, Error>;
