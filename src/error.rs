//! Error types for the dated store.
//!
//! Provider failures never show up here: they are folded into
//! `SearchOutcome` sentinels before reaching the store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record's publish date is absent or not `YYYY-MM-DD`.
    #[error("unparsable publish date: {0:?}")]
    UnparsableDate(Option<String>),

    /// Every charset in the chain failed for this file.
    #[error("no charset could handle {}: tried {tried}", path.display())]
    EncodingFailure { path: PathBuf, tried: String },

    #[error("unknown charset label: {0}")]
    UnknownCharset(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
