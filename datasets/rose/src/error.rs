//! Error types for the RoSE loader
//!
//! Every variant is fatal: nothing is retried or downgraded to a warning.

use rose_common::JsonlError;
use thiserror::Error;

use crate::corpus::JoinKey;

/// Errors that can occur while declaring or generating the dataset
#[derive(Error, Debug)]
pub enum RoseError {
    /// The configuration name is not one of the declared variants
    #[error("unknown configuration '{name}' (expected one of: {known})")]
    UnknownConfig {
        /// The rejected name
        name: String,
        /// Comma-separated list of valid names
        known: String,
    },

    /// A dataset family or split identifier was not recognized
    #[error("unknown {kind} '{value}'")]
    UnknownIdentifier {
        /// What was being parsed ("dataset" or "split")
        kind: &'static str,
        value: String,
    },

    /// Reading or decoding the annotation file failed
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    /// An annotation record lacks the field used as its join key
    #[error("line {line}: missing or invalid join field '{field}'")]
    MissingField {
        /// Zero-based line index
        line: usize,
        field: &'static str,
    },

    /// An annotation record's join key has no corpus entry
    #[error("line {line}: no corpus entry for key {key}")]
    MissingKey {
        /// Zero-based line index
        line: usize,
        key: JoinKey,
    },

    /// The joined corpus record lacks its source or reference field
    #[error("line {line}: corpus entry for {key} has no field '{field}'")]
    MissingCorpusField {
        /// Zero-based line index
        line: usize,
        key: JoinKey,
        field: &'static str,
    },

    /// The external corpus could not be loaded or indexed
    #[error("corpus error: {0}")]
    Corpus(String),

    /// A record does not match the declared schema
    #[error("schema mismatch at '{path}': expected {expected}")]
    Schema {
        /// Dotted path to the offending field
        path: String,
        expected: String,
    },
}

/// Result type alias for RoSE operations
pub type RoseResult<T> = Result<T, RoseError>;
