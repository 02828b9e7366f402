//! Error handling for PIRATA decoding operations.
//!
//! Two layers: [`PirataError`] for conditions that stop a document (or a
//! batch) from being decoded at all, and [`DecodeIssue`] for the recoverable
//! problems found inside a document, which are collected and returned next
//! to the decoded table.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PirataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Unreadable document: {reason}")]
    UnreadableDocument { reason: String },

    #[error("Invalid PIRATA file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("File '{file}' belongs to station {found}, expected {expected}")]
    StationMismatch {
        file: String,
        expected: String,
        found: String,
    },

    #[error("Station {station} already has a '{variable}' table (from {file})")]
    DuplicateVariable {
        station: String,
        variable: String,
        file: String,
    },

    #[error("Block {index} does not exist (document has {blocks} blocks)")]
    BlockOutOfRange { index: usize, blocks: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl PirataError {
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            reason: reason.into(),
        }
    }

    pub fn invalid_file_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFileName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PirataError>;

/// How much a [`DecodeIssue`] degrades the decoded output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Recoverable problem found while decoding one document.
///
/// Line numbers are zero-based positions in the decompressed document.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum DecodeIssue {
    #[error("block {block}: malformed header ({reason})")]
    MalformedHeader { block: usize, reason: String },

    #[error("block {block}: {depths} depth values for {columns} data columns")]
    DepthCountMismatch {
        block: usize,
        depths: usize,
        columns: usize,
    },

    #[error("line {line}: expected {expected} tokens, found {found}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid timestamp '{token}'")]
    InvalidTimestamp { line: usize, token: String },

    #[error("line {line}, column {column}: non-numeric value '{token}'")]
    NonNumericValue {
        line: usize,
        column: String,
        token: String,
    },

    #[error("block {block}: repeated column '{name}' at position {position} dropped")]
    DuplicateColumn {
        block: usize,
        name: String,
        position: usize,
    },

    #[error("block {block} skipped: {reason}")]
    BlockSkipped { block: usize, reason: String },
}

impl DecodeIssue {
    pub fn severity(&self) -> Severity {
        match self {
            DecodeIssue::DepthCountMismatch { .. } | DecodeIssue::DuplicateColumn { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}
