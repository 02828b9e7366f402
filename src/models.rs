//! Core data structures for PIRATA decoding.
//!
//! Defines the decompressed document, the metadata recovered by the header
//! scanner, and the tables produced for blocks, files and stations.

use crate::error::{DecodeIssue, PirataError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Decompressed text of one station/variable file, addressed by zero-based line number
#[derive(Debug, Clone)]
pub struct RawDocument {
    text: String,
    line_spans: Vec<Range<usize>>,
}

impl RawDocument {
    /// Accept raw bytes, rejecting empty or non-text input
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let text = String::from_utf8(bytes)
            .map_err(|e| PirataError::unreadable(format!("not valid UTF-8 text: {}", e)))?;
        Self::from_text(text)
    }

    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(PirataError::unreadable("document is empty"));
        }
        if text.contains('\0') {
            return Err(PirataError::unreadable("document contains binary data"));
        }

        let mut line_spans = Vec::new();
        let mut start = 0;
        for line in text.split_inclusive('\n') {
            let end = start + line.len();
            let content = line.trim_end_matches(['\n', '\r']);
            line_spans.push(start..start + content.len());
            start = end;
        }

        Ok(Self { text, line_spans })
    }

    /// Line at a zero-based position, without its terminator
    pub fn line(&self, index: usize) -> Option<&str> {
        self.line_spans.get(index).map(|span| &self.text[span.clone()])
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.line_spans.iter().map(|span| &self.text[span.clone()])
    }

    pub fn line_count(&self) -> usize {
        self.line_spans.len()
    }
}

/// Site position and record period from the `Location:` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub period: Option<(NaiveDate, NaiveDate)>,
}

/// Header of one data block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Line numbers of the time/index, depth/height and column-name lines
    pub header_lines: Vec<usize>,
    /// Sampling depths (or heights) in meters, left to right
    pub depths: Vec<i64>,
    /// Raw column names, data columns suffixed with their depth
    pub column_names: Vec<String>,
    /// Set once the depth suffixes have been applied to `column_names`
    #[serde(default)]
    pub suffixed: bool,
    pub time_span: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Row count announced by the time line
    pub declared_rows: Option<usize>,
}

impl BlockHeader {
    pub fn first_header_line(&self) -> Option<usize> {
        self.header_lines.iter().min().copied()
    }

    pub fn last_header_line(&self) -> Option<usize> {
        self.header_lines.iter().max().copied()
    }
}

/// Metadata of one PIRATA file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_header_lines: Vec<usize>,
    pub units: Option<String>,
    pub missing_value_token: Option<String>,
    pub extra_header_notes: Vec<String>,
    pub location: Option<SiteLocation>,
    pub blocks: Vec<BlockHeader>,
    pub total_lines: usize,
}

impl FileMetadata {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether a data token is the declared missing-value sentinel
    pub fn is_missing(&self, token: &str) -> bool {
        self.missing_value_token.as_deref() == Some(token)
    }
}

/// Result of scanning a document's headers
#[derive(Debug, Clone)]
pub struct HeaderScan {
    pub metadata: FileMetadata,
    pub issues: Vec<DecodeIssue>,
}

/// Rows of one block as a time-indexed table
#[derive(Debug, Clone)]
pub struct ParsedBlockTable {
    pub block_index: usize,
    pub frame: DataFrame,
    pub issues: Vec<DecodeIssue>,
}

/// Union of every block of one file
#[derive(Debug, Clone)]
pub struct FileTable {
    pub frame: DataFrame,
    pub blocks_decoded: usize,
    pub issues: Vec<DecodeIssue>,
}

/// Everything recovered from one document
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub metadata: FileMetadata,
    pub table: DataFrame,
    pub issues: Vec<DecodeIssue>,
}

/// Merged table of every variable file of one station
#[derive(Debug, Clone)]
pub struct StationTable {
    pub station: String,
    /// Variable prefixes merged into the table, in merge order
    pub variables: Vec<String>,
    pub frame: DataFrame,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub stations: usize,
    pub total_rows: usize,
    pub issues: usize,
    pub failed_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
