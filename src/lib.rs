//! PIRATA Processor Library
//!
//! Decodes the high-resolution ASCII files published for the PIRATA buoy
//! array (tropical Atlantic moorings) into time-indexed polars tables.
//!
//! A file holds one variable for one buoy and is split into blocks, each
//! with its own time range, depth set and column layout. Decoding happens
//! in two passes:
//! - [`header`] scans the whole document once and records file metadata
//!   and the header line numbers of every block
//! - [`table`] slices the rows of each block, drops the quality, source and
//!   instrument-id flag columns and stacks the blocks into one table
//!
//! [`station`] then joins the tables of every variable file of one buoy on
//! the time key, and [`processor`] runs the whole pipeline concurrently over
//! local files.

pub mod cli;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod header;
pub mod models;
pub mod numeric;
pub mod processor;
pub mod station;
pub mod table;

pub use config::PirataConfig;
pub use decoder::{decode, decode_document};
pub use error::{DecodeIssue, PirataError, Result, Severity};
pub use header::{scan, scan_document};
pub use models::{
    BlockHeader, DecodedFile, FileMetadata, ParsedBlockTable, RawDocument, SiteLocation,
    StationTable,
};
pub use processor::{BatchOutcome, BatchProcessor};
pub use station::PirataFileName;
pub use table::{build, build_file};
