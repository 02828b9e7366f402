//! PIRATA header scanning and metadata extraction.
//!
//! A PIRATA file starts with file-scope `Location:` and `Units:` lines and
//! then holds one or more blocks, each introduced by its own `Time:` (or
//! `Index:`) line, a `Depth`/`Height` line and a `YYYYMMDD HHMM` column-name
//! line. The layout is discovered in a single pass: every line is classified
//! by prefix and folded into a block accumulator that is flushed whenever a
//! column-name line is consumed.

use crate::constants::*;
use crate::error::DecodeIssue;
use crate::models::{BlockHeader, FileMetadata, HeaderScan, RawDocument, SiteLocation};
use crate::numeric::{is_number, parse_depth};
use crate::table::is_flag_column;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static COORDINATES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([NS])\s+(\d+(?:\.\d+)?)\s*([EW])").expect("valid regex")
});

static PERIOD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})\s+to\s+(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})")
        .expect("valid regex")
});

static TIME_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{4})\s+(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})\s+to\s+(\d{4})\s+(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})",
    )
    .expect("valid regex")
});

static ROW_COUNT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s+times").expect("valid regex"));

/// Scan a document and return its metadata
pub fn scan(doc: &RawDocument) -> FileMetadata {
    scan_document(doc).metadata
}

/// Scan a document, returning its metadata and the header problems found
pub fn scan_document(doc: &RawDocument) -> HeaderScan {
    let mut file = FileMetadataBuilder::default();
    let mut block = BlockHeaderBuilder::default();
    let mut blocks = Vec::new();
    let mut issues = Vec::new();

    for (line_num, raw_line) in doc.lines().enumerate() {
        let line = raw_line.trim_start();

        if line.starts_with(LOCATION_PREFIX) {
            file.header_lines.push(line_num);
            file.location = parse_location(line);
        }

        if line.starts_with(UNITS_PREFIX) {
            file.header_lines.push(line_num);
            file.parse_units_line(line);
        }

        if line.starts_with(TIME_PREFIX) || line.starts_with(INDEX_PREFIX) {
            block.header_lines.push(line_num);
            if line.starts_with(TIME_PREFIX) {
                block.parse_time_line(line);
            }
        }

        if line.starts_with(DEPTH_PREFIX) || line.starts_with(HEIGHT_PREFIX) {
            block.header_lines.push(line_num);
            block.parse_depth_line(line);
        }

        if line.starts_with(COLUMN_LINE_PREFIX) {
            block.header_lines.push(line_num);
            let finished = std::mem::take(&mut block).finish(blocks.len(), line, &mut issues);
            blocks.push(finished);
        }
    }

    if !block.header_lines.is_empty() {
        let issue = DecodeIssue::MalformedHeader {
            block: blocks.len(),
            reason: "no column-name line before end of document".to_string(),
        };
        warn!("{}", issue);
        issues.push(issue);
    }

    let metadata = file.build(blocks, doc.line_count());

    debug!(
        "Scanned header: {} blocks, units={:?}, missing={:?}, {} lines",
        metadata.blocks.len(),
        metadata.units,
        metadata.missing_value_token,
        metadata.total_lines
    );

    HeaderScan { metadata, issues }
}

/// Accumulator for file-scope metadata
#[derive(Default)]
struct FileMetadataBuilder {
    header_lines: Vec<usize>,
    units: Option<String>,
    missing_value_token: Option<String>,
    extra_header_notes: Vec<String>,
    location: Option<SiteLocation>,
}

impl FileMetadataBuilder {
    fn parse_units_line(&mut self, line: &str) {
        for fragment in line.split(',') {
            if fragment.contains(UNITS_KEYWORD) {
                let units = fragment
                    .split_once(UNITS_VALUE_MARKER)
                    .or_else(|| fragment.split_once(UNITS_PREFIX))
                    .map(|(_, units)| units.trim().to_string());
                if units.is_some() {
                    self.units = units;
                }

                // Precipitation files carry the sentinel inside the units fragment
                if fragment.contains(PRECIPITATION_KEYWORD) {
                    if let Some(token) = fragment.split(' ').find(|token| is_number(token)) {
                        self.missing_value_token = Some(token.trim().to_string());
                    }
                }
            } else if fragment.contains(MISSING_KEYWORD) {
                if let Some(sentinel) = parse_missing_clause(fragment) {
                    self.missing_value_token = Some(sentinel);
                }
            } else if !fragment.trim().is_empty() {
                self.extra_header_notes.push(fragment.trim().to_string());
            }
        }
    }

    fn build(self, blocks: Vec<BlockHeader>, total_lines: usize) -> FileMetadata {
        FileMetadata {
            file_header_lines: self.header_lines,
            units: self.units,
            missing_value_token: self.missing_value_token,
            extra_header_notes: self.extra_header_notes,
            location: self.location,
            blocks,
            total_lines,
        }
    }
}

/// Accumulator for the block whose header is being read
#[derive(Default)]
struct BlockHeaderBuilder {
    header_lines: Vec<usize>,
    depths: Vec<i64>,
    saw_depth_line: bool,
    time_span: Option<(NaiveDateTime, NaiveDateTime)>,
    declared_rows: Option<usize>,
}

impl BlockHeaderBuilder {
    fn parse_time_line(&mut self, line: &str) {
        self.time_span = parse_time_span(line);
        self.declared_rows = ROW_COUNT_REGEX
            .captures(line)
            .and_then(|caps| caps[1].parse().ok());
    }

    fn parse_depth_line(&mut self, line: &str) {
        self.saw_depth_line = true;

        let Some((_, values)) = line.split_once(DEPTH_VALUES_MARKER) else {
            debug!("Depth line without '{}': {}", DEPTH_VALUES_MARKER, line);
            return;
        };

        // Labels such as QUALITY or SOURCE share the line and are skipped
        self.depths
            .extend(values.split_whitespace().filter_map(parse_depth));
    }

    fn finish(self, index: usize, line: &str, issues: &mut Vec<DecodeIssue>) -> BlockHeader {
        let column_names: Vec<String> = line.split_whitespace().map(String::from).collect();

        if !self.saw_depth_line {
            let issue = DecodeIssue::MalformedHeader {
                block: index,
                reason: "no Depth/Height line before column names".to_string(),
            };
            warn!("{}", issue);
            issues.push(issue);
        }

        let measurement_columns = column_names
            .iter()
            .skip(TIMESTAMP_COLUMN_COUNT)
            .filter(|name| !is_flag_column(name))
            .count();
        if self.saw_depth_line && self.depths.len() < measurement_columns {
            let issue = DecodeIssue::DepthCountMismatch {
                block: index,
                depths: self.depths.len(),
                columns: measurement_columns,
            };
            warn!("{}", issue);
            issues.push(issue);
        }

        let mut block = BlockHeader {
            header_lines: self.header_lines,
            depths: self.depths,
            column_names,
            suffixed: false,
            time_span: self.time_span,
            declared_rows: self.declared_rows,
        };
        apply_depth_suffixes(&mut block);
        block
    }
}

/// Suffix data columns with their depth, in positional order after the date and time columns.
///
/// Columns beyond the listed depths stay unsuffixed. The block records that
/// it has been suffixed, so a second call leaves it unchanged.
pub fn apply_depth_suffixes(block: &mut BlockHeader) {
    if block.suffixed {
        return;
    }

    let data_columns = block.column_names.iter_mut().skip(TIMESTAMP_COLUMN_COUNT);
    for (name, depth) in data_columns.zip(&block.depths) {
        name.push_str(&format!("_{}", depth));
    }
    block.suffixed = true;
}

/// Sentinel of a `-9.99 = missing` clause (also accepts `missing = -9.99`)
fn parse_missing_clause(fragment: &str) -> Option<String> {
    let (left, right) = fragment.split_once(MISSING_ASSIGNMENT)?;
    let sentinel = if right.contains(MISSING_KEYWORD) {
        left
    } else {
        right
    }
    .trim();

    (!sentinel.is_empty() && !sentinel.contains(MISSING_KEYWORD)).then(|| sentinel.to_string())
}

/// Parse the `Location:` line into coordinates and record period
fn parse_location(line: &str) -> Option<SiteLocation> {
    let Some(caps) = COORDINATES_REGEX.captures(line) else {
        debug!("Could not parse coordinates: {}", line);
        return None;
    };

    let latitude = signed_coordinate(&caps[1], &caps[2])?;
    let longitude = signed_coordinate(&caps[3], &caps[4])?;

    let period = PERIOD_REGEX.captures(line).and_then(|caps| {
        let start = parse_header_date(&caps[1])?;
        let end = parse_header_date(&caps[2])?;
        Some((start, end))
    });

    Some(SiteLocation {
        latitude,
        longitude,
        period,
    })
}

fn signed_coordinate(value: &str, hemisphere: &str) -> Option<f64> {
    let value = value.parse::<f64>().ok()?;
    match hemisphere {
        "S" | "W" => Some(-value),
        _ => Some(value),
    }
}

fn parse_header_date(text: &str) -> Option<NaiveDate> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&normalized, "%d %b %Y").ok()
}

/// Parse `HHMM DD Mon YYYY to HHMM DD Mon YYYY` from a block time line
fn parse_time_span(line: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let caps = TIME_SPAN_REGEX.captures(line)?;
    let start = parse_header_date(&caps[2])?.and_time(parse_hhmm(&caps[1])?);
    let end = parse_header_date(&caps[4])?.and_time(parse_hhmm(&caps[3])?);
    Some((start, end))
}

fn parse_hhmm(text: &str) -> Option<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(text, "%H%M").ok()
}
