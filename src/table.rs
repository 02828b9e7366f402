//! Block table building for PIRATA files.
//!
//! Turns the rows of each scanned block into a time-indexed polars table.
//! Quality (`Q`, `QQ`, ...), source (`S`, `SS`, ...) and instrument-id
//! (`ID`, `IDID`, ...) flag columns are pruned before parsing, the date and
//! time tokens are combined into one `datetime` key, and the blocks of a
//! file are stacked into a single table.

use crate::constants::*;
use crate::error::{DecodeIssue, PirataError, Result};
use crate::models::{FileMetadata, FileTable, ParsedBlockTable, RawDocument};
use crate::numeric::parse_number;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::HashSet;
use std::ops::Range;
use tracing::{debug, warn};

static FLAG_COLUMNS: Lazy<HashSet<String>> = Lazy::new(|| {
    FLAG_COLUMN_BASES
        .iter()
        .flat_map(|base| (1..=FLAG_REPEAT_LIMIT).map(move |count| base.repeat(count)))
        .collect()
});

/// Whether a column name is a quality, source or instrument-id flag column (exact match)
pub fn is_flag_column(name: &str) -> bool {
    FLAG_COLUMNS.contains(name)
}

/// Measurement columns of a block and their positions in the raw column list
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelection {
    pub raw_count: usize,
    pub retained: Vec<(usize, String)>,
    /// Later occurrences of a retained name, left out of the table
    pub repeated: Vec<(usize, String)>,
}

impl ColumnSelection {
    /// Keep every column after the date and time columns that is not a flag column.
    ///
    /// Only the first column of a given name is retained.
    pub fn from_names(column_names: &[String]) -> Self {
        let mut seen = HashSet::new();
        let mut retained = Vec::new();
        let mut repeated = Vec::new();

        for (index, name) in column_names.iter().enumerate().skip(TIMESTAMP_COLUMN_COUNT) {
            if is_flag_column(name) {
                continue;
            }
            if seen.insert(name.as_str()) {
                retained.push((index, name.clone()));
            } else {
                repeated.push((index, name.clone()));
            }
        }

        Self {
            raw_count: column_names.len(),
            retained,
            repeated,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.retained.iter().map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Data lines of a block: after its last header line, up to the next block's first header line
pub fn row_range(meta: &FileMetadata, block_index: usize) -> Result<Range<usize>> {
    let block = meta
        .blocks
        .get(block_index)
        .ok_or(PirataError::BlockOutOfRange {
            index: block_index,
            blocks: meta.blocks.len(),
        })?;

    let start = block.last_header_line().map_or(0, |line| line + 1);
    let end = meta
        .blocks
        .get(block_index + 1)
        .and_then(|next| next.first_header_line())
        .unwrap_or(meta.total_lines);

    Ok(start..end.max(start))
}

/// Decode the rows of one block into a table keyed by `datetime`
pub fn build(doc: &RawDocument, meta: &FileMetadata, block_index: usize) -> Result<ParsedBlockTable> {
    let rows = row_range(meta, block_index)?;
    let block = &meta.blocks[block_index];
    let selection = ColumnSelection::from_names(&block.column_names);

    let mut issues: Vec<DecodeIssue> = selection
        .repeated
        .iter()
        .map(|(position, name)| DecodeIssue::DuplicateColumn {
            block: block_index,
            name: name.clone(),
            position: *position,
        })
        .collect();
    let mut timestamps = Vec::with_capacity(rows.len());
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(rows.len()); selection.len()];

    for line_num in rows.clone() {
        let Some(line) = doc.line(line_num) else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        if tokens.len() != selection.raw_count {
            issues.push(DecodeIssue::ColumnCountMismatch {
                line: line_num,
                expected: selection.raw_count,
                found: tokens.len(),
            });
            continue;
        }

        let stamp = format!("{} {}", tokens[0], tokens[1]);
        let Ok(datetime) = NaiveDateTime::parse_from_str(&stamp, ROW_DATETIME_FORMAT) else {
            issues.push(DecodeIssue::InvalidTimestamp {
                line: line_num,
                token: stamp,
            });
            continue;
        };
        timestamps.push(datetime.and_utc().timestamp_millis());

        for (column, (index, name)) in values.iter_mut().zip(&selection.retained) {
            let token = tokens[*index];
            let value = if meta.is_missing(token) {
                None
            } else {
                let parsed = parse_number(token);
                if parsed.is_none() {
                    issues.push(DecodeIssue::NonNumericValue {
                        line: line_num,
                        column: name.clone(),
                        token: token.to_string(),
                    });
                }
                parsed
            };
            column.push(value);
        }
    }

    for issue in &issues {
        warn!("block {}: {}", block_index, issue);
    }

    if let Some(declared) = block.declared_rows {
        if declared != timestamps.len() {
            debug!(
                "Block {} declares {} rows, decoded {}",
                block_index,
                declared,
                timestamps.len()
            );
        }
    }

    let mut columns = Vec::with_capacity(selection.len() + 1);
    columns.push(datetime_column(timestamps)?);
    for ((_, name), column) in selection.retained.iter().zip(values) {
        columns.push(Column::new(name.as_str().into(), column));
    }
    let frame = DataFrame::new(columns)?;

    debug!(
        "Built block {}: {} rows x {} columns (lines {}..{})",
        block_index,
        frame.height(),
        selection.len(),
        rows.start,
        rows.end
    );

    Ok(ParsedBlockTable {
        block_index,
        frame,
        issues,
    })
}

/// Decode every block of a file and stack them into one table.
///
/// Blocks are concatenated in file order; a column missing from a block is
/// null in that block's rows. Duplicate timestamps across blocks are kept.
pub fn build_file(doc: &RawDocument, meta: &FileMetadata) -> Result<FileTable> {
    let mut frames = Vec::with_capacity(meta.blocks.len());
    let mut issues = Vec::new();

    for block_index in 0..meta.blocks.len() {
        match build(doc, meta, block_index) {
            Ok(parsed) => {
                issues.extend(parsed.issues);
                frames.push(parsed.frame.lazy());
            }
            Err(e) => {
                let issue = DecodeIssue::BlockSkipped {
                    block: block_index,
                    reason: e.to_string(),
                };
                warn!("{}", issue);
                issues.push(issue);
            }
        }
    }

    let blocks_decoded = frames.len();
    let frame = match frames.len() {
        0 => empty_table()?,
        1 => frames.remove(0).collect()?,
        _ => concat_lf_diagonal(frames, UnionArgs::default())?.collect()?,
    };

    Ok(FileTable {
        frame,
        blocks_decoded,
        issues,
    })
}

/// Table with only the time key and no rows
pub fn empty_table() -> Result<DataFrame> {
    Ok(DataFrame::new(vec![datetime_column(Vec::new())?])?)
}

fn datetime_column(timestamps_ms: Vec<i64>) -> Result<Column> {
    let series = Series::new(DATETIME_COLUMN.into(), timestamps_ms)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into_column())
}
