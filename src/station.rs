//! Station grouping and cross-file merging.
//!
//! PIRATA files are named `<variable><station>...`, e.g. `t0n23w_10m.ascii.gz`
//! holds temperature (`t`) for the buoy at 0N 23W. Every variable file of a
//! station is decoded separately; this module joins them into one table on
//! the `datetime` key, suffixing each file's columns with its variable prefix
//! so that names stay unique.

use crate::constants::DATETIME_COLUMN;
use crate::error::{PirataError, Result};
use crate::models::StationTable;
use crate::table::empty_table;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]*?)(\d+(?:p\d+)?[ns]\d+(?:p\d+)?[ew])").expect("valid regex")
});

/// Variable prefix and station identifier of a PIRATA file name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PirataFileName {
    pub variable: String,
    pub station: String,
}

impl PirataFileName {
    pub fn parse(file_name: &str) -> Result<Self> {
        let lower = file_name.to_lowercase();
        let caps = FILE_NAME_REGEX.captures(&lower).ok_or_else(|| {
            PirataError::invalid_file_name(file_name, "no station identifier found")
        })?;

        let variable = caps[1].to_string();
        if variable.is_empty() {
            return Err(PirataError::invalid_file_name(
                file_name,
                "no variable prefix before the station identifier",
            ));
        }

        Ok(Self {
            variable,
            station: caps[2].to_string(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PirataError::invalid_file_name(path.display().to_string(), "not a file name")
            })?;
        Self::parse(name)
    }
}

/// Rename every non-key column to `<name>_<suffix>`
pub fn suffix_columns(frame: DataFrame, suffix: &str) -> LazyFrame {
    let exprs: Vec<Expr> = frame
        .get_column_names_str()
        .into_iter()
        .map(|name| {
            if name == DATETIME_COLUMN {
                col(name)
            } else {
                col(name).alias(format!("{}_{}", name, suffix))
            }
        })
        .collect();

    frame.lazy().select(exprs)
}

impl StationTable {
    /// Outer-join the decoded tables of one station's variable files.
    ///
    /// Each entry is the file name and its decoded table. The result holds
    /// every timestamp present in any file, sorted by time when `sort_by_time`.
    pub fn merge(
        station: &str,
        files: Vec<(String, DataFrame)>,
        sort_by_time: bool,
    ) -> Result<Self> {
        let mut variables = Vec::with_capacity(files.len());
        let mut merged: Option<LazyFrame> = None;

        for (file_name, frame) in files {
            let name = PirataFileName::parse(&file_name)?;
            if name.station != station {
                return Err(PirataError::StationMismatch {
                    file: file_name,
                    expected: station.to_string(),
                    found: name.station,
                });
            }
            let suffix = name.variable;

            if variables.contains(&suffix) {
                return Err(PirataError::DuplicateVariable {
                    station: station.to_string(),
                    variable: suffix,
                    file: file_name,
                });
            }

            debug!(
                "Merging {} ({} rows) into station {} as '{}'",
                file_name,
                frame.height(),
                station,
                suffix
            );

            let renamed = suffix_columns(frame, &suffix);
            variables.push(suffix);

            merged = Some(match merged {
                None => renamed,
                Some(left) => left.join(
                    renamed,
                    [col(DATETIME_COLUMN)],
                    [col(DATETIME_COLUMN)],
                    JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
                ),
            });
        }

        let frame = match merged {
            Some(lazy) if sort_by_time => lazy
                .sort([DATETIME_COLUMN], SortMultipleOptions::default())
                .collect()?,
            Some(lazy) => lazy.collect()?,
            None => empty_table()?,
        };

        Ok(Self {
            station: station.to_string(),
            variables,
            frame,
        })
    }
}
