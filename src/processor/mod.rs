//! Batch decoding of local PIRATA files.
//!
//! Decodes many files concurrently on the blocking pool, groups the results
//! by station and merges each group into a [`StationTable`].

pub mod source;

#[cfg(test)]
pub mod tests;

use self::source::read_document;

use crate::config::PirataConfig;
use crate::decoder::decode_document;
use crate::error::{DecodeIssue, PirataError, Result};
use crate::models::{DecodedFile, FileMetadata, ProcessingStats, StationTable};
use crate::station::PirataFileName;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, info};

/// Summary of one decoded file
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: PathBuf,
    pub name: PirataFileName,
    pub metadata: FileMetadata,
    pub rows: usize,
    pub issues: usize,
}

/// A decode issue and the file it was found in
#[derive(Debug, Clone)]
pub struct FileIssue {
    pub path: PathBuf,
    pub issue: DecodeIssue,
}

/// Everything produced by one batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// Merged tables, ordered by station identifier
    pub stations: Vec<StationTable>,
    /// Decoded files, ordered by path
    pub files: Vec<FileSummary>,
    pub issues: Vec<FileIssue>,
    pub stats: ProcessingStats,
}

/// Concurrent decoder for a set of local files
#[derive(Debug)]
pub struct BatchProcessor {
    config: PirataConfig,
    show_progress: bool,
}

impl BatchProcessor {
    pub fn new(config: PirataConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: false,
        })
    }

    /// Draw a progress bar while decoding
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &PirataConfig {
        &self.config
    }

    /// Decode every file and merge the results per station
    pub async fn process(&self, paths: &[PathBuf]) -> Result<BatchOutcome> {
        let start_time = Instant::now();
        info!("Decoding {} files", paths.len());

        let pb = self.progress_bar(paths.len());
        let concurrent_limit = self.config.max_concurrent_files.min(paths.len()).max(1);
        debug!("Using {} concurrent decoders", concurrent_limit);

        let mut results: Vec<(PathBuf, Result<(PirataFileName, DecodedFile)>)> =
            stream::iter(paths)
                .map(|path| {
                    let pb = pb.clone();
                    async move {
                        if let Some(file_name) = path.file_name() {
                            pb.set_message(format!("Decoding: {}", file_name.to_string_lossy()));
                        }
                        let result = decode_path(path).await;
                        pb.inc(1);
                        (path.clone(), result)
                    }
                })
                .buffer_unordered(concurrent_limit)
                .collect()
                .await;

        pb.finish_with_message("All files decoded");

        // Completion order is arbitrary
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut stats = ProcessingStats::default();
        let mut files = Vec::new();
        let mut issues = Vec::new();
        let mut groups: BTreeMap<String, Vec<(String, DataFrame)>> = BTreeMap::new();
        let mut claimed = BTreeSet::new();

        for (path, result) in results {
            // A station holds one table per variable; later files of the same variable are rejected
            let result = result.and_then(|(name, decoded)| {
                if claimed.insert((name.station.clone(), name.variable.clone())) {
                    Ok((name, decoded))
                } else {
                    Err(PirataError::DuplicateVariable {
                        station: name.station,
                        variable: name.variable,
                        file: file_name_of(&path),
                    })
                }
            });

            match result {
                Ok((name, decoded)) => {
                    stats.files_processed += 1;
                    stats.issues += decoded.issues.len();

                    files.push(FileSummary {
                        path: path.clone(),
                        name: name.clone(),
                        metadata: decoded.metadata,
                        rows: decoded.table.height(),
                        issues: decoded.issues.len(),
                    });
                    issues.extend(decoded.issues.into_iter().map(|issue| FileIssue {
                        path: path.clone(),
                        issue,
                    }));

                    groups
                        .entry(name.station)
                        .or_default()
                        .push((file_name_of(&path), decoded.table));
                }
                Err(e) if self.config.skip_failed_files => {
                    error!("Failed to decode {}: {}", path.display(), e);
                    stats.files_failed += 1;
                    stats.failed_paths.push(path);
                }
                Err(e @ PirataError::DuplicateVariable { .. }) => return Err(e),
                Err(e) => {
                    return Err(PirataError::ProcessingFailed {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut stations = Vec::with_capacity(groups.len());
        for (station, tables) in groups {
            let table = StationTable::merge(&station, tables, self.config.sort_by_time)?;
            debug!(
                "Station {}: {} rows, {} columns from {:?}",
                station,
                table.frame.height(),
                table.frame.width(),
                table.variables
            );
            stats.total_rows += table.frame.height();
            stations.push(table);
        }

        stats.stations = stations.len();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        info!(
            "Decoded {} files ({} failed) into {} stations in {}ms",
            stats.files_processed, stats.files_failed, stats.stations, stats.processing_time_ms
        );

        Ok(BatchOutcome {
            stations,
            files,
            issues,
            stats,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

/// Read and decode one file on the blocking pool
async fn decode_path(path: &Path) -> Result<(PirataFileName, DecodedFile)> {
    let name = PirataFileName::from_path(path)?;

    let decoded = task::spawn_blocking({
        let path = path.to_owned();
        move || decode_document(&read_document(&path)?)
    })
    .await
    .map_err(|e| PirataError::ProcessingFailed {
        path: path.to_path_buf(),
        reason: format!("Decode task failed: {}", e),
    })??;

    Ok((name, decoded))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
