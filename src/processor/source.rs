//! Local source reading for PIRATA files
//!
//! Finds `.ascii` / `.ascii.gz` files under the given paths and reads them
//! into memory, gunzipping when the content starts with the gzip magic bytes.

use crate::constants::{ASCII_EXTENSIONS, GZIP_MAGIC};
use crate::error::{PirataError, Result};
use crate::models::RawDocument;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Whether a path names a PIRATA ASCII file
pub fn is_pirata_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            let name = name.to_lowercase();
            ASCII_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
        .unwrap_or(false)
}

/// Expand directories into the PIRATA files they contain.
///
/// Files given explicitly are kept whatever their extension. The result is
/// sorted and free of duplicates.
pub fn discover_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            debug!("Searching for PIRATA files in: {}", path.display());
            for entry in WalkDir::new(path) {
                let entry = entry.map_err(|e| PirataError::ProcessingFailed {
                    path: path.clone(),
                    reason: format!("Failed to walk directory: {}", e),
                })?;
                if entry.file_type().is_file() && is_pirata_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    debug!("Found {} PIRATA files", files.len());

    Ok(files)
}

/// Gunzip `bytes` when they carry the gzip magic, otherwise return them unchanged
pub fn decompress(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }

    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut text = Vec::new();
    decoder
        .read_to_end(&mut text)
        .map_err(|e| PirataError::unreadable(format!("corrupt gzip stream: {}", e)))?;

    Ok(text)
}

/// Read a local file into a document
pub fn read_document(path: &Path) -> Result<RawDocument> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    RawDocument::from_bytes(decompress(bytes)?)
}
