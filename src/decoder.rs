//! Single-document decoding.
//!
//! Runs the header scan and the block table build over one decompressed
//! document. No filesystem or network access happens here.

use crate::error::Result;
use crate::header::scan_document;
use crate::models::{DecodedFile, RawDocument};
use crate::table::build_file;
use tracing::debug;

/// Decode the bytes of one decompressed PIRATA file
pub fn decode(bytes: Vec<u8>) -> Result<DecodedFile> {
    let doc = RawDocument::from_bytes(bytes)?;
    decode_document(&doc)
}

/// Decode an already materialized document.
///
/// Header issues come first in the returned list, followed by the row and
/// block issues in file order.
pub fn decode_document(doc: &RawDocument) -> Result<DecodedFile> {
    let scan = scan_document(doc);
    let file_table = build_file(doc, &scan.metadata)?;

    let mut issues = scan.issues;
    issues.extend(file_table.issues);

    debug!(
        "Decoded {} of {} blocks: {} rows, {} columns, {} issues",
        file_table.blocks_decoded,
        scan.metadata.block_count(),
        file_table.frame.height(),
        file_table.frame.width(),
        issues.len()
    );

    Ok(DecodedFile {
        metadata: scan.metadata,
        table: file_table.frame,
        issues,
    })
}
