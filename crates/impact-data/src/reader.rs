//! CSV loading for the storm events export.
//!
//! Reads `StormData.csv` (or a gzip-compressed `.csv.gz`) into
//! [`RawRecord`] rows for the filter stage. Columns not mapped by
//! [`RawRecord`] are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use impact_core::models::RawRecord;
use impact_core::{Result, StormError};
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every row of the export at `path`.
///
/// Files whose name ends in `.gz` are gzip-decoded on the fly. A file that
/// parses but holds no data rows is reported as
/// [`StormError::EmptyDataset`].
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).map_err(|source| StormError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let records = if is_gzip(path) {
        read_raw_records(GzDecoder::new(reader))?
    } else {
        read_raw_records(reader)?
    };

    if records.is_empty() {
        return Err(StormError::EmptyDataset(path.to_path_buf()));
    }

    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Parse CSV rows with a header line from any reader.
///
/// Stops at the first malformed row; the CSV error names its position.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.deserialize::<RawRecord>() {
        records.push(row?);
    }
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
