//! Totals per-vehicle parking time from huge fixed-width record files.
//!
//! The input is a flat file of 50-byte ASCII records, each holding an entry
//! timestamp, an exit timestamp, and an 8-digit vehicle identifier:
//!
//! ```text
//! 2015-01-01T16:44:31 2015-01-01T16:46:01 00043064\r\n
//! ```
//!
//! [`analyze_file`] scans the whole file and returns, for every distinct
//! identifier, the total parked time in 100-nanosecond ticks. Inputs run to
//! gigabytes, so the engine decodes fields in place from the raw bytes,
//! allocates nothing per record, and splits the mapped file into contiguous
//! record-aligned partitions scanned by independent workers whose private
//! maps are merged at the end.

mod error;
mod record;
mod scan;
mod source;
mod timestamp;
mod totals;

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use log::info;

pub use error::Error;
pub use record::{parse_id, ID_LEN, ID_OFFSET, RECORD_LEN, TIMESTAMP_LEN};
pub use scan::{partitions, scan_block, scan_partitioned};
pub use source::{ChunkedSource, MappedFile, DEFAULT_CHUNK_SIZE};
pub use timestamp::{
    absolute_ticks, duration_ticks, duration_ticks_full, TICKS_PER_DAY, TICKS_PER_SECOND,
};
pub use totals::Totals;

/// How the input file is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Sequential chunked reads through a reusable buffer; single scanner.
    Buffered,
    /// Whole-file memory mapping, partitioned across workers.
    Mapped,
}

/// Engine configuration. [`Config::default`] maps the file and uses every
/// available processor.
#[derive(Clone, Debug)]
pub struct Config {
    pub strategy: Strategy,
    /// Worker count for the mapped strategy; clamped to at least one.
    pub workers: usize,
    /// Read size for the buffered strategy, in bytes.
    pub chunk_size: usize,
    /// Skip calendar arithmetic when entry and exit share a date.
    pub same_day_fast_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::Mapped,
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            same_day_fast_path: true,
        }
    }
}

/// Scans `path` and returns the per-identifier totals.
///
/// Resource errors (open, metadata, mapping) surface before any scanning
/// starts; format and calendar errors abort the whole scan. A file whose
/// length is not a whole number of records is rejected, never truncated.
pub fn analyze_file(path: &Path, config: &Config) -> Result<Totals, Error> {
    match config.strategy {
        Strategy::Mapped => {
            let mapped = MappedFile::open(path)?;
            info!(
                "scanning {} records with {} workers (mapped)",
                mapped.record_count(),
                config.workers.max(1)
            );
            analyze_bytes(mapped.bytes(), config.workers, config.same_day_fast_path)
        }
        Strategy::Buffered => {
            let mut source =
                ChunkedSource::with_chunk_size(File::open(path)?, config.chunk_size);
            info!(
                "scanning {} in {} byte chunks (buffered)",
                path.display(),
                config.chunk_size
            );
            let mut totals = Totals::new();
            while let Some(block) = source.next_block()? {
                scan::scan_block(block, &mut totals, config.same_day_fast_path)?;
            }
            Ok(totals)
        }
    }
}

/// Scans an in-memory byte range. This is the seam the mapped strategy uses
/// internally and the natural entry point for callers that already hold the
/// bytes.
pub fn analyze_bytes(bytes: &[u8], workers: usize, fast_path: bool) -> Result<Totals, Error> {
    if bytes.len() % RECORD_LEN != 0 {
        return Err(Error::Truncated {
            len: bytes.len() as u64,
        });
    }
    scan::scan_partitioned(bytes, workers, fast_path)
}
