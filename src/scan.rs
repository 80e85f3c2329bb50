//! Walks record-aligned byte ranges and aggregates them, optionally across
//! partitions scanned in parallel.

use std::ops::Range;
use std::sync::Mutex;
use std::thread;

use log::debug;

use crate::error::Error;
use crate::record::{self, ENTRY_OFFSET, EXIT_OFFSET, ID_LEN, ID_OFFSET, RECORD_LEN, TIMESTAMP_LEN};
use crate::timestamp;
use crate::totals::Totals;

/// Scans one record-aligned byte range into `totals`, one decode and one
/// upsert per record. No effect beyond the map it is given.
pub fn scan_block(block: &[u8], totals: &mut Totals, fast_path: bool) -> Result<(), Error> {
    debug_assert_eq!(block.len() % RECORD_LEN, 0);
    for rec in block.chunks_exact(RECORD_LEN) {
        let entry = &rec[ENTRY_OFFSET..ENTRY_OFFSET + TIMESTAMP_LEN];
        let exit = &rec[EXIT_OFFSET..EXIT_OFFSET + TIMESTAMP_LEN];
        let ticks = if fast_path {
            timestamp::duration_ticks(entry, exit)?
        } else {
            timestamp::duration_ticks_full(entry, exit)?
        };
        let id = record::parse_id(&rec[ID_OFFSET..ID_OFFSET + ID_LEN])?;
        totals.add(id, ticks);
    }
    Ok(())
}

/// Splits `total_records` into `workers` contiguous record ranges. Every
/// worker but the last gets the floor share; the last absorbs the remainder.
/// The ranges are disjoint and cover `[0, total_records)` exactly.
pub fn partitions(total_records: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let share = total_records / workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let end = if i == workers - 1 {
            total_records
        } else {
            start + share
        };
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Scans `bytes` across `workers` partitions and merges the results.
///
/// One scoped thread and one private [`Totals`] per partition: nothing is
/// shared mutably during the scan, and the merge starts only once the scope
/// has joined every worker. The first decode error to land wins and fails
/// the whole operation.
pub fn scan_partitioned(bytes: &[u8], workers: usize, fast_path: bool) -> Result<Totals, Error> {
    debug_assert_eq!(bytes.len() % RECORD_LEN, 0);
    let total_records = bytes.len() / RECORD_LEN;
    let ranges = partitions(total_records, workers);
    // Distinct identifiers are few relative to records; a modest pre-size
    // avoids the early rehashes without committing real memory per worker.
    let mut partials: Vec<Totals> = ranges
        .iter()
        .map(|_| Totals::with_capacity(4096))
        .collect();
    let scan_error: Mutex<Option<Error>> = Mutex::new(None);

    thread::scope(|s| {
        for (range, totals) in ranges.iter().zip(partials.iter_mut()) {
            let block = &bytes[range.start * RECORD_LEN..range.end * RECORD_LEN];
            let scan_error = &scan_error;
            s.spawn(move || {
                if let Err(e) = scan_block(block, totals, fast_path) {
                    scan_error.lock().unwrap().get_or_insert(e);
                }
            });
        }
    }); // scope ends, all workers were joined

    if let Some(e) = scan_error.into_inner().unwrap() {
        return Err(e);
    }

    debug!("merging {} partial maps", partials.len());
    let mut parts = partials.into_iter();
    let mut merged = parts.next().unwrap_or_default();
    for part in parts {
        merged.absorb(part);
    }
    Ok(merged)
}
