//! Record sources: sequential byte access to the input file, in
//! record-aligned strides.
//!
//! Two interchangeable strategies produce identical aggregation results.
//! [`MappedFile`] maps the whole file and lets the OS page it in; record
//! addresses are pure arithmetic and disjoint partitions can be read in
//! parallel. [`ChunkedSource`] reads sequentially into one reusable buffer
//! and carries the partial record at each chunk boundary over to the next
//! read. Both flag a file whose length is not a whole number of records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use crate::error::Error;
use crate::record::RECORD_LEN;

/// Default read size for the buffered strategy.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Whole-file memory mapping.
///
/// The mapping is owned here for the duration of the scan; workers only ever
/// borrow `bytes()` and the mapping is released when this value drops, after
/// every reader is done.
#[derive(Debug)]
pub struct MappedFile {
    // Empty files stay unmapped: zero-length mappings are rejected by the OS.
    mmap: Option<Mmap>,
}

impl MappedFile {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % RECORD_LEN as u64 != 0 {
            return Err(Error::Truncated { len });
        }
        if len == 0 {
            return Ok(Self { mmap: None });
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap: Some(mmap) })
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.bytes().len() / RECORD_LEN
    }
}

/// Sequential chunked reader with partial-record carry-over.
///
/// Each call to [`next_block`](Self::next_block) hands out the longest
/// record-aligned prefix of the freshly filled buffer. The trailing partial
/// record, if the chunk boundary fell mid-record, is moved to the front of
/// the buffer before the next read completes it. A partial record still
/// pending at end of stream means the file was truncated.
pub struct ChunkedSource<R> {
    inner: R,
    buf: Vec<u8>,
    // Leftover bytes from the previous block live at buf[carry_at..carry_at + carry_len].
    carry_at: usize,
    carry_len: usize,
    bytes_read: u64,
    eof: bool,
}

impl ChunkedSource<File> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> ChunkedSource<R> {
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// A chunk size that is not a record multiple is fine; it just means
    /// every block ends with a carry. Sizes below one record are bumped up.
    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0; chunk_size.max(RECORD_LEN)],
            carry_at: 0,
            carry_len: 0,
            bytes_read: 0,
            eof: false,
        }
    }

    /// Next record-aligned block, or `None` once the stream is drained.
    pub fn next_block(&mut self) -> Result<Option<&[u8]>, Error> {
        self.buf.copy_within(self.carry_at..self.carry_at + self.carry_len, 0);
        let mut filled = self.carry_len;
        self.carry_at = 0;
        self.carry_len = 0;

        while !self.eof && filled < self.buf.len() {
            let n = self.inner.read(&mut self.buf[filled..])?;
            if n == 0 {
                self.eof = true;
            } else {
                filled += n;
                self.bytes_read += n as u64;
            }
        }

        let complete = filled - filled % RECORD_LEN;
        if complete == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                // End of stream with a partial record still in hand.
                Err(Error::Truncated {
                    len: self.bytes_read,
                })
            };
        }

        self.carry_at = complete;
        self.carry_len = filled - complete;
        Ok(Some(&self.buf[..complete]))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::io::Write;

    use super::*;

    fn records(n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n * RECORD_LEN);
        for i in 0..n {
            write!(
                out,
                "2015-01-01T08:00:00 2015-01-01T09:00:00 {i:08}\r\n"
            )
            .unwrap();
        }
        out
    }

    fn drain(source: &mut ChunkedSource<Cursor<Vec<u8>>>) -> Result<Vec<u8>, Error> {
        let mut all = Vec::new();
        while let Some(block) = source.next_block()? {
            assert_eq!(block.len() % RECORD_LEN, 0, "blocks must be record-aligned");
            all.extend_from_slice(block);
        }
        Ok(all)
    }

    #[test]
    fn chunked_reassembles_input_across_boundaries() {
        let input = records(100);
        // 64 is not a multiple of 50, so every block ends mid-record.
        for chunk_size in [64, 128, 50, 1, 4096] {
            let mut source = ChunkedSource::with_chunk_size(Cursor::new(input.clone()), chunk_size);
            assert_eq!(drain(&mut source).unwrap(), input, "chunk_size={chunk_size}");
        }
    }

    #[test]
    fn chunked_empty_input_is_drained_immediately() {
        let mut source = ChunkedSource::new(Cursor::new(Vec::new()));
        assert!(source.next_block().unwrap().is_none());
        assert!(source.next_block().unwrap().is_none());
    }

    #[test]
    fn chunked_flags_partial_tail() {
        let mut input = records(3);
        input.push(b'2');
        let mut source = ChunkedSource::with_chunk_size(Cursor::new(input), 64);
        let err = drain(&mut source).unwrap_err();
        assert!(matches!(err, Error::Truncated { len: 151 }));
    }

    #[test]
    fn mapped_rejects_off_size_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = records(2);
        bytes.push(b'x');
        file.write_all(&bytes).unwrap();
        let err = MappedFile::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::Truncated { len: 101 }));
    }

    #[test]
    fn mapped_reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bytes = records(5);
        file.write_all(&bytes).unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.bytes(), &bytes[..]);
        assert_eq!(mapped.record_count(), 5);
    }

    #[test]
    fn mapped_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert!(mapped.bytes().is_empty());
        assert_eq!(mapped.record_count(), 0);
    }
}
