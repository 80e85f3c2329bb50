//! Byte layout of one parking record.
//!
//! Every record is exactly [`RECORD_LEN`] bytes:
//!
//! ```text
//! 2015-01-01T16:44:31 2015-01-01T16:46:01 00043064\r\n
//! ^entry (19)        ^sp ^exit (19)      ^sp ^id (8) ^crlf
//! ```
//!
//! A well-formed file is an exact multiple of [`RECORD_LEN`] bytes long;
//! anything else is corrupt and rejected, never silently trimmed.

use crate::error::Error;

/// Width of one `yyyy-MM-ddTHH:mm:ss` timestamp field.
pub const TIMESTAMP_LEN: usize = 19;
/// Width of the zero-padded decimal identifier field.
pub const ID_LEN: usize = 8;

/// Byte offset of the entry timestamp within a record.
pub const ENTRY_OFFSET: usize = 0;
/// Byte offset of the exit timestamp within a record.
pub const EXIT_OFFSET: usize = TIMESTAMP_LEN + 1;
/// Byte offset of the identifier within a record.
pub const ID_OFFSET: usize = EXIT_OFFSET + TIMESTAMP_LEN + 1;

/// Total record width: two timestamps, two separating spaces, the
/// identifier, and the trailing CRLF.
pub const RECORD_LEN: usize = ID_OFFSET + ID_LEN + 2;

/// Locates the first non-digit byte for the error report. Only reached once
/// the hot path has already established the field is bad.
#[cold]
fn non_digit(field: &[u8]) -> Error {
    let byte = field
        .iter()
        .copied()
        .find(|b| !b.is_ascii_digit())
        .unwrap_or(0);
    Error::Digit { byte }
}

/// Decodes the 8-digit identifier field into its numeric value.
///
/// The expansion is unrolled: eight `byte - b'0'` subtractions and a fixed
/// polynomial, no allocation, no generic integer parser. A non-digit byte
/// anywhere in the field fails the record.
#[inline]
pub fn parse_id(field: &[u8]) -> Result<u64, Error> {
    debug_assert_eq!(field.len(), ID_LEN);
    let d0 = field[0].wrapping_sub(b'0') as u64;
    let d1 = field[1].wrapping_sub(b'0') as u64;
    let d2 = field[2].wrapping_sub(b'0') as u64;
    let d3 = field[3].wrapping_sub(b'0') as u64;
    let d4 = field[4].wrapping_sub(b'0') as u64;
    let d5 = field[5].wrapping_sub(b'0') as u64;
    let d6 = field[6].wrapping_sub(b'0') as u64;
    let d7 = field[7].wrapping_sub(b'0') as u64;
    if (d0 > 9) | (d1 > 9) | (d2 > 9) | (d3 > 9) | (d4 > 9) | (d5 > 9) | (d6 > 9) | (d7 > 9) {
        return Err(non_digit(field));
    }
    Ok(d0 * 10_000_000
        + d1 * 1_000_000
        + d2 * 100_000
        + d3 * 10_000
        + d4 * 1_000
        + d5 * 100
        + d6 * 10
        + d7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_adds_up() {
        assert_eq!(RECORD_LEN, 50);
        assert_eq!(EXIT_OFFSET, 20);
        assert_eq!(ID_OFFSET, 40);
    }

    #[test]
    fn parse_id_bounds() {
        assert_eq!(parse_id(b"00000000").unwrap(), 0);
        assert_eq!(parse_id(b"99999999").unwrap(), 99_999_999);
        assert_eq!(parse_id(b"00043064").unwrap(), 43_064);
        assert_eq!(parse_id(b"00000001").unwrap(), 1);
        // Digit pairs whose bit patterns overlap must not trip the validity
        // checks.
        assert_eq!(parse_id(b"96521873").unwrap(), 96_521_873);
    }

    #[test]
    fn parse_id_rejects_non_digits() {
        for bad in [b"0000000x" as &[u8], b" 0000000", b"0000-000"] {
            match parse_id(bad) {
                Err(Error::Digit { .. }) => {}
                other => panic!("expected digit error for {bad:?}, got {other:?}"),
            }
        }
    }
}
