//! Decodes `yyyy-MM-ddTHH:mm:ss` timestamp fields straight from record bytes.
//!
//! Timestamps resolve to 100-nanosecond ticks on the proleptic Gregorian
//! calendar, day 0 being January 1 of year 1. Digits are decoded by
//! subtracting `b'0'` from each byte at its known position; there is no
//! generic parser and no intermediate allocation anywhere in this module.
//!
//! [`duration_ticks`] is the scanner's entry point: it computes
//! `exit - entry` directly, keeping the day and second-of-day differences in
//! 32-bit arithmetic and widening to 64 bits only for the final two
//! multiplications, and it skips calendar work entirely when both fields
//! carry the same date.

use crate::error::Error;
use crate::record::TIMESTAMP_LEN;

/// One tick is 100 nanoseconds.
pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const TICKS_PER_DAY: i64 = TICKS_PER_SECOND * 86_400;

/// Cumulative day counts before each month, common year.
const DAYS_TO_MONTH_365: [i32; 13] = [
    0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365,
];
/// Cumulative day counts before each month, leap year.
const DAYS_TO_MONTH_366: [i32; 13] = [
    0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366,
];

#[inline]
fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Decodes one two-digit field, rejecting anything that isn't a digit.
#[inline]
fn pair(hi: u8, lo: u8) -> Result<u32, Error> {
    let h = hi.wrapping_sub(b'0') as u32;
    let l = lo.wrapping_sub(b'0') as u32;
    if h > 9 || l > 9 {
        return Err(Error::Digit {
            byte: if h > 9 { hi } else { lo },
        });
    }
    Ok(h * 10 + l)
}

/// Day number of `year-month-day` counted from day 0 = 0001-01-01.
#[inline]
fn day_number(year: u32, month: u32, day: u32) -> Result<i32, Error> {
    if !(1..=12).contains(&month) {
        return Err(Error::Date { year, month, day });
    }
    let table = if is_leap_year(year) {
        &DAYS_TO_MONTH_366
    } else {
        &DAYS_TO_MONTH_365
    };
    let m = month as usize;
    let days_in_month = table[m] - table[m - 1];
    if day < 1 || day as i32 > days_in_month {
        return Err(Error::Date { year, month, day });
    }
    let y = year as i32 - 1;
    Ok(y * 365 + y / 4 - y / 100 + y / 400 + table[m - 1] + day as i32 - 1)
}

/// Decodes the `yyyy-MM-dd` portion into a day number.
#[inline]
fn epoch_day(ts: &[u8]) -> Result<i32, Error> {
    let year = pair(ts[0], ts[1])? * 100 + pair(ts[2], ts[3])?;
    let month = pair(ts[5], ts[6])?;
    let day = pair(ts[8], ts[9])?;
    day_number(year, month, day)
}

/// Decodes the `HH:mm:ss` portion into seconds since midnight.
#[inline]
fn second_of_day(ts: &[u8]) -> Result<i32, Error> {
    let hour = pair(ts[11], ts[12])?;
    let minute = pair(ts[14], ts[15])?;
    let second = pair(ts[17], ts[18])?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(Error::Time {
            hour,
            minute,
            second,
        });
    }
    Ok((hour * 3600 + minute * 60 + second) as i32)
}

/// True when both fields carry the same `yyyy-MM-dd` date. Two word-sized
/// loads instead of ten byte comparisons; byte order is irrelevant since the
/// same positions are compared on both sides.
#[inline]
fn same_date(entry: &[u8], exit: &[u8]) -> bool {
    let e_head = u64::from_ne_bytes([
        entry[0], entry[1], entry[2], entry[3], entry[4], entry[5], entry[6], entry[7],
    ]);
    let x_head = u64::from_ne_bytes([
        exit[0], exit[1], exit[2], exit[3], exit[4], exit[5], exit[6], exit[7],
    ]);
    let e_tail = u16::from_ne_bytes([entry[8], entry[9]]);
    let x_tail = u16::from_ne_bytes([exit[8], exit[9]]);
    e_head == x_head && e_tail == x_tail
}

/// Absolute tick value of one 19-byte timestamp field.
pub fn absolute_ticks(ts: &[u8]) -> Result<i64, Error> {
    debug_assert!(ts.len() >= TIMESTAMP_LEN);
    Ok(epoch_day(ts)? as i64 * TICKS_PER_DAY + second_of_day(ts)? as i64 * TICKS_PER_SECOND)
}

/// `exit - entry` in ticks, always through the calendar arithmetic.
///
/// Both differences stay in 32-bit arithmetic (day counts top out around
/// 3.65 M for year 9999, second-of-day differences at ±86399), so only the
/// two final multiplications are 64-bit.
pub fn duration_ticks_full(entry: &[u8], exit: &[u8]) -> Result<i64, Error> {
    debug_assert!(entry.len() >= TIMESTAMP_LEN && exit.len() >= TIMESTAMP_LEN);
    let days = epoch_day(exit)? - epoch_day(entry)?;
    let secs = second_of_day(exit)? - second_of_day(entry)?;
    Ok(days as i64 * TICKS_PER_DAY + secs as i64 * TICKS_PER_SECOND)
}

/// `exit - entry` in ticks, taking the same-day shortcut when possible.
///
/// Entries and exits overwhelmingly share a calendar date, and equal dates
/// contribute zero days to the difference, so the date portions only need an
/// equality check, not decoding. Produces the same value as
/// [`duration_ticks_full`] whenever both succeed.
pub fn duration_ticks(entry: &[u8], exit: &[u8]) -> Result<i64, Error> {
    debug_assert!(entry.len() >= TIMESTAMP_LEN && exit.len() >= TIMESTAMP_LEN);
    if same_date(entry, exit) {
        let secs = second_of_day(exit)? - second_of_day(entry)?;
        return Ok(secs as i64 * TICKS_PER_SECOND);
    }
    duration_ticks_full(entry, exit)
}
