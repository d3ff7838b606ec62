//! Cell references, limits and value text forms for SpreadsheetML.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::common::{Error, Result};

/// Rows per worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Columns per worksheet.
pub const MAX_COLUMNS: u32 = 16_384;
/// Characters a single cell can hold.
pub const MAX_CELL_TEXT_LENGTH: usize = 32_767;

pub(crate) const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest magnitude where every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// A1-style reference from a zero-based column and a one-based row.
pub fn cell_reference(column: u32, row: u32) -> String {
    let mut reference = column_to_letters(column + 1);
    let mut buffer = itoa::Buffer::new();
    reference.push_str(buffer.format(row));
    reference
}

/// Locale-independent text form of an integer.
pub(crate) fn format_integer(value: i64) -> String {
    itoa::Buffer::new().format(value).to_string()
}

/// Shortest round-trippable text form of a float.
///
/// Integral values are written without a fractional part. NaN and the
/// infinities have no representation in a cell.
pub(crate) fn format_float(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "cannot write non-finite number {}",
            value
        )));
    }
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        return Ok(format_integer(value as i64));
    }
    Ok(ryu::Buffer::new().format_finite(value).to_string())
}

fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Serial number of `date` in the 1900 date system.
///
/// The 1900 system counts the nonexistent 1900-02-29, so dates from
/// 1900-03-01 on are one day ahead of a plain day count from 1899-12-31.
pub(crate) fn date_to_serial(date: NaiveDate) -> Result<f64> {
    let (Some(base), Some(first), Some(leap_fix)) = (
        epoch(),
        NaiveDate::from_ymd_opt(1900, 1, 1),
        NaiveDate::from_ymd_opt(1900, 3, 1),
    ) else {
        return Err(Error::InvalidArgument("invalid date epoch".to_string()));
    };
    if date < first {
        return Err(Error::InvalidArgument(format!(
            "date {} is before 1900-01-01",
            date
        )));
    }
    let mut days = (date - base).num_days();
    if date < leap_fix {
        days -= 1;
    }
    Ok(days as f64)
}

/// Serial number of `datetime`, with the time of day as the fraction.
pub(crate) fn datetime_to_serial(datetime: NaiveDateTime) -> Result<f64> {
    let days = date_to_serial(datetime.date())?;
    let time = datetime.time();
    let seconds =
        time.num_seconds_from_midnight() as f64 + f64::from(time.nanosecond()) / 1_000_000_000.0;
    Ok(days + seconds / SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(1), "A");
        assert_eq!(column_to_letters(26), "Z");
        assert_eq!(column_to_letters(27), "AA");
        assert_eq!(column_to_letters(702), "ZZ");
        assert_eq!(column_to_letters(703), "AAA");
        assert_eq!(column_to_letters(MAX_COLUMNS), "XFD");
        assert_eq!(cell_reference(0, 1), "A1");
        assert_eq!(cell_reference(27, 15), "AB15");
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_integer(-42), "-42");
        assert_eq!(format_float(3.5).unwrap(), "3.5");
        assert_eq!(format_float(100.0).unwrap(), "100");
        assert_eq!(format_float(-0.25).unwrap(), "-0.25");
        assert_eq!(format_float(0.1 + 0.2).unwrap(), "0.30000000000000004");
        assert!(format_float(f64::NAN).is_err());
        assert!(format_float(f64::INFINITY).is_err());
    }

    #[test]
    fn test_date_serials() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(date_to_serial(date(1900, 1, 1)).unwrap(), 1.0);
        assert_eq!(date_to_serial(date(1900, 2, 28)).unwrap(), 59.0);
        assert_eq!(date_to_serial(date(1900, 3, 1)).unwrap(), 61.0);
        assert_eq!(date_to_serial(date(2024, 1, 1)).unwrap(), 45292.0);
        assert!(date_to_serial(date(1899, 12, 31)).is_err());

        let noon = date(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(noon).unwrap(), 45292.5);
    }
}
