use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::models::Cell;

// ── NumericParser ─────────────────────────────────────────────────────────────

/// Coerces untyped cells into measure values.
///
/// Spreadsheet exports routinely render numeric columns as text with
/// thousands-separator commas (`"1,234.5"`); the parser strips those before
/// float conversion. A cell that still fails to parse yields `None` — the
/// caller drops the row rather than aborting the pipeline.
pub struct NumericParser;

impl NumericParser {
    /// Attempt to read a cell as an `f64` measure value.
    ///
    /// * `Number` → taken as-is.
    /// * `Text`   → trimmed, commas stripped, then parsed.
    /// * everything else (blank, bool, date) → `None`.
    ///
    /// Only finite values qualify: NaN and infinities (whether already in a
    /// number cell, or text such as `"NaN"` that `str::parse` would accept)
    /// are nulls, not measures.
    pub fn parse(cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Number(n) => n.is_finite().then_some(*n),
            Cell::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }
}

// ── DateParser ────────────────────────────────────────────────────────────────

/// Excel's day-serial epoch. Serial 1 is 1899-12-31; the offset of -30 also
/// absorbs Excel's historical 1900 leap-year quirk for modern dates.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial Excel itself can represent (9999-12-31).
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// Coerces untyped cells into calendar dates.
pub struct DateParser;

impl DateParser {
    /// Attempt to read a cell as a [`NaiveDate`].
    ///
    /// Handles:
    /// * native date cells (time-of-day discarded),
    /// * text in the common export formats (ISO, slashed, dashed),
    /// * numeric Excel day serials.
    ///
    /// Returns `None` for anything else; the caller drops the row.
    pub fn parse(cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::Date(dt) => Some(dt.date()),
            Cell::Text(s) => Self::parse_str(s.trim()),
            Cell::Number(serial) => Self::from_excel_serial(*serial),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<NaiveDate> {
        if s.is_empty() {
            return None;
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%d",
            "%Y/%m/%d",
            "%d/%m/%Y",
            "%d-%m-%Y",
            "%d-%b-%Y",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
        ];

        for fmt in FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        warn!("DateParser: could not parse date string \"{}\"", s);
        None
    }

    /// Convert an Excel day serial into a date.
    ///
    /// The fractional part (time of day) is discarded. Serials outside
    /// Excel's own representable range are rejected rather than wrapped.
    fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
        if !(1.0..=EXCEL_SERIAL_MAX).contains(&serial) {
            return None;
        }
        let (y, m, d) = EXCEL_EPOCH;
        let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
        epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    // ── NumericParser ─────────────────────────────────────────────────────────

    #[test]
    fn test_numeric_from_number_cell() {
        assert_eq!(NumericParser::parse(&Cell::Number(42.5)), Some(42.5));
    }

    #[test]
    fn test_numeric_strips_thousands_separators() {
        let cell = Cell::Text("1,234.5".to_string());
        assert_eq!(NumericParser::parse(&cell), Some(1234.5));
    }

    #[test]
    fn test_numeric_multiple_separators() {
        let cell = Cell::Text("12,345,678.25".to_string());
        assert_eq!(NumericParser::parse(&cell), Some(12_345_678.25));
    }

    #[test]
    fn test_numeric_plain_text_number() {
        assert_eq!(NumericParser::parse(&Cell::Text(" 99 ".to_string())), Some(99.0));
        assert_eq!(NumericParser::parse(&Cell::Text("-3.5".to_string())), Some(-3.5));
    }

    #[test]
    fn test_numeric_garbage_returns_none() {
        assert_eq!(NumericParser::parse(&Cell::Text("abc".to_string())), None);
        assert_eq!(NumericParser::parse(&Cell::Text("12abc".to_string())), None);
    }

    #[test]
    fn test_numeric_nonfinite_returns_none() {
        assert_eq!(NumericParser::parse(&Cell::Number(f64::NAN)), None);
        assert_eq!(NumericParser::parse(&Cell::Number(f64::INFINITY)), None);
        assert_eq!(NumericParser::parse(&Cell::Number(f64::NEG_INFINITY)), None);
        // str::parse::<f64> accepts these spellings; they are still nulls here.
        assert_eq!(NumericParser::parse(&Cell::Text("NaN".to_string())), None);
        assert_eq!(NumericParser::parse(&Cell::Text("inf".to_string())), None);
        assert_eq!(NumericParser::parse(&Cell::Text("-inf".to_string())), None);
    }

    #[test]
    fn test_numeric_blank_and_nonnumeric_cells() {
        assert_eq!(NumericParser::parse(&Cell::Empty), None);
        assert_eq!(NumericParser::parse(&Cell::Text("  ".to_string())), None);
        assert_eq!(NumericParser::parse(&Cell::Bool(true)), None);
    }

    // ── DateParser ────────────────────────────────────────────────────────────

    #[test]
    fn test_date_from_native_cell() {
        let dt = NaiveDateTime::parse_from_str("2023-11-07 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            DateParser::parse(&Cell::Date(dt)),
            NaiveDate::from_ymd_opt(2023, 11, 7)
        );
    }

    #[test]
    fn test_date_from_iso_text() {
        let cell = Cell::Text("2023-11-07".to_string());
        assert_eq!(DateParser::parse(&cell), NaiveDate::from_ymd_opt(2023, 11, 7));
    }

    #[test]
    fn test_date_from_slashed_text() {
        let cell = Cell::Text("07/11/2023".to_string());
        assert_eq!(DateParser::parse(&cell), NaiveDate::from_ymd_opt(2023, 11, 7));
    }

    #[test]
    fn test_date_from_datetime_text() {
        let cell = Cell::Text("2023-11-07 14:00:00".to_string());
        assert_eq!(DateParser::parse(&cell), NaiveDate::from_ymd_opt(2023, 11, 7));
    }

    #[test]
    fn test_date_from_excel_serial() {
        // Serial 45237 is 2023-11-07.
        let cell = Cell::Number(45237.0);
        assert_eq!(DateParser::parse(&cell), NaiveDate::from_ymd_opt(2023, 11, 7));
    }

    #[test]
    fn test_date_excel_serial_fraction_discarded() {
        // Same day, mid-afternoon.
        let cell = Cell::Number(45237.65);
        assert_eq!(DateParser::parse(&cell), NaiveDate::from_ymd_opt(2023, 11, 7));
    }

    #[test]
    fn test_date_excel_serial_out_of_range() {
        assert_eq!(DateParser::parse(&Cell::Number(0.0)), None);
        assert_eq!(DateParser::parse(&Cell::Number(-5.0)), None);
        assert_eq!(DateParser::parse(&Cell::Number(3_000_000.0)), None);
    }

    #[test]
    fn test_date_garbage_returns_none() {
        assert_eq!(DateParser::parse(&Cell::Text("not-a-date".to_string())), None);
        assert_eq!(DateParser::parse(&Cell::Empty), None);
        assert_eq!(DateParser::parse(&Cell::Bool(false)), None);
    }
}
