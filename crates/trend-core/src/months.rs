use crate::error::{Result, TrendError};

/// English month abbreviations in fixed calendar order.
///
/// Presentation layers must label and order months through this table.
/// Sorting the labels alphabetically puts Apr before Jan and is a known
/// defect of an earlier revision of this pipeline; the aggregator's output
/// is keyed on the month *number* precisely so that can never happen.
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label for a calendar month number (1–12).
pub fn month_abbr(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_ABBR[(month - 1) as usize])
    } else {
        None
    }
}

/// Label for a calendar month number, as a [`Result`] for `?` call sites.
pub fn month_abbr_checked(month: u32) -> Result<&'static str> {
    month_abbr(month).ok_or(TrendError::InvalidMonth(month))
}

/// Month number for an English abbreviation (case-insensitive).
pub fn abbr_to_month(abbr: &str) -> Option<u32> {
    MONTH_ABBR
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbr.trim()))
        .map(|i| (i + 1) as u32)
}
