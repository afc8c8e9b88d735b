//! Revision indicators compared as digits-only integers.
//!
//! "Rev. 03A", "REV0003" and the number 3 all extract to 3. Leading zeros
//! and punctuation are lost on purpose: two revisions are equal iff their
//! digit-only forms parse to the same integer.

use crate::table::CellValue;

/// Characters of a procedure title that carry its revision token.
pub const REVISION_TOKEN_LEN: usize = 7;

/// Digit-only integer of a text revision. No digits (or overflow) is `None`.
pub fn revision_digits(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Revision of a cell: text goes through [`revision_digits`], numbers are
/// truncated to an integer.
pub fn extract_revision(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Text(s) => revision_digits(s),
        CellValue::Number(n) => {
            if n.is_finite() && n.abs() < i64::MAX as f64 {
                Some(n.trunc() as i64)
            } else {
                None
            }
        }
        CellValue::Bool(b) => Some(i64::from(*b)),
        CellValue::Empty | CellValue::DateTime(_) => None,
    }
}

/// Trailing [`REVISION_TOKEN_LEN`] characters of a procedure title.
pub fn revision_token(title: &str) -> String {
    let count = title.chars().count();
    title
        .chars()
        .skip(count.saturating_sub(REVISION_TOKEN_LEN))
        .collect()
}
