//! In-memory tabular input: one header row plus typed cells.
//!
//! Loaders in `trainrecon-io` produce these from spreadsheets or CSV; the
//! engine only ever sees `Table`s.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::error::ReconError;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Text layouts accepted for completion dates, tried in order.
/// Month-first is tried before day-first for slash dates.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
];

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

impl CellValue {
    /// True for blank cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Cell rendered as text, `None` when blank. Text is returned untrimmed.
    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(match self {
            Self::Empty => return None,
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Cell rendered as trimmed text, `None` when blank.
    pub fn as_trimmed(&self) -> Option<String> {
        self.as_text().map(|s| s.trim().to_string())
    }

    /// Lenient timestamp parse. Anything unparseable is `None`.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Text(s) => parse_datetime_lenient(s),
            Self::Number(n) => excel_serial_to_datetime(*n),
            Self::Empty | Self::Bool(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// Integral values print without a fractional part so that numeric
/// procedure codes compare equal to their text form.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn parse_datetime_lenient(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Excel serial day number (1900 system) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// A named table: header labels plus rows of cells.
///
/// Rows may be ragged; reads past the end of a row yield an empty cell.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Where the table came from (usually the file name).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Index of the header whose trimmed label equals `label`.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.headers.iter().position(|h| h.trim() == label)
    }

    /// Like [`column_index`](Self::column_index), but a missing header is a
    /// schema error naming `role` and this table's source.
    pub fn require_column(&self, role: &str, label: &str) -> Result<usize, ReconError> {
        self.column_index(label)
            .ok_or_else(|| ReconError::MissingColumn {
                table: role.into(),
                source_name: self.name.clone(),
                column: label.into(),
            })
    }

    /// Positional tables must be at least as wide as the positions read.
    /// `labels[i]` describes column `i`; the first one missing is reported.
    pub fn require_width(&self, role: &str, labels: &[&str]) -> Result<(), ReconError> {
        if self.headers.len() >= labels.len() {
            return Ok(());
        }
        let missing = self.headers.len();
        Err(ReconError::MissingColumn {
            table: role.into(),
            source_name: self.name.clone(),
            column: format!("#{} ({})", missing + 1, labels[missing]),
        })
    }
}
