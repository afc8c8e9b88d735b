// Excel import (calamine) and report export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, FormatBorder, Workbook, Worksheet, XlsxError};

use trainrecon_recon::projector::{record_cells, OUTPUT_COLUMNS};
use trainrecon_recon::table::{excel_serial_to_datetime, parse_datetime_lenient};
use trainrecon_recon::{CellValue, ReconciledRecord, Table};

use crate::csv::file_label;
use crate::error::IoError;

pub const REPORT_SHEET: &str = "Status";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Import the first worksheet of an Excel/ODS file (xlsx, xls, xlsb, ods).
///
/// The first row of the used range is the header row. Dates become
/// timestamps, numbers stay numeric, empty strings become empty cells.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let spreadsheet = |message: String| IoError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| spreadsheet(format!("failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(spreadsheet("workbook contains no sheets".to_string()));
    };

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| spreadsheet(format!("failed to read sheet '{first}': {e}")))?;

    // Data may not begin at A1; leading blank columns still count as positions.
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IoError::NoHeader(path.to_path_buf()));
    };

    let headers: Vec<String> = std::iter::repeat(String::new())
        .take(pad)
        .chain(header_row.iter().map(|cell| convert(cell).as_text().unwrap_or_default()))
        .collect();

    let mut table = Table::new(file_label(path), headers);
    for row in rows {
        let cells: Vec<CellValue> = std::iter::repeat(CellValue::Empty)
            .take(pad)
            .chain(row.iter().map(convert))
            .collect();
        table.push_row(cells);
    }

    tracing::debug!(
        file = %table.name,
        sheet = %first,
        rows = table.len(),
        columns = table.headers.len(),
        "sheet imported"
    );
    Ok(table)
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Assumes the 1900 date system
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_datetime_lenient(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}

/// Write the reconciled table as a single-sheet workbook: bold header row,
/// frozen under the header, autofilter over the data.
pub fn export<'a, I>(records: I, path: &Path) -> Result<usize, IoError>
where
    I: IntoIterator<Item = &'a ReconciledRecord>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET)?;

    let header_format = Format::new().set_bold().set_border_bottom(FormatBorder::Thin);
    let date_format = Format::new().set_num_format(DATETIME_FORMAT);

    for (col, label) in OUTPUT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header_format)?;
    }

    let mut written = 0usize;
    for (idx, record) in records.into_iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, cell) in record_cells(record).iter().enumerate() {
            write_cell(worksheet, row, col as u16, cell, &date_format)?;
        }
        written += 1;
    }

    let last_col = (OUTPUT_COLUMNS.len() - 1) as u16;
    worksheet.autofilter(0, 0, written as u32, last_col)?;
    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    workbook.save(path)?;
    Ok(written)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => match to_excel_datetime(dt) {
            Some(value) => {
                worksheet.write_datetime_with_format(row, col, &value, date_format)?;
            }
            None => {
                worksheet.write_string(row, col, dt.format("%Y-%m-%d %H:%M:%S").to_string())?;
            }
        },
    }
    Ok(())
}

/// Excel cannot represent dates before 1900 or after 9999.
fn to_excel_datetime(dt: &NaiveDateTime) -> Option<ExcelDateTime> {
    let year = u16::try_from(dt.year()).ok()?;
    ExcelDateTime::from_ymd(year, dt.month() as u8, dt.day() as u8)
        .and_then(|d| d.and_hms(dt.hour() as u16, dt.minute() as u8, dt.second()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use trainrecon_recon::FinalStatus;

    fn record(employee: &str, status: FinalStatus, at: Option<NaiveDateTime>) -> ReconciledRecord {
        ReconciledRecord {
            employee_id: employee.into(),
            role_b: Some("Operador".into()),
            role_a: Some("Operator".into()),
            procedure_name: Some("Induction".into()),
            assigned_code: Some("P-100-PT".into()),
            alternative_code: Some("P-100-EN".into()),
            requirement: Some("Mandatory".into()),
            category: Some("Safety".into()),
            control_status: Some("Completed".into()),
            control_name: Some(employee.to_uppercase()),
            control_revision: Some("REV0003".into()),
            elearning_revision: Some("3".into()),
            final_status: Some(status),
            control_completed_at: at,
            match_score: 100.0,
            inconsistent: false,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_export_then_import_keeps_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let records = vec![
            record("John Smith", FinalStatus::Ok, Some(at(2024, 1, 10))),
            record("Mary Jones", FinalStatus::Retraining, None),
        ];

        let written = export(&records, &path).unwrap();
        assert_eq!(written, 2);

        let table = import(&path).unwrap();
        assert_eq!(table.name, "report.xlsx");
        assert_eq!(table.headers, OUTPUT_COLUMNS.map(String::from).to_vec());
        assert_eq!(table.len(), 2);

        let status = table.column_index("final_status").unwrap();
        let date = table.column_index("control_completed_at").unwrap();
        let score = table.column_index("match_score").unwrap();
        let flag = table.column_index("inconsistent").unwrap();

        assert_eq!(table.cell(0, 0), &CellValue::from("John Smith"));
        assert_eq!(table.cell(1, status), &CellValue::from("Retreinamento"));
        assert_eq!(table.cell(0, date), &CellValue::DateTime(at(2024, 1, 10)));
        assert_eq!(table.cell(1, date), &CellValue::Empty);
        assert_eq!(table.cell(0, score), &CellValue::Number(100.0));
        assert_eq!(table.cell(0, flag), &CellValue::Bool(false));
    }

    #[test]
    fn test_export_empty_report_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let written = export(std::iter::empty(), &path).unwrap();
        assert_eq!(written, 0);

        let table = import(&path).unwrap();
        assert_eq!(table.headers.len(), OUTPUT_COLUMNS.len());
        assert!(table.is_empty());
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::Spreadsheet { .. }));
    }

    #[test]
    fn test_convert_cells() {
        assert_eq!(convert(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(
            convert(&Data::DateTimeIso("2024-01-10T08:30:00".into())),
            CellValue::DateTime(at(2024, 1, 10))
        );
    }
}
