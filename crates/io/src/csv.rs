// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use trainrecon_recon::projector::{record_cells, OUTPUT_COLUMNS};
use trainrecon_recon::{CellValue, ReconciledRecord, Table};

use crate::error::IoError;

/// Load a delimited file as a table. The first record is the header row;
/// every other field is kept as text, blank fields become empty cells.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(path, &content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::file(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Windows-1252 is what Excel writes for "CSV" on most locales
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .map_err(|e| IoError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err(IoError::NoHeader(path.to_path_buf())),
    };

    let mut table = Table::new(file_label(path), headers);
    for result in records {
        let record = result.map_err(|e| IoError::csv(path, e))?;
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write the reconciled table as comma-separated text, one header row.
pub fn export<'a, I>(records: I, path: &Path) -> Result<usize, IoError>
where
    I: IntoIterator<Item = &'a ReconciledRecord>,
{
    let mut writer = ::csv::Writer::from_path(path)
        .map_err(|e| IoError::csv(path, e))?;

    writer
        .write_record(OUTPUT_COLUMNS)
        .map_err(|e| IoError::csv(path, e))?;

    let mut written = 0;
    for record in records {
        let fields: Vec<String> = record_cells(record)
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default())
            .collect();
        writer
            .write_record(&fields)
            .map_err(|e| IoError::csv(path, e))?;
        written += 1;
    }

    writer.flush().map_err(|e| IoError::file(path, e))?;
    Ok(written)
}
