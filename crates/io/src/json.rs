// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use trainrecon_recon::model::{ReconMeta, ReconSummary};
use trainrecon_recon::ReconciledRecord;

use crate::error::IoError;

#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a ReconMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a ReconSummary>,
    records: Vec<&'a ReconciledRecord>,
}

/// Export records as a JSON document `{ meta?, summary?, records: [...] }`.
pub fn export<'a, I>(
    records: I,
    meta: Option<&'a ReconMeta>,
    summary: Option<&'a ReconSummary>,
    path: &Path,
) -> Result<usize, IoError>
where
    I: IntoIterator<Item = &'a ReconciledRecord>,
{
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let writer = BufWriter::new(file);

    let report = Report {
        meta,
        summary,
        records: records.into_iter().collect(),
    };
    serde_json::to_writer_pretty(writer, &report)?;

    Ok(report.records.len())
}
