//! Export of session results.
//!
//! | Format | Contents |
//! |--------|----------|
//! | CSV | one `portfolio,return,risk` row per labelled portfolio |
//! | JSON | the whole [`SessionReport`] |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::SessionReport;
use crate::error::Result;

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub portfolio: String,
    #[serde(rename = "return")]
    pub expected_return: f64,
    pub risk: f64,
}

/// Rows in export order: frontier, equal weight and benchmarks, matches.
pub fn export_rows(report: &SessionReport) -> Vec<ExportRow> {
    let frontier = report.frontier_portfolios.iter().map(|p| ExportRow {
        portfolio: p.label.clone(),
        expected_return: p.expected_return,
        risk: p.risk,
    });
    let others = report.scatter_points().into_iter().map(|p| ExportRow {
        portfolio: p.label,
        expected_return: p.expected_return,
        risk: p.risk,
    });
    frontier.chain(others).collect()
}

/// Write export rows as CSV to any writer.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export `label,return,risk` rows to a CSV file.
pub fn export_csv(report: &SessionReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let rows = export_rows(report);
    write_csv(BufWriter::new(File::create(path)?), &rows)?;
    info!(rows = rows.len(), "wrote {}", path.display());
    Ok(())
}

/// Export the full report as pretty-printed JSON.
pub fn export_json(report: &SessionReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}
