//! CSV discrepancy report.
//!
//! The report is written to a temporary file beside the target and renamed
//! into place only once every row is flushed, so a failed run never leaves a
//! truncated report that looks complete.

use std::io::Write;
use std::path::Path;

use crate::config::{LineEnding, OutputConfig};
use crate::error::ReconError;
use crate::model::ReconciliationRow;

pub const HEADER: [&str; 5] = [
    "RoadID",
    "Registry_Mileage",
    "Inventory_Mileage",
    "Mileage_Diff",
    "Error",
];

/// Text written for a side with no segments.
pub const ABSENT: &str = "-1";

/// Render a scaled integer as a decimal mileage.
///
/// Power-of-ten scales are rendered exactly from the integer with at least
/// one fractional digit (`30001 @ 10000` -> `3.0001`, `30000` -> `3.0`).
/// Other scales fall back to the shortest float representation.
pub fn format_scaled(value: i64, scale: i64) -> String {
    let Some(places) = decimal_places(scale) else {
        return format!("{:?}", value as f64 / scale as f64);
    };

    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let divisor = scale.unsigned_abs();
    let int = abs / divisor;
    let frac = abs % divisor;

    let mut frac_str = format!("{frac:0places$}");
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    if frac_str.is_empty() {
        frac_str.push('0');
    }

    format!("{sign}{int}.{frac_str}")
}

/// Number of decimal places if `scale` is a power of ten.
fn decimal_places(scale: i64) -> Option<usize> {
    if scale <= 0 {
        return None;
    }
    let mut s = scale;
    let mut places = 0;
    while s % 10 == 0 {
        s /= 10;
        places += 1;
    }
    (s == 1).then_some(places)
}

/// Serialize the header and `rows` to `writer`.
pub fn write_rows<W: Write>(
    writer: W,
    rows: &[ReconciliationRow],
    output: &OutputConfig,
) -> Result<W, ReconError> {
    let terminator = match output.line_ending {
        LineEnding::Crlf => csv::Terminator::CRLF,
        LineEnding::Lf => csv::Terminator::Any(b'\n'),
    };
    let mut wtr = csv::WriterBuilder::new()
        .terminator(terminator)
        .from_writer(writer);

    let sink_err = |e: csv::Error| ReconError::SinkWrite(e.to_string());

    wtr.write_record(HEADER).map_err(sink_err)?;

    for row in rows {
        let registry = row
            .registry_scaled
            .map_or_else(|| ABSENT.to_string(), |v| format_scaled(v, row.scale));
        let inventory = row
            .inventory_scaled
            .map_or_else(|| ABSENT.to_string(), |v| format_scaled(v, row.scale));
        let diff = row
            .difference_scaled
            .map_or_else(|| output.null_text.clone(), |v| format_scaled(v, row.scale));

        wtr.write_record([
            row.road_id.as_str(),
            registry.as_str(),
            inventory.as_str(),
            diff.as_str(),
            row.error.as_str(),
        ])
        .map_err(sink_err)?;
    }

    wtr.into_inner()
        .map_err(|e| ReconError::SinkWrite(e.error().to_string()))
}

/// Write the report to `path`, replacing any existing file only on success.
pub fn write_report(
    path: &Path,
    rows: &[ReconciliationRow],
    output: &OutputConfig,
) -> Result<(), ReconError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".roadrecon-")
        .suffix(".csv.tmp")
        .tempfile_in(dir)
        .map_err(|e| ReconError::SinkWrite(format!("{}: {e}", dir.display())))?;

    write_rows(&mut tmp, rows, output)?;

    tmp.as_file()
        .sync_all()
        .map_err(|e| ReconError::SinkWrite(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| ReconError::SinkWrite(format!("{}: {}", path.display(), e.error)))?;

    log::debug!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}
