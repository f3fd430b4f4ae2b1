//! Streaming CSV reader that turns a source file into [`SegmentRecord`]s.
//!
//! Rows are read lazily, one at a time; nothing is buffered beyond the
//! current record. The underlying file is closed when the reader is dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::{ColumnMapping, RowFilter, SourceConfig};
use crate::error::ReconError;
use crate::model::{SegmentRecord, Source};

pub struct CsvSegmentReader<R: Read> {
    source: Source,
    records: csv::StringRecordsIntoIter<R>,
    road_id_idx: usize,
    length_idx: usize,
    filter: Option<(usize, Vec<String>)>,
    failed: bool,
}

impl CsvSegmentReader<File> {
    /// Open `path` and resolve the configured columns against its header.
    pub fn open(source: Source, path: &Path, config: &SourceConfig) -> Result<Self, ReconError> {
        let file = File::open(path)
            .map_err(|e| ReconError::source_read(source, format!("{}: {e}", path.display())))?;
        Self::from_reader(
            source,
            file,
            &config.columns_for(source),
            config.filter.as_ref(),
        )
    }
}

impl<R: Read> CsvSegmentReader<R> {
    pub fn from_reader(
        source: Source,
        reader: R,
        columns: &ColumnMapping,
        filter: Option<&RowFilter>,
    ) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::source_read(source, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let idx = |name: &str| -> Result<usize, ReconError> {
            headers
                .iter()
                .position(|h| h == name.trim())
                .ok_or_else(|| ReconError::source_read(source, format!("missing column '{name}'")))
        };

        let road_id_idx = idx(&columns.road_id)?;
        let length_idx = idx(&columns.length)?;
        let filter = match filter {
            Some(f) => {
                // Cells are trimmed on read, so the configured values must be too.
                let values = f.values.iter().map(|v| v.trim().to_string()).collect();
                Some((idx(&f.column)?, values))
            }
            None => None,
        };

        Ok(Self {
            source,
            records: reader.into_records(),
            road_id_idx,
            length_idx,
            filter,
            failed: false,
        })
    }
}

impl<R: Read> Iterator for CsvSegmentReader<R> {
    type Item = Result<SegmentRecord, ReconError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(ReconError::source_read(self.source, e)));
                }
            };

            if let Some((fi, ref values)) = self.filter {
                let val = record.get(fi).unwrap_or("");
                if !values.iter().any(|v| v == val) {
                    continue;
                }
            }

            let line = record.position().map_or(0, |p| p.line());
            let road_id = record.get(self.road_id_idx).unwrap_or("").to_string();
            let length_str = record.get(self.length_idx).unwrap_or("");

            let length = match length_str.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    let reason = if length_str.is_empty() {
                        "missing length".to_string()
                    } else {
                        format!("cannot parse length '{length_str}'")
                    };
                    return Some(Err(ReconError::InvalidRecord {
                        source: self.source,
                        line,
                        road_id,
                        reason,
                    }));
                }
            };

            return Some(Ok(SegmentRecord {
                road_id,
                length,
                line,
            }));
        }
    }
}
