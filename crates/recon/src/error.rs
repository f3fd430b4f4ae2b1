use std::fmt;

use crate::model::Source;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad scale, empty column name, etc.).
    ConfigValidation(String),
    /// A source could not produce records (open, read, CSV framing, missing column).
    SourceRead { source: Source, message: String },
    /// A record with an unusable id or length, under the `abort` policy.
    InvalidRecord {
        source: Source,
        line: u64,
        road_id: String,
        reason: String,
    },
    /// A road's scaled total no longer fits in an i64.
    Overflow { source: Source, road_id: String },
    /// `registry - inventory` for a road no longer fits in an i64.
    DifferenceOverflow { road_id: String },
    /// The report could not be written or finalized.
    SinkWrite(String),
}

impl ReconError {
    pub(crate) fn source_read(source: Source, message: impl fmt::Display) -> Self {
        Self::SourceRead {
            source,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SourceRead { source, message } => {
                write!(f, "{source}: cannot read source: {message}")
            }
            Self::InvalidRecord {
                source,
                line,
                road_id,
                reason,
            } => {
                if road_id.is_empty() {
                    write!(f, "{source}, line {line}: invalid record: {reason}")
                } else {
                    write!(f, "{source}, line {line}, road '{road_id}': invalid record: {reason}")
                }
            }
            Self::Overflow { source, road_id } => {
                write!(f, "{source}, road '{road_id}': scaled total overflows i64")
            }
            Self::DifferenceOverflow { road_id } => {
                write!(f, "road '{road_id}': mileage difference overflows i64")
            }
            Self::SinkWrite(msg) => write!(f, "cannot write report: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
