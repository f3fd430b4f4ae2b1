use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Source;

pub const DEFAULT_SCALE: i64 = 10_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default = "default_scale")]
    pub scale: i64,
    pub inventory: SourceConfig,
    pub registry: SourceConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_scale() -> i64 {
    DEFAULT_SCALE
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    #[serde(default)]
    pub columns: Option<ColumnMapping>,
    #[serde(default)]
    pub filter: Option<RowFilter>,
}

impl SourceConfig {
    /// Column mapping for this source, falling back to the field names used by
    /// the road inventory and ARNOLD layers.
    pub fn columns_for(&self, source: Source) -> ColumnMapping {
        self.columns
            .clone()
            .unwrap_or_else(|| ColumnMapping::default_for(source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMapping {
    pub road_id: String,
    pub length: String,
}

impl ColumnMapping {
    pub fn default_for(source: Source) -> Self {
        match source {
            Source::Inventory => Self {
                road_id: "AH_roadid".into(),
                length: "RoadLength".into(),
            },
            Source::Registry => Self {
                road_id: "AH_RoadID".into(),
                length: "AH_Length".into(),
            },
        }
    }
}

/// Keeps only rows whose `column` holds one of `values` (the region filter).
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub values: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tolerance + record policy
// ---------------------------------------------------------------------------

/// Allowed |registry - inventory| in scaled units before a road is a mismatch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default)]
    pub scaled_units: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordsConfig {
    #[serde(default)]
    pub on_invalid: InvalidRecordPolicy,
}

/// What to do with a record whose id is empty or whose length is negative,
/// non-finite or unparseable. Applies to both sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Fail the run on the first invalid record.
    #[default]
    Abort,
    /// Drop the record, log it, and count it in the source stats.
    Skip,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line_ending: LineEnding,
    #[serde(default = "default_null_text")]
    pub null_text: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            line_ending: LineEnding::default(),
            null_text: default_null_text(),
        }
    }
}

fn default_null_text() -> String {
    "null".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    /// `\r\n`, what spreadsheet tools on Windows expect.
    #[default]
    Crlf,
    Lf,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.scale <= 0 {
            return Err(ReconError::ConfigValidation(format!(
                "scale must be a positive integer, got {}",
                self.scale
            )));
        }

        if self.tolerance.scaled_units < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.scaled_units must not be negative, got {}",
                self.tolerance.scaled_units
            )));
        }

        for (source, cfg) in [
            (Source::Inventory, &self.inventory),
            (Source::Registry, &self.registry),
        ] {
            if cfg.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{source}: file must not be empty"
                )));
            }

            let columns = cfg.columns_for(source);
            if columns.road_id.trim().is_empty() || columns.length.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{source}: column names must not be empty"
                )));
            }
            if columns.road_id.trim() == columns.length.trim() {
                return Err(ReconError::ConfigValidation(format!(
                    "{source}: road_id and length must be different columns ('{}')",
                    columns.road_id
                )));
            }

            if let Some(ref filter) = cfg.filter {
                if filter.column.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{source}: filter column must not be empty"
                    )));
                }
                if filter.values.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{source}: filter on '{}' has no values",
                        filter.column
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn source(&self, source: Source) -> &SourceConfig {
        match source {
            Source::Inventory => &self.inventory,
            Source::Registry => &self.registry,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
