use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which side of the reconciliation a record or total belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The locally maintained road inventory.
    Inventory,
    /// The ARNOLD registry.
    Registry,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inventory => write!(f, "inventory"),
            Self::Registry => write!(f, "registry"),
        }
    }
}

/// A single road segment as read from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub road_id: String,
    /// Length in miles.
    pub length: f64,
    /// 1-based line in the source file; 0 when the record did not come from a file.
    pub line: u64,
}

impl SegmentRecord {
    pub fn new(road_id: impl Into<String>, length: f64) -> Self {
        Self {
            road_id: road_id.into(),
            length,
            line: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Per-road scaled totals for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// road id -> sum of `round_half_even(length * scale)` over its segments.
    pub totals: BTreeMap<String, i64>,
    /// Records that contributed to `totals`.
    pub records: usize,
    /// Records dropped under the `skip` policy.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    MissingFromRegistry,
    MissingFromInventory,
    NoError,
    MilageMismatch,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 4] = [
        Self::MissingFromRegistry,
        Self::MissingFromInventory,
        Self::NoError,
        Self::MilageMismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingFromRegistry => "MissingFromRegistry",
            Self::MissingFromInventory => "MissingFromInventory",
            Self::NoError => "NoError",
            Self::MilageMismatch => "MilageMismatch",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified road. Totals are kept in scaled units; the mileage
/// accessors divide back by `scale` for presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    pub road_id: String,
    pub registry_scaled: Option<i64>,
    pub inventory_scaled: Option<i64>,
    /// `registry - inventory`, only when both sides are present.
    pub difference_scaled: Option<i64>,
    pub error: ErrorCode,
    #[serde(skip)]
    pub scale: i64,
}

/// Mileage written for a side that has no segments for the road.
const ABSENT_MILEAGE: f64 = -1.0;

impl ReconciliationRow {
    pub fn registry_mileage(&self) -> f64 {
        self.registry_scaled
            .map_or(ABSENT_MILEAGE, |v| unscale(v, self.scale))
    }

    pub fn inventory_mileage(&self) -> f64 {
        self.inventory_scaled
            .map_or(ABSENT_MILEAGE, |v| unscale(v, self.scale))
    }

    pub fn mileage_difference(&self) -> Option<f64> {
        self.difference_scaled.map(|v| unscale(v, self.scale))
    }
}

fn unscale(value: i64, scale: i64) -> f64 {
    value as f64 / scale as f64
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub records: usize,
    pub skipped: usize,
    pub roads: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_roads: usize,
    pub no_error: usize,
    pub mileage_mismatches: usize,
    pub missing_from_registry: usize,
    pub missing_from_inventory: usize,
    pub inventory: SourceStats,
    pub registry: SourceStats,
}

impl ReconSummary {
    /// Rows whose error code is anything other than `NoError`.
    pub fn discrepancies(&self) -> usize {
        self.mileage_mismatches + self.missing_from_registry + self.missing_from_inventory
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub scale: i64,
    pub tolerance_scaled: i64,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<ReconciliationRow>,
}
