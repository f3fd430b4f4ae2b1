//! `roadinv-recon` — road inventory vs. ARNOLD mileage reconciliation.
//!
//! Segment lengths from each source are summed per road id in scaled integer
//! units, the two sets of road ids are merged, and every road is classified
//! as matching, mismatched, or missing from one side.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{run, run_files};
pub use error::ReconError;
pub use model::{ErrorCode, ReconResult, ReconciliationRow, SegmentRecord, Source};
