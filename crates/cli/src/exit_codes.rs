//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | recon            | Reconciliation run codes                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

use roadinv_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (60-69)
// =============================================================================

/// Config file unreadable, unparseable, or invalid.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 60;

/// A source file could not be opened or read (missing column, bad CSV).
pub const EXIT_RECON_SOURCE: u8 = 61;

/// A record was invalid under the `abort` policy, or a total or difference overflowed.
pub const EXIT_RECON_INVALID_RECORD: u8 = 62;

/// The report or JSON output could not be written.
pub const EXIT_RECON_WRITE: u8 = 63;

/// Discrepancies found and `--fail-on-discrepancy` was given.
pub const EXIT_RECON_DISCREPANCIES: u8 = 64;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_INVALID_CONFIG,
        ReconError::SourceRead { .. } => EXIT_RECON_SOURCE,
        ReconError::InvalidRecord { .. }
        | ReconError::Overflow { .. }
        | ReconError::DifferenceOverflow { .. } => EXIT_RECON_INVALID_RECORD,
        ReconError::SinkWrite(_) => EXIT_RECON_WRITE,
    }
}
