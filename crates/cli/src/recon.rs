//! `roadrecon run` / `roadrecon validate`.

use std::path::{Path, PathBuf};

use roadinv_recon::engine::{report_path, run_files};
use roadinv_recon::report::write_report;
use roadinv_recon::{ErrorCode, ReconConfig, ReconError, ReconResult, ReconciliationRow};

use crate::exit_codes::{
    recon_exit_code, EXIT_ERROR, EXIT_RECON_DISCREPANCIES, EXIT_RECON_INVALID_CONFIG,
    EXIT_RECON_WRITE,
};
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub scale: Option<i64>,
    pub json: bool,
    pub json_output: Option<PathBuf>,
    pub fail_on_discrepancy: bool,
}

fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::SourceRead { .. } => {
            Some("source paths are resolved relative to the config file".to_string())
        }
        ReconError::InvalidRecord { .. } => {
            Some("set `on_invalid = \"skip\"` under [records] to drop invalid rows".to_string())
        }
        _ => None,
    };
    CliError {
        code: recon_exit_code(&err),
        message: err.to_string(),
        hint,
    }
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_RECON_INVALID_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&config_str).map_err(recon_err)
}

fn base_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(&args.config)?;
    if let Some(scale) = args.scale {
        override_scale(&mut config, scale)?;
    }

    let base = base_dir(&args.config);
    let result = run_files(&config, base).map_err(recon_err)?;

    match report_path(&config, base, args.output.as_deref()) {
        Some(path) => {
            write_report(&path, &result.rows, &config.output).map_err(recon_err)?;
            eprintln!("wrote {}", path.display());
        }
        None if !args.json && args.json_output.is_none() => {
            log::warn!("no report path configured; pass --output or set [output] file");
        }
        None => {}
    }

    if args.json || args.json_output.is_some() {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        if let Some(ref path) = args.json_output {
            std::fs::write(path, &json_str).map_err(|e| CliError {
                code: EXIT_RECON_WRITE,
                message: format!("cannot write {}: {e}", path.display()),
                hint: None,
            })?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    print_summary(&result);

    if args.fail_on_discrepancy && result.summary.discrepancies() > 0 {
        return Err(CliError {
            code: EXIT_RECON_DISCREPANCIES,
            message: format!("{} discrepancies found", result.summary.discrepancies()),
            hint: None,
        });
    }

    Ok(())
}

/// Apply `--scale`. The tolerance is expressed in scaled units, so a
/// non-zero tolerance would silently change meaning under a new scale.
fn override_scale(config: &mut ReconConfig, scale: i64) -> Result<(), CliError> {
    if config.tolerance.scaled_units != 0 && scale != config.scale {
        return Err(CliError {
            code: EXIT_RECON_INVALID_CONFIG,
            message: format!(
                "--scale {scale} conflicts with tolerance of {} units at scale {}",
                config.tolerance.scaled_units, config.scale
            ),
            hint: Some("set scale and [tolerance] scaled_units together in the config".into()),
        });
    }
    config.scale = scale;
    config.validate().map_err(recon_err)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "config '{}' is valid (scale {}, inventory {}, registry {})",
        config.name, config.scale, config.inventory.file, config.registry.file
    );
    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "{}: {} roads: {} ok, {} mileage mismatches, \
         {} missing from registry, {} missing from inventory",
        result.meta.config_name,
        s.total_roads,
        s.no_error,
        s.mileage_mismatches,
        s.missing_from_registry,
        s.missing_from_inventory,
    );
    if let Some(row) = largest_mismatch(&result.rows) {
        eprintln!("{}", describe_mismatch(row));
    }
    if s.inventory.skipped > 0 || s.registry.skipped > 0 {
        eprintln!(
            "skipped invalid records: {} inventory, {} registry",
            s.inventory.skipped, s.registry.skipped
        );
    }
}

fn largest_mismatch(rows: &[ReconciliationRow]) -> Option<&ReconciliationRow> {
    rows.iter()
        .filter(|r| r.error == ErrorCode::MilageMismatch)
        .max_by_key(|r| r.difference_scaled.map_or(0, i64::unsigned_abs))
}

fn describe_mismatch(row: &ReconciliationRow) -> String {
    format!(
        "largest mismatch: {} (registry {}, inventory {}, diff {})",
        row.road_id,
        row.registry_mileage(),
        row.inventory_mileage(),
        row.mileage_difference().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch(id: &str, reg: i64, inv: i64) -> ReconciliationRow {
        ReconciliationRow {
            road_id: id.into(),
            registry_scaled: Some(reg),
            inventory_scaled: Some(inv),
            difference_scaled: Some(reg - inv),
            error: ErrorCode::MilageMismatch,
            scale: 10_000,
        }
    }

    fn config_with_tolerance(units: i64) -> ReconConfig {
        let mut config = ReconConfig::from_toml(
            "name = \"t\"\n[inventory]\nfile = \"i.csv\"\n[registry]\nfile = \"r.csv\"\n",
        )
        .unwrap();
        config.tolerance.scaled_units = units;
        config
    }

    #[test]
    fn largest_mismatch_by_absolute_difference() {
        let mut rows = vec![
            mismatch("A", 30_000, 30_001),
            mismatch("B", 10_000, 5_000),
            mismatch("C", 0, 7_000),
        ];
        rows.push(ReconciliationRow {
            error: ErrorCode::MissingFromInventory,
            inventory_scaled: None,
            difference_scaled: None,
            ..mismatch("D", 900_000, 0)
        });
        assert_eq!(largest_mismatch(&rows).unwrap().road_id, "C");
        assert!(largest_mismatch(&rows[3..]).is_none());
    }

    #[test]
    fn mismatch_line_uses_mileages() {
        assert_eq!(
            describe_mismatch(&mismatch("SR0008", 30_000, 30_001)),
            "largest mismatch: SR0008 (registry 3, inventory 3.0001, diff -0.0001)"
        );
    }

    #[test]
    fn scale_override_without_tolerance() {
        let mut config = config_with_tolerance(0);
        override_scale(&mut config, 100).unwrap();
        assert_eq!(config.scale, 100);

        let err = override_scale(&mut config, 0).unwrap_err();
        assert_eq!(err.code, EXIT_RECON_INVALID_CONFIG);
    }

    #[test]
    fn scale_override_rejected_with_tolerance() {
        let mut config = config_with_tolerance(5);
        let err = override_scale(&mut config, 100).unwrap_err();
        assert_eq!(err.code, EXIT_RECON_INVALID_CONFIG);
        assert!(err.message.contains("tolerance of 5 units at scale 10000"));
        assert_eq!(config.scale, 10_000);

        // Same scale as configured is a no-op.
        override_scale(&mut config, 10_000).unwrap();
    }

    #[test]
    fn base_dir_of_bare_file_is_cwd() {
        assert_eq!(base_dir(Path::new("recon.toml")), Path::new("."));
        assert_eq!(base_dir(Path::new("data/recon.toml")), Path::new("data"));
    }

    #[test]
    fn invalid_record_gets_hint() {
        let err = recon_err(ReconError::InvalidRecord {
            source: roadinv_recon::Source::Inventory,
            line: 3,
            road_id: "A".into(),
            reason: "negative length (-1)".into(),
        });
        assert_eq!(err.code, crate::exit_codes::EXIT_RECON_INVALID_RECORD);
        assert!(err.message.contains("line 3"));
        assert!(err.hint.unwrap().contains("skip"));
    }
}
