use std::path::{Path, PathBuf};

use crate::aggregate::aggregate;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{Aggregation, ReconMeta, ReconResult, SegmentRecord, Source};
use crate::reconcile::reconcile;
use crate::source::CsvSegmentReader;
use crate::summary::compute_summary;

/// Run reconciliation over two record streams. Each stream is consumed once.
pub fn run<I, R>(config: &ReconConfig, inventory: I, registry: R) -> Result<ReconResult, ReconError>
where
    I: IntoIterator<Item = Result<SegmentRecord, ReconError>>,
    R: IntoIterator<Item = Result<SegmentRecord, ReconError>>,
{
    let policy = config.records.on_invalid;
    let inventory = aggregate(Source::Inventory, inventory, config.scale, policy)?;
    let registry = aggregate(Source::Registry, registry, config.scale, policy)?;
    finish(config, &inventory, &registry)
}

/// Read both sources from disk (paths relative to `base_dir`) and reconcile.
pub fn run_files(config: &ReconConfig, base_dir: &Path) -> Result<ReconResult, ReconError> {
    let inventory = aggregate_file(config, Source::Inventory, base_dir)?;
    let registry = aggregate_file(config, Source::Registry, base_dir)?;
    finish(config, &inventory, &registry)
}

/// Aggregate one source file. The file is open only for the duration of this call.
pub fn aggregate_file(
    config: &ReconConfig,
    source: Source,
    base_dir: &Path,
) -> Result<Aggregation, ReconError> {
    let source_config = config.source(source);
    let path = resolve(base_dir, &source_config.file);
    log::info!("{source}: reading {}", path.display());

    let reader = CsvSegmentReader::open(source, &path, source_config)?;
    aggregate(source, reader, config.scale, config.records.on_invalid)
}

/// Where the report goes: `override_path` if given, else `output.file`
/// resolved against `base_dir`.
pub fn report_path(
    config: &ReconConfig,
    base_dir: &Path,
    override_path: Option<&Path>,
) -> Option<PathBuf> {
    match override_path {
        Some(p) => Some(p.to_path_buf()),
        None => config.output.file.as_deref().map(|f| resolve(base_dir, f)),
    }
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn finish(
    config: &ReconConfig,
    inventory: &Aggregation,
    registry: &Aggregation,
) -> Result<ReconResult, ReconError> {
    let rows = reconcile(
        &inventory.totals,
        &registry.totals,
        config.scale,
        config.tolerance.scaled_units,
    )?;
    let summary = compute_summary(&rows, inventory, registry);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            scale: config.scale,
            tolerance_scaled: config.tolerance.scaled_units,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;

    const CONFIG: &str = r#"
name = "unit"
[inventory]
file = "inv.csv"
[registry]
file = "reg.csv"
"#;

    fn rec(id: &str, length: f64) -> Result<SegmentRecord, ReconError> {
        Ok(SegmentRecord::new(id, length))
    }

    #[test]
    fn run_in_memory() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run(
            &config,
            vec![rec("A", 2.00005), rec("A", 1.00005)],
            vec![rec("A", 3.0), rec("B", 4.5)],
        )
        .unwrap();

        assert_eq!(result.meta.scale, 10_000);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].error, ErrorCode::MilageMismatch);
        assert_eq!(result.rows[0].difference_scaled, Some(-1));
        assert_eq!(result.rows[1].error, ErrorCode::MissingFromInventory);
        assert_eq!(result.summary.discrepancies(), 2);
        assert_eq!(result.summary.inventory.records, 2);
        assert_eq!(result.summary.registry.roads, 2);
    }

    #[test]
    fn run_empty() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run(&config, Vec::new(), Vec::new()).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.summary.total_roads, 0);
    }

    #[test]
    fn run_files_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inv.csv"), "AH_roadid,RoadLength\nA,1.5\n").unwrap();
        std::fs::write(dir.path().join("reg.csv"), "AH_RoadID,AH_Length\nA,1.5\n").unwrap();

        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run_files(&config, dir.path()).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].error, ErrorCode::NoError);
    }

    #[test]
    fn run_files_missing_registry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inv.csv"), "AH_roadid,RoadLength\nA,1.5\n").unwrap();

        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let err = run_files(&config, dir.path()).unwrap_err();
        assert!(matches!(err, ReconError::SourceRead { source: Source::Registry, .. }));
        assert!(err.to_string().starts_with("registry:"));
    }

    #[test]
    fn report_path_precedence() {
        let mut config = ReconConfig::from_toml(CONFIG).unwrap();
        let base = Path::new("/data/county");
        assert_eq!(report_path(&config, base, None), None);

        config.output.file = Some("out.csv".into());
        assert_eq!(
            report_path(&config, base, None),
            Some(PathBuf::from("/data/county/out.csv"))
        );
        assert_eq!(
            report_path(&config, base, Some(Path::new("elsewhere.csv"))),
            Some(PathBuf::from("elsewhere.csv"))
        );
    }
}
