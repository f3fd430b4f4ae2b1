use crate::model::{Aggregation, ErrorCode, ReconSummary, ReconciliationRow, SourceStats};

/// Compute summary statistics from classified rows and the two aggregation passes.
pub fn compute_summary(
    rows: &[ReconciliationRow],
    inventory: &Aggregation,
    registry: &Aggregation,
) -> ReconSummary {
    let mut summary = ReconSummary {
        total_roads: rows.len(),
        inventory: source_stats(inventory),
        registry: source_stats(registry),
        ..ReconSummary::default()
    };

    for r in rows {
        match r.error {
            ErrorCode::NoError => summary.no_error += 1,
            ErrorCode::MilageMismatch => summary.mileage_mismatches += 1,
            ErrorCode::MissingFromRegistry => summary.missing_from_registry += 1,
            ErrorCode::MissingFromInventory => summary.missing_from_inventory += 1,
        }
    }

    summary
}

fn source_stats(agg: &Aggregation) -> SourceStats {
    SourceStats {
        records: agg.records,
        skipped: agg.skipped,
        roads: agg.totals.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(error: ErrorCode) -> ReconciliationRow {
        ReconciliationRow {
            road_id: "k".into(),
            registry_scaled: None,
            inventory_scaled: None,
            difference_scaled: None,
            error,
            scale: 10_000,
        }
    }

    #[test]
    fn summary_counts() {
        let rows = vec![
            row(ErrorCode::NoError),
            row(ErrorCode::NoError),
            row(ErrorCode::MilageMismatch),
            row(ErrorCode::MissingFromInventory),
            row(ErrorCode::MissingFromRegistry),
        ];
        let mut inventory = Aggregation::default();
        inventory.totals.insert("a".into(), 1);
        inventory.records = 4;
        inventory.skipped = 1;

        let summary = compute_summary(&rows, &inventory, &Aggregation::default());
        assert_eq!(summary.total_roads, 5);
        assert_eq!(summary.no_error, 2);
        assert_eq!(summary.mileage_mismatches, 1);
        assert_eq!(summary.missing_from_inventory, 1);
        assert_eq!(summary.missing_from_registry, 1);
        assert_eq!(summary.discrepancies(), 3);
        assert_eq!(
            summary.inventory,
            SourceStats {
                records: 4,
                skipped: 1,
                roads: 1
            }
        );
        assert_eq!(summary.registry, SourceStats::default());
    }
}
