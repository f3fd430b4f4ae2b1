use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReconError;
use crate::model::{ErrorCode, ReconciliationRow};

/// Merge inventory and registry totals into one classified row per road id.
///
/// Rows come out sorted by road id. Comparison happens on the scaled
/// integers; `tolerance` is in the same scaled units (0 = exact).
/// Fails if `registry - inventory` does not fit in an i64.
pub fn reconcile(
    inventory: &BTreeMap<String, i64>,
    registry: &BTreeMap<String, i64>,
    scale: i64,
    tolerance: i64,
) -> Result<Vec<ReconciliationRow>, ReconError> {
    let all_ids: BTreeSet<&String> = inventory.keys().chain(registry.keys()).collect();

    all_ids
        .into_iter()
        .map(|id| {
            let inv = inventory.get(id).copied();
            let reg = registry.get(id).copied();
            let (error, difference_scaled) =
                classify(reg, inv, tolerance).ok_or_else(|| ReconError::DifferenceOverflow {
                    road_id: id.clone(),
                })?;
            Ok(ReconciliationRow {
                road_id: id.clone(),
                registry_scaled: reg,
                inventory_scaled: inv,
                difference_scaled,
                error,
                scale,
            })
        })
        .collect()
}

/// `None` when the difference overflows.
fn classify(
    registry: Option<i64>,
    inventory: Option<i64>,
    tolerance: i64,
) -> Option<(ErrorCode, Option<i64>)> {
    let classified = match (registry, inventory) {
        (None, Some(_)) => (ErrorCode::MissingFromRegistry, None),
        (Some(_), None) => (ErrorCode::MissingFromInventory, None),
        (Some(reg), Some(inv)) => {
            let diff = reg.checked_sub(inv)?;
            if diff.unsigned_abs() <= tolerance.unsigned_abs() {
                (ErrorCode::NoError, Some(diff))
            } else {
                (ErrorCode::MilageMismatch, Some(diff))
            }
        }
        (None, None) => unreachable!("road id came from neither source"),
    };
    Some(classified)
}
