use crate::config::InvalidRecordPolicy;
use crate::error::ReconError;
use crate::model::{Aggregation, SegmentRecord, Source};

/// Convert a length to scaled units, rounding half to even.
///
/// Returns `None` for negative, non-finite, or out-of-range values.
pub fn scale_length(length: f64, scale: i64) -> Option<i64> {
    if !length.is_finite() || length < 0.0 {
        return None;
    }
    let scaled = (length * scale as f64).round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, which itself does not fit.
    if scaled >= i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

/// Sum scaled segment lengths per road id in a single pass over `records`.
///
/// Read errors from the source are always fatal. Invalid records (empty id,
/// negative / non-finite / unparseable length) fail the pass under
/// [`InvalidRecordPolicy::Abort`] and are dropped and counted under
/// [`InvalidRecordPolicy::Skip`].
pub fn aggregate<I>(
    source: Source,
    records: I,
    scale: i64,
    policy: InvalidRecordPolicy,
) -> Result<Aggregation, ReconError>
where
    I: IntoIterator<Item = Result<SegmentRecord, ReconError>>,
{
    let mut agg = Aggregation::default();

    for item in records {
        let checked = item.and_then(|record| {
            let scaled = validate(source, &record, scale)?;
            Ok((record, scaled))
        });

        let (record, scaled) = match checked {
            Ok(v) => v,
            Err(e @ ReconError::InvalidRecord { .. }) if policy == InvalidRecordPolicy::Skip => {
                log::warn!("skipping {e}");
                agg.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match agg.totals.get_mut(&record.road_id) {
            Some(total) => {
                *total = total.checked_add(scaled).ok_or_else(|| ReconError::Overflow {
                    source,
                    road_id: record.road_id.clone(),
                })?;
            }
            None => {
                agg.totals.insert(record.road_id, scaled);
            }
        }
        agg.records += 1;
    }

    log::info!(
        "{source}: aggregated {} record(s) into {} road(s), {} skipped",
        agg.records,
        agg.totals.len(),
        agg.skipped
    );

    Ok(agg)
}

fn validate(source: Source, record: &SegmentRecord, scale: i64) -> Result<i64, ReconError> {
    let invalid = |reason: String| ReconError::InvalidRecord {
        source,
        line: record.line,
        road_id: record.road_id.clone(),
        reason,
    };

    if record.road_id.trim().is_empty() {
        return Err(invalid("missing road id".into()));
    }
    if record.length.is_nan() || record.length.is_infinite() {
        return Err(invalid(format!("length is not finite ({})", record.length)));
    }
    if record.length < 0.0 {
        return Err(invalid(format!("negative length ({})", record.length)));
    }
    scale_length(record.length, scale)
        .ok_or_else(|| invalid(format!("length {} is too large for scale {scale}", record.length)))
}
