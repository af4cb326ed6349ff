//! Stock-health classification: the single, ordered rule table every view
//! derives status from. Earlier revisions of this tool carried two drifting
//! threshold schemes; this 6-way table is the one canonical policy.

use crate::config::ThresholdConfig;
use crate::model::StockStatus;

/// Classify one aggregated (stock, AMS, month-cover) triple. Rules are
/// evaluated top to bottom, first match wins; the final rule is a catch-all
/// so every input lands in exactly one status.
pub fn classify(total_stock: i64, ams: f64, month_cover: f64, t: &ThresholdConfig) -> StockStatus {
    let rules = [
        (total_stock > 0 && ams == 0.0, StockStatus::NewDeadStock),
        (month_cover < t.critical, StockStatus::Critical),
        (month_cover < t.reorder, StockStatus::NeedReorder),
        (month_cover <= t.healthy, StockStatus::Healthy),
        (month_cover <= t.buffer, StockStatus::GoodBuffer),
    ];

    for (hit, status) in rules {
        if hit {
            return status;
        }
    }
    StockStatus::Overstock
}

/// Target-buffer replenishment heuristic, reported only for the reorder
/// band (Critical / Need Reorder): top up to 1.5 months of cover when
/// below one month, otherwise half a month's sales.
pub fn suggested_reorder(status: StockStatus, total_stock: i64, ams: f64, month_cover: f64) -> f64 {
    match status {
        StockStatus::Critical | StockStatus::NeedReorder => {
            if month_cover < 1.0 {
                (ams * 1.5 - total_stock as f64).max(0.0)
            } else {
                (ams * 0.5).max(0.0)
            }
        }
        _ => 0.0,
    }
}
