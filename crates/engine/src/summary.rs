use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{AnalysisSummary, SkuAnalysisRecord, StockStatus};

/// Compute the dashboard metric-card figures from classified records.
pub fn compute_summary(records: &[SkuAnalysisRecord], last_sales_date: NaiveDate) -> AnalysisSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_stock_qty = 0i64;
    let mut total_stock_value = 0.0f64;
    let mut healthy = 0usize;

    for r in records {
        *status_counts.entry(r.status.to_string()).or_insert(0) += 1;
        total_stock_qty += r.total_stock;
        total_stock_value += r.stock_value;
        if r.status == StockStatus::Healthy {
            healthy += 1;
        }
    }

    let healthy_ratio_pct = if records.is_empty() {
        0.0
    } else {
        healthy as f64 / records.len() as f64 * 100.0
    };

    AnalysisSummary {
        active_skus: records.len(),
        total_stock_qty,
        total_stock_value,
        healthy_ratio_pct,
        last_sales_date,
        status_counts,
    }
}
