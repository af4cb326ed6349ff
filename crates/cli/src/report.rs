//! Human summary and CSV export for analysis results.
//!
//! Summaries and warnings go to stderr; artifacts (JSON, CSV) go to stdout
//! or files so the command stays pipeline-friendly.

use shelfwatch_engine::model::{AnalysisResult, SkuAnalysisRecord, StockStatus};

use crate::CliError;

/// Print the metric-card summary to stderr.
pub fn print_summary(result: &AnalysisResult) {
    let s = &result.summary;
    let m = &result.meta;

    eprintln!(
        "{} '{}': {} active SKU(s), {} units on hand (value {:.0})",
        m.scope, m.config_name, s.active_skus, s.total_stock_qty, s.total_stock_value,
    );
    eprintln!(
        "window: {} .. {} (last sale {}), healthy ratio {:.1}%",
        m.window_start, m.reference_date, s.last_sales_date, s.healthy_ratio_pct,
    );

    for status in StockStatus::ALL {
        if let Some(count) = s.status_counts.get(status.as_str()) {
            if *count > 0 {
                eprintln!("  {:<16} {}", status.as_str(), count);
            }
        }
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
}

pub const CSV_HEADERS: [&str; 8] = [
    "SKU",
    "Status",
    "Store",
    "Total stock",
    "3-month qty",
    "AMS",
    "Month cover",
    "Stock value",
];

/// Render records as the CSV export. `scope_label` fills the Store column
/// for records without a per-store attribution.
pub fn render_csv(records: &[SkuAnalysisRecord], scope_label: &str) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| CliError::io(format!("CSV write error: {e}")))?;

    for r in records {
        let total_stock = r.total_stock.to_string();
        let qty_3mo = r.qty_3mo.to_string();
        let ams = format!("{:.2}", r.ams);
        let cover = format!("{:.2}", r.month_cover);
        let value = format!("{:.0}", r.stock_value);
        writer
            .write_record([
                r.sku.as_str(),
                r.status.as_str(),
                r.store.as_deref().unwrap_or(scope_label),
                total_stock.as_str(),
                qty_3mo.as_str(),
                ams.as_str(),
                cover.as_str(),
                value.as_str(),
            ])
            .map_err(|e| CliError::io(format!("CSV write error: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::io(format!("CSV write error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CliError::io(format!("CSV encoding error: {e}")))
}
