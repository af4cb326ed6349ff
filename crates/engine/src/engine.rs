//! The reconciliation pass: store assignment, rolling window, sales/stock
//! aggregation, allow-list filtering, stock-driven join, derived metrics.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::classify::{classify, suggested_reorder};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::model::{
    AnalysisInput, AnalysisMeta, AnalysisResult, SalesRecord, Scope, SkuAnalysisRecord,
    StockRecord, Warning, INFINITE_COVER,
};
use crate::summary::compute_summary;

/// Run one analysis pass over pre-normalized input, scoped to one store or
/// to all stores. Pure over its inputs: the reference date comes from the
/// data, never from the wall clock.
pub fn run(
    config: &AnalysisConfig,
    input: &AnalysisInput,
    scope: &Scope,
) -> Result<AnalysisResult, AnalysisError> {
    let mut warnings = Vec::new();

    // 1. Store assignment via POS-code prefix
    let sales = assign_stores(&input.sales, input);
    let unmapped = sales.iter().filter(|r| r.store.is_none()).count();
    if unmapped > 0 {
        warnings.push(Warning::new(
            "sales",
            format!("{unmapped} row(s) have no store mapping; excluded from store scopes"),
        ));
    }

    if let Scope::Store(name) = scope {
        let known = input.stores.values().any(|v| v == name)
            || input.stock.iter().any(|s| &s.store == name);
        if !known {
            return Err(AnalysisError::UnknownStore(name.clone()));
        }
    }

    // 2. Scope filters. Unmapped sales rows participate only in AllStores.
    let scoped_sales: Vec<&SalesRecord> = sales
        .iter()
        .filter(|r| match scope {
            Scope::AllStores => true,
            Scope::Store(name) => r.store.as_deref() == Some(name.as_str()),
        })
        .collect();
    let scoped_stock: Vec<&StockRecord> = input
        .stock
        .iter()
        .filter(|r| match scope {
            Scope::AllStores => true,
            Scope::Store(name) => &r.store == name,
        })
        .collect();

    // 3. Rolling window anchored at the latest order date in scope
    let reference_date = scoped_sales
        .iter()
        .map(|r| r.order_date)
        .max()
        .ok_or_else(|| AnalysisError::NoSalesData {
            scope: scope.label().to_string(),
        })?;
    let window_start = reference_date - Duration::days(config.thresholds.window_days);

    // 4. Allow-list: a non-empty catalog restricts both sides
    let allow_list_active = !input.catalog.is_empty();
    let allowed = |sku: &str| !allow_list_active || input.catalog.contains_key(sku);

    // 5. Aggregate sales per SKU within the window
    struct SalesAgg {
        qty: i64,
        price_sum: f64,
        price_count: usize,
    }
    let mut sales_agg: BTreeMap<&str, SalesAgg> = BTreeMap::new();
    for r in &scoped_sales {
        if r.order_date < window_start || !allowed(&r.sku) {
            continue;
        }
        let entry = sales_agg.entry(r.sku.as_str()).or_insert(SalesAgg {
            qty: 0,
            price_sum: 0.0,
            price_count: 0,
        });
        entry.qty += r.quantity;
        if let Some(price) = r.unit_price {
            entry.price_sum += price;
            entry.price_count += 1;
        }
    }

    // 6. Aggregate stock per SKU; duplicate rows sum
    let mut stock_agg: BTreeMap<&str, i64> = BTreeMap::new();
    for r in &scoped_stock {
        if !allowed(&r.sku) {
            continue;
        }
        *stock_agg.entry(r.sku.as_str()).or_insert(0) += r.quantity;
    }

    // Mean window price per SKU, and the median of those means as the
    // fallback for SKUs that sold at no observable price
    let mean_price = |agg: &SalesAgg| -> Option<f64> {
        (agg.price_count > 0).then(|| agg.price_sum / agg.price_count as f64)
    };
    let mut observed: Vec<f64> = sales_agg.values().filter_map(mean_price).collect();
    let fallback_price = median(&mut observed).unwrap_or(0.0);

    // Months in the rolling window; 90 days → 3, the AMS denominator
    let window_months = config.thresholds.window_days as f64 / 30.0;

    // 7. Left join driven by stock: every stocked SKU appears exactly once
    let mut records = Vec::with_capacity(stock_agg.len());
    for (sku, total_stock) in &stock_agg {
        let (qty_3mo, price) = match sales_agg.get(sku) {
            Some(agg) => (agg.qty, mean_price(agg)),
            None => (0, None),
        };
        let ams = qty_3mo as f64 / window_months;
        let month_cover = if ams > 0.0 {
            *total_stock as f64 / ams
        } else {
            INFINITE_COVER
        };
        let status = classify(*total_stock, ams, month_cover, &config.thresholds);

        records.push(SkuAnalysisRecord {
            sku: (*sku).to_string(),
            store: match scope {
                Scope::AllStores => None,
                Scope::Store(name) => Some(name.clone()),
            },
            category: input.catalog.get(*sku).cloned(),
            total_stock: *total_stock,
            qty_3mo,
            ams,
            month_cover,
            status,
            suggested_reorder: suggested_reorder(status, *total_stock, ams, month_cover),
            stock_value: *total_stock as f64 * price.unwrap_or(fallback_price),
        });
    }

    let summary = compute_summary(&records, reference_date);

    Ok(AnalysisResult {
        meta: AnalysisMeta {
            config_name: config.name.clone(),
            scope: scope.label().to_string(),
            reference_date,
            window_start,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
        warnings,
    })
}

/// Resolve each sales row's store through the POS-code lookup.
fn assign_stores(sales: &[SalesRecord], input: &AnalysisInput) -> Vec<SalesRecord> {
    sales
        .iter()
        .map(|r| {
            let mut r = r.clone();
            r.store = input.stores.get(&r.pos_code).cloned();
            r
        })
        .collect()
}

/// Median of an unsorted slice; `None` when empty.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// All store names known to an input, for scope pickers: lookup names
/// first, then stock-source tags not already present.
pub fn store_names(input: &AnalysisInput) -> Vec<String> {
    let mut names: Vec<String> = input.stores.values().cloned().collect();
    names.sort();
    names.dedup();
    for r in &input.stock {
        if !names.contains(&r.store) {
            names.push(r.store.clone());
        }
    }
    names
}
