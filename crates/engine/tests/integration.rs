use std::path::PathBuf;

use shelfwatch_engine::config::AnalysisConfig;
use shelfwatch_engine::engine::{run, store_names};
use shelfwatch_engine::model::{Scope, StockStatus, INFINITE_COVER};
use shelfwatch_engine::source::{build_input, load_sources};
use shelfwatch_engine::{AnalysisError, AnalysisInput, ViewFilter};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture_input() -> (AnalysisConfig, AnalysisInput, Vec<String>) {
    let dir = fixtures_dir();
    let config_str = std::fs::read_to_string(dir.join("flagship.toml")).unwrap();
    let config = AnalysisConfig::from_toml(&config_str).unwrap();

    let (tables, load_warnings) = load_sources(&config, &dir).unwrap();
    let (input, build_warnings) = build_input(&tables).unwrap();

    let warnings = load_warnings
        .iter()
        .chain(build_warnings.iter())
        .map(|w| w.to_string())
        .collect();

    (config, input, warnings)
}

// -------------------------------------------------------------------------
// Load + normalize
// -------------------------------------------------------------------------

#[test]
fn fixture_load_absorbs_bad_sources_and_rows() {
    let (_, input, warnings) = load_fixture_input();

    // source_mcd.csv has no quantity-like column and is skipped whole;
    // the other two stock sources survive
    assert!(warnings.iter().any(|w| w.contains("source_mcd.csv")));
    assert_eq!(input.stock.len(), 5);
    assert!(input.stock.iter().all(|r| r.store != "MCD"));

    // one sales row has an unparseable date
    assert!(warnings.iter().any(|w| w.contains("dropped 1")));
    assert_eq!(input.sales.len(), 8);

    assert_eq!(input.stores.len(), 3);
    assert_eq!(input.catalog.len(), 5);
}

#[test]
fn drifted_stock_columns_resolve_per_source() {
    let (_, input, _) = load_fixture_input();
    let bsb: Vec<_> = input.stock.iter().filter(|r| r.store == "BSB").collect();
    assert_eq!(bsb.len(), 2);
    assert_eq!(bsb[0].location_code, "BSB-WH");
}

// -------------------------------------------------------------------------
// All-stores analysis
// -------------------------------------------------------------------------

#[test]
fn all_stores_analysis() {
    let (config, input, _) = load_fixture_input();
    let result = run(&config, &input, &Scope::AllStores).unwrap();

    // Reference date is the latest parseable order date, not wall clock
    assert_eq!(result.meta.reference_date.to_string(), "2025-03-31");
    assert_eq!(result.meta.window_start.to_string(), "2024-12-31");
    assert_eq!(result.meta.scope, "All Stores");

    // Join is stock-driven: TS-003 sells but has no stock anywhere
    assert!(result.records.iter().all(|r| r.sku != "TS-003"));
    let skus: Vec<&str> = result.records.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, vec!["DR-001", "SLOW-9", "TS-001", "TS-002"]);

    let by_sku = |sku: &str| result.records.iter().find(|r| r.sku == sku).unwrap();

    // TS-001: the out-of-window 500-unit row is excluded
    let ts1 = by_sku("TS-001");
    assert_eq!(ts1.total_stock, 30);
    assert_eq!(ts1.qty_3mo, 60);
    assert_eq!(ts1.ams, 20.0);
    assert_eq!(ts1.month_cover, 1.5);
    assert_eq!(ts1.status, StockStatus::Healthy);

    // TS-002 includes the row whose POS code has no store mapping
    let ts2 = by_sku("TS-002");
    assert_eq!(ts2.qty_3mo, 65);
    assert_eq!(ts2.status, StockStatus::GoodBuffer);

    // SLOW-9: stocked, zero sales → sentinel cover, dead stock
    let slow = by_sku("SLOW-9");
    assert_eq!(slow.month_cover, INFINITE_COVER);
    assert_eq!(slow.status, StockStatus::NewDeadStock);
    // No window price → median of the other SKUs' mean prices
    assert_eq!(slow.stock_value, 70.0 * 120_000.0);

    let dr = by_sku("DR-001");
    assert_eq!(dr.status, StockStatus::Healthy);
    assert_eq!(dr.category.as_deref(), Some("Dresses"));

    assert_eq!(result.summary.active_skus, 4);
    assert_eq!(result.summary.total_stock_qty, 144);
    assert_eq!(result.summary.healthy_ratio_pct, 50.0);
    assert_eq!(result.summary.last_sales_date.to_string(), "2025-03-31");
}

// -------------------------------------------------------------------------
// Store scopes
// -------------------------------------------------------------------------

#[test]
fn store_scope_recomputes_everything() {
    let (config, input, _) = load_fixture_input();
    let result = run(&config, &input, &Scope::Store("AMB".into())).unwrap();

    let by_sku = |sku: &str| result.records.iter().find(|r| r.sku == sku).unwrap();

    // TS-001 at AMB only: stock 5, window qty 30 → cover 0.5 → Need Reorder
    let ts1 = by_sku("TS-001");
    assert_eq!(ts1.total_stock, 5);
    assert_eq!(ts1.qty_3mo, 30);
    assert_eq!(ts1.month_cover, 0.5);
    assert_eq!(ts1.status, StockStatus::NeedReorder);
    assert_eq!(ts1.suggested_reorder, 10.0);
    assert_eq!(ts1.store.as_deref(), Some("AMB"));

    // BSB stock does not leak into the AMB scope
    assert!(result.records.iter().all(|r| r.sku != "DR-001"));
}

#[test]
fn store_with_skipped_source_and_no_sales_aborts_render() {
    let (config, input, _) = load_fixture_input();
    // MCD is a known store (lookup entry) but its stock source was skipped
    // and it has no sales rows
    let err = run(&config, &input, &Scope::Store("MCD".into())).unwrap_err();
    assert!(matches!(err, AnalysisError::NoSalesData { .. }));
}

#[test]
fn store_names_from_fixture() {
    let (_, input, _) = load_fixture_input();
    assert_eq!(
        store_names(&input),
        vec!["AMB".to_string(), "BSB".into(), "MCD".into()]
    );
}

// -------------------------------------------------------------------------
// View filtering
// -------------------------------------------------------------------------

#[test]
fn view_filter_is_recomputed_per_request() {
    let (config, input, _) = load_fixture_input();
    let result = run(&config, &input, &Scope::AllStores).unwrap();

    let filter = ViewFilter {
        statuses: vec![StockStatus::NewDeadStock],
        ..Default::default()
    };
    let dead = filter.apply(&result.records);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].sku, "SLOW-9");

    let filter = ViewFilter {
        category: Some("Tops".into()),
        min_stock: Some(31),
        ..Default::default()
    };
    let heavy_tops = filter.apply(&result.records);
    assert_eq!(heavy_tops.len(), 1);
    assert_eq!(heavy_tops[0].sku, "TS-002");
}

// -------------------------------------------------------------------------
// Threshold overrides
// -------------------------------------------------------------------------

#[test]
fn threshold_overrides_reclassify() {
    let (mut config, input, _) = load_fixture_input();
    // Stretch the healthy band: 1.5 cover is now merely adequate buffer
    config.thresholds.healthy = 1.2;
    config.thresholds.buffer = 5.0;

    let result = run(&config, &input, &Scope::AllStores).unwrap();
    let ts1 = result.records.iter().find(|r| r.sku == "TS-001").unwrap();
    assert_eq!(ts1.month_cover, 1.5);
    assert_eq!(ts1.status, StockStatus::GoodBuffer);
}
