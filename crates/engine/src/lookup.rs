//! Lookup tables: POS code → store name, SKU → category.
//!
//! Both resolvers fail softly — a malformed table yields an empty map plus
//! a warning, never an error into the reconciliation step.

use crate::model::{RawTable, SkuCatalog, StoreLookup, Warning};

/// Parse the store dictionary. Requires a `POS` column; when the `Store`
/// column is absent the POS code itself is used as the display name.
pub fn store_lookup(table: &RawTable) -> (StoreLookup, Vec<Warning>) {
    let mut warnings = Vec::new();

    let Some(pos_idx) = table.column("POS") else {
        warnings.push(Warning::new(
            &table.name,
            "missing 'POS' column; store lookup disabled",
        ));
        return (StoreLookup::new(), warnings);
    };

    let store_idx = table.column("Store");
    if store_idx.is_none() {
        warnings.push(Warning::new(
            &table.name,
            "missing 'Store' column; using POS codes as display names",
        ));
    }

    let mut lookup = StoreLookup::new();
    for row in &table.rows {
        let pos = table.cell(row, pos_idx).trim();
        if pos.is_empty() {
            continue;
        }
        let name = store_idx
            .map(|i| table.cell(row, i).trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(pos);
        lookup.insert(pos.to_string(), name.to_string());
    }

    (lookup, warnings)
}

/// Parse the SKU dictionary (`SKU`, `SKU_Category`). A non-empty catalog is
/// also the analysis allow-list.
pub fn sku_catalog(table: &RawTable) -> (SkuCatalog, Vec<Warning>) {
    let mut warnings = Vec::new();

    let Some(sku_idx) = table.column("SKU") else {
        warnings.push(Warning::new(
            &table.name,
            "missing 'SKU' column; catalog disabled",
        ));
        return (SkuCatalog::new(), warnings);
    };

    let category_idx = table.column("SKU_Category");
    if category_idx.is_none() {
        warnings.push(Warning::new(
            &table.name,
            "missing 'SKU_Category' column; categories will be blank",
        ));
    }

    let mut catalog = SkuCatalog::new();
    for row in &table.rows {
        let sku = table.cell(row, sku_idx).trim();
        if sku.is_empty() {
            continue;
        }
        let category = category_idx
            .map(|i| table.cell(row, i).trim())
            .unwrap_or("");
        catalog.insert(sku.to_string(), category.to_string());
    }

    (catalog, warnings)
}
