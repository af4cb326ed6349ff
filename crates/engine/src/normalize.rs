//! Source normalization: heterogeneous exports → canonical rows.
//!
//! Stock exports arrive with per-store column naming drift ("Location
//! Code" vs "Store Loc", "Total" vs "Qty On Hand"), so stock columns are
//! resolved through a declarative alias table instead of exact names. The
//! sales export has a fixed schema and is the only fatal source.

use chrono::NaiveDate;

use crate::error::AnalysisError;
use crate::model::{RawTable, SalesRecord, StockRecord, Warning};

// ---------------------------------------------------------------------------
// Stock schema mapping
// ---------------------------------------------------------------------------

/// Canonical stock field and the header substrings that resolve to it,
/// matched case-insensitively. First alias hit wins.
#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const STOCK_SCHEMA: [SchemaField; 3] = [
    SchemaField {
        canonical: "location_code",
        aliases: &["location", "store"],
    },
    SchemaField {
        canonical: "sku",
        aliases: &["sku"],
    },
    SchemaField {
        canonical: "quantity",
        aliases: &["total", "stock", "qty"],
    },
];

/// Resolve the three canonical stock columns, or name the first canonical
/// field that no header satisfies.
fn resolve_stock_columns(table: &RawTable) -> Result<[usize; 3], &'static str> {
    let mut indices = [0usize; 3];
    for (slot, field) in STOCK_SCHEMA.iter().enumerate() {
        match table.find_column(|h| field.aliases.iter().any(|a| h.contains(a))) {
            Some(idx) => indices[slot] = idx,
            None => return Err(field.canonical),
        }
    }
    Ok(indices)
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// Normalize per-store stock tables into one concatenated sequence, each
/// row tagged with its source's store. A table missing any canonical
/// column is skipped whole; a bad source never aborts the load.
pub fn normalize_stock(tables: &[(String, RawTable)]) -> (Vec<StockRecord>, Vec<Warning>) {
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (store, table) in tables {
        let [loc_idx, sku_idx, qty_idx] = match resolve_stock_columns(table) {
            Ok(indices) => indices,
            Err(canonical) => {
                warnings.push(Warning::new(
                    &table.name,
                    format!("no column matches '{canonical}'; source skipped"),
                ));
                continue;
            }
        };

        let mut dropped = 0usize;
        for row in &table.rows {
            let sku = table.cell(row, sku_idx).trim();
            if sku.is_empty() {
                dropped += 1;
                continue;
            }
            let Some(quantity) = parse_quantity(table.cell(row, qty_idx)) else {
                dropped += 1;
                continue;
            };
            records.push(StockRecord {
                location_code: table.cell(row, loc_idx).trim().to_string(),
                sku: sku.to_string(),
                quantity,
                store: store.clone(),
                category: None,
            });
        }

        if dropped > 0 {
            warnings.push(Warning::new(
                &table.name,
                format!("dropped {dropped} row(s) with missing SKU or non-numeric quantity"),
            ));
        }
    }

    (records, warnings)
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

const SALES_COLUMNS: [&str; 5] = [
    "Ordernumber",
    "Orderdate",
    "ItemSKU",
    "ItemPrice",
    "ItemOrdered",
];

/// Normalize the sales export. Columns are fixed; a missing column is an
/// error because sales is the fatal source. Rows with unparseable dates or
/// quantities are dropped and counted.
pub fn normalize_sales(table: &RawTable) -> Result<(Vec<SalesRecord>, Vec<Warning>), AnalysisError> {
    let mut indices = [0usize; 5];
    for (slot, name) in SALES_COLUMNS.iter().enumerate() {
        indices[slot] = table.column(name).ok_or_else(|| AnalysisError::MissingColumn {
            table: table.name.clone(),
            column: (*name).to_string(),
        })?;
    }
    let [order_idx, date_idx, sku_idx, price_idx, qty_idx] = indices;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in &table.rows {
        let order_id = table.cell(row, order_idx).trim().to_string();
        let sku = table.cell(row, sku_idx).trim();
        if order_id.is_empty() || sku.is_empty() {
            dropped += 1;
            continue;
        }
        let Some(order_date) = parse_date_day_first(table.cell(row, date_idx)) else {
            dropped += 1;
            continue;
        };
        let Some(quantity) = parse_quantity(table.cell(row, qty_idx)) else {
            dropped += 1;
            continue;
        };
        let unit_price = parse_price(table.cell(row, price_idx));

        let pos_code: String = order_id.chars().take(4).collect();
        records.push(SalesRecord {
            order_id,
            order_date,
            sku: sku.to_string(),
            unit_price,
            quantity,
            pos_code,
            store: None,
        });
    }

    let mut warnings = Vec::new();
    if dropped > 0 {
        warnings.push(Warning::new(
            &table.name,
            format!("dropped {dropped} row(s) with unparseable date, quantity, or blank key"),
        ));
    }

    Ok((records, warnings))
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Day-first date convention, the format the POS exports use. ISO accepted
/// for round-tripped files.
pub fn parse_date_day_first(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(v, format) {
            return Some(date);
        }
    }
    None
}

pub fn parse_quantity(value: &str) -> Option<i64> {
    let v = value.trim().replace(',', "");
    if v.is_empty() {
        return None;
    }
    v.parse::<i64>()
        .ok()
        .or_else(|| v.parse::<f64>().ok().map(|f| f.round() as i64))
}

pub fn parse_price(value: &str) -> Option<f64> {
    let v = value.trim().replace(',', "");
    if v.is_empty() {
        return None;
    }
    v.parse::<f64>().ok().filter(|p| p.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn stock_columns_resolve_by_alias() {
        let t = table(
            "amb",
            &["Location Code", "SKU", "Total"],
            &[&["AMB-WH", "TS-001", "40"]],
        );
        let (records, warnings) = normalize_stock(&[("AMB".into(), t)]);
        assert!(warnings.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store, "AMB");
        assert_eq!(records[0].quantity, 40);
    }

    #[test]
    fn stock_columns_drifted_names() {
        // Column drift across store exports must still resolve
        let t = table(
            "bsb",
            &["Store Loc", "Item SKU", "Qty On Hand"],
            &[&["BSB-WH", "TS-001", "12"]],
        );
        let (records, warnings) = normalize_stock(&[("BSB".into(), t)]);
        assert!(warnings.is_empty());
        assert_eq!(records[0].location_code, "BSB-WH");
        assert_eq!(records[0].quantity, 12);
    }

    #[test]
    fn stock_source_missing_quantity_skipped_others_survive() {
        let bad = table("bad", &["Location", "SKU"], &[&["X", "TS-001"]]);
        let good = table(
            "good",
            &["Location", "SKU", "Total"],
            &[&["Y", "TS-002", "7"]],
        );
        let (records, warnings) =
            normalize_stock(&[("AMB".into(), bad), ("BSB".into(), good)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "TS-002");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("quantity"));
    }

    #[test]
    fn stock_non_numeric_quantity_drops_row_only() {
        let t = table(
            "amb",
            &["Location", "SKU", "Total"],
            &[&["A", "TS-001", "n/a"], &["A", "TS-002", "5"]],
        );
        let (records, warnings) = normalize_stock(&[("AMB".into(), t)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "TS-002");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("dropped 1"));
    }

    fn sales_table(rows: &[&[&str]]) -> RawTable {
        table(
            "export",
            &["Ordernumber", "Orderdate", "ItemSKU", "ItemPrice", "ItemOrdered"],
            rows,
        )
    }

    #[test]
    fn sales_basic() {
        let t = sales_table(&[&["AMB1-0001", "15/01/2025", "TS-001", "150000", "2"]]);
        let (records, warnings) = normalize_sales(&t).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.pos_code, "AMB1");
        assert_eq!(r.order_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(r.quantity, 2);
        assert!(r.store.is_none());
    }

    #[test]
    fn sales_day_first_not_month_first() {
        let t = sales_table(&[&["AMB1-0001", "02/03/2025", "TS-001", "100", "1"]]);
        let (records, _) = normalize_sales(&t).unwrap();
        assert_eq!(records[0].order_date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn sales_bad_date_dropped_not_fatal() {
        let t = sales_table(&[
            &["AMB1-0001", "not a date", "TS-001", "100", "1"],
            &["AMB1-0002", "16/01/2025", "TS-002", "100", "3"],
        ]);
        let (records, warnings) = normalize_sales(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "TS-002");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("dropped 1"));
    }

    #[test]
    fn sales_missing_column_is_fatal() {
        let t = table(
            "export",
            &["Ordernumber", "Orderdate", "ItemSKU", "ItemPrice"],
            &[],
        );
        let err = normalize_sales(&t).unwrap_err();
        assert!(err.to_string().contains("ItemOrdered"));
    }

    #[test]
    fn pos_code_tolerates_short_and_non_numeric_ids() {
        let t = sales_table(&[
            &["AB", "15/01/2025", "TS-001", "100", "1"],
            &["XY-99-123", "15/01/2025", "TS-002", "100", "1"],
        ]);
        let (records, _) = normalize_sales(&t).unwrap();
        assert_eq!(records[0].pos_code, "AB");
        assert_eq!(records[1].pos_code, "XY-9");
    }

    #[test]
    fn quantity_parser_accepts_thousands_separator() {
        assert_eq!(parse_quantity("1,250"), Some(1250));
        assert_eq!(parse_quantity(" 12 "), Some(12));
        assert_eq!(parse_quantity("3.0"), Some(3));
        assert_eq!(parse_quantity("n/a"), None);
        assert_eq!(parse_quantity(""), None);
    }
}
