use shelfwatch_engine::model::{SkuAnalysisRecord, StockStatus, INFINITE_COVER};

use crate::util;

/// Table sort order, cycled from the dashboard with `o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Status priority (Critical first), then cover ascending.
    Urgency,
    Cover,
    Stock,
    Value,
    Sku,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            Self::Urgency => Self::Cover,
            Self::Cover => Self::Stock,
            Self::Stock => Self::Value,
            Self::Value => Self::Sku,
            Self::Sku => Self::Urgency,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::Cover => "cover",
            Self::Stock => "stock",
            Self::Value => "value",
            Self::Sku => "sku",
        }
    }
}

pub fn sort_records(records: &mut [SkuAnalysisRecord], key: SortKey) {
    match key {
        SortKey::Urgency => records.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then(a.month_cover.total_cmp(&b.month_cover))
        }),
        SortKey::Cover => records.sort_by(|a, b| a.month_cover.total_cmp(&b.month_cover)),
        SortKey::Stock => records.sort_by(|a, b| b.total_stock.cmp(&a.total_stock)),
        SortKey::Value => records.sort_by(|a, b| b.stock_value.total_cmp(&a.stock_value)),
        SortKey::Sku => records.sort_by(|a, b| a.sku.cmp(&b.sku)),
    }
}

/// Display-ready table data: pre-formatted cells and per-column widths
/// (display columns, clamped to [3, 40]).
pub struct DashTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    /// Status per row, for coloring.
    pub statuses: Vec<StockStatus>,
    pub col_widths: Vec<usize>,
}

pub const TABLE_HEADERS: [&str; 8] = [
    "SKU", "Category", "Stock", "Qty 3mo", "AMS", "Cover", "Suggest", "Status",
];

fn format_cover(cover: f64) -> String {
    if cover == INFINITE_COVER {
        "n/a".to_string()
    } else {
        format!("{cover:.2}")
    }
}

pub fn build_table(records: &[SkuAnalysisRecord]) -> DashTable {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.sku.clone(),
                r.category.clone().unwrap_or_default(),
                r.total_stock.to_string(),
                r.qty_3mo.to_string(),
                format!("{:.2}", r.ams),
                format_cover(r.month_cover),
                format!("{:.0}", r.suggested_reorder),
                r.status.as_str().to_string(),
            ]
        })
        .collect();

    let statuses = records.iter().map(|r| r.status).collect();

    let col_widths = (0..TABLE_HEADERS.len())
        .map(|c| {
            let header_w = util::display_width(TABLE_HEADERS[c]);
            let max_cell = rows
                .iter()
                .map(|row| util::display_width(&row[c]))
                .max()
                .unwrap_or(0);
            header_w.max(max_cell).clamp(3, 40)
        })
        .collect();

    DashTable {
        headers: TABLE_HEADERS.to_vec(),
        rows,
        statuses,
        col_widths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str, status: StockStatus, cover: f64, stock: i64, value: f64) -> SkuAnalysisRecord {
        SkuAnalysisRecord {
            sku: sku.into(),
            store: None,
            category: Some("Tops".into()),
            total_stock: stock,
            qty_3mo: 0,
            ams: 1.0,
            month_cover: cover,
            status,
            suggested_reorder: 0.0,
            stock_value: value,
        }
    }

    #[test]
    fn urgency_sort_critical_first() {
        let mut records = vec![
            record("a", StockStatus::Overstock, 5.0, 1, 1.0),
            record("b", StockStatus::Critical, 0.2, 1, 1.0),
            record("c", StockStatus::Critical, 0.1, 1, 1.0),
        ];
        sort_records(&mut records, SortKey::Urgency);
        assert_eq!(records[0].sku, "c");
        assert_eq!(records[1].sku, "b");
        assert_eq!(records[2].sku, "a");
    }

    #[test]
    fn value_sort_descending() {
        let mut records = vec![
            record("a", StockStatus::Healthy, 1.0, 1, 10.0),
            record("b", StockStatus::Healthy, 1.0, 1, 30.0),
        ];
        sort_records(&mut records, SortKey::Value);
        assert_eq!(records[0].sku, "b");
    }

    #[test]
    fn sort_key_cycle_returns() {
        let mut key = SortKey::Urgency;
        for _ in 0..5 {
            key = key.next();
        }
        assert_eq!(key, SortKey::Urgency);
    }

    #[test]
    fn table_formats_sentinel_cover() {
        let t = build_table(&[record("a", StockStatus::NewDeadStock, INFINITE_COVER, 7, 1.0)]);
        assert_eq!(t.rows[0][5], "n/a");
        assert_eq!(t.statuses[0], StockStatus::NewDeadStock);
    }

    #[test]
    fn table_widths_cover_headers_and_cells() {
        let t = build_table(&[record("VERY-LONG-SKU-CODE-1", StockStatus::Healthy, 1.0, 7, 1.0)]);
        assert_eq!(t.col_widths[0], "VERY-LONG-SKU-CODE-1".len());
        // Numeric columns never collapse below the header width
        assert!(t.col_widths[2] >= "Stock".len());
    }

    #[test]
    fn empty_table() {
        let t = build_table(&[]);
        assert!(t.rows.is_empty());
        assert_eq!(t.col_widths.len(), TABLE_HEADERS.len());
    }
}
