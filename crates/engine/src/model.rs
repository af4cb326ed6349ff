use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Month-cover sentinel for SKUs with no recent sales. Means "unbounded
/// cover", not a real ratio — never produced by an actual division.
pub const INFINITE_COVER: f64 = 999.0;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One tabular export as delivered by the spreadsheet source: a header row
/// plus string cells. No schema is enforced at this layer.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the first header satisfying `pred` (applied lowercased).
    pub fn find_column(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| pred(&h.trim().to_lowercase()))
    }

    /// Index of a header by case-insensitive exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        let want = name.to_lowercase();
        self.find_column(|h| h == want)
    }

    pub fn cell<'a>(&'a self, row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Normalized rows
// ---------------------------------------------------------------------------

/// A single normalized sales transaction row.
#[derive(Debug, Clone)]
pub struct SalesRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub sku: String,
    /// `None` when the price cell is blank or unparseable; the row still
    /// counts toward quantities.
    pub unit_price: Option<f64>,
    pub quantity: i64,
    /// Leading 4 characters of the order id. String prefix — order ids are
    /// not numeric.
    pub pos_code: String,
    /// Store display name via the store lookup. `None` when the POS code
    /// has no lookup entry.
    pub store: Option<String>,
}

/// A single normalized on-hand stock row, tagged with the store of its
/// originating source table (never derived from the row itself).
#[derive(Debug, Clone)]
pub struct StockRecord {
    pub location_code: String,
    pub sku: String,
    pub quantity: i64,
    pub store: String,
    pub category: Option<String>,
}

/// POS code → store display name.
pub type StoreLookup = BTreeMap<String, String>;

/// SKU → category label. Non-empty catalogs double as an allow-list.
pub type SkuCatalog = BTreeMap<String, String>;

/// Pre-normalized inputs for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub sales: Vec<SalesRecord>,
    pub stock: Vec<StockRecord>,
    pub stores: StoreLookup,
    pub catalog: SkuCatalog,
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Store scope for one analysis pass. Sales rows with no resolved store are
/// excluded from single-store scopes but participate in `AllStores`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AllStores,
    Store(String),
}

impl Scope {
    pub fn label(&self) -> &str {
        match self {
            Self::AllStores => "All Stores",
            Self::Store(name) => name,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Replenishment status. Variant order is display/sort priority: the most
/// urgent statuses sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Critical,
    NeedReorder,
    Healthy,
    GoodBuffer,
    Overstock,
    NewDeadStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 6] = [
        Self::Critical,
        Self::NeedReorder,
        Self::Healthy,
        Self::GoodBuffer,
        Self::Overstock,
        Self::NewDeadStock,
    ];

    /// Parse a user-supplied status name: display form or snake/kebab case.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_lowercase().replace(['-', '_'], " ");
        match v.as_str() {
            "critical" => Some(Self::Critical),
            "need reorder" | "reorder" => Some(Self::NeedReorder),
            "healthy" => Some(Self::Healthy),
            "good buffer" | "buffer" => Some(Self::GoodBuffer),
            "overstock" => Some(Self::Overstock),
            "new/dead stock" | "new dead stock" | "dead stock" | "dead" => {
                Some(Self::NewDeadStock)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::NeedReorder => "Need Reorder",
            Self::Healthy => "Healthy",
            Self::GoodBuffer => "Good Buffer",
            Self::Overstock => "Overstock",
            Self::NewDeadStock => "New/Dead Stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Analysis output
// ---------------------------------------------------------------------------

/// The central aggregate: one row per SKU within the requested scope.
#[derive(Debug, Clone, Serialize)]
pub struct SkuAnalysisRecord {
    pub sku: String,
    /// Store for single-store scopes; `None` in the all-stores scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub total_stock: i64,
    pub qty_3mo: i64,
    pub ams: f64,
    pub month_cover: f64,
    pub status: StockStatus,
    pub suggested_reorder: f64,
    pub stock_value: f64,
}

/// Metric-card figures for the dashboard header.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub active_skus: usize,
    pub total_stock_qty: i64,
    pub total_stock_value: f64,
    pub healthy_ratio_pct: f64,
    pub last_sales_date: NaiveDate,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMeta {
    pub config_name: String,
    pub scope: String,
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    pub engine_version: String,
    pub run_at: String,
}

/// A non-fatal problem absorbed during load or normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub source: String,
    pub message: String,
}

impl Warning {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub meta: AnalysisMeta,
    pub summary: AnalysisSummary,
    pub records: Vec<SkuAnalysisRecord>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_sort_priority() {
        let mut statuses = vec![
            StockStatus::Overstock,
            StockStatus::NewDeadStock,
            StockStatus::Critical,
            StockStatus::Healthy,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                StockStatus::Critical,
                StockStatus::Healthy,
                StockStatus::Overstock,
                StockStatus::NewDeadStock,
            ]
        );
    }

    #[test]
    fn status_parse_accepts_cli_spellings() {
        assert_eq!(StockStatus::parse("critical"), Some(StockStatus::Critical));
        assert_eq!(StockStatus::parse("need-reorder"), Some(StockStatus::NeedReorder));
        assert_eq!(StockStatus::parse("Need Reorder"), Some(StockStatus::NeedReorder));
        assert_eq!(StockStatus::parse("good_buffer"), Some(StockStatus::GoodBuffer));
        assert_eq!(StockStatus::parse("dead"), Some(StockStatus::NewDeadStock));
        assert_eq!(StockStatus::parse("New/Dead Stock"), Some(StockStatus::NewDeadStock));
        assert_eq!(StockStatus::parse("bogus"), None);
    }

    #[test]
    fn find_column_is_case_insensitive() {
        let table = RawTable {
            name: "t".into(),
            headers: vec!["Location Code".into(), "SKU".into(), "Total".into()],
            rows: vec![],
        };
        assert_eq!(table.column("sku"), Some(1));
        assert_eq!(table.find_column(|h| h.contains("location")), Some(0));
        assert_eq!(table.column("missing"), None);
    }
}
