//! Per-request view filtering over classified records. Always recomputed —
//! only the raw load behind it is cached.

use crate::model::{SkuAnalysisRecord, StockStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    pub category: Option<String>,
    /// Empty means all statuses pass.
    pub statuses: Vec<StockStatus>,
    pub min_cover: Option<f64>,
    pub max_cover: Option<f64>,
    pub min_stock: Option<i64>,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, r: &SkuAnalysisRecord) -> bool {
        if let Some(ref category) = self.category {
            if r.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&r.status) {
            return false;
        }
        if let Some(min) = self.min_cover {
            if r.month_cover < min {
                return false;
            }
        }
        if let Some(max) = self.max_cover {
            if r.month_cover > max {
                return false;
            }
        }
        if let Some(min) = self.min_stock {
            if r.total_stock < min {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, records: &[SkuAnalysisRecord]) -> Vec<SkuAnalysisRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str, status: StockStatus, cover: f64, stock: i64, category: Option<&str>) -> SkuAnalysisRecord {
        SkuAnalysisRecord {
            sku: sku.into(),
            store: None,
            category: category.map(String::from),
            total_stock: stock,
            qty_3mo: 0,
            ams: 0.0,
            month_cover: cover,
            status,
            suggested_reorder: 0.0,
            stock_value: 0.0,
        }
    }

    #[test]
    fn empty_filter_passes_everything() {
        let f = ViewFilter::default();
        assert!(f.is_empty());
        assert!(f.matches(&record("a", StockStatus::Overstock, 999.0, 0, None)));
    }

    #[test]
    fn status_filter() {
        let f = ViewFilter {
            statuses: vec![StockStatus::Critical, StockStatus::NeedReorder],
            ..Default::default()
        };
        assert!(f.matches(&record("a", StockStatus::Critical, 0.2, 5, None)));
        assert!(!f.matches(&record("b", StockStatus::Healthy, 1.2, 5, None)));
    }

    #[test]
    fn cover_band_and_min_stock() {
        let f = ViewFilter {
            min_cover: Some(1.0),
            max_cover: Some(3.0),
            min_stock: Some(10),
            ..Default::default()
        };
        assert!(f.matches(&record("a", StockStatus::Healthy, 1.5, 10, None)));
        assert!(!f.matches(&record("b", StockStatus::Critical, 0.5, 10, None)));
        assert!(!f.matches(&record("c", StockStatus::Overstock, 5.0, 10, None)));
        assert!(!f.matches(&record("d", StockStatus::Healthy, 1.5, 9, None)));
    }

    #[test]
    fn category_filter() {
        let f = ViewFilter {
            category: Some("Tops".into()),
            ..Default::default()
        };
        assert!(f.matches(&record("a", StockStatus::Healthy, 1.0, 1, Some("Tops"))));
        assert!(!f.matches(&record("b", StockStatus::Healthy, 1.0, 1, Some("Bottoms"))));
        // Uncategorized records never match a category filter
        assert!(!f.matches(&record("c", StockStatus::Healthy, 1.0, 1, None)));
    }

    #[test]
    fn apply_preserves_order() {
        let records = vec![
            record("a", StockStatus::Critical, 0.1, 5, None),
            record("b", StockStatus::Healthy, 1.2, 5, None),
            record("c", StockStatus::Critical, 0.3, 5, None),
        ];
        let f = ViewFilter {
            statuses: vec![StockStatus::Critical],
            ..Default::default()
        };
        let out = f.apply(&records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].sku, "a");
        assert_eq!(out[1].sku, "c");
    }
}
