use serde::Deserialize;

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,
    pub sources: SourcesConfig,
    pub lookups: LookupsConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Explicit role → file mapping. Replaces the legacy practice of sniffing
/// spreadsheet names for "export_" / "Source_*" substrings; see
/// [`assign_roles`] for the compatibility path.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Sales export. Unreadable ⇒ fatal, no analysis possible.
    pub sales: String,
    /// Per-store stock exports. Unreadable ⇒ that store is skipped.
    pub stock: Vec<StockSourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockSourceConfig {
    pub store: String,
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupsConfig {
    /// POS code → store name table.
    pub stores: String,
    /// SKU → category table. Optional; when present and non-empty the
    /// analysis is restricted to SKUs it names.
    #[serde(default)]
    pub skus: Option<String>,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Month-cover boundaries for the classification rule table, plus the
/// rolling sales window. All overridable from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_reorder")]
    pub reorder: f64,
    #[serde(default = "default_healthy")]
    pub healthy: f64,
    #[serde(default = "default_buffer")]
    pub buffer: f64,
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

fn default_critical() -> f64 {
    0.5
}
fn default_reorder() -> f64 {
    1.0
}
fn default_healthy() -> f64 {
    1.5
}
fn default_buffer() -> f64 {
    3.0
}
fn default_window_days() -> i64 {
    90
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            reorder: default_reorder(),
            healthy: default_healthy(),
            buffer: default_buffer(),
            window_days: default_window_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Raw-load cache time-to-live. Scope filtering is never cached.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AnalysisConfig {
    pub fn from_toml(input: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig =
            toml::from_str(input).map_err(|e| AnalysisError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sources.stock.is_empty() {
            return Err(AnalysisError::ConfigValidation(
                "at least one stock source is required".into(),
            ));
        }

        let mut seen: Vec<&str> = Vec::new();
        for source in &self.sources.stock {
            if seen.contains(&source.store.as_str()) {
                return Err(AnalysisError::ConfigValidation(format!(
                    "duplicate stock source for store '{}'",
                    source.store
                )));
            }
            seen.push(&source.store);
        }

        let t = &self.thresholds;
        let ordered =
            t.critical > 0.0 && t.critical < t.reorder && t.reorder < t.healthy && t.healthy < t.buffer;
        if !ordered {
            return Err(AnalysisError::ConfigValidation(format!(
                "thresholds must be strictly increasing: critical={} reorder={} healthy={} buffer={}",
                t.critical, t.reorder, t.healthy, t.buffer
            )));
        }

        if t.window_days <= 0 {
            return Err(AnalysisError::ConfigValidation(format!(
                "window_days must be positive, got {}",
                t.window_days
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Legacy name-based discovery
// ---------------------------------------------------------------------------

/// Role assignment produced by the legacy name protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub sales: Option<String>,
    /// (store tag, resource name) pairs.
    pub stock: Vec<(String, String)>,
    pub unassigned: Vec<String>,
}

const STORE_TAGS: [(&str, &str); 3] = [
    ("source_amb", "AMB"),
    ("source_bsb", "BSB"),
    ("source_mcd", "MCD"),
];

/// Assign spreadsheet resources to roles by the legacy substring protocol:
/// a name containing "export_" (and not "xlsx") is the sales source, names
/// containing "source_amb" / "source_bsb" / "source_mcd" are per-store
/// stock sources. Case-insensitive; a later sales candidate replaces an
/// earlier one, matching the behavior this tool inherits. Kept only so
/// `discover` can draft an explicit config from an old folder layout.
pub fn assign_roles(names: &[String]) -> RoleAssignment {
    let mut assignment = RoleAssignment::default();

    for name in names {
        let lower = name.to_lowercase();

        if lower.contains("export_") && !lower.contains("xlsx") {
            if let Some(previous) = assignment.sales.replace(name.clone()) {
                assignment.unassigned.push(previous);
            }
            continue;
        }

        if let Some((_, tag)) = STORE_TAGS.iter().find(|(pat, _)| lower.contains(pat)) {
            assignment.stock.push(((*tag).to_string(), name.clone()));
            continue;
        }

        assignment.unassigned.push(name.clone());
    }

    assignment
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Flagship Stores"

[sources]
sales = "export_orders.csv"
stock = [
    { store = "AMB", file = "source_amb.csv" },
    { store = "BSB", file = "source_bsb.csv" },
]

[lookups]
stores = "store_kamus.csv"
skus = "sku_kamus.csv"
"#;

    #[test]
    fn parse_valid() {
        let config = AnalysisConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Flagship Stores");
        assert_eq!(config.sources.stock.len(), 2);
        assert_eq!(config.lookups.skus.as_deref(), Some("sku_kamus.csv"));
        assert_eq!(config.thresholds.critical, 0.5);
        assert_eq!(config.thresholds.buffer, 3.0);
        assert_eq!(config.thresholds.window_days, 90);
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn parse_threshold_overrides() {
        let input = format!(
            r#"{VALID}

[thresholds]
reorder = 1.2
buffer = 4.0

[cache]
ttl_secs = 300
"#
        );
        let config = AnalysisConfig::from_toml(&input).unwrap();
        assert_eq!(config.thresholds.reorder, 1.2);
        assert_eq!(config.thresholds.buffer, 4.0);
        // Unset fields keep defaults
        assert_eq!(config.thresholds.critical, 0.5);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn reject_no_stock_sources() {
        let input = r#"
name = "Bad"

[sources]
sales = "export.csv"
stock = []

[lookups]
stores = "kamus.csv"
"#;
        let err = AnalysisConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("stock source"));
    }

    #[test]
    fn reject_duplicate_store() {
        let input = r#"
name = "Bad"

[sources]
sales = "export.csv"
stock = [
    { store = "AMB", file = "a.csv" },
    { store = "AMB", file = "b.csv" },
]

[lookups]
stores = "kamus.csv"
"#;
        let err = AnalysisConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn reject_unordered_thresholds() {
        let input = format!(
            r#"{VALID}

[thresholds]
reorder = 0.4
"#
        );
        let err = AnalysisConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn assign_roles_by_name() {
        let names: Vec<String> = [
            "export_2024_q3",
            "Source_AMB stock",
            "Source_BSB stock",
            "Source_MCD stock",
            "export_backup.xlsx",
            "notes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let assignment = assign_roles(&names);
        assert_eq!(assignment.sales.as_deref(), Some("export_2024_q3"));
        assert_eq!(assignment.stock.len(), 3);
        assert_eq!(assignment.stock[0], ("AMB".into(), "Source_AMB stock".into()));
        // xlsx exports and unrelated files fall through
        assert_eq!(
            assignment.unassigned,
            vec!["export_backup.xlsx".to_string(), "notes".to_string()]
        );
    }

    #[test]
    fn assign_roles_later_sales_wins() {
        let names: Vec<String> =
            vec!["export_old".into(), "export_new".into()];
        let assignment = assign_roles(&names);
        assert_eq!(assignment.sales.as_deref(), Some("export_new"));
        assert_eq!(assignment.unassigned, vec!["export_old".to_string()]);
    }
}
