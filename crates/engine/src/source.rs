//! Source loading and the raw-load cache.
//!
//! The spreadsheet service itself is an external collaborator; this layer
//! consumes its CSV exports. Failure policy per the error taxonomy: the
//! sales export is fatal when unreadable, every other source degrades to a
//! warning and a partial result.

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::lookup;
use crate::model::{AnalysisInput, RawTable, Warning};
use crate::normalize;

// ---------------------------------------------------------------------------
// CSV → RawTable
// ---------------------------------------------------------------------------

/// Parse CSV text into the raw header + string-cell shape.
pub fn load_table(name: &str, csv_text: &str) -> Result<RawTable, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AnalysisError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AnalysisError::Io(e.to_string()))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable {
        name: name.to_string(),
        headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Config-driven load
// ---------------------------------------------------------------------------

/// The raw tables of one load, before normalization. This is the unit the
/// cache holds.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub sales: RawTable,
    /// (store tag, table) per accepted stock source.
    pub stock: Vec<(String, RawTable)>,
    pub stores: Option<RawTable>,
    pub skus: Option<RawTable>,
}

/// Read every configured source relative to `base_dir`. Sales unreadable ⇒
/// error; a stock or lookup source unreadable ⇒ skipped with a warning.
pub fn load_sources(
    config: &AnalysisConfig,
    base_dir: &Path,
) -> Result<(SourceTables, Vec<Warning>), AnalysisError> {
    let mut warnings = Vec::new();

    let sales_path = base_dir.join(&config.sources.sales);
    let sales_text = std::fs::read_to_string(&sales_path).map_err(|e| {
        AnalysisError::SalesSourceUnavailable {
            path: sales_path.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    let sales = load_table(&config.sources.sales, &sales_text)?;

    let mut stock = Vec::new();
    for source in &config.sources.stock {
        let path = base_dir.join(&source.file);
        match std::fs::read_to_string(&path) {
            Ok(text) => match load_table(&source.file, &text) {
                Ok(table) => stock.push((source.store.clone(), table)),
                Err(e) => warnings.push(Warning::new(
                    &source.file,
                    format!("unreadable stock source skipped: {e}"),
                )),
            },
            Err(e) => warnings.push(Warning::new(
                &source.file,
                format!("stock source for '{}' unavailable: {e}", source.store),
            )),
        }
    }

    let stores = load_optional(base_dir, &config.lookups.stores, &mut warnings);
    let skus = match &config.lookups.skus {
        Some(file) => load_optional(base_dir, file, &mut warnings),
        None => None,
    };

    Ok((
        SourceTables {
            sales,
            stock,
            stores,
            skus,
        },
        warnings,
    ))
}

fn load_optional(base_dir: &Path, file: &str, warnings: &mut Vec<Warning>) -> Option<RawTable> {
    let path = base_dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) => match load_table(file, &text) {
            Ok(table) => Some(table),
            Err(e) => {
                warnings.push(Warning::new(file, format!("lookup unreadable: {e}")));
                None
            }
        },
        Err(e) => {
            warnings.push(Warning::new(file, format!("lookup unavailable: {e}")));
            None
        }
    }
}

/// Normalize raw tables into engine input. Lookup problems degrade to
/// warnings; only a malformed sales schema errors.
pub fn build_input(tables: &SourceTables) -> Result<(AnalysisInput, Vec<Warning>), AnalysisError> {
    let mut warnings = Vec::new();

    let (stores, mut w) = match &tables.stores {
        Some(t) => lookup::store_lookup(t),
        None => Default::default(),
    };
    warnings.append(&mut w);

    let (catalog, mut w) = match &tables.skus {
        Some(t) => lookup::sku_catalog(t),
        None => Default::default(),
    };
    warnings.append(&mut w);

    let (sales, mut w) = normalize::normalize_sales(&tables.sales)?;
    warnings.append(&mut w);

    let (stock, mut w) = normalize::normalize_stock(&tables.stock);
    warnings.append(&mut w);

    Ok((
        AnalysisInput {
            sales,
            stock,
            stores,
            catalog,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Raw-load cache
// ---------------------------------------------------------------------------

/// Time-bounded read-through cache for the raw load. The key is the absence
/// of parameters: one slot, refreshed when older than the TTL. Scope and
/// view filtering are recomputed on every request and never cached.
pub struct TableCache {
    ttl: Duration,
    slot: Mutex<Option<(Instant, SourceTables)>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached tables, loading through `load` when the slot is
    /// empty or stale. A failed reload leaves any stale value evicted.
    pub fn get_or_load(
        &self,
        load: impl FnOnce() -> Result<SourceTables, AnalysisError>,
    ) -> Result<SourceTables, AnalysisError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AnalysisError::Io("cache lock poisoned".into()))?;

        if let Some((loaded_at, tables)) = slot.as_ref() {
            if loaded_at.elapsed() < self.ttl {
                return Ok(tables.clone());
            }
        }

        *slot = None;
        let tables = load()?;
        *slot = Some((Instant::now(), tables.clone()));
        Ok(tables)
    }

    /// Drop the cached load so the next request re-reads the sources.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
