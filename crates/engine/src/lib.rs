//! `shelfwatch-engine` — inventory-health analysis engine.
//!
//! Pure engine crate: receives pre-loaded tabular exports, returns
//! classified per-SKU records. No CLI or terminal dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod filter;
pub mod error;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod source;
pub mod summary;

pub use config::AnalysisConfig;
pub use engine::run;
pub use error::AnalysisError;
pub use filter::ViewFilter;
pub use model::{AnalysisInput, AnalysisResult, Scope, SkuAnalysisRecord, StockStatus};
