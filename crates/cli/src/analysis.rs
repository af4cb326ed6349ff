//! `shelfwatch run` / `shelfwatch validate` — config-driven analysis passes.

use std::path::{Path, PathBuf};

use shelfwatch_engine::config::AnalysisConfig;
use shelfwatch_engine::model::{Scope, StockStatus};
use shelfwatch_engine::source::{build_input, load_sources};
use shelfwatch_engine::{AnalysisError, AnalysisResult, ViewFilter};

use crate::exit_codes::{analysis_exit_code, EXIT_CRITICAL_STOCK, EXIT_SOURCE};
use crate::report;
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    pub store: Option<String>,
    pub category: Option<String>,
    pub status: Vec<String>,
    pub min_cover: Option<f64>,
    pub max_cover: Option<f64>,
    pub min_stock: Option<i64>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

fn engine_err(err: AnalysisError) -> CliError {
    CliError {
        code: analysis_exit_code(&err),
        message: err.to_string(),
        hint: None,
    }
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    AnalysisConfig::from_toml(&config_str).map_err(engine_err)
}

/// Build a [`ViewFilter`] from the run flags. Status spellings are the
/// display names or their snake/kebab forms.
pub fn parse_filter(
    category: Option<String>,
    status: &[String],
    min_cover: Option<f64>,
    max_cover: Option<f64>,
    min_stock: Option<i64>,
) -> Result<ViewFilter, CliError> {
    let mut statuses = Vec::with_capacity(status.len());
    for s in status {
        match StockStatus::parse(s) {
            Some(parsed) => statuses.push(parsed),
            None => {
                let known: Vec<&str> = StockStatus::ALL.iter().map(|s| s.as_str()).collect();
                return Err(CliError::args(format!("unknown status: \"{s}\""))
                    .with_hint(format!("known statuses: {}", known.join(", "))));
            }
        }
    }

    Ok(ViewFilter {
        category,
        statuses,
        min_cover,
        max_cover,
        min_stock,
    })
}

/// One full pass: load sources relative to the config's directory,
/// normalize, run the engine. Load-time warnings are folded into the
/// result so every consumer sees the whole picture.
pub fn run_once(
    config: &AnalysisConfig,
    base_dir: &Path,
    scope: &Scope,
) -> Result<AnalysisResult, CliError> {
    let (tables, load_warnings) = load_sources(config, base_dir).map_err(engine_err)?;
    let (input, build_warnings) = build_input(&tables).map_err(engine_err)?;

    let mut result = shelfwatch_engine::run(config, &input, scope).map_err(engine_err)?;

    let mut warnings = load_warnings;
    warnings.extend(build_warnings);
    warnings.append(&mut result.warnings);
    result.warnings = warnings;

    Ok(result)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    let filter = parse_filter(
        args.category,
        &args.status,
        args.min_cover,
        args.max_cover,
        args.min_stock,
    )?;

    let scope = match args.store {
        Some(store) => Scope::Store(store),
        None => Scope::AllStores,
    };
    let base_dir = args.config.parent().unwrap_or_else(|| Path::new("."));

    let mut result = run_once(&config, base_dir, &scope)?;

    // The replenishment gate looks at the whole scope, not the filtered view
    let critical = result
        .records
        .iter()
        .filter(|r| r.status == StockStatus::Critical)
        .count();

    if !filter.is_empty() {
        result.records = filter.apply(&result.records);
    }

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = args.csv {
        let csv_str = report::render_csv(&result.records, result.meta.scope.as_str())?;
        std::fs::write(path, csv_str)
            .map_err(|e| CliError::io(format!("cannot write CSV: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    report::print_summary(&result);

    if critical > 0 {
        return Err(CliError {
            code: EXIT_CRITICAL_STOCK,
            message: format!("{critical} SKU(s) at critical stock level"),
            hint: None,
        });
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // A validated config must still name readable files to be useful; check
    // only the fatal one, everything else degrades at run time.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let sales_path = base_dir.join(&config.sources.sales);
    if !sales_path.is_file() {
        return Err(CliError {
            code: EXIT_SOURCE,
            message: format!("sales source '{}' not found", sales_path.display()),
            hint: None,
        });
    }

    eprintln!(
        "valid: '{}' with {} stock source(s), lookups: stores{}",
        config.name,
        config.sources.stock.len(),
        if config.lookups.skus.is_some() {
            " + skus"
        } else {
            ""
        },
    );
    Ok(())
}
