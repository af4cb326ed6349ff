//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — replenishment scripts and
//! cron jobs rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error (unspecified)              |
//! | 2     | Universal | CLI usage error (bad args, missing file) |
//! | 3-9   | analysis  | Inventory-analysis codes                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use shelfwatch_engine::AnalysisError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Analysis (3-9)
// =============================================================================

/// Critical SKUs present in the analysis result.
/// The scriptable replenishment gate: `shelfwatch run && deploy` stops here.
pub const EXIT_CRITICAL_STOCK: u8 = 3;

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// A fatal source problem: sales export unreadable or missing a required
/// column. Stock and lookup sources never trigger this; they degrade to
/// warnings.
pub const EXIT_SOURCE: u8 = 5;

/// No sales rows inside the requested scope.
pub const EXIT_NO_SALES: u8 = 6;

/// The requested store scope matches no lookup entry or stock source.
pub const EXIT_UNKNOWN_STORE: u8 = 7;

/// Map an engine error to its exit code.
pub fn analysis_exit_code(err: &AnalysisError) -> u8 {
    match err {
        AnalysisError::ConfigParse(_) | AnalysisError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        AnalysisError::SalesSourceUnavailable { .. } | AnalysisError::MissingColumn { .. } => {
            EXIT_SOURCE
        }
        AnalysisError::NoSalesData { .. } => EXIT_NO_SALES,
        AnalysisError::UnknownStore(_) => EXIT_UNKNOWN_STORE,
        AnalysisError::Io(_) => EXIT_ERROR,
    }
}
