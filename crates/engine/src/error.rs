use std::fmt;

#[derive(Debug)]
pub enum AnalysisError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad thresholds, no stock sources, etc.).
    ConfigValidation(String),
    /// The sales export cannot be read. Fatal — no analysis is possible.
    SalesSourceUnavailable { path: String, reason: String },
    /// A required column is missing from a fatal source.
    MissingColumn { table: String, column: String },
    /// No sales rows inside the requested scope; aborts this render only.
    NoSalesData { scope: String },
    /// The requested store scope matches no lookup entry or stock source.
    UnknownStore(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SalesSourceUnavailable { path, reason } => {
                write!(f, "sales source '{path}' unavailable: {reason}")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::NoSalesData { scope } => {
                write!(f, "no sales data in scope '{scope}'")
            }
            Self::UnknownStore(store) => write!(f, "unknown store: {store}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}
