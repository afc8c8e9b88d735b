use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (threshold out of range, blank column name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Required column missing from an input table. Fatal to the run.
    #[error("{table} table ({source_name}): missing column '{column}'")]
    MissingColumn {
        table: String,
        source_name: String,
        column: String,
    },
}
