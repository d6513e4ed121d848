use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rule catalog not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("failed to read rule catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid rule catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("rule catalog defines no rules")]
    Empty,
}
