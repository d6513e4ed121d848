use thiserror::Error;

/// Hard failures of JSON extraction. Everything after extraction is total.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("model response is empty")]
    EmptyInput,

    #[error("no JSON object found in model response")]
    NoJsonObjectFound,

    #[error("model response is not valid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl RepairError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::NoJsonObjectFound => "NO_JSON_OBJECT_FOUND",
            Self::JsonParse(_) => "JSON_PARSE_ERROR",
        }
    }
}
