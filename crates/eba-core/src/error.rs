use thiserror::Error;

#[derive(Debug, Error)]
pub enum EbaError {
    #[error("'sloctl' is not installed or not in PATH; install it from https://docs.nobl9.com/sloctl/")]
    SloctlNotInstalled,

    #[error("sloctl {command} failed: {stderr}")]
    SloctlFailed { command: String, stderr: String },

    #[error("sloctl {0} returned no output")]
    SloctlEmptyOutput(String),

    #[error("no contexts available: configure one with 'sloctl config add-context'")]
    NoContexts,

    #[error("unknown context '{0}'")]
    UnknownContext(String),

    #[error("invalid SLO data: {0}")]
    InvalidSloData(String),

    #[error("selection is empty: pick at least one SLO")]
    EmptySelection,

    #[error("invalid batch size {0}: must be at least 1")]
    InvalidBatchSize(usize),

    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EbaError>;
