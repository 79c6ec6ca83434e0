use thiserror::Error;

use crate::types::ActionType;

#[derive(Error, Debug)]
pub enum UitestgenError {
    /// The execution oracle itself failed (launch, navigation, teardown).
    #[error("Oracle failure: {0}")]
    Oracle(String),

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Site model error: {0}")]
    SiteModel(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, UitestgenError>;

/// A single action could not be applied to the page.
///
/// These never abort a search: the oracle records them against the step that
/// failed and stops that chromosome's run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("no element matches selector {selector}")]
    ElementNotFound { selector: String },

    #[error("timed out after {timeout_ms}ms waiting for {selector}")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("{action_type} action requires a target element")]
    MissingTarget { action_type: ActionType },

    #[error("page crashed, cannot continue execution")]
    PageCrashed,
}
