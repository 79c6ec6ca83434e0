use super::traits::ConfigSection;
use crate::error::UitestgenError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_URL: &str = "https://the-internet.herokuapp.com/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Starting URL every run is reset to
    pub url: String,
    /// Bound on waiting for an element to become actionable
    pub action_timeout_ms: u64,
    /// Site model for the simulated oracle; the built-in demo site when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_model: Option<PathBuf>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            action_timeout_ms: 3000,
            site_model: None,
        }
    }
}

impl ConfigSection for OracleConfig {
    fn section_name() -> &'static str {
        "oracle"
    }

    fn validate(&self) -> Result<(), UitestgenError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(UitestgenError::Configuration(format!(
                "Target URL must be http(s), got '{}'",
                self.url
            )));
        }
        if self.action_timeout_ms == 0 {
            return Err(UitestgenError::Configuration(
                "Action timeout must be positive".to_string()
            ));
        }
        Ok(())
    }
}
