use super::traits::ConfigSection;
use crate::error::UitestgenError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options for the replay script written for the best chromosome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub headless: bool,
    pub echo_source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            headless: false,
            echo_source: true,
            output: None,
        }
    }
}

impl ConfigSection for ExportConfig {
    fn section_name() -> &'static str {
        "export"
    }

    fn validate(&self) -> Result<(), UitestgenError> {
        if let Some(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(UitestgenError::Configuration(
                    "Export output path is empty".to_string()
                ));
            }
        }
        Ok(())
    }
}
