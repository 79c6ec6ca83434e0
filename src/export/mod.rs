//! Output of a finished search: the Playwright replay script for the best
//! chromosome and an optional JSON report of the whole run.

pub mod playwright;

pub use playwright::PlaywrightEmitter;

use crate::config::AppConfig;
use crate::engines::generation::{EliteChromosome, GenerationStats, SearchOutcome};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Machine-readable record of a search, written next to the replay script
#[derive(Serialize)]
pub struct SearchReport<'a> {
    pub schema_version: &'static str,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub config: &'a AppConfig,
    pub best: Option<BestSummary>,
    pub hall_of_fame: &'a [EliteChromosome],
    pub generations: &'a [GenerationStats],
}

/// Best chromosome flattened to its printable steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSummary {
    pub fitness: Option<f64>,
    pub steps: Vec<String>,
}

impl<'a> SearchReport<'a> {
    pub fn new(config: &'a AppConfig, outcome: &'a SearchOutcome) -> Self {
        let best = outcome.best.as_ref().map(|chromosome| BestSummary {
            fitness: chromosome.fitness(),
            steps: chromosome.actions().iter().map(ToString::to_string).collect(),
        });

        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            config,
            best,
            hall_of_fame: &outcome.hall_of_fame,
            generations: &outcome.generations,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Wrote search report to {}", path.as_ref().display());
        Ok(())
    }
}
