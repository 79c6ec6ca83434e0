//! Execution oracle: the component that applies actions to a live target and
//! reports what happened.
//!
//! A browser driver is one implementation; [`simulated::SimulatedSite`] is an
//! in-process one driven by a site model.

pub mod discovery;
pub mod fingerprint;
pub mod simulated;

pub use discovery::discover_elements;
pub use fingerprint::{MarkupFingerprint, StateFingerprint, UrlFingerprint};
pub use simulated::{SimulatedSite, SiteModel};

use crate::engines::generation::chromosome::Chromosome;
use crate::error::{ExecutionError, Result, UitestgenError};
use crate::types::{Action, PageState, UIElement};
use serde::{Deserialize, Serialize};

/// HTTP response with an error status observed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorEvent {
    pub status: u16,
    pub url: String,
}

/// Uncaught script exception or console error observed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsErrorEvent {
    pub url: String,
    pub message: String,
}

/// Application signals collected by the oracle between two `take_events` calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEvents {
    pub http_errors: Vec<HttpErrorEvent>,
    pub js_errors: Vec<JsErrorEvent>,
    pub crashed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    pub step: usize,
    pub action: String,
    pub error: ExecutionError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub step: usize,
    pub action: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Everything observed while replaying one chromosome.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Distinct URLs in first-visit order
    pub urls: Vec<String>,
    /// Initial state followed by the state after every applied action
    pub states: Vec<PageState>,
    pub execution_errors: Vec<ExecutionFailure>,
    pub js_errors: Vec<JsErrorEvent>,
    pub http_errors: Vec<HttpErrorEvent>,
    pub crashed: bool,
    pub action_results: Vec<ActionResult>,
}

impl RunResult {
    pub fn completed(&self) -> bool {
        self.execution_errors.is_empty() && !self.crashed
    }
}

/// A single stateful session against the target application.
///
/// Implementations provide the primitive operations; [`ExecutionOracle::run`]
/// composes them into the replay protocol. Errors returned as
/// [`UitestgenError`] are tool failures and abort the whole search; per-action
/// problems are [`ExecutionError`]s and only end the current run.
pub trait ExecutionOracle {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Return to the starting URL with a fresh page.
    fn reset(&mut self) -> Result<()>;

    fn current_elements(&mut self) -> Result<Vec<UIElement>>;

    fn current_url(&self) -> String;

    fn execute(&mut self, action: &Action) -> std::result::Result<(), ExecutionError>;

    fn capture_state(&mut self) -> std::result::Result<PageState, ExecutionError>;

    fn is_crashed(&self) -> bool;

    /// Drain the application signals seen since the previous call.
    fn take_events(&mut self) -> PageEvents;

    /// Replay `chromosome` from the current page, stopping at the first
    /// action that cannot be applied.
    fn run(&mut self, chromosome: &Chromosome) -> Result<RunResult> {
        // Signals raised while loading the baseline page are not the chromosome's doing
        let _ = self.take_events();

        let mut result = RunResult::default();
        result.urls.push(self.current_url());
        let initial = self.capture_state().map_err(|e| {
            UitestgenError::Oracle(format!("cannot capture the starting page: {}", e))
        })?;
        result.states.push(initial);

        for (step, action) in chromosome.actions().iter().enumerate() {
            let outcome = if self.is_crashed() {
                Err(ExecutionError::PageCrashed)
            } else {
                self.execute(action).and_then(|_| self.capture_state())
            };

            match outcome {
                Ok(state) => {
                    let url = self.current_url();
                    if !result.urls.contains(&url) {
                        result.urls.push(url);
                    }
                    result.states.push(state);
                    result.action_results.push(ActionResult {
                        step,
                        action: action.to_string(),
                        success: true,
                        error: None,
                    });
                }
                Err(error) => {
                    log::debug!("Step {} ({}) failed: {}", step, action, error);
                    result.action_results.push(ActionResult {
                        step,
                        action: action.to_string(),
                        success: false,
                        error: Some(error.to_string()),
                    });
                    result.execution_errors.push(ExecutionFailure {
                        step,
                        action: action.to_string(),
                        error,
                    });
                    break;
                }
            }
        }

        let events = self.take_events();
        result.http_errors = events.http_errors;
        result.js_errors = events.js_errors;
        result.crashed = events.crashed || self.is_crashed();

        Ok(result)
    }
}
