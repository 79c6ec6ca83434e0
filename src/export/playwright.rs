//! Replay script generation.
//!
//! Turns a finished chromosome into a standalone Playwright (Python) script
//! that opens the target URL and issues the same actions, addressing elements
//! with the same selector priority the search used.

use crate::config::ExportConfig;
use crate::error::{Result, UitestgenError};
use crate::types::{Action, ActionType};
use std::path::Path;

/// Pixel offset of a targetless scroll
pub const PAGE_SCROLL_OFFSET: u32 = 500;

pub struct PlaywrightEmitter {
    url: String,
    headless: bool,
    echo_source: bool,
}

impl PlaywrightEmitter {
    pub fn new(url: impl Into<String>, headless: bool, echo_source: bool) -> Self {
        Self {
            url: url.into(),
            headless,
            echo_source,
        }
    }

    pub fn from_config(url: impl Into<String>, config: &ExportConfig) -> Self {
        Self::new(url, config.headless, config.echo_source)
    }

    /// Render the script for `actions`. Echoes it to stdout when configured to.
    pub fn emit(&self, actions: &[Action]) -> Result<String> {
        let mut lines = vec![
            format!(
                "# Generated by uitestgen on {}",
                chrono::Utc::now().to_rfc3339()
            ),
            "from playwright.sync_api import sync_playwright".to_string(),
            String::new(),
            "with sync_playwright() as p:".to_string(),
            format!(
                "    browser = p.chromium.launch(headless={})",
                if self.headless { "True" } else { "False" }
            ),
            "    page = browser.new_page()".to_string(),
            format!("    page.goto({})", py_str(&self.url)),
            String::new(),
        ];

        for (step, action) in actions.iter().enumerate() {
            let line = action_line(action).map_err(|e| {
                UitestgenError::Export(format!("step {} ({}): {}", step + 1, action, e))
            })?;
            lines.push(format!("    {}", line));
        }

        // Let the page settle before closing
        lines.push(String::new());
        lines.push("    page.wait_for_load_state('networkidle')".to_string());
        lines.push("    browser.close()".to_string());

        let source = lines.join("\n") + "\n";
        if self.echo_source {
            let rule = "=".repeat(40);
            println!("\n{}\n{}{}\n", rule, source, rule);
        }
        Ok(source)
    }

    pub fn write_to<P: AsRef<Path>>(&self, actions: &[Action], path: P) -> Result<String> {
        let source = self.emit(actions)?;
        std::fs::write(path.as_ref(), &source)?;
        log::info!("Wrote replay script to {}", path.as_ref().display());
        Ok(source)
    }
}

fn action_line(action: &Action) -> std::result::Result<String, String> {
    let selector = action.selector().map(|s| py_str(&s.to_css()));

    match (action.action_type(), selector) {
        (ActionType::Click, Some(selector)) => Ok(format!("page.click({})", selector)),
        (ActionType::Edit, Some(selector)) => Ok(format!(
            "page.fill({}, {})",
            selector,
            py_str(action.data().unwrap_or_default())
        )),
        (ActionType::Scroll, Some(selector)) => Ok(format!(
            "page.locator({}).scroll_into_view_if_needed()",
            selector
        )),
        (ActionType::Scroll, None) => Ok(format!("page.mouse.wheel(0, {})", PAGE_SCROLL_OFFSET)),
        (action_type, None) => Err(format!("{} action requires a target element", action_type)),
    }
}

/// Double-quoted Python string literal
fn py_str(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{}\"", escaped)
}
