//! In-process execution oracle backed by a declarative site model.
//!
//! Pages are keyed by URL and list the element candidates they render. Each
//! element carries the effects that interacting with it has: navigation, a
//! flash message, HTTP or script errors, or crashing the session. Filled-in
//! field values are part of the rendered markup, so edits produce new states.

use super::{
    discover_elements, ExecutionOracle, HttpErrorEvent, JsErrorEvent, MarkupFingerprint,
    PageEvents, StateFingerprint,
};
use crate::config::OracleConfig;
use crate::error::{ExecutionError, Result, UitestgenError};
use crate::types::{Action, ActionType, ElementType, PageState, UIElement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const NOT_FOUND_MARKUP: &str = "<h1>Not Found</h1>";

/// What happens when an element is clicked or a page is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    /// Target URL. Ignored in `on_load` effects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    pub http_errors: Vec<HttpErrorEvent>,
    pub js_errors: Vec<JsErrorEvent>,
    pub crash: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(flatten)]
    pub element: UIElement,
    #[serde(default)]
    pub effects: Effects,
}

impl ElementSpec {
    pub fn new(element: UIElement) -> Self {
        Self {
            element,
            effects: Effects::default(),
        }
    }

    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.effects.navigate = Some(url.into());
        self
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub url: String,
    #[serde(default)]
    pub markup: String,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub on_load: Effects,
}

impl PageSpec {
    pub fn new(url: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markup: markup.into(),
            elements: Vec::new(),
            on_load: Effects::default(),
        }
    }

    pub fn with_element(mut self, element: ElementSpec) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_on_load(mut self, effects: Effects) -> Self {
        self.on_load = effects;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteModel {
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

impl SiteModel {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let model: SiteModel = toml::from_str(source)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading site model from {}", path.as_ref().display());
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.url.as_str()) {
                return Err(UitestgenError::SiteModel(format!(
                    "page {} is defined more than once",
                    page.url
                )));
            }
        }
        Ok(())
    }

    /// A small login/status-code site rooted at `url`, with a few planted
    /// defects and some third-party tracker noise.
    pub fn demo(url: &str) -> Self {
        let base = url.trim_end_matches('/');
        let login = format!("{}/login", base);
        let secure = format!("{}/secure", base);
        let status = format!("{}/status_codes", base);
        let status_200 = format!("{}/status_codes/200", base);
        let status_500 = format!("{}/status_codes/500", base);

        let link = |text: &str| UIElement::new(ElementType::Link).with_text(text);

        let home = PageSpec::new(url, "<h1>Welcome to the-internet</h1><ul><li>Form Authentication</li><li>Status Codes</li></ul>")
            .with_element(ElementSpec::new(link("Form Authentication")).navigates_to(&login))
            .with_element(ElementSpec::new(link("Status Codes")).navigates_to(&status))
            .with_element(
                ElementSpec::new(link("Sponsored").with_class("promo")).with_effects(Effects {
                    flash: Some("Thanks for your interest".to_string()),
                    js_errors: vec![JsErrorEvent {
                        url: "https://www.googletagmanager.com/gtm.js".to_string(),
                        message: "Script error.".to_string(),
                    }],
                    ..Effects::default()
                }),
            );

        let login_page = PageSpec::new(&login, "<h2>Login Page</h2><form id=\"login\"></form>")
            .with_on_load(Effects {
                http_errors: vec![HttpErrorEvent {
                    status: 503,
                    url: "https://stats.doubleclick.net/pixel".to_string(),
                }],
                ..Effects::default()
            })
            .with_element(ElementSpec::new(UIElement::new(ElementType::Input).with_id("username").with_name("username")))
            .with_element(ElementSpec::new(UIElement::new(ElementType::Input).with_id("password").with_name("password")))
            .with_element(
                ElementSpec::new(UIElement::new(ElementType::Button).with_class("radius").with_text("Login"))
                    .with_effects(Effects {
                        navigate: Some(secure.clone()),
                        flash: Some("You logged into a secure area!".to_string()),
                        ..Effects::default()
                    }),
            )
            .with_element(ElementSpec::new(link("Elemental Selenium")).navigates_to("http://elementalselenium.com/"));

        let secure_page = PageSpec::new(&secure, "<h2>Secure Area</h2>")
            .with_element(
                ElementSpec::new(link("Logout").with_class("button secondary radius")).with_effects(Effects {
                    navigate: Some(login.clone()),
                    flash: Some("You logged out of the secure area!".to_string()),
                    ..Effects::default()
                }),
            )
            .with_element(
                ElementSpec::new(UIElement::new(ElementType::Button).with_id("export-report")).with_effects(Effects {
                    flash: Some("Export failed".to_string()),
                    http_errors: vec![HttpErrorEvent {
                        status: 500,
                        url: format!("{}/secure/export", base),
                    }],
                    js_errors: vec![JsErrorEvent {
                        url: format!("{}/js/app.js", base),
                        message: "TypeError: report is undefined".to_string(),
                    }],
                    ..Effects::default()
                }),
            )
            .with_element(
                ElementSpec::new(UIElement::new(ElementType::Button).with_id("delete-account")).with_effects(Effects {
                    crash: true,
                    ..Effects::default()
                }),
            );

        let status_page = PageSpec::new(&status, "<h3>Status Codes</h3>")
            .with_element(ElementSpec::new(link("200")).navigates_to(&status_200))
            .with_element(ElementSpec::new(link("500")).navigates_to(&status_500))
            .with_element(ElementSpec::new(link("Home").with_id("home")).navigates_to(url));

        let ok_page = PageSpec::new(&status_200, "<p>This page returned a 200 status code.</p>")
            .with_element(ElementSpec::new(link("here")).navigates_to(&status));

        let error_page = PageSpec::new(&status_500, "<p>This page returned a 500 status code.</p>")
            .with_on_load(Effects {
                http_errors: vec![HttpErrorEvent {
                    status: 500,
                    url: status_500.clone(),
                }],
                ..Effects::default()
            })
            .with_element(ElementSpec::new(link("here")).navigates_to(&status));

        SiteModel {
            pages: vec![home, login_page, secure_page, status_page, ok_page, error_page],
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    url: String,
    fields: BTreeMap<String, String>,
    flash: Option<String>,
    crashed: bool,
    events: PageEvents,
}

impl Session {
    fn blank() -> Self {
        Self {
            url: String::new(),
            fields: BTreeMap::new(),
            flash: None,
            crashed: false,
            events: PageEvents::default(),
        }
    }
}

fn record_events(session: &mut Session, effects: &Effects) {
    session.events.http_errors.extend(effects.http_errors.iter().cloned());
    session.events.js_errors.extend(effects.js_errors.iter().cloned());
    if effects.crash {
        session.crashed = true;
        session.events.crashed = true;
    }
}

fn navigate(pages: &HashMap<String, PageSpec>, session: &mut Session, url: &str) {
    session.url = url.to_string();
    session.fields.clear();
    session.flash = None;

    match pages.get(url) {
        Some(page) => record_events(session, &page.on_load),
        None => session.events.http_errors.push(HttpErrorEvent {
            status: 404,
            url: url.to_string(),
        }),
    }
}

fn apply_effects(pages: &HashMap<String, PageSpec>, session: &mut Session, effects: &Effects) {
    if let Some(target) = &effects.navigate {
        navigate(pages, session, target);
    }
    if let Some(flash) = &effects.flash {
        session.flash = Some(flash.clone());
    }
    record_events(session, effects);
}

/// Single simulated browser session over a [`SiteModel`].
pub struct SimulatedSite<F: StateFingerprint = MarkupFingerprint> {
    start_url: String,
    pages: HashMap<String, PageSpec>,
    fingerprint: F,
    action_timeout_ms: u64,
    session: Option<Session>,
}

impl SimulatedSite<MarkupFingerprint> {
    pub fn new(model: SiteModel, config: &OracleConfig) -> Result<Self> {
        model.validate()?;
        let pages = model
            .pages
            .into_iter()
            .map(|page| (page.url.clone(), page))
            .collect();

        Ok(Self {
            start_url: config.url.clone(),
            pages,
            fingerprint: MarkupFingerprint,
            action_timeout_ms: config.action_timeout_ms,
            session: None,
        })
    }

    pub fn demo(config: &OracleConfig) -> Result<Self> {
        Self::new(SiteModel::demo(&config.url), config)
    }

    /// Site model from `config.site_model`, or the demo site.
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        match &config.site_model {
            Some(path) => Self::new(SiteModel::load(path)?, config),
            None => Self::demo(config),
        }
    }
}

impl<F: StateFingerprint> SimulatedSite<F> {
    pub fn with_fingerprint<G: StateFingerprint>(self, fingerprint: G) -> SimulatedSite<G> {
        SimulatedSite {
            start_url: self.start_url,
            pages: self.pages,
            fingerprint,
            action_timeout_ms: self.action_timeout_ms,
            session: self.session,
        }
    }

    fn fresh_session(&self) -> Session {
        let mut session = Session::blank();
        navigate(&self.pages, &mut session, &self.start_url);
        session
    }

    fn visible_elements(&self, session: &Session) -> Vec<UIElement> {
        if session.crashed {
            return Vec::new();
        }
        match self.pages.get(&session.url) {
            Some(page) => discover_elements(page.elements.iter().map(|spec| &spec.element)),
            None => Vec::new(),
        }
    }

    fn rendered_markup(&self, session: &Session) -> String {
        let mut markup = self
            .pages
            .get(&session.url)
            .map(|page| page.markup.clone())
            .unwrap_or_else(|| NOT_FOUND_MARKUP.to_string());

        if let Some(flash) = &session.flash {
            markup.push_str(&format!("<div id=\"flash\">{}</div>", flash));
        }
        for (selector, value) in &session.fields {
            markup.push_str(&format!("<input data-selector=\"{}\" value=\"{}\">", selector, value));
        }
        markup
    }
}

impl<F: StateFingerprint> ExecutionOracle for SimulatedSite<F> {
    fn start(&mut self) -> Result<()> {
        if !self.pages.contains_key(&self.start_url) {
            return Err(UitestgenError::Oracle(format!(
                "cannot open {}: not part of the site model",
                self.start_url
            )));
        }
        if self.session.is_none() {
            self.session = Some(self.fresh_session());
            log::debug!("Simulated session started at {}", self.start_url);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Err(UitestgenError::Oracle("reset called before start".to_string()));
        }
        self.session = Some(self.fresh_session());
        Ok(())
    }

    fn current_elements(&mut self) -> Result<Vec<UIElement>> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| UitestgenError::Oracle("session not started".to_string()))?;
        Ok(self.visible_elements(session))
    }

    fn current_url(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.url.clone())
            .unwrap_or_else(|| self.start_url.clone())
    }

    fn execute(&mut self, action: &Action) -> std::result::Result<(), ExecutionError> {
        let session = match self.session.as_mut() {
            Some(session) if !session.crashed => session,
            _ => return Err(ExecutionError::PageCrashed),
        };

        let selector = match action.selector() {
            Some(selector) => selector,
            // Targetless scroll: fixed-offset page scroll, nothing to resolve
            None if action.action_type() == ActionType::Scroll => return Ok(()),
            None => {
                return Err(ExecutionError::MissingTarget {
                    action_type: action.action_type(),
                })
            }
        };

        let spec = self
            .pages
            .get(&session.url)
            .and_then(|page| {
                page.elements
                    .iter()
                    .find(|spec| spec.element.selector().as_ref() == Some(&selector))
            })
            .ok_or_else(|| ExecutionError::ElementNotFound {
                selector: selector.to_css(),
            })?;

        match action.action_type() {
            ActionType::Click => {
                let effects = spec.effects.clone();
                apply_effects(&self.pages, session, &effects);
            }
            ActionType::Edit => {
                // Filling a non-editable element waits until the timeout
                if spec.element.element_type != ElementType::Input {
                    return Err(ExecutionError::Timeout {
                        selector: selector.to_css(),
                        timeout_ms: self.action_timeout_ms,
                    });
                }
                session
                    .fields
                    .insert(selector.to_css(), action.data().unwrap_or_default().to_string());
            }
            ActionType::Scroll => {}
        }
        Ok(())
    }

    fn capture_state(&mut self) -> std::result::Result<PageState, ExecutionError> {
        let session = match self.session.as_ref() {
            Some(session) if !session.crashed => session,
            _ => return Err(ExecutionError::PageCrashed),
        };
        let hash = self
            .fingerprint
            .fingerprint(&session.url, &self.rendered_markup(session));
        Ok(PageState::new(hash, self.visible_elements(session)))
    }

    fn is_crashed(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.crashed)
    }

    fn take_events(&mut self) -> PageEvents {
        self.session
            .as_mut()
            .map(|s| std::mem::take(&mut s.events))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::chromosome::Chromosome;
    use crate::oracle::UrlFingerprint;

    fn site() -> SimulatedSite {
        let mut site = SimulatedSite::demo(&OracleConfig::default()).unwrap();
        site.start().unwrap();
        site
    }

    fn link(text: &str) -> UIElement {
        UIElement::new(ElementType::Link).with_text(text)
    }

    #[test]
    fn test_start_rejects_unknown_url() {
        let config = OracleConfig {
            url: "https://elsewhere.example/".to_string(),
            ..OracleConfig::default()
        };
        let mut site = SimulatedSite::new(SiteModel::demo("https://the-internet.herokuapp.com/"), &config).unwrap();
        assert!(matches!(site.start(), Err(UitestgenError::Oracle(_))));
    }

    #[test]
    fn test_run_records_aligned_trace() {
        let mut site = site();
        let chromosome = Chromosome::new(vec![
            Action::click(link("Form Authentication")).unwrap(),
            Action::edit(UIElement::new(ElementType::Input).with_id("username"), "tomsmith").unwrap(),
        ]);

        let result = site.run(&chromosome).unwrap();
        assert!(result.completed());
        assert_eq!(result.states.len(), 3);
        assert_eq!(result.urls.len(), 2);
        // Edit changed the rendered page
        assert_ne!(result.states[1].hash, result.states[2].hash);
        // The login page's tracker error was observed
        assert_eq!(result.http_errors.len(), 1);
        assert_eq!(result.http_errors[0].status, 503);
    }

    #[test]
    fn test_run_stops_at_missing_element() {
        let mut site = site();
        let chromosome = Chromosome::new(vec![
            Action::click(UIElement::new(ElementType::Button).with_id("nope")).unwrap(),
            Action::click(link("Status Codes")).unwrap(),
        ]);

        let result = site.run(&chromosome).unwrap();
        assert_eq!(result.states.len(), 1);
        assert_eq!(result.execution_errors.len(), 1);
        assert_eq!(
            result.execution_errors[0].error,
            ExecutionError::ElementNotFound { selector: "#nope".to_string() }
        );
        assert_eq!(result.action_results.len(), 1);
        assert!(!result.action_results[0].success);
    }

    #[test]
    fn test_edit_on_button_times_out() {
        let mut site = site();
        site.execute(&Action::click(link("Form Authentication")).unwrap()).unwrap();
        let edit = Action::edit(UIElement::new(ElementType::Input).with_class("radius"), "x").unwrap();
        assert_eq!(
            site.execute(&edit),
            Err(ExecutionError::Timeout { selector: ".radius".to_string(), timeout_ms: 3000 })
        );
    }

    #[test]
    fn test_crash_aborts_run() {
        let mut site = site();
        let chromosome = Chromosome::new(vec![
            Action::click(link("Form Authentication")).unwrap(),
            Action::click(UIElement::new(ElementType::Button).with_class("radius")).unwrap(),
            Action::click(UIElement::new(ElementType::Button).with_id("delete-account")).unwrap(),
            Action::click(link("Logout")).unwrap(),
        ]);

        let result = site.run(&chromosome).unwrap();
        assert!(result.crashed);
        assert_eq!(result.states.len(), 3);
        assert_eq!(result.execution_errors[0].step, 2);

        site.reset().unwrap();
        assert!(!site.is_crashed());
        assert!(!site.current_elements().unwrap().is_empty());
    }

    #[test]
    fn test_reset_discards_baseline_events() {
        let mut site = site();
        site.execute(&Action::click(link("Status Codes")).unwrap()).unwrap();
        site.execute(&Action::click(link("500")).unwrap()).unwrap();
        site.reset().unwrap();

        let result = site.run(&Chromosome::new(Vec::new())).unwrap();
        assert!(result.http_errors.is_empty());
        assert_eq!(result.states.len(), 1);
    }

    #[test]
    fn test_unknown_navigation_is_not_found() {
        let mut site = site();
        site.execute(&Action::click(link("Form Authentication")).unwrap()).unwrap();
        site.take_events();
        site.execute(&Action::click(link("Elemental Selenium")).unwrap()).unwrap();

        let events = site.take_events();
        assert_eq!(events.http_errors[0].status, 404);
        assert!(site.current_elements().unwrap().is_empty());
    }

    #[test]
    fn test_url_fingerprint_collapses_flash_messages() {
        let mut site = site().with_fingerprint(UrlFingerprint);
        let before = site.capture_state().unwrap();
        site.execute(&Action::click(link("Sponsored").with_class("promo")).unwrap()).unwrap();
        let after = site.capture_state().unwrap();
        assert_eq!(before.hash, after.hash);
    }

    #[test]
    fn test_site_model_from_toml() {
        let source = r#"
            [[pages]]
            url = "http://localhost/"
            markup = "<h1>Home</h1>"

            [[pages.elements]]
            element_type = "button"
            id = "boom"
            effects = { http_errors = [{ status = 500, url = "http://localhost/api" }] }
        "#;
        let model = SiteModel::from_toml_str(source).unwrap();
        assert_eq!(model.pages.len(), 1);
        assert_eq!(model.pages[0].elements[0].element.id.as_deref(), Some("boom"));
        assert_eq!(model.pages[0].elements[0].effects.http_errors[0].status, 500);

        let duplicated = format!("{}\n[[pages]]\nurl = \"http://localhost/\"\n", source);
        assert!(SiteModel::from_toml_str(&duplicated).is_err());
    }
}
