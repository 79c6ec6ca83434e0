use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, UitestgenError};

/// Kind of interactable element found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Button,
    Input,
    Link,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Button => "button",
            ElementType::Input => "input",
            ElementType::Link => "link",
        }
    }
}

/// A resolved way of addressing an element, in stability order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Name(String),
    Class(String),
    Text(String),
}

impl Selector {
    /// Playwright/CSS form of the selector.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Name(name) => format!("[name='{}']", name),
            // "class1 class2" -> ".class1.class2"
            Selector::Class(class) => {
                let classes: Vec<&str> = class.split_whitespace().collect();
                format!(".{}", classes.join("."))
            }
            Selector::Text(text) => format!("text='{}'", text.replace('\'', "\\'")),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// A targetable UI element.
///
/// Selector attributes are ranked by stability: `id` > `name` > `class_name` >
/// `text_content`. Whenever more than one is present the earliest one wins,
/// both for display and for selector synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UIElement {
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

fn present(attr: &Option<String>) -> Option<&str> {
    attr.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl UIElement {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            id: None,
            name: None,
            class_name: None,
            text_content: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text(mut self, text_content: impl Into<String>) -> Self {
        self.text_content = Some(text_content.into());
        self
    }

    /// Most stable selector this element can yield, if any
    pub fn selector(&self) -> Option<Selector> {
        if let Some(id) = present(&self.id) {
            return Some(Selector::Id(id.to_string()));
        }
        if let Some(name) = present(&self.name) {
            return Some(Selector::Name(name.to_string()));
        }
        if let Some(class) = present(&self.class_name) {
            return Some(Selector::Class(class.to_string()));
        }
        present(&self.text_content).map(|text| Selector::Text(text.to_string()))
    }

    pub fn is_addressable(&self) -> bool {
        self.selector().is_some()
    }
}

impl fmt::Display for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.element_type.as_str();
        match self.selector() {
            Some(Selector::Id(id)) => write!(f, "{}[id='{}']", kind, id),
            Some(Selector::Name(name)) => write!(f, "{}[name='{}']", kind, name),
            Some(Selector::Class(class)) => write!(f, "{}[class='{}']", kind, class),
            Some(Selector::Text(text)) => {
                let short: String = text.chars().take(15).collect();
                write!(f, "{}[text='{}...']", kind, short)
            }
            None => write!(f, "{}[unknown selector]", kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Click,
    Edit,
    Scroll,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Click => f.write_str("click"),
            ActionType::Edit => f.write_str("edit"),
            ActionType::Scroll => f.write_str("scroll"),
        }
    }
}

/// One interaction step. Construction validates that the target, when one is
/// required or given, can yield a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Action {
    action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<UIElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        target: Option<UIElement>,
        data: Option<String>,
    ) -> Result<Self> {
        match (&target, action_type) {
            (None, ActionType::Click | ActionType::Edit) => {
                return Err(UitestgenError::InvalidElement(format!(
                    "{} action requires a target element",
                    action_type
                )));
            }
            (Some(element), _) if !element.is_addressable() => {
                return Err(UitestgenError::InvalidElement(format!(
                    "{} has no identifiable selector attribute",
                    element
                )));
            }
            _ => {}
        }

        // Only edits carry a payload
        let data = if action_type == ActionType::Edit { data } else { None };

        Ok(Self {
            action_type,
            target,
            data,
        })
    }

    pub fn click(target: UIElement) -> Result<Self> {
        Self::new(ActionType::Click, Some(target), None)
    }

    pub fn edit(target: UIElement, data: impl Into<String>) -> Result<Self> {
        Self::new(ActionType::Edit, Some(target), Some(data.into()))
    }

    /// Scroll an element into view, or the page by a fixed offset when `target` is `None`.
    pub fn scroll(target: Option<UIElement>) -> Result<Self> {
        Self::new(ActionType::Scroll, target, None)
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn target(&self) -> Option<&UIElement> {
        self.target.as_ref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn selector(&self) -> Option<Selector> {
        self.target.as_ref().and_then(UIElement::selector)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.target, self.action_type) {
            (Some(target), ActionType::Edit) => {
                write!(f, "Edit {} with '{}'", target, self.data.as_deref().unwrap_or(""))
            }
            (Some(target), action_type) => {
                write!(f, "{} {}", action_type.to_string().to_uppercase(), target)
            }
            (None, action_type) => write!(f, "{}", action_type.to_string().to_uppercase()),
        }
    }
}

/// Point-in-time fingerprint of the application, as captured by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub hash: String,
    pub available_elements: Vec<UIElement>,
}

impl PageState {
    pub fn new(hash: impl Into<String>, available_elements: Vec<UIElement>) -> Self {
        Self {
            hash: hash.into(),
            available_elements,
        }
    }
}
