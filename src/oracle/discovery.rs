use crate::types::{ElementType, UIElement};

/// Scan order, matching how a page is swept for interactable elements
const SCAN_ORDER: [ElementType; 3] = [ElementType::Button, ElementType::Input, ElementType::Link];

/// Inventory the interactable elements of a page.
///
/// Candidates are grouped buttons, then inputs, then links, keeping document
/// order within a group. Candidates without any identifying attribute cannot
/// be targeted again later and are skipped.
pub fn discover_elements<'a, I>(candidates: I) -> Vec<UIElement>
where
    I: IntoIterator<Item = &'a UIElement>,
{
    let candidates: Vec<&UIElement> = candidates.into_iter().collect();
    let mut found = Vec::with_capacity(candidates.len());

    for element_type in SCAN_ORDER {
        for candidate in candidates.iter().filter(|c| c.element_type == element_type) {
            if !candidate.is_addressable() {
                log::warn!(
                    "Found {} without any identifiable attributes, skipping",
                    element_type.as_str()
                );
                continue;
            }
            found.push((*candidate).clone());
        }
    }

    found
}
