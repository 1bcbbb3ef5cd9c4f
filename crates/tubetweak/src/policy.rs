//! Pluggable policies for the parts of the page structure that differ between
//! page variants: which elements count as player chrome, and when an ad skip
//! button is really clickable.

use std::rc::Rc;

use tubetweak_proto::config::{PageConfig, SkipButtonPolicyConfig, UiElementsConfig};
use tubetweak_proto::page::Page;
use tubetweak_proto::protocol::ElementId;

/// Chooses the UI element set of a player. Always evaluated live.
pub trait UiElementPolicy {
    fn ui_elements(&self, page: &dyn Page, root: ElementId) -> Vec<ElementId>;

    /// Whether players using this policy watch their chrome for style
    /// mutations made by the native widget.
    fn observes_mutations(&self) -> bool {
        false
    }
}

/// Every direct child of the player except the video container.
pub struct NonVideoChildren {
    pub video_container_selector: String,
}

impl UiElementPolicy for NonVideoChildren {
    fn ui_elements(&self, page: &dyn Page, root: ElementId) -> Vec<ElementId> {
        page.children(root)
            .into_iter()
            .filter(|c| !page.matches(*c, &self.video_container_selector))
            .collect()
    }
}

/// Every descendant matching one of a fixed list of chrome selectors.
pub struct SelectorList {
    pub selectors: Vec<String>,
}

impl UiElementPolicy for SelectorList {
    fn ui_elements(&self, page: &dyn Page, root: ElementId) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = Vec::new();
        for selector in &self.selectors {
            for el in page.query_within(root, selector) {
                if !out.contains(&el) {
                    out.push(el);
                }
            }
        }
        out
    }

    fn observes_mutations(&self) -> bool {
        true
    }
}

/// Decides whether an ad skip button can be clicked yet.
pub trait SkipButtonPolicy {
    fn is_clickable(&self, page: &dyn Page, button: ElementId) -> bool;
}

/// Clickable once it is neither `display: none` nor `visibility: hidden`.
pub struct VisibilityCheck;

impl SkipButtonPolicy for VisibilityCheck {
    fn is_clickable(&self, page: &dyn Page, button: ElementId) -> bool {
        page.computed_style(button, "display") != "none"
            && page.computed_style(button, "visibility") != "hidden"
    }
}

/// Clickable once it occupies layout space.
pub struct LayoutCheck;

impl SkipButtonPolicy for LayoutCheck {
    fn is_clickable(&self, page: &dyn Page, button: ElementId) -> bool {
        let (w, h) = page.layout_size(button);
        w > 0.0 && h > 0.0
    }
}

pub fn ui_policy_from_config(page: &PageConfig) -> Rc<dyn UiElementPolicy> {
    match &page.ui_elements {
        UiElementsConfig::NonVideoChildren => Rc::new(NonVideoChildren {
            video_container_selector: page.video_container_selector.clone(),
        }),
        UiElementsConfig::SelectorList { selectors } => Rc::new(SelectorList {
            selectors: selectors.clone(),
        }),
    }
}

pub fn skip_policy_from_config(policy: SkipButtonPolicyConfig) -> Rc<dyn SkipButtonPolicy> {
    match policy {
        SkipButtonPolicyConfig::Visibility => Rc::new(VisibilityCheck),
        SkipButtonPolicyConfig::Layout => Rc::new(LayoutCheck),
    }
}
