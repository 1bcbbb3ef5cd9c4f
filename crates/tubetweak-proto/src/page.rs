//! Host-page boundary.
//!
//! tubetweak never owns the page or the native player widgets on it. Both are
//! reached only through these two traits, which a host binding (or the
//! in-memory simulation used by tests) implements.
//!
//! Everything here is single-threaded: handles are `Rc<RefCell<..>>` and the
//! framework never holds a borrow of the page while calling into a widget.

use std::cell::RefCell;
use std::rc::Rc;

use crate::protocol::{ElementId, KeyStroke, PointerKind, Quality};

pub type SharedPage = Rc<RefCell<dyn Page>>;
pub type SharedNative = Rc<RefCell<dyn NativePlayer>>;

/// The DOM-shaped view of the host page.
///
/// Selectors are plain CSS selector lists; implementations only need to
/// support the selectors named in [`crate::config::PageConfig`].
pub trait Page {
    /// Every connected element matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// Descendants of `root` (excluding `root` itself) matching `selector`.
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId>;

    fn children(&self, element: ElementId) -> Vec<ElementId>;

    fn matches(&self, element: ElementId, selector: &str) -> bool;

    /// True when `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool;

    fn active_element(&self) -> Option<ElementId>;

    fn focus(&mut self, element: ElementId);

    /// Computed value of a style property, e.g. `display` or `visibility`.
    fn computed_style(&self, element: ElementId, property: &str) -> String;

    /// Set or clear (`None`) the inline `display` of an element.
    fn set_inline_display(&mut self, element: ElementId, display: Option<&str>);

    fn text(&self, element: ElementId) -> String;

    fn set_text(&mut self, element: ElementId, text: &str);

    /// Rendered `(width, height)`; zero when the element takes no space.
    fn layout_size(&self, element: ElementId) -> (f64, f64);

    fn click(&mut self, element: ElementId);

    fn create_element(&mut self, tag: &str, class: &str) -> ElementId;

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    fn dispatch_pointer(&mut self, target: ElementId, kind: PointerKind);

    /// Start observing style-attribute mutations on the subtree of `root`.
    fn observe_styles(&mut self, root: ElementId);

    /// Drain the elements whose style changed since the last call, across
    /// every observed subtree.
    fn take_style_mutations(&mut self) -> Vec<ElementId>;

    /// The native player widget rooted at `element`, if there is one.
    fn native_player(&self, element: ElementId) -> Option<SharedNative>;

    /// `playbackRate` of a media element.
    fn media_playback_rate(&self, element: ElementId) -> Option<f64>;
}

/// Capabilities of the host page's own player widget.
pub trait NativePlayer {
    /// 0..=100
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn is_muted(&self) -> bool;

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    fn playback_quality(&self) -> Quality;
    /// Highest first, in the widget's own order.
    fn available_quality_levels(&self) -> Vec<Quality>;
    fn set_playback_quality_range(&mut self, quality: Quality);

    /// [`crate::protocol::NO_AD`] when no ad is playing.
    fn ad_state(&self) -> i32;

    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn seek_to(&mut self, seconds: f64);

    /// Deliver a synthetic key stroke as if the user pressed it over the widget.
    fn handle_key(&mut self, stroke: &KeyStroke);

    fn show_video_info(&mut self);
    fn hide_video_info(&mut self);

    /// Ask the widget to show its controls. Returns `false` when the widget
    /// has no such call.
    fn wake_up_controls(&mut self) -> bool {
        false
    }
}
