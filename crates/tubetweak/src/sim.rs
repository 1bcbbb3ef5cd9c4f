//! In-memory page and native player widgets.
//!
//! Mirrors the structure of the host page closely enough to drive the whole
//! framework headless: the demo binary and every test run against it.
//! Selector support is limited to comma lists of compound selectors
//! (`tag`, `#id`, `.class`, combined).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tubetweak_proto::page::{NativePlayer, Page, SharedNative};
use tubetweak_proto::protocol::{ElementId, KeyStroke, PointerKind, Quality, NO_AD};

/// Rates the native widget's own step keys move through.
pub const NATIVE_RATE_STEPS: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Volume change of one native arrow-key step.
pub const NATIVE_VOLUME_STEP: f64 = 5.0;

struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    base_display: String,
    inline_display: Option<String>,
    visibility: String,
    text: String,
    size: (f64, f64),
    media_rate: Option<f64>,
}

/// The element tree plus the page-global bits (focus, observers, event logs).
pub struct SimDom {
    nodes: Vec<Node>,
    active: Option<ElementId>,
    observed: Vec<ElementId>,
    mutations: Vec<ElementId>,
    pointer_events: Vec<(ElementId, PointerKind)>,
    clicks: Vec<ElementId>,
}

impl SimDom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            active: None,
            observed: Vec::new(),
            mutations: Vec::new(),
            pointer_events: Vec::new(),
            clicks: Vec::new(),
        };
        dom.create("body", "block");
        dom
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.0 as usize)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.0 as usize)
    }

    /// New detached element from a compound selector such as
    /// `div#movie_player.html5-video-player`.
    pub fn create(&mut self, compound: &str, display: &str) -> ElementId {
        let (tag, id, classes) = parse_compound(compound);
        let el = ElementId(self.nodes.len() as u64);
        self.nodes.push(Node {
            media_rate: (tag == "video").then_some(1.0),
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: classes.into_iter().map(str::to_string).collect(),
            parent: None,
            children: Vec::new(),
            base_display: display.to_string(),
            inline_display: None,
            visibility: "visible".to_string(),
            text: String::new(),
            size: (0.0, 0.0),
        });
        el
    }

    /// Create `compound` and append it to `parent`.
    pub fn add(&mut self, parent: ElementId, compound: &str, display: &str) -> ElementId {
        let el = self.create(compound, display);
        self.append(parent, el);
        el
    }

    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Remove `el` (and its subtree) from the document.
    pub fn detach(&mut self, el: ElementId) {
        let parent = self.node(el).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|c| *c != el);
            }
        }
        if let Some(node) = self.node_mut(el) {
            node.parent = None;
        }
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).and_then(|n| n.parent)
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn is_connected(&self, el: ElementId) -> bool {
        self.contains(self.body(), el)
    }

    pub fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut cur = Some(el);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }

    pub fn matches(&self, el: ElementId, selector: &str) -> bool {
        let Some(node) = self.node(el) else {
            return false;
        };
        selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .any(|compound| matches_compound(node, compound))
    }

    pub fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|el| self.matches(*el, selector))
            .collect()
    }

    pub fn display(&self, el: ElementId) -> String {
        self.node(el)
            .map(|n| n.inline_display.clone().unwrap_or_else(|| n.base_display.clone()))
            .unwrap_or_default()
    }

    pub fn inline_display(&self, el: ElementId) -> Option<String> {
        self.node(el).and_then(|n| n.inline_display.clone())
    }

    pub fn set_inline_display(&mut self, el: ElementId, display: Option<&str>) {
        if let Some(node) = self.node_mut(el) {
            node.inline_display = display.map(str::to_string);
        }
        self.record_mutation(el);
    }

    pub fn visibility(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.visibility.clone()).unwrap_or_default()
    }

    pub fn set_visibility(&mut self, el: ElementId, visibility: &str) {
        if let Some(node) = self.node_mut(el) {
            node.visibility = visibility.to_string();
        }
        self.record_mutation(el);
    }

    /// Rendered size: zero when the element or an ancestor is not displayed.
    pub fn layout_size(&self, el: ElementId) -> (f64, f64) {
        let mut cur = Some(el);
        while let Some(c) = cur {
            if self.display(c) == "none" {
                return (0.0, 0.0);
            }
            cur = self.parent(c);
        }
        self.node(el).map(|n| n.size).unwrap_or((0.0, 0.0))
    }

    pub fn set_size(&mut self, el: ElementId, size: (f64, f64)) {
        if let Some(node) = self.node_mut(el) {
            node.size = size;
        }
    }

    pub fn text(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.text.clone()).unwrap_or_default()
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.node_mut(el) {
            node.text = text.to_string();
        }
    }

    pub fn media_rate(&self, el: ElementId) -> Option<f64> {
        self.node(el).and_then(|n| n.media_rate)
    }

    pub fn set_media_rate(&mut self, el: ElementId, rate: f64) {
        if let Some(node) = self.node_mut(el) {
            if node.media_rate.is_some() {
                node.media_rate = Some(rate);
            }
        }
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    pub fn focus(&mut self, el: ElementId) {
        self.active = Some(el);
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    pub fn observe(&mut self, root: ElementId) {
        if !self.observed.contains(&root) {
            self.observed.push(root);
        }
    }

    fn record_mutation(&mut self, el: ElementId) {
        let observed = self.observed.iter().any(|root| self.contains(*root, el));
        if observed && !self.mutations.contains(&el) {
            self.mutations.push(el);
        }
    }

    pub fn take_mutations(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.mutations)
    }

    pub fn record_pointer(&mut self, target: ElementId, kind: PointerKind) {
        self.pointer_events.push((target, kind));
    }

    pub fn pointer_events(&self) -> &[(ElementId, PointerKind)] {
        &self.pointer_events
    }

    pub fn record_click(&mut self, el: ElementId) {
        self.clicks.push(el);
    }

    pub fn clicks(&self) -> &[ElementId] {
        &self.clicks
    }
}

impl Default for SimDom {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_compound(compound: &str) -> (&str, Option<&str>, Vec<&str>) {
    let is_marker = |c: char| c == '.' || c == '#';
    let tag_end = compound.find(is_marker).unwrap_or(compound.len());
    let (tag, mut rest) = compound.split_at(tag_end);
    let mut id = None;
    let mut classes = Vec::new();
    while let Some(marker) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(is_marker).unwrap_or(body.len());
        let name = &body[..end];
        if marker == '#' {
            id = Some(name);
        } else {
            classes.push(name);
        }
        rest = &body[end..];
    }
    (tag, id, classes)
}

fn matches_compound(node: &Node, compound: &str) -> bool {
    let (tag, id, classes) = parse_compound(compound);
    if !tag.is_empty() && tag != "*" && tag != node.tag {
        return false;
    }
    if id.is_some() && id != node.id.as_deref() {
        return false;
    }
    classes.iter().all(|c| node.classes.iter().any(|n| n == c))
}

// ── Players ───────────────────────────────────────────────────────────────────

/// Shape of a simulated player.
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    /// `id` of the root element; the main player is `movie_player`.
    pub root_id: Option<String>,
    pub duration: f64,
    pub volume: f64,
}

impl PlayerSpec {
    pub fn main() -> Self {
        Self {
            root_id: Some("movie_player".to_string()),
            duration: 600.0,
            volume: 50.0,
        }
    }

    /// A secondary player, e.g. an inline preview.
    pub fn embedded() -> Self {
        Self {
            root_id: None,
            duration: 30.0,
            volume: 50.0,
        }
    }
}

/// Elements of one simulated player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerParts {
    pub root: ElementId,
    pub video_container: ElementId,
    pub video: ElementId,
    pub gradient_top: ElementId,
    pub chrome_top: ElementId,
    pub gradient_bottom: ElementId,
    pub chrome_bottom: ElementId,
    pub time_display: ElementId,
    pub bezel: ElementId,
    pub osd_text: ElementId,
    pub ad_module: ElementId,
    pub skip_button: ElementId,
    pub stats_panel: ElementId,
}

impl PlayerParts {
    fn build(dom: &mut SimDom, parent: ElementId, spec: &PlayerSpec) -> Self {
        let root_sel = match &spec.root_id {
            Some(id) => format!("div#{}.html5-video-player", id),
            None => "div.html5-video-player".to_string(),
        };
        let root = dom.add(parent, &root_sel, "block");
        let video_container = dom.add(root, "div.html5-video-container", "block");
        let video = dom.add(video_container, "video.video-stream", "block");
        let gradient_top = dom.add(root, "div.ytp-gradient-top", "block");
        let chrome_top = dom.add(root, "div.ytp-chrome-top", "flex");
        let gradient_bottom = dom.add(root, "div.ytp-gradient-bottom", "block");
        let chrome_bottom = dom.add(root, "div.ytp-chrome-bottom", "block");
        let time_display = dom.add(chrome_bottom, "div.ytp-time-display", "inline-block");
        let bezel = dom.add(root, "div.ytp-bezel-text-wrapper", "block");
        let osd_text = dom.add(bezel, "div.ytp-bezel-text", "block");
        let ad_module = dom.add(root, "div.ytp-ad-module", "block");
        let skip_button = dom.add(ad_module, "button.ytp-ad-skip-button", "none");
        let stats_panel = dom.add(root, "div.html5-video-info-panel", "none");
        for el in [root, video_container, video] {
            dom.set_size(el, (640.0, 360.0));
        }
        Self {
            root,
            video_container,
            video,
            gradient_top,
            chrome_top,
            gradient_bottom,
            chrome_bottom,
            time_display,
            bezel,
            osd_text,
            ad_module,
            skip_button,
            stats_panel,
        }
    }
}

/// A native player widget living on a [`SimDom`].
pub struct SimPlayer {
    dom: Rc<RefCell<SimDom>>,
    parts: PlayerParts,
    pub volume: f64,
    pub muted: bool,
    pub rate: f64,
    pub quality: Quality,
    pub available: Vec<Quality>,
    pub ad_state: i32,
    pub current_time: f64,
    pub duration: f64,
    /// Whether the widget offers a direct "show controls" call.
    pub supports_wake: bool,
    pub wake_calls: u32,
    /// Times the widget fired its volume-change notification.
    pub volume_notifications: u32,
    pub rate_notifications: u32,
    keys: Vec<KeyStroke>,
}

impl SimPlayer {
    fn new(dom: Rc<RefCell<SimDom>>, parts: PlayerParts, spec: &PlayerSpec) -> Self {
        Self {
            dom,
            parts,
            volume: spec.volume,
            muted: false,
            rate: 1.0,
            quality: Quality::Auto,
            available: vec![
                Quality::Hd1080,
                Quality::Hd720,
                Quality::Large,
                Quality::Medium,
                Quality::Small,
                Quality::Tiny,
                Quality::Auto,
            ],
            ad_state: NO_AD,
            current_time: 0.0,
            duration: spec.duration,
            supports_wake: false,
            wake_calls: 0,
            volume_notifications: 0,
            rate_notifications: 0,
            keys: Vec::new(),
        }
    }

    pub fn parts(&self) -> &PlayerParts {
        &self.parts
    }

    /// Synthetic key strokes delivered to the widget, oldest first.
    pub fn keys_received(&self) -> &[KeyStroke] {
        &self.keys
    }

    pub fn start_ad(&mut self) {
        self.ad_state = 1;
    }

    /// The skip countdown ran out: the button becomes visible and clickable.
    pub fn reveal_skip_button(&mut self) {
        let button = self.parts.skip_button;
        let mut dom = self.dom.borrow_mut();
        dom.set_size(button, (80.0, 30.0));
        dom.set_visibility(button, "visible");
        dom.set_inline_display(button, Some("inline-block"));
    }

    /// What clicking the skip button does.
    pub fn skip_ad(&mut self) {
        self.ad_state = NO_AD;
        let button = self.parts.skip_button;
        let mut dom = self.dom.borrow_mut();
        dom.set_inline_display(button, None);
        dom.set_size(button, (0.0, 0.0));
    }

    fn show_osd(&self, text: &str) {
        self.dom.borrow_mut().set_text(self.parts.osd_text, text);
    }
}

impl NativePlayer for SimPlayer {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 100.0);
        self.volume_notifications += 1;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.rate_notifications += 1;
        self.dom
            .borrow_mut()
            .set_media_rate(self.parts.video, rate);
    }

    fn playback_quality(&self) -> Quality {
        self.quality
    }

    fn available_quality_levels(&self) -> Vec<Quality> {
        self.available.clone()
    }

    fn set_playback_quality_range(&mut self, quality: Quality) {
        self.quality = quality;
    }

    fn ad_state(&self) -> i32 {
        self.ad_state
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek_to(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn handle_key(&mut self, stroke: &KeyStroke) {
        self.keys.push(stroke.clone());
        match (stroke.key.as_str(), stroke.modifiers.shift) {
            ("ArrowUp", _) => self.set_volume(self.volume + NATIVE_VOLUME_STEP),
            ("ArrowDown", _) => self.set_volume(self.volume - NATIVE_VOLUME_STEP),
            (">", true) => {
                let next = NATIVE_RATE_STEPS
                    .iter()
                    .copied()
                    .find(|r| *r > self.rate)
                    .unwrap_or(self.rate);
                self.set_playback_rate(next);
                self.show_osd(&format!("{}x", next));
            }
            ("<", true) => {
                let prev = NATIVE_RATE_STEPS
                    .iter()
                    .rev()
                    .copied()
                    .find(|r| *r < self.rate)
                    .unwrap_or(self.rate);
                self.set_playback_rate(prev);
                self.show_osd(&format!("{}x", prev));
            }
            _ => {}
        }
    }

    fn show_video_info(&mut self) {
        self.dom
            .borrow_mut()
            .set_inline_display(self.parts.stats_panel, Some("block"));
    }

    fn hide_video_info(&mut self) {
        self.dom
            .borrow_mut()
            .set_inline_display(self.parts.stats_panel, Some("none"));
    }

    fn wake_up_controls(&mut self) -> bool {
        if self.supports_wake {
            self.wake_calls += 1;
        }
        self.supports_wake
    }
}

// ── Page ──────────────────────────────────────────────────────────────────────

pub struct SimPage {
    dom: Rc<RefCell<SimDom>>,
    widgets: HashMap<ElementId, Rc<RefCell<SimPlayer>>>,
}

impl SimPage {
    pub fn new() -> Self {
        Self {
            dom: Rc::new(RefCell::new(SimDom::new())),
            widgets: HashMap::new(),
        }
    }

    pub fn dom(&self) -> &Rc<RefCell<SimDom>> {
        &self.dom
    }

    pub fn body(&self) -> ElementId {
        self.dom.borrow().body()
    }

    /// Build a player at the end of the body and register its widget.
    pub fn add_player(&mut self, spec: PlayerSpec) -> Rc<RefCell<SimPlayer>> {
        let parts = {
            let mut dom = self.dom.borrow_mut();
            let body = dom.body();
            PlayerParts::build(&mut dom, body, &spec)
        };
        let root = parts.root;
        let player = Rc::new(RefCell::new(SimPlayer::new(self.dom.clone(), parts, &spec)));
        self.widgets.insert(root, player.clone());
        player
    }

    /// Tear a player out of the page, widget included.
    pub fn remove_player(&mut self, root: ElementId) {
        self.widgets.remove(&root);
        self.dom.borrow_mut().detach(root);
    }

    pub fn widget(&self, root: ElementId) -> Option<Rc<RefCell<SimPlayer>>> {
        self.widgets.get(&root).cloned()
    }

    /// Append a plain element (e.g. a text field) to the body.
    pub fn add_element(&mut self, compound: &str) -> ElementId {
        let mut dom = self.dom.borrow_mut();
        let body = dom.body();
        dom.add(body, compound, "inline-block")
    }
}

impl Default for SimPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for SimPage {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let dom = self.dom.borrow();
        dom.query_within(dom.body(), selector)
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        self.dom.borrow().query_within(root, selector)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.dom.borrow().children(element)
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        self.dom.borrow().matches(element, selector)
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        self.dom.borrow().contains(ancestor, element)
    }

    fn active_element(&self) -> Option<ElementId> {
        self.dom.borrow().active_element()
    }

    fn focus(&mut self, element: ElementId) {
        self.dom.borrow_mut().focus(element);
    }

    fn computed_style(&self, element: ElementId, property: &str) -> String {
        let dom = self.dom.borrow();
        match property {
            "display" => dom.display(element),
            "visibility" => dom.visibility(element),
            _ => String::new(),
        }
    }

    fn set_inline_display(&mut self, element: ElementId, display: Option<&str>) {
        self.dom.borrow_mut().set_inline_display(element, display);
    }

    fn text(&self, element: ElementId) -> String {
        self.dom.borrow().text(element)
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        self.dom.borrow_mut().set_text(element, text);
    }

    fn layout_size(&self, element: ElementId) -> (f64, f64) {
        self.dom.borrow().layout_size(element)
    }

    fn click(&mut self, element: ElementId) {
        self.dom.borrow_mut().record_click(element);
        let skipped: Vec<Rc<RefCell<SimPlayer>>> = self
            .widgets
            .values()
            .filter(|w| w.borrow().parts.skip_button == element)
            .cloned()
            .collect();
        for widget in skipped {
            widget.borrow_mut().skip_ad();
        }
    }

    fn create_element(&mut self, tag: &str, class: &str) -> ElementId {
        let compound = if class.is_empty() {
            tag.to_string()
        } else {
            format!("{}.{}", tag, class)
        };
        self.dom.borrow_mut().create(&compound, "inline")
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.dom.borrow_mut().append(parent, child);
    }

    fn dispatch_pointer(&mut self, target: ElementId, kind: PointerKind) {
        self.dom.borrow_mut().record_pointer(target, kind);
    }

    fn observe_styles(&mut self, root: ElementId) {
        self.dom.borrow_mut().observe(root);
    }

    fn take_style_mutations(&mut self) -> Vec<ElementId> {
        self.dom.borrow_mut().take_mutations()
    }

    fn native_player(&self, element: ElementId) -> Option<SharedNative> {
        let widget: SharedNative = self.widgets.get(&element)?.clone();
        Some(widget)
    }

    fn media_playback_rate(&self, element: ElementId) -> Option<f64> {
        self.dom.borrow().media_rate(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_selectors() {
        let mut dom = SimDom::new();
        let body = dom.body();
        let root = dom.add(body, "div#movie_player.html5-video-player.ytp-big-mode", "block");

        assert!(dom.matches(root, "div"));
        assert!(dom.matches(root, "#movie_player"));
        assert!(dom.matches(root, ".html5-video-player"));
        assert!(dom.matches(root, "div.ytp-big-mode#movie_player"));
        assert!(dom.matches(root, "span, .ytp-big-mode"));
        assert!(!dom.matches(root, "span"));
        assert!(!dom.matches(root, "#other_player"));
        assert!(!dom.matches(root, ".html5-video-player.missing"));
    }

    #[test]
    fn test_query_in_document_order() {
        let mut page = SimPage::new();
        let a = page.add_player(PlayerSpec::main());
        let b = page.add_player(PlayerSpec::embedded());
        let roots = page.query_all(".html5-video-player");
        assert_eq!(roots, vec![a.borrow().parts().root, b.borrow().parts().root]);

        let parts = a.borrow().parts().clone();
        assert_eq!(
            page.query_within(parts.root, ".ytp-chrome-bottom, .html5-video-container"),
            vec![parts.video_container, parts.chrome_bottom]
        );
        assert!(page.query_within(parts.root, ".html5-video-player").is_empty());
    }

    #[test]
    fn test_mutations_only_recorded_under_observed_roots() {
        let mut page = SimPage::new();
        let a = page.add_player(PlayerSpec::main());
        let b = page.add_player(PlayerSpec::embedded());
        let (pa, pb) = (a.borrow().parts().clone(), b.borrow().parts().clone());

        page.observe_styles(pa.root);
        page.set_inline_display(pa.chrome_top, Some("none"));
        page.set_inline_display(pa.chrome_top, None);
        page.set_inline_display(pb.chrome_top, Some("none"));
        assert_eq!(page.take_style_mutations(), vec![pa.chrome_top]);
        assert!(page.take_style_mutations().is_empty());
    }

    #[test]
    fn test_layout_size_zero_under_hidden_ancestor() {
        let mut page = SimPage::new();
        let p = page.add_player(PlayerSpec::main());
        let parts = p.borrow().parts().clone();
        p.borrow_mut().reveal_skip_button();
        assert_eq!(page.layout_size(parts.skip_button), (80.0, 30.0));

        page.set_inline_display(parts.ad_module, Some("none"));
        assert_eq!(page.layout_size(parts.skip_button), (0.0, 0.0));
    }

    #[test]
    fn test_clicking_skip_button_ends_ad() {
        let mut page = SimPage::new();
        let p = page.add_player(PlayerSpec::main());
        p.borrow_mut().start_ad();
        p.borrow_mut().reveal_skip_button();
        let button = p.borrow().parts().skip_button;

        page.click(button);
        assert_eq!(p.borrow().ad_state, NO_AD);
        assert_eq!(page.dom().borrow().clicks(), &[button]);
        assert_eq!(page.computed_style(button, "display"), "none");
    }

    #[test]
    fn test_native_rate_keys_step_and_show_bezel() {
        let mut page = SimPage::new();
        let p = page.add_player(PlayerSpec::main());
        let parts = p.borrow().parts().clone();
        let shift = tubetweak_proto::protocol::Modifiers::SHIFT;

        p.borrow_mut().handle_key(&KeyStroke::with_modifiers(">", shift));
        assert_eq!(p.borrow().rate, 1.25);
        assert_eq!(page.media_playback_rate(parts.video), Some(1.25));
        assert_eq!(page.text(parts.osd_text), "1.25x");

        // Unshifted '>' is not a rate key.
        p.borrow_mut().handle_key(&KeyStroke::new(">"));
        assert_eq!(p.borrow().rate, 1.25);
    }

    #[test]
    fn test_removed_player_is_gone() {
        let mut page = SimPage::new();
        let p = page.add_player(PlayerSpec::main());
        let root = p.borrow().parts().root;
        page.remove_player(root);
        assert!(page.query_all(".html5-video-player").is_empty());
        assert!(page.native_player(root).is_none());
        assert!(!page.dom().borrow().is_connected(root));
    }
}
