//! Player: façade over one native player widget.
//!
//! The wrapper exposes a curated, typed surface (volume, rate, quality, time
//! displays, UI visibility) built on the widget's capabilities. Anything not
//! curated goes through [`Player::native`], the explicit escape hatch.
//!
//! Two quirks of the native widget shape the setters:
//! - Its on-screen indicator (volume bar, rate bezel) can only be triggered by
//!   its own step behavior, so every direct set first sends a sign-only
//!   synthetic key stroke and then writes the exact value. The widget's own
//!   change notification therefore fires twice per logical change.
//! - Its notion of the playback rate can lag, so the rate is read from the
//!   `<video>` element instead.
//!
//! Borrow discipline: never hold a borrow of the page while calling into the
//! widget. Native widgets may touch the page themselves.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;
use tubetweak_proto::config::PageConfig;
use tubetweak_proto::page::{SharedNative, SharedPage};
use tubetweak_proto::protocol::{
    Direction, ElementId, KeyStroke, Modifiers, PointerKind, Quality, NO_AD,
};

use crate::policy::{ui_policy_from_config, UiElementPolicy};

/// `(current, requested) -> effective`
pub type PropertyOverride = Box<dyn Fn(f64, f64) -> f64>;

/// Page structure a player needs, shared by every player on the page.
pub struct PlayerSettings {
    pub player_selector: String,
    pub main_player_selector: String,
    pub video_selector: String,
    pub time_display_selector: String,
    pub osd_text_selector: String,
    pub stats_panel_selector: String,
    pub scroll_target_selector: String,
    pub ui_policy: Rc<dyn UiElementPolicy>,
}

impl PlayerSettings {
    pub fn from_config(page: &PageConfig) -> Self {
        Self {
            player_selector: page.player_selector.clone(),
            main_player_selector: page.main_player_selector.clone(),
            video_selector: page.video_selector.clone(),
            time_display_selector: page.time_display_selector.clone(),
            osd_text_selector: page.osd_text_selector.clone(),
            stats_panel_selector: page.stats_panel_selector.clone(),
            scroll_target_selector: page.scroll_target_selector.clone(),
            ui_policy: ui_policy_from_config(page),
        }
    }
}

/// Override slots for the mutable properties. Installed by eager hooks;
/// later installs wrap earlier ones.
#[derive(Default)]
pub struct Overrides {
    volume: Option<PropertyOverride>,
    playback_rate: Option<PropertyOverride>,
}

impl Overrides {
    fn chain(slot: &mut Option<PropertyOverride>, next: PropertyOverride) {
        let chained: PropertyOverride = match slot.take() {
            Some(prev) => Box::new(move |current, requested| next(current, prev(current, requested))),
            None => next,
        };
        *slot = Some(chained);
    }

    fn apply(slot: &Option<PropertyOverride>, current: f64, requested: f64) -> f64 {
        match slot {
            Some(f) => f(current, requested),
            None => requested,
        }
    }
}

pub struct Player {
    root: ElementId,
    native: SharedNative,
    page: SharedPage,
    settings: Rc<PlayerSettings>,
    ui_enabled: bool,
    /// Display value of each hidden chrome element before it was hidden.
    saved_display: HashMap<ElementId, String>,
    /// Set by our own style writes so the observer skips the echo.
    ignore_next_mutation: bool,
    overrides: Overrides,
}

impl Player {
    pub fn new(
        root: ElementId,
        native: SharedNative,
        page: SharedPage,
        settings: Rc<PlayerSettings>,
    ) -> Self {
        if settings.ui_policy.observes_mutations() {
            page.borrow_mut().observe_styles(root);
        }
        Self {
            root,
            native,
            page,
            settings,
            ui_enabled: true,
            saved_display: HashMap::new(),
            ignore_next_mutation: false,
            overrides: Overrides::default(),
        }
    }

    /// Identity of the wrapped widget.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Escape hatch to the native widget for anything not curated here.
    pub fn native(&self) -> &SharedNative {
        &self.native
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn is_main(&self) -> bool {
        self.page
            .borrow()
            .matches(self.root, &self.settings.main_player_selector)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.page.borrow().contains(self.root, element)
    }

    pub fn focus(&self) {
        self.page.borrow_mut().focus(self.root);
    }

    // ── Override slots ────────────────────────────────────────────────────────

    pub fn override_volume(&mut self, f: impl Fn(f64, f64) -> f64 + 'static) {
        Overrides::chain(&mut self.overrides.volume, Box::new(f));
    }

    pub fn override_playback_rate(&mut self, f: impl Fn(f64, f64) -> f64 + 'static) {
        Overrides::chain(&mut self.overrides.playback_rate, Box::new(f));
    }

    pub fn has_volume_override(&self) -> bool {
        self.overrides.volume.is_some()
    }

    pub fn has_playback_rate_override(&self) -> bool {
        self.overrides.playback_rate.is_some()
    }

    // ── Volume ────────────────────────────────────────────────────────────────

    pub fn volume(&self) -> f64 {
        self.native.borrow().volume()
    }

    pub fn is_muted(&self) -> bool {
        self.native.borrow().is_muted()
    }

    pub fn set_volume(&mut self, volume: f64) {
        let current = self.volume();
        let target = Overrides::apply(&self.overrides.volume, current, volume).clamp(0.0, 100.0);
        if let Some(direction) = Direction::from_delta(target - current) {
            self.step_volume(direction);
        }
        self.native.borrow_mut().set_volume(target);
        debug!("player {}: volume {} → {}", self.root, current, target);
    }

    /// One native volume step, showing the widget's own volume indicator.
    pub fn step_volume(&mut self, direction: Direction) {
        let key = match direction {
            Direction::Up => "ArrowUp",
            Direction::Down => "ArrowDown",
        };
        self.native.borrow_mut().handle_key(&KeyStroke::new(key));
    }

    // ── Playback rate ─────────────────────────────────────────────────────────

    pub fn playback_rate(&self) -> f64 {
        let video = self.video_element();
        video
            .and_then(|v| self.page.borrow().media_playback_rate(v))
            .unwrap_or_else(|| self.native.borrow().playback_rate())
    }

    /// No-op while an ad is showing.
    pub fn set_playback_rate(&mut self, rate: f64) {
        if self.is_ad_showing() {
            debug!("player {}: ignoring rate {} during ad", self.root, rate);
            return;
        }
        let current = self.playback_rate();
        let target = Overrides::apply(&self.overrides.playback_rate, current, rate);
        if !(target.is_finite() && target > 0.0) {
            debug!("player {}: rejecting rate {}", self.root, target);
            return;
        }
        if let Some(direction) = Direction::from_delta(target - current) {
            self.step_playback_rate(direction);
            // The native step moves by its own increments; show the real value.
            self.set_osd_text(&format!("{}x", target));
        }
        self.native.borrow_mut().set_playback_rate(target);
        debug!("player {}: rate {} → {}", self.root, current, target);
    }

    /// One native rate step, showing the widget's own rate bezel.
    pub fn step_playback_rate(&mut self, direction: Direction) {
        let key = match direction {
            Direction::Up => ">",
            Direction::Down => "<",
        };
        self.native
            .borrow_mut()
            .handle_key(&KeyStroke::with_modifiers(key, Modifiers::SHIFT));
    }

    fn set_osd_text(&self, text: &str) {
        let mut page = self.page.borrow_mut();
        let osd = page.query_within(self.root, &self.settings.osd_text_selector);
        for el in osd {
            page.set_text(el, text);
        }
    }

    // ── Quality ───────────────────────────────────────────────────────────────

    pub fn playback_quality(&self) -> Quality {
        self.native.borrow().playback_quality()
    }

    pub fn available_qualities(&self) -> Vec<Quality> {
        self.native.borrow().available_quality_levels()
    }

    /// What `set_playback_quality(quality)` would apply right now.
    pub fn resolve_quality(&self, quality: Quality) -> Option<Quality> {
        let available = self.available_qualities();
        if available.contains(&quality) {
            Some(quality)
        } else {
            available.first().copied()
        }
    }

    /// Apply `quality`, or the best available one when it is not offered.
    /// Returns what was applied; `None` when the widget offers nothing yet.
    pub fn set_playback_quality(&mut self, quality: Quality) -> Option<Quality> {
        let chosen = self.resolve_quality(quality)?;
        if chosen != quality {
            debug!(
                "player {}: quality {} unavailable, using {}",
                self.root, quality, chosen
            );
        }
        self.native.borrow_mut().set_playback_quality_range(chosen);
        Some(chosen)
    }

    // ── Timeline ──────────────────────────────────────────────────────────────

    pub fn current_time(&self) -> f64 {
        self.native.borrow().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.native.borrow().duration()
    }

    pub fn seek_relative(&mut self, seconds: f64) {
        let (current, duration) = (self.current_time(), self.duration());
        let mut target = (current + seconds).max(0.0);
        if duration.is_finite() && duration > 0.0 {
            target = target.min(duration);
        }
        self.native.borrow_mut().seek_to(target);
    }

    pub fn is_ad_showing(&self) -> bool {
        self.native.borrow().ad_state() != NO_AD
    }

    // ── Live element sets ─────────────────────────────────────────────────────

    pub fn video_element(&self) -> Option<ElementId> {
        self.page
            .borrow()
            .query_within(self.root, &self.settings.video_selector)
            .into_iter()
            .next()
    }

    pub fn time_displays(&self) -> Vec<ElementId> {
        self.page
            .borrow()
            .query_within(self.root, &self.settings.time_display_selector)
    }

    pub fn scroll_targets(&self) -> Vec<ElementId> {
        self.page
            .borrow()
            .query_within(self.root, &self.settings.scroll_target_selector)
    }

    /// True when `element` is a scroll target or inside one.
    pub fn is_scroll_target(&self, element: ElementId) -> bool {
        let targets = self.scroll_targets();
        let page = self.page.borrow();
        targets.into_iter().any(|t| page.contains(t, element))
    }

    pub fn ui_elements(&self) -> Vec<ElementId> {
        let page = self.page.borrow();
        self.settings.ui_policy.ui_elements(&*page, self.root)
    }

    // ── UI visibility ─────────────────────────────────────────────────────────

    pub fn ui_enabled(&self) -> bool {
        self.ui_enabled
    }

    /// Hide the player chrome, remembering each element's display value.
    /// Elements already remembered keep their first recorded value.
    pub fn hide_ui(&mut self) {
        let elements = self.ui_elements();
        {
            let mut page = self.page.borrow_mut();
            for el in elements {
                let display = page.computed_style(el, "display");
                self.saved_display.entry(el).or_insert(display);
                page.set_inline_display(el, Some("none"));
            }
        }
        self.ignore_next_mutation = true;
        self.ui_enabled = false;
        debug!(
            "player {}: ui hidden ({} elements)",
            self.root,
            self.saved_display.len()
        );
    }

    /// Restore the chrome to exactly what it was before `hide_ui`.
    pub fn show_ui(&mut self) {
        let mut saved = std::mem::take(&mut self.saved_display);
        let elements = self.ui_elements();
        {
            let mut page = self.page.borrow_mut();
            for el in elements {
                match saved.remove(&el) {
                    Some(display) => page.set_inline_display(el, Some(&display)),
                    None => page.set_inline_display(el, None),
                }
            }
            // Chrome the page rebuilt or detached since hiding.
            for (el, display) in saved {
                page.set_inline_display(el, Some(&display));
            }
        }
        self.ignore_next_mutation = true;
        self.ui_enabled = true;
        self.wake_controls();
        debug!("player {}: ui shown", self.root);
    }

    pub fn toggle_ui(&mut self) {
        if self.ui_enabled {
            self.hide_ui();
        } else {
            self.show_ui();
        }
    }

    /// Restored controls stay dormant until the widget sees activity.
    fn wake_controls(&mut self) {
        let woke = self.native.borrow_mut().wake_up_controls();
        if !woke {
            let mut page = self.page.borrow_mut();
            page.dispatch_pointer(self.root, PointerKind::MouseOver);
            page.dispatch_pointer(self.root, PointerKind::MouseMove);
        }
    }

    /// Style mutations observed inside this player. While the chrome is
    /// hidden, changes the widget makes to it are recorded so `show_ui`
    /// restores the widget's latest intent.
    ///
    /// The widget may un-hide elements this way (e.g. during ads); that is
    /// not countered.
    pub fn on_style_mutations(&mut self, elements: &[ElementId]) {
        if std::mem::take(&mut self.ignore_next_mutation) {
            return;
        }
        if self.ui_enabled {
            return;
        }
        let page = self.page.borrow();
        for el in elements {
            if let Some(saved) = self.saved_display.get_mut(el) {
                let shown = page.computed_style(*el, "display");
                debug!(
                    "player {}: captured external display {:?} on {}",
                    self.root, shown, el
                );
                *saved = shown;
            }
        }
    }

    // ── Stats overlay ─────────────────────────────────────────────────────────

    pub fn stats_visible(&self) -> bool {
        let page = self.page.borrow();
        let panel = page
            .query_within(self.root, &self.settings.stats_panel_selector)
            .first()
            .copied();
        panel
            .map(|panel| page.computed_style(panel, "display") != "none")
            .unwrap_or(false)
    }

    pub fn toggle_stats(&mut self) {
        let visible = self.stats_visible();
        let mut native = self.native.borrow_mut();
        if visible {
            native.hide_video_info();
        } else {
            native.show_video_info();
        }
    }
}
