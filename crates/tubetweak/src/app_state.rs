//! AppState: everything the app-level hooks may touch.
//!
//! Owned by `App` next to the tweak list, so a hook can get `&mut AppState`
//! while the tweak itself is borrowed mutably.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};
use tubetweak_proto::page::SharedPage;
use tubetweak_proto::protocol::{Action, ElementId, InputEvent};

use crate::focus::FocusRing;
use crate::player::{Player, PlayerSettings};
use crate::rate::RateLadder;
use crate::scheduler::{JobId, Scheduler};
use crate::tweak::contain;

/// Returns `true` when it consumed the event.
pub type InputHandler = Box<dyn FnMut(&mut AppState, &InputEvent) -> bool>;

enum Job {
    Interval(Box<dyn FnMut(&mut AppState)>),
    Retry {
        check: Box<dyn FnMut(&mut AppState) -> bool>,
        remaining: u32,
        interval: Duration,
    },
}

pub struct AppState {
    page: SharedPage,
    settings: Rc<PlayerSettings>,
    players: Vec<Player>,
    rate_ladder: RateLadder,
    scheduler: Rc<dyn Scheduler>,
    jobs: HashMap<JobId, Job>,
    next_job: u64,
    input_handlers: Vec<InputHandler>,
}

impl AppState {
    pub fn new(page: SharedPage, settings: Rc<PlayerSettings>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            page,
            settings,
            players: Vec::new(),
            rate_ladder: RateLadder::default(),
            scheduler,
            jobs: HashMap::new(),
            next_job: 0,
            input_handlers: Vec::new(),
        }
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn settings(&self) -> &Rc<PlayerSettings> {
        &self.settings
    }

    // ── Players ───────────────────────────────────────────────────────────────

    /// Tracked players, in discovery order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn player(&self, root: ElementId) -> Option<&Player> {
        self.players.iter().find(|p| p.root() == root)
    }

    pub fn player_mut(&mut self, root: ElementId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.root() == root)
    }

    pub fn is_tracked(&self, root: ElementId) -> bool {
        self.player(root).is_some()
    }

    /// Returns `false` (and drops `player`) when its widget is already tracked.
    pub fn track(&mut self, player: Player) -> bool {
        if self.is_tracked(player.root()) {
            return false;
        }
        self.players.push(player);
        true
    }

    pub fn main_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_main())
    }

    pub fn main_player_mut(&mut self) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.is_main())
    }

    /// The player containing the page's active element.
    pub fn focused_player(&self) -> Option<&Player> {
        let active = self.page.borrow().active_element()?;
        self.players.iter().find(|p| p.contains(active))
    }

    /// Focused player, else the main player.
    fn target_root(&self) -> Option<ElementId> {
        self.focused_player()
            .or_else(|| self.main_player())
            .map(Player::root)
    }

    fn focus_ring(&self) -> FocusRing<ElementId> {
        let roots = self.players.iter().map(Player::root).collect();
        FocusRing::new(roots, self.focused_player().map(Player::root))
    }

    /// Move keyboard focus to the next tracked player, wrapping around.
    pub fn focus_next_player(&mut self) -> Option<ElementId> {
        let next = self.focus_ring().advance()?;
        self.page.borrow_mut().focus(next);
        debug!("focus → player {}", next);
        Some(next)
    }

    pub fn focus_prev_player(&mut self) -> Option<ElementId> {
        let prev = self.focus_ring().retreat()?;
        self.page.borrow_mut().focus(prev);
        debug!("focus → player {}", prev);
        Some(prev)
    }

    // ── Rate ladder ───────────────────────────────────────────────────────────

    pub fn rate_ladder(&self) -> &RateLadder {
        &self.rate_ladder
    }

    pub fn set_rate_ladder(&mut self, ladder: RateLadder) {
        self.rate_ladder = ladder;
    }

    // ── Actions and input ─────────────────────────────────────────────────────

    /// Apply `action` to the focused player (or the main one).
    /// Returns `false` when there was nothing to act on.
    pub fn apply_action(&mut self, action: &Action) -> bool {
        match action {
            Action::FocusNextPlayer => return self.focus_next_player().is_some(),
            Action::FocusPrevPlayer => return self.focus_prev_player().is_some(),
            _ => {}
        }

        let Some(root) = self.target_root() else {
            debug!("action {:?}: no player", action);
            return false;
        };
        let ladder = &self.rate_ladder;
        let Some(player) = self.players.iter_mut().find(|p| p.root() == root) else {
            return false;
        };

        match action {
            Action::StepVolume { direction } => player.step_volume(*direction),
            Action::StepRate { direction } => {
                let target = ladder.step(player.playback_rate(), *direction);
                player.set_playback_rate(target);
            }
            Action::ResetRate => player.set_playback_rate(ladder.default_rate()),
            Action::ToggleUi => player.toggle_ui(),
            Action::ToggleStats => player.toggle_stats(),
            Action::SeekRelative { seconds } => player.seek_relative(*seconds),
            Action::FocusNextPlayer | Action::FocusPrevPlayer => return false,
        }
        debug!("action {:?} → player {}", action, root);
        true
    }

    /// Handlers run in registration order until one consumes the event.
    pub fn add_input_handler(
        &mut self,
        handler: impl FnMut(&mut AppState, &InputEvent) -> bool + 'static,
    ) {
        self.input_handlers.push(Box::new(handler));
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let mut handlers = std::mem::take(&mut self.input_handlers);
        let mut handled = false;
        for (i, handler) in handlers.iter_mut().enumerate() {
            // A panicking handler counts as not consuming the event.
            if contain(format_args!("input handler {}", i), || handler(self, event))
                .unwrap_or(false)
            {
                handled = true;
                break;
            }
        }
        // Handlers registered while dispatching go after the existing ones.
        handlers.append(&mut self.input_handlers);
        self.input_handlers = handlers;
        handled
    }

    // ── Jobs ──────────────────────────────────────────────────────────────────

    fn next_job_id(&mut self) -> JobId {
        self.next_job += 1;
        JobId(self.next_job)
    }

    /// Run `f` every `period` until cancelled.
    pub fn set_interval(
        &mut self,
        period: Duration,
        f: impl FnMut(&mut AppState) + 'static,
    ) -> JobId {
        let id = self.next_job_id();
        self.jobs.insert(id, Job::Interval(Box::new(f)));
        self.scheduler.every(period, id);
        id
    }

    /// Call `check` now, and again every `interval` while it keeps returning
    /// `false`, for at most `max_tries` calls in total. Exhausting the budget
    /// is silent.
    ///
    /// Returns the pending job, or `None` when no retry was needed.
    pub fn retry_on_fail(
        &mut self,
        max_tries: u32,
        interval: Duration,
        check: impl FnMut(&mut AppState) -> bool + 'static,
    ) -> Option<JobId> {
        if max_tries == 0 {
            return None;
        }
        let mut check: Box<dyn FnMut(&mut AppState) -> bool> = Box::new(check);
        if contain("retry check", || check(self)).unwrap_or(false) {
            return None;
        }
        let remaining = max_tries - 1;
        if remaining == 0 {
            debug!("retry: gave up after 1 try");
            return None;
        }
        let id = self.next_job_id();
        self.jobs.insert(
            id,
            Job::Retry {
                check,
                remaining,
                interval,
            },
        );
        self.scheduler.after(interval, id);
        Some(id)
    }

    pub fn cancel_job(&mut self, id: JobId) -> bool {
        self.jobs.remove(&id).is_some()
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// A timer for `id` fired. Unknown (cancelled or finished) jobs are ignored.
    pub fn run_job(&mut self, id: JobId) {
        // The job is taken out while it runs so it can borrow the state.
        let Some(job) = self.jobs.remove(&id) else {
            debug!("{}: no longer scheduled", id);
            return;
        };
        match job {
            Job::Interval(mut f) => {
                // Kept scheduled even when this run panicked.
                contain(id, || f(self));
                self.jobs.insert(id, Job::Interval(f));
            }
            Job::Retry {
                mut check,
                remaining,
                interval,
            } => {
                // A panicking check uses up a try like a failing one.
                if contain(id, || check(self)).unwrap_or(false) {
                    debug!("{}: succeeded", id);
                    return;
                }
                let remaining = remaining - 1;
                if remaining == 0 {
                    debug!("{}: gave up", id);
                    return;
                }
                self.jobs.insert(
                    id,
                    Job::Retry {
                        check,
                        remaining,
                        interval,
                    },
                );
                self.scheduler.after(interval, id);
            }
        }
    }

    // ── Style mutations ───────────────────────────────────────────────────────

    /// Hand each player the mutated elements inside it.
    pub fn route_style_mutations(&mut self, elements: &[ElementId]) {
        if elements.is_empty() {
            return;
        }
        for player in self.players.iter_mut() {
            let mine: Vec<ElementId> = {
                let page = self.page.borrow();
                elements
                    .iter()
                    .copied()
                    .filter(|el| page.contains(player.root(), *el))
                    .collect()
            };
            if !mine.is_empty() {
                player.on_style_mutations(&mine);
            }
        }
    }

    /// Drain the page's pending style mutations and route them.
    pub fn flush_style_mutations(&mut self) {
        let mutations = self.page.borrow_mut().take_style_mutations();
        if !mutations.is_empty() {
            debug!("routing {} style mutations", mutations.len());
        }
        self.route_style_mutations(&mutations);
    }

    pub(crate) fn log_summary(&self) {
        info!(
            "{} players tracked, {} jobs pending, {} input handlers",
            self.players.len(),
            self.jobs.len(),
            self.input_handlers.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use tubetweak_proto::config::PageConfig;
    use tubetweak_proto::page::Page;
    use tubetweak_proto::protocol::{Direction, KeyStroke, WheelEvent};

    use crate::scheduler::{ManualScheduler, Scheduled};
    use crate::sim::{PlayerSpec, SimPage};

    fn state_with(
        specs: Vec<PlayerSpec>,
    ) -> (Rc<RefCell<SimPage>>, ManualScheduler, AppState) {
        let page = Rc::new(RefCell::new(SimPage::new()));
        for spec in specs {
            page.borrow_mut().add_player(spec);
        }
        let sched = ManualScheduler::new();
        let shared: SharedPage = page.clone();
        let settings = Rc::new(PlayerSettings::from_config(&PageConfig::default()));
        let mut state = AppState::new(shared.clone(), settings.clone(), Rc::new(sched.clone()));

        let roots = page.borrow().query_all(&settings.player_selector);
        for root in roots {
            let native = page.borrow().native_player(root).unwrap();
            state.track(Player::new(root, native, shared.clone(), settings.clone()));
        }
        (page, sched, state)
    }

    #[test]
    fn test_retry_on_fail_stops_after_max_tries() {
        let (_page, sched, mut state) = state_with(Vec::new());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();

        let id = state
            .retry_on_fail(3, Duration::from_millis(100), move |_| {
                c.set(c.get() + 1);
                false
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(
            sched.take(),
            vec![Scheduled {
                job: id,
                delay: Duration::from_millis(100),
                repeat: false
            }]
        );

        state.run_job(id);
        assert_eq!(calls.get(), 2);
        assert_eq!(sched.take().len(), 1);

        state.run_job(id);
        assert_eq!(calls.get(), 3);
        assert!(sched.take().is_empty());
        assert_eq!(state.pending_jobs(), 0);

        // A stray timer after giving up does nothing.
        state.run_job(id);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_on_fail_immediate_success_schedules_nothing() {
        let (_page, sched, mut state) = state_with(Vec::new());
        assert!(state
            .retry_on_fail(5, Duration::from_millis(10), |_| true)
            .is_none());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_retry_on_fail_succeeds_on_later_try() {
        let (_page, sched, mut state) = state_with(Vec::new());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let id = state
            .retry_on_fail(10, Duration::from_millis(10), move |_| {
                c.set(c.get() + 1);
                c.get() == 2
            })
            .unwrap();
        sched.take();
        state.run_job(id);
        assert_eq!(calls.get(), 2);
        assert!(sched.take().is_empty());
    }

    #[test]
    fn test_interval_runs_until_cancelled() {
        let (_page, sched, mut state) = state_with(Vec::new());
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let id = state.set_interval(Duration::from_millis(500), move |_| t.set(t.get() + 1));
        assert!(sched.take()[0].repeat);

        state.run_job(id);
        state.run_job(id);
        assert_eq!(ticks.get(), 2);

        assert!(state.cancel_job(id));
        state.run_job(id);
        assert_eq!(ticks.get(), 2);
    }

    #[test]
    fn test_main_and_focused_player() {
        let (page, _sched, mut state) =
            state_with(vec![PlayerSpec::embedded(), PlayerSpec::main()]);
        let main = state.main_player().unwrap().root();
        let embedded = state.players()[0].root();
        assert_ne!(main, embedded);
        assert!(state.focused_player().is_none());

        page.borrow_mut().focus(embedded);
        assert_eq!(state.focused_player().map(Player::root), Some(embedded));

        assert_eq!(state.focus_next_player(), Some(main));
        assert_eq!(state.focus_next_player(), Some(embedded));
        assert_eq!(state.focus_prev_player(), Some(main));
        assert_eq!(page.borrow().active_element(), Some(main));
    }

    #[test]
    fn test_track_rejects_duplicates() {
        let (page, _sched, mut state) = state_with(vec![PlayerSpec::main()]);
        let root = state.players()[0].root();
        let native = page.borrow().native_player(root).unwrap();
        let shared: SharedPage = page.clone();
        let dup = Player::new(root, native, shared, state.settings().clone());
        assert!(!state.track(dup));
        assert_eq!(state.players().len(), 1);
    }

    #[test]
    fn test_apply_action_targets_focused_then_main() {
        let (page, _sched, mut state) =
            state_with(vec![PlayerSpec::main(), PlayerSpec::embedded()]);
        let main = state.players()[0].root();
        let embedded = state.players()[1].root();

        let up = Action::StepRate {
            direction: Direction::Up,
        };
        assert!(state.apply_action(&up));
        assert_eq!(state.player(main).unwrap().playback_rate(), 1.25);

        page.borrow_mut().focus(embedded);
        assert!(state.apply_action(&up));
        assert!(state.apply_action(&up));
        assert_eq!(state.player(embedded).unwrap().playback_rate(), 1.5);
        assert!(state.apply_action(&Action::ResetRate));
        assert_eq!(state.player(embedded).unwrap().playback_rate(), 1.0);
        assert_eq!(state.player(main).unwrap().playback_rate(), 1.25);
    }

    #[test]
    fn test_apply_action_without_players() {
        let (_page, _sched, mut state) = state_with(Vec::new());
        assert!(!state.apply_action(&Action::ToggleUi));
        assert!(!state.apply_action(&Action::FocusNextPlayer));
    }

    #[test]
    fn test_input_handlers_stop_at_first_consumer() {
        let (_page, _sched, mut state) = state_with(Vec::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        state.add_input_handler(move |_, ev| {
            s.borrow_mut().push("keys");
            matches!(ev, InputEvent::Key(_))
        });
        let s = seen.clone();
        state.add_input_handler(move |_, _| {
            s.borrow_mut().push("all");
            true
        });

        assert!(state.handle_input(&InputEvent::Key(KeyStroke::new("d"))));
        assert!(state.handle_input(&InputEvent::Wheel(WheelEvent {
            target: ElementId(1),
            delta_y: -1.0
        })));
        assert_eq!(*seen.borrow(), vec!["keys", "keys", "all"]);
    }

    #[test]
    fn test_panicking_input_handler_is_contained() {
        let (_page, _sched, mut state) = state_with(Vec::new());
        let counted = Rc::new(Cell::new(0));

        state.add_input_handler(|_, ev| match ev {
            InputEvent::Key(k) if k.key == "x" => panic!("handler blew up"),
            _ => false,
        });
        let c = counted.clone();
        state.add_input_handler(move |_, _| {
            c.set(c.get() + 1);
            true
        });

        assert!(state.handle_input(&InputEvent::Key(KeyStroke::new("x"))));
        assert_eq!(counted.get(), 1);
        // Both handlers are still registered.
        assert!(state.handle_input(&InputEvent::Key(KeyStroke::new("x"))));
        assert_eq!(counted.get(), 2);
    }

    #[test]
    fn test_panicking_jobs_are_contained() {
        let (_page, sched, mut state) = state_with(Vec::new());
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let interval = state.set_interval(Duration::from_millis(500), move |_| {
            t.set(t.get() + 1);
            if t.get() == 1 {
                panic!("first tick blew up");
            }
        });
        state.run_job(interval);
        state.run_job(interval);
        assert_eq!(ticks.get(), 2);

        let tries = Rc::new(Cell::new(0));
        let t = tries.clone();
        let retry = state
            .retry_on_fail(3, Duration::from_millis(100), move |_| {
                t.set(t.get() + 1);
                panic!("check blew up");
            })
            .unwrap();
        sched.take();
        state.run_job(retry);
        assert_eq!(tries.get(), 2);
        state.run_job(retry);
        assert_eq!(tries.get(), 3);
        // Budget used up; only the interval is left.
        assert_eq!(state.pending_jobs(), 1);
    }

    #[test]
    fn test_route_style_mutations_per_player() {
        let (page, _sched, mut state) =
            state_with(vec![PlayerSpec::main(), PlayerSpec::embedded()]);
        let main = state.players()[0].root();
        state.player_mut(main).unwrap().hide_ui();
        state.flush_style_mutations();

        let bottom = page
            .borrow()
            .query_within(main, ".ytp-chrome-bottom")
            .into_iter()
            .next()
            .unwrap();
        page.borrow_mut().set_inline_display(bottom, Some("flex"));
        state.flush_style_mutations();

        state.player_mut(main).unwrap().show_ui();
        assert_eq!(page.borrow().computed_style(bottom, "display"), "flex");
    }
}
