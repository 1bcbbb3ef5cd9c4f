//! App: owns the tweaks and the player registry, and drives the lifecycle.
//!
//! Order of hook fan-out:
//! - `load`: every tweak's app eager hook, then every tweak's app init hook,
//!   then player discovery.
//! - discovery, per new player: every tweak's player eager hook, then every
//!   tweak's player init hook, then the player is tracked.
//! - `refresh`: discovery, every tweak's app refresh hook, then for each
//!   tracked player every tweak's player refresh hook.
//!
//! Within one step tweaks run in registration order.

use std::rc::Rc;

use tracing::{debug, info, warn};
use tubetweak_proto::config::Config;
use tubetweak_proto::page::SharedPage;
use tubetweak_proto::protocol::InputEvent;

use crate::app_state::AppState;
use crate::player::{Player, PlayerSettings};
use crate::runtime::PageEvent;
use crate::scheduler::{JobId, Scheduler};
use crate::tweak::{invoke, Hook, Tweak};
use crate::tweaks;

pub struct App {
    tweaks: Vec<Box<dyn Tweak>>,
    state: AppState,
    loaded: bool,
}

impl App {
    pub fn new(
        page: SharedPage,
        settings: Rc<PlayerSettings>,
        scheduler: Rc<dyn Scheduler>,
        tweaks: Vec<Box<dyn Tweak>>,
    ) -> Self {
        Self {
            tweaks,
            state: AppState::new(page, settings, scheduler),
            loaded: false,
        }
    }

    /// An app with the tweaks enabled in `config`.
    pub fn from_config(page: SharedPage, config: &Config, scheduler: Rc<dyn Scheduler>) -> Self {
        let settings = Rc::new(PlayerSettings::from_config(&config.page));
        let tweaks = tweaks::from_config(config);
        info!(
            "tweaks: {}",
            tweaks.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
        );
        Self::new(page, settings, scheduler, tweaks)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn tweak_names(&self) -> Vec<&str> {
        self.tweaks.iter().map(|t| t.name()).collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Page finished loading. Runs once; later calls are ignored.
    pub fn load(&mut self) {
        if self.loaded {
            warn!("load: already loaded, ignoring");
            return;
        }
        self.loaded = true;
        info!("load: initialising {} tweaks", self.tweaks.len());

        let state = &mut self.state;
        for tweak in self.tweaks.iter_mut() {
            invoke(tweak.as_mut(), Hook::AppEagerInit, |t| {
                t.on_app_eager_init(state)
            });
        }
        for tweak in self.tweaks.iter_mut() {
            invoke(tweak.as_mut(), Hook::AppInit, |t| t.on_app_init(state));
        }

        self.discover_players();
    }

    /// Wrap every player widget on the page not tracked yet.
    /// Returns how many were added.
    pub fn discover_players(&mut self) -> usize {
        let settings = self.state.settings().clone();
        let page = self.state.page().clone();
        let roots = page.borrow().query_all(&settings.player_selector);

        let mut added = 0;
        for root in roots {
            if self.state.is_tracked(root) {
                continue;
            }
            let native = page.borrow().native_player(root);
            let Some(native) = native else {
                debug!("discover: {} has no native widget yet", root);
                continue;
            };

            let mut player = Player::new(root, native, page.clone(), settings.clone());
            for tweak in self.tweaks.iter_mut() {
                invoke(tweak.as_mut(), Hook::PlayerEagerInit, |t| {
                    t.on_player_eager_init(&mut player)
                });
            }
            for tweak in self.tweaks.iter_mut() {
                invoke(tweak.as_mut(), Hook::PlayerInit, |t| {
                    t.on_player_init(&mut player)
                });
            }

            info!("discover: tracking player {} (main: {})", root, player.is_main());
            self.state.track(player);
            added += 1;
        }
        added
    }

    /// Refresh signal from the page (navigation, visibility change, ...).
    /// Allowed before `load`.
    pub fn refresh(&mut self) {
        let added = self.discover_players();
        debug!(
            "refresh: {} new, {} tracked",
            added,
            self.state.players().len()
        );

        let state = &mut self.state;
        for tweak in self.tweaks.iter_mut() {
            invoke(tweak.as_mut(), Hook::AppRefresh, |t| t.on_app_refresh(state));
        }
        for player in state.players_mut().iter_mut() {
            for tweak in self.tweaks.iter_mut() {
                invoke(tweak.as_mut(), Hook::PlayerRefresh, |t| {
                    t.on_player_refresh(player)
                });
            }
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.state.handle_input(event)
    }

    pub fn run_job(&mut self, id: JobId) {
        self.state.run_job(id);
    }

    /// Apply one page event, then hand any resulting style mutations to
    /// the players they belong to.
    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Load => self.load(),
            PageEvent::VisibilityRefresh => self.refresh(),
            PageEvent::Input { input } => {
                let handled = self.handle_input(&input);
                debug!("input {:?} handled: {}", input, handled);
            }
            PageEvent::Timer(job) => self.run_job(job),
            PageEvent::Shutdown => {}
        }
        self.state.flush_style_mutations();
    }
}
