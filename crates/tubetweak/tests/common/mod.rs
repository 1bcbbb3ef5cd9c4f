#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tubetweak::app::App;
use tubetweak::error::{HookResult, TweakError};
use tubetweak::player::{Player, PlayerSettings};
use tubetweak::scheduler::{ManualScheduler, Scheduled, Scheduler};
use tubetweak::sim::{PlayerSpec, SimPage, SimPlayer};
use tubetweak::{AppState, Tweak};
use tubetweak_proto::config::{Config, PageConfig};
use tubetweak_proto::page::SharedPage;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn page_with(specs: Vec<PlayerSpec>) -> (Rc<RefCell<SimPage>>, Vec<Rc<RefCell<SimPlayer>>>) {
    let page = Rc::new(RefCell::new(SimPage::new()));
    let players = specs
        .into_iter()
        .map(|spec| page.borrow_mut().add_player(spec))
        .collect();
    (page, players)
}

/// App with an explicit tweak list and default page settings.
pub fn app_with(page: &Rc<RefCell<SimPage>>, tweaks: Vec<Box<dyn Tweak>>) -> (App, ManualScheduler) {
    let sched = ManualScheduler::new();
    let shared: SharedPage = page.clone();
    let settings = Rc::new(PlayerSettings::from_config(&PageConfig::default()));
    let app = App::new(shared, settings, Rc::new(sched.clone()), tweaks);
    (app, sched)
}

/// App with the tweaks `config` enables.
pub fn app_from_config(page: &Rc<RefCell<SimPage>>, config: &Config) -> (App, ManualScheduler) {
    let sched = ManualScheduler::new();
    let shared: SharedPage = page.clone();
    let scheduler: Rc<dyn Scheduler> = Rc::new(sched.clone());
    (App::from_config(shared, config, scheduler), sched)
}

/// First recorded request with the given delay.
pub fn scheduled_with_delay(requests: &[Scheduled], millis: u64) -> Option<Scheduled> {
    requests
        .iter()
        .copied()
        .find(|r| r.delay.as_millis() == u128::from(millis))
}

/// Logs every hook call as `name:hook` or `name:hook:#root`.
pub struct Recorder {
    pub name: &'static str,
    pub log: Log,
    /// Hook name on which to return an error.
    pub fail_on: Option<&'static str>,
    /// Hook name on which to panic.
    pub panic_on: Option<&'static str>,
}

impl Recorder {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            fail_on: None,
            panic_on: None,
        }
    }

    fn record(&self, hook: &str, player: Option<&Player>) -> HookResult {
        let entry = match player {
            Some(p) => format!("{}:{}:{}", self.name, hook, p.root()),
            None => format!("{}:{}", self.name, hook),
        };
        self.log.borrow_mut().push(entry);
        if self.panic_on == Some(hook) {
            panic!("{} exploded in {}", self.name, hook);
        }
        if self.fail_on == Some(hook) {
            return Err(TweakError::Custom(format!("{} failed in {}", self.name, hook)));
        }
        Ok(())
    }
}

impl Tweak for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn on_app_eager_init(&mut self, _app: &mut AppState) -> HookResult {
        self.record("app_eager", None)
    }

    fn on_app_init(&mut self, _app: &mut AppState) -> HookResult {
        self.record("app_init", None)
    }

    fn on_app_refresh(&mut self, _app: &mut AppState) -> HookResult {
        self.record("app_refresh", None)
    }

    fn on_player_eager_init(&mut self, player: &mut Player) -> HookResult {
        self.record("player_eager", Some(player))
    }

    fn on_player_init(&mut self, player: &mut Player) -> HookResult {
        self.record("player_init", Some(player))
    }

    fn on_player_refresh(&mut self, player: &mut Player) -> HookResult {
        self.record("player_refresh", Some(player))
    }
}

pub fn entries(log: &Log, hook: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|e| e.split(':').nth(1) == Some(hook))
        .cloned()
        .collect()
}
