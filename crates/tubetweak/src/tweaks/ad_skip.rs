//! AdSkip: clicks an ad's skip button as soon as it can be clicked.

use std::rc::Rc;
use std::time::Duration;

use tracing::info;
use tubetweak_proto::config::AdSkipConfig;

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::player::Player;
use crate::policy::SkipButtonPolicy;
use crate::tweak::Tweak;

pub struct AdSkip {
    selector: String,
    policy: Rc<dyn SkipButtonPolicy>,
    check_interval: Duration,
}

impl AdSkip {
    pub fn new(selector: String, policy: Rc<dyn SkipButtonPolicy>, config: &AdSkipConfig) -> Self {
        Self {
            selector,
            policy,
            check_interval: Duration::from_millis(config.check_interval_ms),
        }
    }
}

/// Returns `true` when a skip button was clicked.
fn try_skip(player: &Player, selector: &str, policy: &dyn SkipButtonPolicy) -> bool {
    if !player.is_ad_showing() {
        return false;
    }
    let page = player.page();
    let buttons = page.borrow().query_within(player.root(), selector);
    for button in buttons {
        let clickable = policy.is_clickable(&*page.borrow(), button);
        if clickable {
            info!("player {}: skipping ad via {}", player.root(), button);
            page.borrow_mut().click(button);
            return true;
        }
    }
    false
}

impl Tweak for AdSkip {
    fn name(&self) -> &str {
        "ad_skip"
    }

    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        let selector = self.selector.clone();
        let policy = self.policy.clone();
        app.set_interval(self.check_interval, move |app| {
            for player in app.players() {
                try_skip(player, &selector, policy.as_ref());
            }
        });
        Ok(())
    }

    fn on_player_refresh(&mut self, player: &mut Player) -> HookResult {
        try_skip(player, &self.selector, self.policy.as_ref());
        Ok(())
    }
}
