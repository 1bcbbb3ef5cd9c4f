//! FocusMain: gives the main player keyboard focus once it exists, so the
//! native shortcuts work without clicking it first.

use std::time::Duration;

use tracing::info;
use tubetweak_proto::config::FocusMainConfig;

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::tweak::Tweak;

pub struct FocusMain {
    max_tries: u32,
    retry_interval: Duration,
}

impl FocusMain {
    pub fn new(config: &FocusMainConfig) -> Self {
        Self {
            max_tries: config.max_tries,
            retry_interval: Duration::from_millis(config.retry_interval_ms),
        }
    }
}

impl Tweak for FocusMain {
    fn name(&self) -> &str {
        "focus_main"
    }

    /// App init runs before discovery, so the first check usually misses.
    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        app.retry_on_fail(self.max_tries, self.retry_interval, |app| {
            let Some(main) = app.main_player() else {
                return false;
            };
            main.focus();
            info!("focused main player {}", main.root());
            true
        });
        Ok(())
    }
}
