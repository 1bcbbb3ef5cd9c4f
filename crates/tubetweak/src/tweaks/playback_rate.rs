//! PlaybackRate: owns the rate ladder and keeps every player on it.

use tracing::debug;
use tubetweak_proto::config::PlaybackRateConfig;

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::player::Player;
use crate::rate::RateLadder;
use crate::tweak::Tweak;

pub struct PlaybackRate {
    ladder: RateLadder,
}

impl PlaybackRate {
    pub fn new(config: &PlaybackRateConfig) -> Self {
        Self {
            ladder: RateLadder::new(config.steps().to_vec(), config.default_rate),
        }
    }
}

impl Tweak for PlaybackRate {
    fn name(&self) -> &str {
        "playback_rate"
    }

    fn on_app_eager_init(&mut self, app: &mut AppState) -> HookResult {
        app.set_rate_ladder(self.ladder.clone());
        Ok(())
    }

    /// Every rate request, from any tweak, is kept within the ladder.
    fn on_player_eager_init(&mut self, player: &mut Player) -> HookResult {
        let (min, max) = (self.ladder.min(), self.ladder.max());
        player.override_playback_rate(move |_, requested| requested.clamp(min, max));
        Ok(())
    }

    fn on_player_init(&mut self, player: &mut Player) -> HookResult {
        let rate = self.ladder.default_rate();
        if (player.playback_rate() - rate).abs() > f64::EPSILON {
            debug!("player {}: default rate {}", player.root(), rate);
            player.set_playback_rate(rate);
        }
        Ok(())
    }
}
