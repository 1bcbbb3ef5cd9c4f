//! PreferredQuality: keeps every player on the preferred quality, or the
//! best one offered when the preferred one is not.

use tracing::info;
use tubetweak_proto::protocol::Quality;

use crate::error::HookResult;
use crate::player::Player;
use crate::tweak::Tweak;

pub struct PreferredQuality {
    preferred: Quality,
}

impl PreferredQuality {
    pub fn new(preferred: Quality) -> Self {
        Self { preferred }
    }

    fn apply(&self, player: &mut Player) {
        // `auto` means leave the widget's own choice alone.
        if self.preferred == Quality::Auto {
            return;
        }
        let Some(target) = player.resolve_quality(self.preferred) else {
            return;
        };
        if player.playback_quality() == target {
            return;
        }
        if let Some(applied) = player.set_playback_quality(self.preferred) {
            info!("player {}: quality → {}", player.root(), applied);
        }
    }
}

impl Tweak for PreferredQuality {
    fn name(&self) -> &str {
        "preferred_quality"
    }

    fn on_player_init(&mut self, player: &mut Player) -> HookResult {
        self.apply(player);
        Ok(())
    }

    /// Quality levels show up late and reset on navigation.
    fn on_player_refresh(&mut self, player: &mut Player) -> HookResult {
        self.apply(player);
        Ok(())
    }
}
