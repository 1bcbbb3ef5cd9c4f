//! VolumeScroll: mouse wheel over a player's video or control bar changes
//! its volume.

use tracing::debug;
use tubetweak_proto::protocol::{Direction, InputEvent};

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::tweak::Tweak;

pub struct VolumeScroll {
    /// Percent per wheel notch.
    step: f64,
}

impl VolumeScroll {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl Tweak for VolumeScroll {
    fn name(&self) -> &str {
        "volume_scroll"
    }

    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        let step = self.step;
        app.add_input_handler(move |app, event| {
            let InputEvent::Wheel(wheel) = event else {
                return false;
            };
            // Scrolling up (negative delta) raises the volume.
            let Some(direction) = Direction::from_delta(-wheel.delta_y) else {
                return false;
            };
            let Some(player) = app
                .players_mut()
                .iter_mut()
                .find(|p| p.is_scroll_target(wheel.target))
            else {
                return false;
            };
            let target = player.volume() + direction.sign() * step;
            debug!("wheel over player {}: volume → {}", player.root(), target);
            player.set_volume(target);
            true
        });
        Ok(())
    }
}
