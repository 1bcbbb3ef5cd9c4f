//! EffectiveTime: shows how much real time is left at the current rate.
//!
//! A label is appended to each time display of each player, e.g.
//! ` 01:02 / 1:01:32 (2x)`. At normal speed the label is empty.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;
use tubetweak_proto::config::EffectiveTimeConfig;
use tubetweak_proto::protocol::ElementId;

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::player::Player;
use crate::time::eff_time_strings;
use crate::tweak::Tweak;

pub const LABEL_CLASS: &str = "tubetweak-effective-time";

/// time display → our label inside it. Grows only.
type Labels = Rc<RefCell<HashMap<ElementId, ElementId>>>;

pub struct EffectiveTime {
    update_interval: Duration,
    labels: Labels,
}

impl EffectiveTime {
    pub fn new(config: &EffectiveTimeConfig) -> Self {
        Self {
            update_interval: Duration::from_millis(config.update_interval_ms),
            labels: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn label_text(player: &Player) -> String {
        let rate = player.playback_rate();
        if (rate - 1.0).abs() < f64::EPSILON {
            return String::new();
        }
        let t = eff_time_strings(player.current_time(), player.duration(), rate);
        format!(" {} / {} {}", t.current, t.duration, t.rate_label)
    }
}

fn update_player(player: &Player, labels: &Labels) {
    let text = EffectiveTime::label_text(player);
    let displays = player.time_displays();
    let mut labels = labels.borrow_mut();
    let mut page = player.page().borrow_mut();
    for td in displays {
        let label = *labels.entry(td).or_insert_with(|| {
            debug!("player {}: patching time display {}", player.root(), td);
            page.create_element("span", LABEL_CLASS)
        });
        // Also re-attaches a label the page dropped when it re-rendered.
        if !page.contains(td, label) {
            page.append_child(td, label);
        }
        if page.text(label) != text {
            page.set_text(label, &text);
        }
    }
}

impl Tweak for EffectiveTime {
    fn name(&self) -> &str {
        "effective_time"
    }

    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        let labels = self.labels.clone();
        app.set_interval(self.update_interval, move |app| {
            for player in app.players() {
                update_player(player, &labels);
            }
        });
        Ok(())
    }

    fn on_player_init(&mut self, player: &mut Player) -> HookResult {
        update_player(player, &self.labels);
        Ok(())
    }

    fn on_player_refresh(&mut self, player: &mut Player) -> HookResult {
        update_player(player, &self.labels);
        Ok(())
    }
}
