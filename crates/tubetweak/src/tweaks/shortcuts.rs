//! Shortcuts: keyboard bindings to player actions.

use std::rc::Rc;

use tracing::debug;
use tubetweak_proto::config::ShortcutsConfig;
use tubetweak_proto::protocol::{Action, Direction, InputEvent, KeyStroke, Modifiers};

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::tweak::Tweak;

/// Keys typed into these are never treated as shortcuts.
const TEXT_INPUT_SELECTOR: &str = "input, textarea";

pub fn default_bindings() -> Vec<(KeyStroke, Action)> {
    vec![
        (
            KeyStroke::new("d"),
            Action::StepRate {
                direction: Direction::Up,
            },
        ),
        (
            KeyStroke::new("s"),
            Action::StepRate {
                direction: Direction::Down,
            },
        ),
        (KeyStroke::new("r"), Action::ResetRate),
        (KeyStroke::new("h"), Action::ToggleUi),
        (KeyStroke::new("i"), Action::ToggleStats),
        (KeyStroke::new("p"), Action::FocusNextPlayer),
        (
            KeyStroke::with_modifiers("P", Modifiers::SHIFT),
            Action::FocusPrevPlayer,
        ),
    ]
}

/// Key strokes to actions. Configured bindings come first, so they shadow
/// the built-in ones.
pub struct Keymap {
    bindings: Vec<(KeyStroke, Action)>,
}

impl Keymap {
    pub fn new(config: &ShortcutsConfig) -> Self {
        let mut bindings: Vec<(KeyStroke, Action)> = config
            .extra
            .iter()
            .map(|s| (s.stroke.clone(), s.action.clone()))
            .collect();
        bindings.extend(default_bindings());
        Self { bindings }
    }

    pub fn action_for(&self, stroke: &KeyStroke) -> Option<&Action> {
        self.bindings
            .iter()
            .find(|(k, _)| k == stroke)
            .map(|(_, a)| a)
    }
}

pub struct Shortcuts {
    keymap: Rc<Keymap>,
}

impl Shortcuts {
    pub fn new(config: &ShortcutsConfig) -> Self {
        Self {
            keymap: Rc::new(Keymap::new(config)),
        }
    }
}

impl Tweak for Shortcuts {
    fn name(&self) -> &str {
        "shortcuts"
    }

    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        let keymap = self.keymap.clone();
        app.add_input_handler(move |app, event| {
            let InputEvent::Key(stroke) = event else {
                return false;
            };
            let typing = {
                let page = app.page().borrow();
                page.active_element()
                    .map(|el| page.matches(el, TEXT_INPUT_SELECTOR))
                    .unwrap_or(false)
            };
            if typing {
                return false;
            }
            let Some(action) = keymap.action_for(stroke) else {
                return false;
            };
            debug!("shortcut {} → {:?}", stroke, action);
            app.apply_action(action)
        });
        Ok(())
    }
}
