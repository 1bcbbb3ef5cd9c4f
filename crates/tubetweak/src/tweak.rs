//! Tweak trait: the interface every behavior plug-in implements.
//!
//! Contract:
//! - All six hooks are optional; the defaults do nothing.
//! - Hooks are only ever called by `App`, never by one tweak on another.
//! - Eager hooks run for every tweak before any init hook at the same
//!   granularity. They are the place to install overrides.
//! - Refresh hooks run on every refresh signal and must be idempotent.
//! - A failing or panicking hook is logged and skipped; the fan-out carries on
//!   with the next tweak and the next player.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use crate::app_state::AppState;
use crate::error::HookResult;
use crate::player::Player;

/// The trait every tweak implements.
pub trait Tweak {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Once per page, before any other app-level hook.
    fn on_app_eager_init(&mut self, _app: &mut AppState) -> HookResult {
        Ok(())
    }

    /// Once per page, after every tweak's eager hook.
    fn on_app_init(&mut self, _app: &mut AppState) -> HookResult {
        Ok(())
    }

    /// On every refresh signal.
    fn on_app_refresh(&mut self, _app: &mut AppState) -> HookResult {
        Ok(())
    }

    /// Once per player, right after it is wrapped.
    fn on_player_eager_init(&mut self, _player: &mut Player) -> HookResult {
        Ok(())
    }

    /// Once per player, after every tweak's eager hook for that player.
    fn on_player_init(&mut self, _player: &mut Player) -> HookResult {
        Ok(())
    }

    /// On every refresh signal, for every tracked player.
    fn on_player_refresh(&mut self, _player: &mut Player) -> HookResult {
        Ok(())
    }
}

/// Which hook is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    AppEagerInit,
    AppInit,
    AppRefresh,
    PlayerEagerInit,
    PlayerInit,
    PlayerRefresh,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hook::AppEagerInit => "on_app_eager_init",
            Hook::AppInit => "on_app_init",
            Hook::AppRefresh => "on_app_refresh",
            Hook::PlayerEagerInit => "on_player_eager_init",
            Hook::PlayerInit => "on_player_init",
            Hook::PlayerRefresh => "on_player_refresh",
        })
    }
}

/// Run one hook of one tweak, containing both `Err` returns and panics.
/// Returns `true` when the hook completed normally.
pub(crate) fn invoke<T, F>(tweak: &mut T, hook: Hook, call: F) -> bool
where
    T: Tweak + ?Sized,
    F: FnOnce(&mut T) -> HookResult,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(&mut *tweak)));
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("tweak '{}' failed in {}: {}", tweak.name(), hook, e);
            false
        }
        Err(payload) => {
            error!(
                "tweak '{}' panicked in {}: {}",
                tweak.name(),
                hook,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

/// Run a callback a tweak registered (input handler, job), containing panics.
/// Returns `None` when it panicked.
pub(crate) fn contain<R>(what: impl fmt::Display, call: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(r) => Some(r),
        Err(payload) => {
            error!("{} panicked: {}", what, panic_message(payload.as_ref()));
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
