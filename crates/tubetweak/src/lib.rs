//! tubetweak: composes small behavior tweaks over the video players of a
//! host page.
//!
//! The page and its native player widgets are reached through the traits in
//! [`tubetweak_proto::page`]. [`app::App`] discovers the widgets, wraps each
//! in a [`player::Player`] and fans lifecycle hooks out to every registered
//! [`tweak::Tweak`]. [`runtime::Runtime`] feeds it page events.

pub mod app;
pub mod app_state;
pub mod error;
pub mod focus;
pub mod player;
pub mod policy;
pub mod rate;
pub mod runtime;
pub mod scheduler;
pub mod sim;
pub mod time;
pub mod tweak;
pub mod tweaks;

pub use app::App;
pub use app_state::AppState;
pub use error::{HookResult, TweakError};
pub use player::Player;
pub use tweak::Tweak;
