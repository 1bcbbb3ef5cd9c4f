//! Runtime: single-owner event loop around the `App`.
//!
//! Page signals, user input and timer ticks all arrive as `PageEvent`
//! messages on one channel. The loop owns the `App` exclusively and applies
//! events one at a time, so no hook ever runs concurrently with another.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tubetweak_proto::protocol::InputEvent;

use crate::app::App;
use crate::scheduler::JobId;

/// Capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// All inputs into the event loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    /// The page finished loading.
    Load,
    /// The page became visible again or navigated; re-discover and refresh.
    VisibilityRefresh,
    /// User input on the page.
    Input { input: InputEvent },
    /// A scheduled job is due.
    #[serde(skip)]
    Timer(JobId),
    /// Stop the loop.
    Shutdown,
}

pub fn channel() -> (mpsc::Sender<PageEvent>, mpsc::Receiver<PageEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// One entry of a scripted session: wait `delay_ms`, then send `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: PageEvent,
}

impl ScriptStep {
    pub fn new(delay_ms: u64, event: PageEvent) -> Self {
        Self { delay_ms, event }
    }
}

/// Parse a JSON array of script steps.
pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Replay `steps` into the loop, then ask it to shut down.
pub async fn feed(tx: mpsc::Sender<PageEvent>, steps: Vec<ScriptStep>) {
    for step in steps {
        tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
        if tx.send(step.event).await.is_err() {
            debug!("feed: event loop gone");
            return;
        }
    }
    let _ = tx.send(PageEvent::Shutdown).await;
}

pub struct Runtime {
    app: App,
    events: mpsc::Receiver<PageEvent>,
}

impl Runtime {
    pub fn new(app: App, events: mpsc::Receiver<PageEvent>) -> Self {
        Self { app, events }
    }

    /// Run until `Shutdown` arrives or every sender is gone, then hand the
    /// app back.
    pub async fn run(mut self) -> App {
        info!("runtime: starting event loop");
        loop {
            match self.events.recv().await {
                None => {
                    info!("runtime: event channel closed, shutting down");
                    break;
                }
                Some(PageEvent::Shutdown) => {
                    info!("runtime: shutdown requested");
                    break;
                }
                Some(event) => {
                    debug!("runtime: {:?}", event);
                    self.app.handle_event(event);
                }
            }
        }
        self.app.state().log_summary();
        self.app
    }
}
