//! The event loop with real (paused) tokio timers.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::page_with;
use tokio::time::Instant;
use tubetweak::app::App;
use tubetweak::error::HookResult;
use tubetweak::player::PlayerSettings;
use tubetweak::runtime::{self, PageEvent, Runtime, ScriptStep};
use tubetweak::scheduler::TokioScheduler;
use tubetweak::sim::PlayerSpec;
use tubetweak::{AppState, Tweak};
use tubetweak_proto::config::{Config, PageConfig};
use tubetweak_proto::page::{Page, SharedPage};
use tubetweak_proto::protocol::{InputEvent, KeyStroke};

/// Retries a check that never succeeds, recording when it ran.
struct RetryRecorder {
    calls: Rc<RefCell<Vec<Instant>>>,
}

impl Tweak for RetryRecorder {
    fn name(&self) -> &str {
        "retry_recorder"
    }

    fn on_app_init(&mut self, app: &mut AppState) -> HookResult {
        let calls = self.calls.clone();
        app.retry_on_fail(3, Duration::from_millis(100), move |_| {
            calls.borrow_mut().push(Instant::now());
            false
        });
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_fail_spacing() {
    let (page, _) = page_with(Vec::new());
    let calls = Rc::new(RefCell::new(Vec::new()));
    let (tx, rx) = runtime::channel();
    let shared: SharedPage = page.clone();
    let app = App::new(
        shared,
        Rc::new(PlayerSettings::from_config(&PageConfig::default())),
        Rc::new(TokioScheduler::new(tx.clone())),
        vec![Box::new(RetryRecorder {
            calls: calls.clone(),
        })],
    );

    tokio::spawn(runtime::feed(
        tx,
        vec![ScriptStep::new(0, PageEvent::Load), ScriptStep::new(1000, PageEvent::Shutdown)],
    ));
    Runtime::new(app, rx).run().await;

    let calls = calls.borrow();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(100), "gap {:?}", gap);
        assert!(gap < Duration::from_millis(150), "gap {:?}", gap);
    }
}

#[tokio::test(start_paused = true)]
async fn test_scripted_session_with_default_tweaks() {
    let (page, players) = page_with(vec![PlayerSpec::main(), PlayerSpec::embedded()]);
    {
        let mut preview = players[1].borrow_mut();
        preview.start_ad();
        preview.reveal_skip_button();
    }
    players[0].borrow_mut().current_time = 125.0;
    let display = players[0].borrow().parts().time_display;

    let (tx, rx) = runtime::channel();
    let shared: SharedPage = page.clone();
    let app = App::from_config(shared, &Config::default(), Rc::new(TokioScheduler::new(tx.clone())));

    let key = |k: &str| PageEvent::Input {
        input: InputEvent::Key(KeyStroke::new(k)),
    };
    tokio::spawn(runtime::feed(
        tx,
        vec![
            ScriptStep::new(0, PageEvent::Load),
            ScriptStep::new(100, key("d")),
            ScriptStep::new(100, key("d")),
            ScriptStep::new(100, key("d")),
            ScriptStep::new(100, key("d")),
            // Long enough for the ad check and a label update to fire.
            ScriptStep::new(1500, PageEvent::Shutdown),
        ],
    ));
    let app = Runtime::new(app, rx).run().await;

    let main_root = players[0].borrow().parts().root;
    // The retry found the main player right after discovery.
    assert_eq!(page.borrow().active_element(), Some(main_root));
    assert_eq!(app.state().player(main_root).unwrap().playback_rate(), 2.0);
    assert_eq!(players[1].borrow().ad_state, tubetweak_proto::protocol::NO_AD);

    let label = page
        .borrow()
        .query_within(display, ".tubetweak-effective-time")[0];
    assert_eq!(page.borrow().text(label), " 01:02 / 05:00 (2x)");
}

#[tokio::test(start_paused = true)]
async fn test_loop_stops_when_senders_are_gone() {
    let (page, _) = page_with(vec![PlayerSpec::main()]);
    let (tx, rx) = runtime::channel();
    let shared: SharedPage = page.clone();
    let app = App::from_config(
        shared,
        &Config::default(),
        Rc::new(tubetweak::scheduler::ManualScheduler::new()),
    );
    tx.send(PageEvent::Load).await.unwrap();
    drop(tx);

    let app = Runtime::new(app, rx).run().await;
    assert!(app.is_loaded());
    assert_eq!(app.state().players().len(), 1);
}
