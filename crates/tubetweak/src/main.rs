use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tubetweak::app::App;
use tubetweak::runtime::{self, PageEvent, Runtime, ScriptStep};
use tubetweak::scheduler::TokioScheduler;
use tubetweak::sim::{PlayerParts, PlayerSpec, SimPage};
use tubetweak_proto::config::Config;
use tubetweak_proto::page::SharedPage;
use tubetweak_proto::platform;
use tubetweak_proto::protocol::{InputEvent, KeyStroke, WheelEvent};

#[derive(Parser)]
#[command(name = "tubetweak")]
#[command(about = "Run the player tweaks against a simulated page")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: <config dir>/tubetweak/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of page events to replay instead of the demo session
    #[arg(short, long)]
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tubetweak.log");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("tubetweak: {e}; using default config");
            Config::default()
        }),
    };

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins over the config file.
    let log_filter = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| config.log.filter.clone())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("tubetweak log: {}", log_path.display());
    info!("tubetweak starting…");

    // ── Simulated page ───────────────────────────────────────────────────────
    let page = Rc::new(RefCell::new(SimPage::new()));
    let main_player = page.borrow_mut().add_player(PlayerSpec::main());
    let preview = page.borrow_mut().add_player(PlayerSpec::embedded());
    main_player.borrow_mut().current_time = 125.0;
    {
        // The preview opens with a skippable ad.
        let mut preview = preview.borrow_mut();
        preview.start_ad();
        preview.reveal_skip_button();
    }
    let main_parts = main_player.borrow().parts().clone();
    info!("main player root {}, video {}", main_parts.root, main_parts.video);

    let steps = match &cli.script {
        Some(path) => load_script(path)?,
        None => demo_script(&main_parts),
    };
    info!("replaying {} events", steps.len());

    // ── Event loop ───────────────────────────────────────────────────────────
    let (tx, rx) = runtime::channel();
    let scheduler = Rc::new(TokioScheduler::new(tx.clone()));
    let shared: SharedPage = page.clone();
    let app = App::from_config(shared, &config, scheduler);

    tokio::spawn(runtime::feed(tx, steps));
    let app = Runtime::new(app, rx).run().await;

    for player in app.state().players() {
        println!(
            "player {} main={} rate={} volume={} quality={} ui={} ad={}",
            player.root(),
            player.is_main(),
            player.playback_rate(),
            player.volume(),
            player.playback_quality(),
            if player.ui_enabled() { "shown" } else { "hidden" },
            player.is_ad_showing(),
        );
    }
    info!("tubetweak exiting");
    Ok(())
}

fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let steps = runtime::parse_script(&content)
        .with_context(|| format!("parsing script {}", path.display()))?;
    Ok(steps)
}

fn demo_script(main: &PlayerParts) -> Vec<ScriptStep> {
    let key = |k: &str| PageEvent::Input {
        input: InputEvent::Key(KeyStroke::new(k)),
    };
    let wheel_up = PageEvent::Input {
        input: InputEvent::Wheel(WheelEvent {
            target: main.video,
            delta_y: -100.0,
        }),
    };
    vec![
        ScriptStep::new(0, PageEvent::Load),
        ScriptStep::new(300, PageEvent::VisibilityRefresh),
        ScriptStep::new(200, key("d")),
        ScriptStep::new(200, key("d")),
        ScriptStep::new(200, wheel_up.clone()),
        ScriptStep::new(200, wheel_up),
        ScriptStep::new(200, key("h")),
        ScriptStep::new(500, key("h")),
        ScriptStep::new(200, key("p")),
        ScriptStep::new(1200, PageEvent::VisibilityRefresh),
    ]
}
