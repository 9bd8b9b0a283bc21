// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod engine;
mod feed;
mod headless;
mod poller;
mod ui;

use app::{App, ROTATE_STEP_DEG};
use config::Config;
use engine::Engine;
use feed::{FeedSource, FileFeed, HttpFeed};
use poller::Poller;
use ui::render_ui;

#[derive(Parser, Debug)]
#[command(name = "rackviz")]
#[command(about = "Rack, node and job queue visualizer for a supercomputer activity feed")]
#[command(version)]
struct Args {
    /// Activity feed URL
    #[arg(long)]
    url: Option<String>,

    /// Read the feed from a local JSON file instead of a URL
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print NDJSON frame reports instead of running the terminal UI
    #[arg(long)]
    headless: bool,

    /// Stop after this many fetch cycles (headless mode)
    #[arg(long, requires = "headless")]
    cycles: Option<u64>,

    /// Write logs to this file (terminal UI mode logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = load_config(&args)?;
    let source: Box<dyn FeedSource> = match &config.feed.file {
        Some(path) => Box::new(FileFeed::new(path)),
        None => Box::new(HttpFeed::new(&config.feed.url)),
    };
    let poller = Poller::new(source, config.feed.refresh_interval(), config.feed.timeout());
    let engine = Engine::new(config.engine_config());

    // Create a single-threaded tokio runtime
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    if args.headless {
        rt.block_on(headless::run_headless(engine, poller, args.cycles))
    } else {
        rt.block_on(run_tui(engine, poller))
    }
}

/// Configuration file (if any) with command line overrides applied
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    if let Some(url) = &args.url {
        config.feed.url = url.clone();
        config.feed.file = None;
    }
    if let Some(file) = &args.file {
        config.feed.file = Some(file.clone());
    }
    if let Some(refresh) = args.refresh {
        config.feed.refresh_secs = refresh;
    }
    if let Some(timeout) = args.timeout {
        config.feed.timeout_secs = timeout;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_target(false)
            .with_ansi(false)
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.headless {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    // The terminal UI owns stdout/stderr; without a log file events are dropped

    Ok(())
}

async fn run_tui(engine: Engine, mut poller: Poller) -> Result<()> {
    let mut app = App::new(engine, poller.describe());
    info!(source = %app.source, "Starting terminal UI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &mut poller).await;

    // Teardown cancels any fetch still in flight
    poller.cancel();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poller: &mut Poller,
) -> Result<()> {
    // Event stream for terminal input
    let mut event_stream = EventStream::new();

    // Render interval (30 FPS)
    let mut render_interval = interval(Duration::from_millis(33));
    render_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Poll schedule check
    let mut poll_interval = interval(Duration::from_millis(250));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // FPS tracking
    let mut frame_count = 0u64;
    let mut fps_start = Instant::now();
    let mut fetch_started: Option<Instant> = None;

    loop {
        tokio::select! {
            // biased ensures render interval is checked first for consistent frame rate
            biased;

            _ = render_interval.tick() => {
                frame_count += 1;
                let fps_elapsed = fps_start.elapsed().as_secs_f32();
                if fps_elapsed >= 1.0 {
                    app.self_stats.fps = frame_count as f32 / fps_elapsed;
                    frame_count = 0;
                    fps_start = Instant::now();
                }

                terminal.draw(|f| render_ui(f, app))?;
            }

            _ = poll_interval.tick() => {
                if poller.start_if_due(tokio::time::Instant::now()) {
                    fetch_started = Some(Instant::now());
                }
            }

            result = poller.completed(), if poller.is_in_flight() => {
                if let Some(started) = fetch_started.take() {
                    app.self_stats.fetch_time_ms = started.elapsed().as_secs_f32() * 1000.0;
                }
                app.on_fetch(result);
            }

            // Handle terminal input
            Some(event_result) = event_stream.next() => {
                if let Ok(Event::Key(key)) = event_result {
                    match (key.code, key.modifiers) {
                        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        // Navigation
                        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
                        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
                        (KeyCode::Home, _) | (KeyCode::Char('g'), _) => app.select_first(),
                        (KeyCode::End, _) | (KeyCode::Char('G'), _) => app.select_last(),
                        (KeyCode::Tab, _) | (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_tab(),
                        (KeyCode::BackTab, _) | (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_tab(),
                        // Menu actions
                        (KeyCode::Enter, _) => app.activate(),
                        (KeyCode::Char('a'), _) => app.show_all(),
                        (KeyCode::Esc, _) | (KeyCode::Char('x'), _) => app.close_detail(),
                        (KeyCode::Char('t'), _) => app.toggle_racks(),
                        // Anchor rotation
                        (KeyCode::Char('['), _) => app.rotate_anchor(-ROTATE_STEP_DEG),
                        (KeyCode::Char(']'), _) => app.rotate_anchor(ROTATE_STEP_DEG),
                        // Manual refresh
                        (KeyCode::Char('r'), _) => poller.trigger_now(),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
