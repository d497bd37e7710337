//! Slate CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`slate_engine`] (application state) and [`slate_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> SlateConfig -> Session + ApiClient -> App::start() -> run_app()
//! ```
//!
//! # Event Loop
//!
//! A fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`slate_tui::InputPump`])
//! 3. Apply completed requests and expire toasts (`app.tick()`)
//! 4. Render frame
//! 5. Check for quit

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, File, OpenOptions},
    io::{Stdout, Write, stdout},
    iter,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use slate_config::SlateConfig;
use slate_engine::{ApiClient, App, AppSettings, ProjectsApi, StaticSession};
use slate_tui::{InputPump, draw, grid_columns, handle_events};

/// `logs/` next to the config file, then `./.slate/logs`.
fn log_dirs() -> impl Iterator<Item = PathBuf> {
    SlateConfig::path()
        .and_then(|config| config.parent().map(|dir| dir.join("logs")))
        .into_iter()
        .chain(iter::once(PathBuf::from(".slate").join("logs")))
}

fn open_log_file() -> Option<(PathBuf, File)> {
    log_dirs().find_map(|dir| {
        fs::create_dir_all(&dir).ok()?;
        let path = dir.join("slate.log");
        let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
        Some((path, file))
    })
}

/// Log to a file or not at all; stdout and stderr belong to the TUI.
fn init_tracing() {
    let Some((path, file)) = open_log_file() else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::info!(path = %path.display(), "Logging initialized");
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

/// Raw mode, alternate screen and bracketed paste for as long as this lives.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let terminal = execute!(stdout(), EnterAlternateScreen, EnableBracketedPaste)
            .and_then(|()| Terminal::new(CrosstermBackend::new(stdout())));
        match terminal {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                restore_terminal();
                Err(err).context("failed to set up terminal")
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
    }
}

fn build_app(config: Option<&SlateConfig>) -> Result<App> {
    let base_url = SlateConfig::api_url(config);
    let client = ApiClient::new(&base_url)
        .with_context(|| format!("invalid backend URL {base_url:?}"))?;

    let session = SlateConfig::session(config);
    if session.subject.is_none() {
        tracing::info!("No session subject configured; starting signed out");
    }
    let session = StaticSession::new(session.subject, session.credential);

    let settings = AppSettings {
        view_mode: SlateConfig::view_mode(config),
        name_policy: SlateConfig::name_policy(config),
        ui_options: SlateConfig::ui_options(config),
    };
    tracing::info!(api = %client.base_url(), "Starting Slate");
    Ok(App::new(ProjectsApi::new(client), Arc::new(session), settings))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match SlateConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring config {}: {e}", e.path().display());
            None
        }
    };
    let mut app = build_app(config.as_ref())?;
    app.start();

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    app.shutdown();

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend + Write,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        let columns = match terminal.size() {
            Ok(size) => grid_columns(size.width),
            Err(e) => break Err(e.into()),
        };

        // Non-blocking input (drain queue only)
        if let Err(e) = handle_events(app, &mut input, columns) {
            break Err(e);
        }
        if app.should_quit() {
            break Ok(());
        }

        app.tick(Instant::now());

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
