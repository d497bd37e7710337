//! Input handling for Slate TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use slate_engine::{App, InputMode, Route, ViewMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and queues them for the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send in the input thread unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain queued input (bounded per frame) and apply it to the app.
///
/// `columns` is the current grid width in cards, used for vertical movement.
pub fn handle_events(app: &mut App, input: &mut InputPump, columns: usize) -> Result<()> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let msg = match input.rx.try_recv() {
            Ok(msg) => msg,
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input thread stopped"));
            }
        };
        match msg {
            InputMsg::Event(event) => handle_event(app, event, columns),
            InputMsg::Error(e) => return Err(anyhow!("terminal input error: {e}")),
        }
        if app.should_quit() {
            break;
        }
    }
    Ok(())
}

pub fn handle_event(app: &mut App, event: Event, columns: usize) {
    match event {
        Event::Key(key) => handle_key(app, key, columns),
        Event::Paste(text) => handle_paste(app, &text),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let text = text.replace(['\r', '\n'], " ");
    match app.input_mode() {
        InputMode::Search => text.chars().for_each(|c| app.search_insert(c)),
        InputMode::Create => text.chars().for_each(|c| app.create_insert(c)),
        InputMode::Normal | InputMode::ConfirmDelete => {}
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent, columns: usize) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.route() {
        Route::Root => {}
        Route::SignIn => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
            KeyCode::Char('u') => app.show_sign_up(),
            _ => {}
        },
        Route::SignUp => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('i') | KeyCode::Esc => app.show_sign_in(),
            _ => {}
        },
        Route::ProjectDetail(_) => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => app.back(),
            KeyCode::Char('x') => app.dismiss_notification(),
            _ => {}
        },
        Route::Projects => match app.input_mode() {
            InputMode::Normal => handle_normal(app, key, columns.max(1)),
            InputMode::Search => handle_search(app, key),
            InputMode::Create => handle_create(app, key),
            InputMode::ConfirmDelete => handle_confirm_delete(app, key),
        },
    }
}

fn handle_normal(app: &mut App, key: KeyEvent, columns: usize) {
    let step = match app.view_mode() {
        ViewMode::Grid => columns as isize,
        ViewMode::List => 1,
    };
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('n') => app.open_create(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => {
            let dispatch = app.reload();
            debug!(?dispatch, "Reload requested");
        }
        KeyCode::Char('x') => app.dismiss_notification(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Esc => {
            if app.search_query().is_empty() {
                app.dismiss_notification();
            } else {
                app.clear_search();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-step),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(step),
        KeyCode::Left | KeyCode::Char('h') if app.view_mode() == ViewMode::Grid => {
            app.move_selection(-1);
        }
        KeyCode::Right | KeyCode::Char('l') if app.view_mode() == ViewMode::Grid => {
            app.move_selection(1);
        }
        KeyCode::Home | KeyCode::Char('g') => app.move_selection(isize::MIN),
        KeyCode::End | KeyCode::Char('G') => app.move_selection(isize::MAX),
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.end_search();
        }
        KeyCode::Enter | KeyCode::Down => app.end_search(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_insert(c);
        }
        _ => {}
    }
}

fn handle_create(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_create(),
        KeyCode::Tab | KeyCode::BackTab => app.create_next_field(),
        KeyCode::Enter => {
            if let Some(dispatch) = app.submit_create() {
                debug!(?dispatch, "Create submitted");
            }
        }
        KeyCode::Backspace => app.create_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.create_insert(c);
        }
        _ => {}
    }
}

fn handle_confirm_delete(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
            if let Some(dispatch) = app.confirm_delete() {
                debug!(?dispatch, "Delete confirmed");
            }
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}
