//! Keyboard-driven flows rendered through the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};

use slate_engine::{App, InputMode, Route};
use slate_tui::{draw, handle_key};

use crate::common::{mount_create, mount_list, project_json, start_backend, started_app};

const WIDTH: u16 = 100;
const HEIGHT: u16 = 30;

fn press(app: &mut App, code: KeyCode) {
    handle_key(
        app,
        KeyEvent::new(code, KeyModifiers::NONE),
        slate_tui::grid_columns(WIDTH),
    );
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[tokio::test]
async fn create_flow_from_keyboard() {
    let server = start_backend().await;
    mount_list(&server, vec![]).await;
    let mut app = started_app(&server).await;
    assert!(screen(&app).contains("No projects yet"));

    mount_create(&server, project_json("p1", "Roadmap", "Q3 plan")).await;
    press(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "Roadmap");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Q3 plan");
    assert!(screen(&app).contains("New project"));

    press(&mut app, KeyCode::Enter);
    app.settle().await;

    assert_eq!(app.input_mode(), InputMode::Normal);
    let rendered = screen(&app);
    assert!(rendered.contains("Roadmap"));
    assert!(rendered.contains("Project created successfully!"));
}

#[tokio::test]
async fn search_then_open_detail() {
    let server = start_backend().await;
    mount_list(
        &server,
        vec![
            project_json("p1", "Alpha", ""),
            project_json("p2", "Beta", "Second one"),
        ],
    )
    .await;
    let mut app = started_app(&server).await;

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "beta");
    press(&mut app, KeyCode::Enter);
    let rendered = screen(&app);
    assert!(rendered.contains("1 of 2 projects"));
    assert!(!rendered.contains("Alpha"));

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.route(), &Route::ProjectDetail("p2".into()));
    assert!(screen(&app).contains("Second one"));
}

#[tokio::test]
async fn quit_key_stops_the_app() {
    let server = start_backend().await;
    mount_list(&server, vec![]).await;
    let mut app = started_app(&server).await;
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}
