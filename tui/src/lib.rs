//! TUI rendering for Slate using ratatui.

mod format;
mod input;
mod theme;

pub use input::{InputPump, handle_event, handle_events, handle_key};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};

use slate_engine::{App, CreateField, InputMode, Project, Route, ToastLevel, ViewMode};
use slate_types::display_line;

use self::format::{format_date, format_timestamp, pad_to_width, truncate_to_width};

const CARD_WIDTH: u16 = 32;
const CARD_HEIGHT: u16 = 6;
const MAX_GRID_COLUMNS: u16 = 4;
const TOAST_WIDTH: u16 = 44;

/// Number of grid columns that fit in a terminal `width` cells wide.
///
/// The input layer uses this to move the selection a whole row at a time.
#[must_use]
pub fn grid_columns(width: u16) -> usize {
    let inner = width.saturating_sub(2);
    usize::from((inner / CARD_WIDTH).clamp(1, MAX_GRID_COLUMNS))
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    match app.route() {
        Route::Root => draw_splash(frame, app, &palette),
        Route::SignIn | Route::SignUp => draw_auth(frame, app, &palette),
        Route::Projects => draw_projects(frame, app, &palette, &glyphs),
        Route::ProjectDetail(_) => draw_detail(frame, app, &palette, &glyphs),
    }

    draw_toasts(frame, app, &palette, &glyphs);
}

fn draw_splash(frame: &mut Frame, app: &App, palette: &Palette) {
    let spinner = spinner_frame(app.frame(), app.ui_options());
    let line = Line::from(Span::styled(
        format!("{spinner} Starting Slate"),
        Style::default().fg(palette.text_muted),
    ));
    let area = centered(frame.area(), 30, 1);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

// ============================================================================
// Auth screens
// ============================================================================

fn draw_auth(frame: &mut Frame, app: &App, palette: &Palette) {
    let sign_up = app.route() == &Route::SignUp;
    let (title, body, hints): (&str, Vec<&str>, &[(&str, &str)]) = if sign_up {
        (
            " Create an account ",
            vec![
                "Sign up on the Slate web dashboard.",
                "",
                "Then copy your API token and user id into SLATE_TOKEN",
                "and SLATE_USER_ID (or [session] in ~/.slate/config.toml)",
                "and restart slate.",
            ],
            &[("i", "sign in"), ("q", "quit")],
        )
    } else {
        (
            " Sign in ",
            vec![
                "You are not signed in.",
                "",
                "Set SLATE_TOKEN and SLATE_USER_ID, or add a [session]",
                "section to ~/.slate/config.toml, then restart slate.",
            ],
            &[("u", "sign up"), ("q", "quit")],
        )
    };

    let mut lines: Vec<Line> = body
        .into_iter()
        .map(|text| {
            Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(palette.text_primary),
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(key_hints(hints, palette)));

    let width = lines
        .iter()
        .map(Line::width)
        .max()
        .unwrap_or(20)
        .min(usize::from(u16::MAX)) as u16;
    let area = centered(
        frame.area(),
        width.saturating_add(6),
        (lines.len() as u16).saturating_add(4),
    );

    let block = Block::default()
        .title(Span::styled(title, styles::title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Projects screen
// ============================================================================

fn draw_projects(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Search
            Constraint::Min(1),    // Projects
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], palette);
    draw_search(frame, app, chunks[1], palette, glyphs);
    draw_collection(frame, app, chunks[2], palette, glyphs);
    draw_status_bar(frame, app, chunks[3], palette, glyphs);

    match app.input_mode() {
        InputMode::Create => draw_create_modal(frame, app, palette, glyphs),
        InputMode::ConfirmDelete => draw_delete_prompt(frame, app, palette),
        InputMode::Normal | InputMode::Search => {}
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let total = app.projects().projects().len();
    let visible = app.visible_projects().len();
    let count = if app.search_query().is_empty() {
        format!("{total} projects")
    } else {
        format!("{visible} of {total} projects")
    };

    let mut spans = vec![
        Span::styled("Slate", styles::title(palette)),
        Span::styled("  Projects  ", Style::default().fg(palette.text_primary)),
        Span::styled(count, Style::default().fg(palette.text_muted)),
    ];
    if app.is_loading() {
        let spinner = spinner_frame(app.frame(), app.ui_options());
        spans.push(Span::styled(
            format!("  {spinner} Loading"),
            Style::default().fg(palette.primary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let active = app.input_mode() == InputMode::Search;
    let query = app.search_query();

    let content = if query.is_empty() && !active {
        Line::from(vec![
            Span::styled(
                format!("{} ", glyphs.search),
                Style::default().fg(palette.text_muted),
            ),
            Span::styled(
                "Search projects (press /)",
                Style::default().fg(palette.text_muted),
            ),
        ])
    } else {
        let mut spans = vec![
            Span::styled(
                format!("{} ", glyphs.search),
                Style::default().fg(palette.accent),
            ),
            Span::styled(
                display_line(query).into_owned(),
                Style::default().fg(palette.text_primary),
            ),
        ];
        if active {
            spans.push(Span::styled(glyphs.cursor, Style::default().fg(palette.accent)));
        }
        Line::from(spans)
    };

    let border = if active { palette.accent } else { palette.bg_border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_collection(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let visible = app.visible_projects();

    if visible.is_empty() {
        let message = if app.is_loading() {
            let spinner = spinner_frame(app.frame(), app.ui_options());
            format!("{spinner} Loading projects{}", glyphs.ellipsis)
        } else if app.projects().projects().is_empty() {
            "No projects yet. Press n to create one.".to_string()
        } else {
            format!("No projects match '{}'", display_line(app.search_query()))
        };
        let y = area.y + area.height / 3;
        let line_area = Rect {
            x: area.x,
            y: y.min(area.bottom().saturating_sub(1)),
            width: area.width,
            height: 1.min(area.height),
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(palette.text_muted),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(empty, line_area);
        return;
    }

    match app.view_mode() {
        ViewMode::Grid => draw_grid(frame, app, &visible, area, palette, glyphs),
        ViewMode::List => draw_list(frame, app, &visible, area, palette, glyphs),
    }
}

fn draw_grid(
    frame: &mut Frame,
    app: &App,
    projects: &[&Project],
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let columns = grid_columns(frame.area().width);
    let card_width = area.width / columns as u16;
    let rows_visible = usize::from((area.height / CARD_HEIGHT).max(1));
    let selected_row = app.selected() / columns;
    let first_row = selected_row.saturating_sub(rows_visible - 1);

    for (index, project) in projects.iter().enumerate().skip(first_row * columns) {
        let row = index / columns - first_row;
        if row >= rows_visible {
            break;
        }
        let col = index % columns;
        let rect = Rect {
            x: area.x + col as u16 * card_width,
            y: area.y + row as u16 * CARD_HEIGHT,
            width: card_width,
            height: CARD_HEIGHT.min(area.height),
        };
        draw_card(frame, app, project, index == app.selected(), rect, palette, glyphs);
    }
}

fn draw_card(
    frame: &mut Frame,
    app: &App,
    project: &Project,
    selected: bool,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let inner_width = usize::from(area.width.saturating_sub(4));
    let name = truncate_to_width(&display_line(&project.name), inner_width, glyphs.ellipsis);

    let (border_style, title_style) = if selected {
        (
            Style::default().fg(palette.primary),
            styles::title(palette),
        )
    } else {
        (
            Style::default().fg(palette.bg_border),
            Style::default().fg(palette.text_primary),
        )
    };

    let description = display_line(&project.description);
    let description_line = if description.trim().is_empty() {
        Line::from(Span::styled(
            "No description",
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(Span::styled(
            truncate_to_width(&description, inner_width, glyphs.ellipsis),
            Style::default().fg(palette.text_secondary),
        ))
    };

    let mut footer = vec![Span::styled(
        format_date(&project.created_at),
        Style::default().fg(palette.text_muted),
    )];
    if app.is_deleting(&project.id) {
        let spinner = spinner_frame(app.frame(), app.ui_options());
        footer.push(Span::styled(
            format!(" {} {spinner} Deleting", glyphs.separator),
            Style::default().fg(palette.error),
        ));
    }

    let block = Block::default()
        .title(Span::styled(format!(" {name} "), title_style))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(Style::default().bg(if selected {
            palette.bg_highlight
        } else {
            palette.bg_panel
        }))
        .padding(Padding::horizontal(1));
    let lines = vec![description_line, Line::from(""), Line::from(footer)];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_list(
    frame: &mut Frame,
    app: &App,
    projects: &[&Project],
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let height = usize::from(area.height.max(1));
    let offset = app.selected().saturating_sub(height - 1);

    let width = usize::from(area.width);
    let date_width = 10;
    let name_width = (width / 3).clamp(8, 40);
    let description_width = width.saturating_sub(name_width + date_width + 6);

    let lines: Vec<Line> = projects
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(index, project)| {
            let selected = index == app.selected();
            let pointer = if selected { glyphs.selected } else { " " };
            let name_style = if selected {
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_primary)
            };
            let mut spans = vec![
                Span::styled(format!("{pointer} "), Style::default().fg(palette.primary)),
                Span::styled(
                    pad_to_width(&display_line(&project.name), name_width, glyphs.ellipsis),
                    name_style,
                ),
                Span::raw("  "),
                Span::styled(
                    pad_to_width(
                        &display_line(&project.description),
                        description_width,
                        glyphs.ellipsis,
                    ),
                    Style::default().fg(palette.text_secondary),
                ),
                Span::raw("  "),
                Span::styled(
                    format_date(&project.created_at),
                    Style::default().fg(palette.text_muted),
                ),
            ];
            if app.is_deleting(&project.id) {
                spans.push(Span::styled(
                    format!(" {}", spinner_frame(app.frame(), app.ui_options())),
                    Style::default().fg(palette.error),
                ));
            }
            let line = Line::from(spans);
            if selected {
                line.style(Style::default().bg(palette.bg_highlight))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

// ============================================================================
// Detail screen
// ============================================================================

fn draw_detail(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    let Route::ProjectDetail(id) = app.route() else {
        return;
    };

    let (title, lines) = match app.projects().get(id) {
        Some(project) => {
            let description = display_line(&project.description);
            let description = if description.trim().is_empty() {
                Span::styled(
                    "No description",
                    Style::default()
                        .fg(palette.text_muted)
                        .add_modifier(Modifier::ITALIC),
                )
            } else {
                Span::styled(
                    description.into_owned(),
                    Style::default().fg(palette.text_primary),
                )
            };
            let label = |text: &'static str| {
                Span::styled(format!("{text:<9}"), Style::default().fg(palette.text_muted))
            };
            let lines = vec![
                Line::from(description),
                Line::from(""),
                Line::from(vec![
                    label("Created"),
                    Span::styled(
                        format_timestamp(&project.created_at),
                        Style::default().fg(palette.text_secondary),
                    ),
                ]),
                Line::from(vec![
                    label("ID"),
                    Span::styled(
                        display_line(project.id.as_str()).into_owned(),
                        Style::default().fg(palette.text_secondary),
                    ),
                ]),
                Line::from(vec![
                    label("Owner"),
                    Span::styled(
                        display_line(&project.owner_id).into_owned(),
                        Style::default().fg(palette.text_secondary),
                    ),
                ]),
            ];
            (display_line(&project.name).into_owned(), lines)
        }
        None => (
            display_line(id.as_str()).into_owned(),
            vec![Line::from(Span::styled(
                "Project not found. It may have been deleted.",
                Style::default().fg(palette.warning),
            ))],
        ),
    };

    let title = truncate_to_width(
        &title,
        usize::from(chunks[0].width.saturating_sub(4)),
        glyphs.ellipsis,
    );
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), styles::title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    let mut spans = vec![Span::styled(" DETAIL ", styles::mode_normal(palette)), Span::raw(" ")];
    spans.extend(key_hints(&[("Esc", "back"), ("x", "dismiss"), ("q", "quit")], palette));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

// ============================================================================
// Status bar, modals, toasts
// ============================================================================

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let (label, style, hints): (&str, Style, &[(&str, &str)]) = match app.input_mode() {
        InputMode::Normal => (
            " NORMAL ",
            styles::mode_normal(palette),
            &[
                ("/", "search"),
                ("v", "view"),
                ("n", "new"),
                ("d", "delete"),
                ("Enter", "open"),
                ("r", "reload"),
                ("q", "quit"),
            ],
        ),
        InputMode::Search => (
            " SEARCH ",
            styles::mode_search(palette),
            &[("Enter", "done"), ("Esc", "clear")],
        ),
        InputMode::Create => (
            " CREATE ",
            styles::mode_create(palette),
            &[("Tab", "field"), ("Enter", "create"), ("Esc", "cancel")],
        ),
        InputMode::ConfirmDelete => (
            " DELETE ",
            styles::mode_confirm(palette),
            &[("y", "confirm"), ("n", "cancel")],
        ),
    };

    let mut spans = vec![
        Span::styled(label, style),
        Span::styled(
            format!(" {} {} ", app.view_mode().label(), glyphs.separator),
            Style::default().fg(palette.text_muted),
        ),
    ];
    spans.extend(key_hints(hints, palette));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_create_modal(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let Some(modal) = app.create_modal() else {
        return;
    };
    let width = 60.min(frame.area().width.saturating_sub(4));
    let field_width = usize::from(width.saturating_sub(18));

    let field = |label: &'static str, value: &str, focused: bool| {
        let mut value = display_line(value).into_owned();
        if focused {
            value.push_str(glyphs.cursor);
        }
        // Keep the tail visible while typing.
        let value = tail_to_width(&value, field_width);
        let label_style = if focused {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_muted)
        };
        Line::from(vec![
            Span::styled(format!("{label:<13}"), label_style),
            Span::styled(value, Style::default().fg(palette.text_primary)),
        ])
    };

    let mut lines = vec![
        field("Name", modal.name(), modal.focus() == CreateField::Name),
        Line::from(""),
        field(
            "Description",
            modal.description(),
            modal.focus() == CreateField::Description,
        ),
        Line::from(""),
    ];
    if app.is_creating() {
        let spinner = spinner_frame(app.frame(), app.ui_options());
        lines.push(Line::from(Span::styled(
            format!("{spinner} Creating{}", glyphs.ellipsis),
            Style::default().fg(palette.primary),
        )));
    } else {
        lines.push(Line::from(key_hints(
            &[("Tab", "next field"), ("Enter", "create"), ("Esc", "cancel")],
            palette,
        )));
    }

    let area = centered(frame.area(), width, (lines.len() as u16).saturating_add(4));
    let block = Block::default()
        .title(Span::styled(" New project ", styles::title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.success))
        .style(Style::default().bg(palette.bg_popup))
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_delete_prompt(frame: &mut Frame, app: &App, palette: &Palette) {
    let Some(project) = app.pending_delete() else {
        return;
    };
    let width = 56.min(frame.area().width.saturating_sub(4));
    let name = truncate_to_width(
        &display_line(&project.name),
        usize::from(width.saturating_sub(24)),
        "...",
    );

    let lines = vec![
        Line::from(vec![
            Span::styled("Delete project ", Style::default().fg(palette.text_primary)),
            Span::styled(
                format!("'{name}'"),
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("?", Style::default().fg(palette.text_primary)),
        ]),
        Line::from(""),
        Line::from(key_hints(&[("y", "delete"), ("n", "cancel")], palette)),
    ];

    let area = centered(frame.area(), width, (lines.len() as u16).saturating_add(4));
    let block = Block::default()
        .title(Span::styled(
            " Confirm delete ",
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.error))
        .style(Style::default().bg(palette.bg_popup))
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Toasts stack upward from the bottom-right corner, newest lowest.
fn draw_toasts(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let area = frame.area();
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2));
    if width < 8 {
        return;
    }
    let mut bottom = area.bottom().saturating_sub(2);

    let toasts: Vec<_> = app.notifications().iter().collect();
    for toast in toasts.into_iter().rev() {
        if bottom < area.y + 3 {
            break;
        }
        let (icon, color) = match toast.level() {
            ToastLevel::Success => (glyphs.success, palette.success),
            ToastLevel::Error => (glyphs.error, palette.error),
        };
        let text = truncate_to_width(
            &display_line(toast.message()),
            usize::from(width.saturating_sub(6)),
            glyphs.ellipsis,
        );
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y: bottom - 3,
            width,
            height: 3,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(palette.bg_popup));
        let line = Line::from(vec![
            Span::styled(format!("{icon} "), Style::default().fg(color)),
            Span::styled(text, Style::default().fg(palette.text_primary)),
        ]);
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(line).block(block), rect);
        bottom -= 3;
    }
}

fn key_hints(pairs: &[(&str, &str)], palette: &Palette) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, action) in pairs {
        spans.push(Span::styled((*key).to_string(), styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}  "), styles::key_hint(palette)));
    }
    spans
}

fn tail_to_width(text: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut used = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        start = i;
    }
    text[start..].to_string()
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
