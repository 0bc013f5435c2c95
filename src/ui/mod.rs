pub mod components;
pub mod users;

use std::io::Write;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode};

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(root[2]);

    let who = crate::sys::current_username().unwrap_or_else(|| "unknown".to_string());
    let p = Paragraph::new(format!(
        "userpager ({who})  source: {}  users:{}  matching:{}",
        app.source_label(),
        app.users_all.len(),
        app.users.len(),
    ))
    .block(
        Block::default()
            .title("userpager")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    components::render_search_box(f, root[1], app);
    users::render_users_table(f, body[0], app);
    users::render_user_details(f, body[1], app);
    components::render_paginator(f, root[3], app);
    components::render_status_bar(f, root[4], app);

    if app.input_mode == InputMode::Link {
        components::render_link_modal(f, f.area(), app);
    }
}

/// Plain-text dump of the current page followed by its link.
pub fn write_plain<W: Write>(app: &AppState, out: &mut W) -> std::io::Result<()> {
    let size = app.view.size.get();
    let first = app.view.page.saturating_mul(size);
    for (i, u) in app.visible_users().iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<24} {:>6}  {}",
            first + i + 1,
            u.name,
            u.id,
            u.full_name.as_deref().unwrap_or("")
        )?;
    }
    writeln!(
        out,
        "-- page {}/{} ({} per page, {} matching) --",
        app.view.page.saturating_add(1),
        app.page_count().max(1),
        size,
        app.users.len()
    )?;
    writeln!(out, "{}", app.link())
}
