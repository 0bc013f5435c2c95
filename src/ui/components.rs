//! Shared UI components (search box, paginator, status bar, link prompt).
//!
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode};
use crate::location::PageSize;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Busy indicator frame for the current instant.
pub fn spinner(app: &AppState) -> char {
    let step = (app.started_at.elapsed().as_millis() / 100) as usize;
    SPINNER[step % SPINNER.len()]
}

pub fn render_search_box(f: &mut Frame, area: Rect, app: &AppState) {
    let editing = app.input_mode == InputMode::Search;
    let border = if editing { app.theme.highlight_fg } else { app.theme.border };
    let clear_keys = app.keymap.keys_for(KeyAction::ClearSearch).join("/");
    let title = if app.search_input.is_empty() {
        "Search by name".to_string()
    } else {
        format!("Search by name ({clear_keys}: clear)")
    };
    let p = Paragraph::new(app.search_input.as_str())
        .style(Style::default().fg(app.theme.text))
        .block(Block::default().title(title).borders(Borders::ALL).border_style(Style::default().fg(border)));
    f.render_widget(p, area);

    if editing {
        f.set_cursor_position(Position::new(search_cursor_x(area, &app.search_input), area.y + 1));
    }
}

/// Column of the text cursor after `input`, kept inside the box border.
fn search_cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

/// One-line paginator: range, page x/y and the size choices.
pub fn render_paginator(f: &mut Frame, area: Rect, app: &AppState) {
    let size = app.view.size.get();
    let total = app.users.len();
    let shown = app.visible_users().len();
    let first = app.view.page.saturating_mul(size);
    let range = if shown == 0 {
        format!("0 of {total}")
    } else {
        format!("{}-{} of {total}", first + 1, first + shown)
    };

    let mut spans = vec![
        Span::raw(format!(" {range}   page {}/{}   size: ", app.view.page.saturating_add(1), app.page_count().max(1))),
    ];
    for option in PageSize::ALL {
        let label = format!(" {option} ");
        if option == app.view.size {
            spans.push(Span::styled(label, Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD | Modifier::REVERSED)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(app.theme.muted)));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.text)), area);
}

/// Bottom status bar with the mode and the shareable link.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Link => "LINK",
    };
    let hint = |a: KeyAction| app.keymap.keys_for(a).first().cloned().unwrap_or_default();
    let msg = format!(
        "mode: {mode}  link: {}  |  {}: search  {}: link  {}: size  {}: quit",
        app.link(),
        hint(KeyAction::StartSearch),
        hint(KeyAction::OpenLink),
        hint(KeyAction::CycleSize),
        hint(KeyAction::Quit),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

pub fn render_link_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = area.width.saturating_sub(10).clamp(30, 90);
    let rect = centered_rect(width, 6, area);
    let body = vec![
        Line::from(app.link_input.as_str()),
        Line::from(""),
        Line::from(Span::styled("Enter: open  Esc: cancel  Ctrl+u: clear", Style::default().fg(app.theme.muted))),
    ];
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Open link").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// A `width` x `height` rect centered in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clipped_and_centered() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(50, 10, area), Rect::new(25, 15, 50, 10));
        assert_eq!(centered_rect(200, 80, area), area);
    }

    #[test]
    fn search_cursor_stays_inside_box() {
        let area = Rect::new(2, 0, 20, 3);
        assert_eq!(search_cursor_x(area, ""), 3);
        assert_eq!(search_cursor_x(area, "ann"), 6);
        assert_eq!(search_cursor_x(area, &"x".repeat(70_000)), 20);
    }
}
