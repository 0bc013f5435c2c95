use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::AppState;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let first = app.view.page.saturating_mul(app.view.size.get());
    let rows = app.visible_users().iter().enumerate().map(|(i, u)| {
        Row::new(vec![
            Cell::from((first + i + 1).to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.id.to_string()),
            Cell::from(u.full_name.clone().unwrap_or_default()),
        ])
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Length(24),
        Constraint::Length(8),
        Constraint::Percentage(100),
    ];

    let header = Row::new(vec!["#", "NAME", "ID", "FULL NAME"]).style(
        Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
    );

    let title = if app.is_busy() {
        format!("Users {} loading", crate::ui::components::spinner(app))
    } else {
        "Users".to_string()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)))
        .style(Style::default().fg(app.theme.text))
        .row_highlight_style(Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD))
        .column_spacing(1);

    let mut state = TableState::default();
    if !app.visible_users().is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "Name: {}\nFull name: {}\nID: {}\nHome directory: {}\nShell: {}",
            u.name,
            u.full_name.as_deref().unwrap_or(""),
            u.id,
            u.home_dir,
            u.shell
        ),
        None if app.is_busy() => "Loading...".to_string(),
        None => "No users to show.".to_string(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default().title("Details").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
