use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode};
use crate::ui;

/// Longest the loop sleeps waiting for input; keeps the busy spinner moving.
const TICK: Duration = Duration::from_millis(100);

/// What the loop should do after a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    app.start();

    let res = event_loop(terminal, app);
    app.teardown();
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        let now = Instant::now();
        let timeout = app
            .next_deadline()
            .map(|d| d.saturating_duration_since(now).min(TICK))
            .unwrap_or(TICK);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key, Instant::now()) == Flow::Quit {
                    break;
                }
            }
        }

        app.pump(Instant::now());
    }
    Ok(())
}

/// Apply one key press to the app.
pub fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    match app.input_mode {
        InputMode::Normal => {
            if let Some(action) = app.keymap.resolve(&key) {
                return apply_action(app, action, now);
            }
        }
        InputMode::Search => match key.code {
            KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_search(now),
            KeyCode::Backspace => app.pop_search_char(now),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.push_search_char(c, now),
            _ => {}
        },
        InputMode::Link => match key.code {
            KeyCode::Esc => {
                app.link_input.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let link = std::mem::take(&mut app.link_input);
                app.input_mode = InputMode::Normal;
                if let Err(e) = app.open_link(&link) {
                    tracing::warn!(error = %e, "ignoring link");
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.link_input.clear(),
            KeyCode::Backspace => {
                app.link_input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.link_input.push(c),
            _ => {}
        },
    }
    Flow::Continue
}

fn apply_action(app: &mut AppState, action: KeyAction, now: Instant) -> Flow {
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::ClearSearch => app.clear_search(now),
        KeyAction::OpenLink => {
            app.link_input = app.link().to_string();
            app.input_mode = InputMode::Link;
        }
        KeyAction::Reload => app.reload(),
        KeyAction::NextPage => app.next_page(),
        KeyAction::PrevPage => app.prev_page(),
        KeyAction::FirstPage => app.first_page(),
        KeyAction::LastPage => app.last_page(),
        KeyAction::CycleSize => app.cycle_page_size(),
        KeyAction::MoveUp => app.move_selection(-1),
        KeyAction::MoveDown => app.move_selection(1),
        KeyAction::Ignore => {}
    }
    Flow::Continue
}
