//! userpager binary entry point.
//!
//! Parses flags, sets up file logging, runs the TUI (or the headless
//! `--print` mode) and prints the final link so the view can be reopened.
//!
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use userpager::app::keymap::Keymap;
use userpager::app::{self, AppState};
use userpager::cli::{Cli, build_source};
use userpager::location::Location;

const LOG_ENV: &str = "USERPAGER_LOG";
const PRINT_TIMEOUT: Duration = Duration::from_secs(30);

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("userpager"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("userpager.log")
}

/// The TUI owns the terminal, so logs go to a file; `--print` logs to stderr.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.print {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let path = cli.log_file.clone().unwrap_or_else(default_log_path);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", path.display()))?;
    std::fs::create_dir_all(&dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn run_tui(app: &mut AppState) -> Result<()> {
    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn run_print(app: &mut AppState) -> Result<()> {
    app.start();
    if !app.wait_for_load(PRINT_TIMEOUT) {
        tracing::warn!("gave up waiting for users");
    }
    app.teardown();
    let stdout = std::io::stdout();
    userpager::ui::write_plain(app, &mut stdout.lock())?;
    Ok(())
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    let settings = cli.settings();
    let source = build_source(settings.source, settings.file.as_deref()).map_err(|e| anyhow!(e))?;
    let location = match cli.link.as_deref() {
        Some(link) => Location::with_link(link).map_err(|e| anyhow!(e))?,
        None => Location::new(),
    };

    let mut app = AppState::new(source, &settings, location);
    app.keymap = Keymap::load(cli.keymap.as_deref());
    tracing::info!(source = %app.source_label(), link = %app.link(), "starting userpager");

    if cli.print {
        return run_print(&mut app);
    }

    if let Err(err) = run_tui(&mut app) {
        eprintln!("application error: {err:#}");
        return Err(err);
    }
    println!("{}", app.link());
    Ok(())
}
