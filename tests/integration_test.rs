// Integration tests for userpager

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use userpager::app::config::Settings;
use userpager::app::update::{Flow, handle_key};
use userpager::app::{AppState, InputMode};
use userpager::location::{Location, LocationChange, Origin, PageSize};
use userpager::sys::{JsonFileSource, UserRecord, UserSource};

struct Fixed(Vec<UserRecord>);

impl UserSource for Fixed {
    fn fetch_all(&self) -> userpager::Result<Vec<UserRecord>> {
        Ok(self.0.clone())
    }
    fn describe(&self) -> String {
        "fixed".into()
    }
}

struct Unreachable;

impl UserSource for Unreachable {
    fn fetch_all(&self) -> userpager::Result<Vec<UserRecord>> {
        Err(userpager::error::simple_error("503 Service Unavailable"))
    }
    fn describe(&self) -> String {
        "unreachable".into()
    }
}

const DIRECTORY: [&str; 12] = [
    "Leanne Graham",
    "Ervin Howell",
    "Clementine Bauch",
    "Patricia Lebsack",
    "Chelsey Dietrich",
    "Mrs. Dennis Schulist",
    "Kurtis Weissnat",
    "Nicholas Runolfsdottir V",
    "Glenna Reichert",
    "Clementina DuBuque",
    "Bob Smith",
    "Eve Olsen",
];

fn directory() -> Vec<UserRecord> {
    DIRECTORY
        .iter()
        .enumerate()
        .map(|(i, n)| UserRecord { id: i as u32 + 1, name: n.to_string(), ..Default::default() })
        .collect()
}

fn started(source: Arc<dyn UserSource>, link: &str) -> AppState {
    let mut app = AppState::new(source, &Settings::default(), Location::with_link(link).unwrap());
    app.start();
    assert!(app.wait_for_load(Duration::from_secs(5)));
    app
}

fn press(app: &mut AppState, code: KeyCode, now: Instant) -> Flow {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), now)
}

// 1) Twelve users, "a" matches seven, five per page
#[test]
fn search_and_page_through_directory() {
    let mut app = started(Arc::new(Fixed(directory())), "?search=a");
    assert_eq!(app.users.len(), 7);
    assert_eq!(app.view.size, PageSize::Five);

    assert_eq!(app.visible_users().len(), 5);
    app.next_page();
    assert_eq!(app.visible_users().len(), 2);
    assert_eq!(app.link().query(), Some("search=a&page=1"));

    // page 2 only reachable through a link; it is simply empty
    app.open_link("?search=a&page=2").unwrap();
    assert!(app.wait_for_load(Duration::from_secs(5)));
    assert!(app.visible_users().is_empty());
    assert!(app.selected_user().is_none());
}

// 2) Typing is debounced into a single search
#[test]
fn keystrokes_settle_into_one_search() {
    let mut app = started(Arc::new(Fixed(directory())), "?page=1");
    let changes = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let changes = Rc::clone(&changes);
        app.location.changes().subscribe(move |c: &LocationChange| changes.borrow_mut().push(c.clone()))
    };
    let generation = app.load_generation();

    let t0 = Instant::now();
    press(&mut app, KeyCode::Char('/'), t0);
    assert_eq!(app.input_mode, InputMode::Search);
    press(&mut app, KeyCode::Char('a'), t0);
    press(&mut app, KeyCode::Char('n'), t0 + Duration::from_millis(40));
    press(&mut app, KeyCode::Char('n'), t0 + Duration::from_millis(80));
    assert_eq!(app.search_input, "ann");

    app.pump(t0 + Duration::from_millis(200));
    assert_eq!(app.view.search, "");
    assert!(changes.borrow().is_empty());

    app.pump(t0 + Duration::from_millis(380));
    assert_eq!(app.view.search, "ann");
    assert_eq!(app.view.page, 0);
    assert_eq!(changes.borrow().len(), 1);
    assert_eq!(changes.borrow()[0].origin, Origin::Internal);
    assert_eq!(app.link().query(), Some("search=ann"));
    // Leanne Graham
    assert_eq!(app.users.len(), 1);
    // mirroring the link does not reload
    assert_eq!(app.load_generation(), generation);

    press(&mut app, KeyCode::Enter, t0 + Duration::from_millis(400));
    assert_eq!(app.input_mode, InputMode::Normal);
}

// 3) Clearing the search goes through the debouncer and restores the full list
#[test]
fn clear_search_restores_everyone() {
    let mut app = started(Arc::new(Fixed(directory())), "?search=bob&size=20");
    assert_eq!(app.users.len(), 1);
    let t0 = Instant::now();
    press(&mut app, KeyCode::Char('x'), t0);
    assert!(app.search_input.is_empty());
    app.pump(t0 + Duration::from_millis(300));
    assert_eq!(app.users.len(), 12);
    assert_eq!(app.link().query(), Some("size=20"));
}

// 4) A failing source leaves an empty, idle view
#[test]
fn failed_load_shows_no_data() {
    let app = started(Arc::new(Unreachable), "");
    assert!(!app.is_busy());
    assert!(app.users_all.is_empty());
    assert!(app.visible_users().is_empty());
}

// 5) Link prompt drives an external navigation and a fresh load
#[test]
fn link_prompt_navigates() {
    let mut app = started(Arc::new(Fixed(directory())), "");
    let generation = app.load_generation();
    let now = Instant::now();

    press(&mut app, KeyCode::Char('o'), now);
    assert_eq!(app.input_mode, InputMode::Link);
    assert_eq!(app.link_input, "userpager://local/users");
    app.link_input = "?size=10&page=1".to_string();
    press(&mut app, KeyCode::Enter, now);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.load_generation(), generation + 1);
    assert!(app.wait_for_load(Duration::from_secs(5)));
    assert_eq!(app.view.size, PageSize::Ten);
    assert_eq!(app.visible_users().len(), 2);

    // a broken link is ignored
    press(&mut app, KeyCode::Char('o'), now);
    app.link_input = "http://[::1".to_string();
    press(&mut app, KeyCode::Enter, now);
    assert_eq!(app.load_generation(), generation + 1);
    assert_eq!(app.view.size, PageSize::Ten);
}

// 6) Reload re-reads the link and fetches again
#[test]
fn reload_fetches_again() {
    let mut app = started(Arc::new(Fixed(directory())), "?page=1");
    let generation = app.load_generation();
    press(&mut app, KeyCode::Char('r'), Instant::now());
    assert_eq!(app.load_generation(), generation + 1);
    assert!(app.wait_for_load(Duration::from_secs(5)));
    assert_eq!(app.view.page, 1);
}

// 7) Quit key ends the loop
#[test]
fn quit_key_stops() {
    let mut app = started(Arc::new(Fixed(vec![])), "");
    assert_eq!(press(&mut app, KeyCode::Char('q'), Instant::now()), Flow::Quit);
    assert_eq!(press(&mut app, KeyCode::Char('j'), Instant::now()), Flow::Continue);
}

// 8) JSON file source end to end, plus the headless dump
#[test]
fn json_file_to_plain_output() {
    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    path.push(format!("userpager_users_{}_{}.json", std::process::id(), nonce));
    let users: Vec<UserRecord> = directory();
    std::fs::write(&path, serde_json::to_string(&users).unwrap()).unwrap();

    let mut app = started(Arc::new(JsonFileSource::new(&path)), "?search=clem");
    app.teardown();
    let mut out = Vec::new();
    userpager::ui::write_plain(&app, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(text.contains("Clementine Bauch"));
    assert!(text.contains("Clementina DuBuque"));
    assert!(!text.contains("Leanne"));
    assert!(text.contains("-- page 1/1 (5 per page, 2 matching) --"));
    assert!(text.trim_end().ends_with("userpager://local/users?search=clem"));
}

// 9) A page index at the top of the range renders and pages without wrapping
#[test]
fn largest_page_index_from_link() {
    let mut app = started(Arc::new(Fixed(directory())), "?page=18446744073709551615");
    assert_eq!(app.view.page, usize::MAX);
    app.next_page();
    assert_eq!(app.view.page, usize::MAX);

    let mut out = Vec::new();
    userpager::ui::write_plain(&app, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(&format!("-- page {}/3 (5 per page, 12 matching) --", usize::MAX)));

    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|f| userpager::ui::render(f, &app)).unwrap();
}
