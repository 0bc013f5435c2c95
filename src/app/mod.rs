//! Application state and the search/page/link state machine.
//!
//! [`AppState`] owns the loaded users, the current [`ViewState`] and the
//! collaborators that feed it: the search debouncer, the [`Location`] and
//! the background [`Loader`]. All three report through emitters; the app
//! subscribes once in [`AppState::start`], queues what they report, and
//! applies it in [`AppState::pump`].
pub mod config;
pub mod keymap;
pub mod loader;
pub mod update;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::style::Color;
use url::Url;

use crate::debounce::Debouncer;
use crate::error::Result;
use crate::events::Subscriptions;
use crate::location::{Location, LocationChange, Origin, ViewState};
use crate::search::{filter_users, page_count, paginate};
use crate::sys::{UserRecord, UserSource};

use self::config::Settings;
use self::keymap::Keymap;
use self::loader::{LoadOutcome, Loader};

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box.
    Search,
    /// Editing a link to jump to.
    Link,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
        }
    }

    /// Catppuccin Mocha.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
        }
    }

    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "mocha" => Some(Self::mocha()),
            _ => None,
        }
    }

    /// Override one colour by key. Returns false for unknown keys or values.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let Some(color) = Self::parse_color(value) else {
            return false;
        };
        let slot = match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            _ => return false,
        };
        *slot = color;
        true
    }

    /// Hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

/// Something a collaborator reported, waiting to be applied.
#[derive(Clone, Debug)]
pub enum AppEvent {
    SearchSettled(String),
    LocationChanged(LocationChange),
    LoadFinished(LoadOutcome),
}

pub struct AppState {
    pub started_at: Instant,
    /// Everything the source returned.
    pub users_all: Vec<UserRecord>,
    /// `users_all` narrowed by the current search.
    pub users: Vec<UserRecord>,
    pub view: ViewState,
    /// Raw search box contents; `view.search` only follows once settled.
    pub search_input: String,
    pub link_input: String,
    pub input_mode: InputMode,
    /// Cursor row within the visible page.
    pub selected: usize,
    pub theme: Theme,
    pub keymap: Keymap,
    pub location: Location,
    debouncer: Debouncer<String>,
    loader: Loader,
    inbox: Rc<RefCell<VecDeque<AppEvent>>>,
    subscriptions: Subscriptions,
}

impl AppState {
    pub fn new(source: Arc<dyn UserSource>, settings: &Settings, location: Location) -> Self {
        let view = location.view_state();
        Self {
            started_at: Instant::now(),
            users_all: Vec::new(),
            users: Vec::new(),
            search_input: view.search.clone(),
            view,
            link_input: String::new(),
            input_mode: InputMode::Normal,
            selected: 0,
            theme: settings.theme,
            keymap: Keymap::default(),
            location,
            debouncer: Debouncer::new(settings.debounce),
            loader: Loader::new(source),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            subscriptions: Subscriptions::new(),
        }
    }

    /// Subscribe to the collaborators and treat the current link as the
    /// initial external navigation, which triggers the first load.
    pub fn start(&mut self) {
        if self.subscriptions.is_empty() {
            let inbox = Rc::clone(&self.inbox);
            self.subscriptions.add(self.debouncer.settled().subscribe(move |q: &String| {
                inbox.borrow_mut().push_back(AppEvent::SearchSettled(q.clone()));
            }));
            let inbox = Rc::clone(&self.inbox);
            self.subscriptions.add(self.location.changes().subscribe(move |c: &LocationChange| {
                inbox.borrow_mut().push_back(AppEvent::LocationChanged(c.clone()));
            }));
            let inbox = Rc::clone(&self.inbox);
            self.subscriptions.add(self.loader.completed().subscribe(move |o: &LoadOutcome| {
                inbox.borrow_mut().push_back(AppEvent::LoadFinished(o.clone()));
            }));
        }
        self.location.reload();
        self.drain();
    }

    /// Release every subscription. Nothing reported afterwards reaches the app.
    pub fn teardown(&mut self) {
        self.subscriptions.release_all();
        self.inbox.borrow_mut().clear();
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Advance timers and background work, then apply whatever they
    /// reported. Returns whether state changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = self.debouncer.poll(now);
        changed |= self.loader.poll();
        changed |= self.drain();
        changed
    }

    /// Block until the newest load finishes (or `timeout`), then apply it.
    pub fn wait_for_load(&mut self, timeout: Duration) -> bool {
        let done = self.loader.wait(timeout);
        self.drain();
        done
    }

    fn drain(&mut self) -> bool {
        let mut any = false;
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(event) = next else { break };
            self.apply(event);
            any = true;
        }
        any
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchSettled(query) => {
                tracing::debug!(%query, "search settled");
                self.view.search = query;
                self.view.page = 0;
                self.selected = 0;
                self.location.replace(&self.view);
                self.recompute();
            }
            AppEvent::LocationChanged(change) => match change.origin {
                Origin::Internal => {}
                Origin::External => {
                    self.view = ViewState::from_url(&change.url);
                    self.search_input = self.view.search.clone();
                    self.debouncer.reset(self.view.search.clone());
                    self.selected = 0;
                    self.recompute();
                    self.loader.start();
                }
            },
            AppEvent::LoadFinished(LoadOutcome::Loaded { users, .. }) => {
                self.users_all = users;
                self.recompute();
            }
            // already logged by the loader; the view keeps what it had
            AppEvent::LoadFinished(LoadOutcome::Failed { .. }) => {}
        }
    }

    fn recompute(&mut self) {
        self.users = filter_users(&self.users_all, &self.view.search);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.visible_users().len().saturating_sub(1));
    }

    /// Rows on the current page.
    pub fn visible_users(&self) -> &[UserRecord] {
        paginate(&self.users, self.view.page, self.view.size.get())
    }

    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.visible_users().get(self.selected)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.users.len(), self.view.size.get())
    }

    pub fn is_busy(&self) -> bool {
        self.loader.is_busy()
    }

    pub fn load_generation(&self) -> u64 {
        self.loader.generation()
    }

    pub fn source_label(&self) -> String {
        self.loader.source().describe()
    }

    pub fn link(&self) -> &Url {
        self.location.url()
    }

    /// When the event loop must wake up next for the debouncer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn set_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input = text.into();
        self.debouncer.push(self.search_input.clone(), now);
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut text = std::mem::take(&mut self.search_input);
        text.push(c);
        self.set_search_input(text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = std::mem::take(&mut self.search_input);
        text.pop();
        self.set_search_input(text, now);
    }

    pub fn clear_search(&mut self, now: Instant) {
        self.set_search_input(String::new(), now);
    }

    pub fn next_page(&mut self) {
        let Some(next) = self.view.page.checked_add(1) else {
            return;
        };
        if next < self.page_count() {
            self.view.page = next;
            self.commit_view();
        }
    }

    pub fn prev_page(&mut self) {
        if self.view.page == 0 {
            return;
        }
        let last = self.page_count().saturating_sub(1);
        self.view.page = (self.view.page - 1).min(last);
        self.commit_view();
    }

    pub fn first_page(&mut self) {
        if self.view.page != 0 {
            self.view.page = 0;
            self.commit_view();
        }
    }

    pub fn last_page(&mut self) {
        let last = self.page_count().saturating_sub(1);
        if self.view.page != last {
            self.view.page = last;
            self.commit_view();
        }
    }

    /// Switch to the next page size, keeping the first visible row on screen.
    pub fn cycle_page_size(&mut self) {
        let old = self.view.size.get();
        self.view.size = self.view.size.next();
        self.view.page = self.view.page.saturating_mul(old) / self.view.size.get();
        self.commit_view();
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_users().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Navigate to a user-supplied link.
    pub fn open_link(&mut self, link: &str) -> Result<()> {
        self.location.navigate(link)?;
        self.drain();
        Ok(())
    }

    /// Re-read the current link and load again.
    pub fn reload(&mut self) {
        self.location.reload();
        self.drain();
    }

    fn commit_view(&mut self) {
        self.selected = 0;
        self.location.replace(&self.view);
        self.drain();
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("view", &self.view)
            .field("users_all", &self.users_all.len())
            .field("users", &self.users.len())
            .field("input_mode", &self.input_mode)
            .field("loader", &self.loader)
            .finish()
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
