//! View state and its link representation.
//!
//! [`ViewState`] maps to and from a query string with default omission, and
//! [`Location`] is the in-process stand-in for the address bar: the app
//! replaces it in place, the user navigates it, and every change is emitted.
use std::fmt;

use url::Url;
use url::form_urlencoded;

use crate::error::{Context, Result};
use crate::events::EventEmitter;

/// Base link every view is expressed against.
pub const BASE_LINK: &str = "userpager://local/users";

/// Rows per page offered by the paginator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageSize {
    #[default]
    Five,
    Ten,
    Twenty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Five, PageSize::Ten, PageSize::Twenty];

    pub fn get(self) -> usize {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
        }
    }

    pub fn from_rows(rows: usize) -> Option<Self> {
        match rows {
            5 => Some(PageSize::Five),
            10 => Some(PageSize::Ten),
            20 => Some(PageSize::Twenty),
            _ => None,
        }
    }

    /// 5 -> 10 -> 20 -> 5.
    pub fn next(self) -> Self {
        match self {
            PageSize::Five => PageSize::Ten,
            PageSize::Ten => PageSize::Twenty,
            PageSize::Twenty => PageSize::Five,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Search term, page index and page size: everything a link carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub page: usize,
    pub size: PageSize,
}

impl ViewState {
    /// Query string for this state; parameters at their default are left out.
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            ser.append_pair("search", &self.search);
        }
        if self.page != 0 {
            ser.append_pair("page", &self.page.to_string());
        }
        if self.size != PageSize::default() {
            ser.append_pair("size", &self.size.to_string());
        }
        ser.finish()
    }

    /// Read a state back from a query string. Missing or malformed values
    /// fall back to their defaults.
    pub fn from_query(query: &str) -> Self {
        let mut state = ViewState::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "search" => state.search = value.into_owned(),
                "page" => state.page = value.trim().parse::<usize>().unwrap_or(0),
                "size" => {
                    state.size = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(PageSize::from_rows)
                        .unwrap_or_default()
                }
                _ => {}
            }
        }
        state
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or(""))
    }
}

/// Who caused a location change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// The app mirrored its own state into the link.
    Internal,
    /// The link was set from outside: startup, the link prompt, a reload.
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationChange {
    pub url: Url,
    pub origin: Origin,
}

/// Current link plus a change feed.
#[derive(Debug)]
pub struct Location {
    url: Url,
    changes: EventEmitter<LocationChange>,
}

impl Location {
    pub fn new() -> Self {
        Self {
            url: base_url(),
            changes: EventEmitter::new(),
        }
    }

    /// Start from `link` (see [`Location::navigate`] for accepted forms)
    /// without emitting anything.
    pub fn with_link(link: &str) -> Result<Self> {
        Ok(Self {
            url: resolve_link(link)?,
            changes: EventEmitter::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn changes(&self) -> &EventEmitter<LocationChange> {
        &self.changes
    }

    pub fn view_state(&self) -> ViewState {
        ViewState::from_url(&self.url)
    }

    /// Rewrite the query in place for `state`. No history is kept.
    pub fn replace(&mut self, state: &ViewState) {
        let query = state.to_query();
        self.url.set_query(if query.is_empty() { None } else { Some(&query) });
        tracing::debug!(link = %self.url, "location replaced");
        self.emit(Origin::Internal);
    }

    /// Jump to a link typed or pasted by the user: a full URL, `?query`, or
    /// a bare `key=value&...` query.
    pub fn navigate(&mut self, link: &str) -> Result<()> {
        self.url = resolve_link(link)?;
        tracing::info!(link = %self.url, "location navigated");
        self.emit(Origin::External);
        Ok(())
    }

    /// Announce the current link again as an external change.
    pub fn reload(&self) {
        self.emit(Origin::External);
    }

    fn emit(&self, origin: Origin) {
        self.changes.emit(&LocationChange { url: self.url.clone(), origin });
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

fn base_url() -> Url {
    Url::parse(BASE_LINK).unwrap_or_else(|_| unreachable!("BASE_LINK is a valid URL"))
}

fn resolve_link(link: &str) -> Result<Url> {
    let link = link.trim();
    if link.is_empty() {
        return Ok(base_url());
    }
    if link.contains("://") {
        return Url::parse(link).with_ctx(|| format!("invalid link {link:?}"));
    }
    let mut url = base_url();
    let query = link.trim_start_matches('?');
    url.set_query(if query.is_empty() { None } else { Some(query) });
    Ok(url)
}
