//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings only apply in normal mode. The search box and the link prompt
//! take raw text and are handled directly by the update loop.

use std::collections::HashMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
///
/// Several keys may map to one action (e.g. both `l` and Right go to the
/// next page).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Focus the search box.
    StartSearch,
    /// Empty the search box.
    ClearSearch,
    /// Open the link prompt.
    OpenLink,
    /// Re-read the current link and load again.
    Reload,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Switch between 5, 10 and 20 rows per page.
    CycleSize,
    MoveUp,
    MoveDown,
    /// Swallow the key.
    Ignore,
}

impl KeyAction {
    const ALL: [KeyAction; 13] = [
        KeyAction::Quit,
        KeyAction::StartSearch,
        KeyAction::ClearSearch,
        KeyAction::OpenLink,
        KeyAction::Reload,
        KeyAction::NextPage,
        KeyAction::PrevPage,
        KeyAction::FirstPage,
        KeyAction::LastPage,
        KeyAction::CycleSize,
        KeyAction::MoveUp,
        KeyAction::MoveDown,
        KeyAction::Ignore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KeyAction::Quit => "Quit",
            KeyAction::StartSearch => "StartSearch",
            KeyAction::ClearSearch => "ClearSearch",
            KeyAction::OpenLink => "OpenLink",
            KeyAction::Reload => "Reload",
            KeyAction::NextPage => "NextPage",
            KeyAction::PrevPage => "PrevPage",
            KeyAction::FirstPage => "FirstPage",
            KeyAction::LastPage => "LastPage",
            KeyAction::CycleSize => "CycleSize",
            KeyAction::MoveUp => "MoveUp",
            KeyAction::MoveDown => "MoveDown",
            KeyAction::Ignore => "Ignore",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|a| a.name() == s)
    }
}

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('x')), KeyAction::ClearSearch);
        bindings.insert((M::CONTROL, Char('u')), KeyAction::ClearSearch);
        bindings.insert((M::NONE, Char('o')), KeyAction::OpenLink);
        bindings.insert((M::NONE, Char('r')), KeyAction::Reload);
        bindings.insert((M::NONE, Char('s')), KeyAction::CycleSize);
        // Paging
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, Home), KeyAction::FirstPage);
        bindings.insert((M::NONE, End), KeyAction::LastPage);
        // Rows
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        // Vim-like keys
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('g')), KeyAction::FirstPage);

        let mut map = Self { bindings };
        map.bind((M::NONE, Char('G')), KeyAction::LastPage);
        map
    }

    /// Insert one binding. Capital letters are bound with and without
    /// Shift since terminals disagree on whether Shift is reported.
    fn bind(&mut self, key: (KeyModifiers, KeyCode), action: KeyAction) {
        if let (mods, KeyCode::Char(c)) = key {
            if c.is_uppercase() {
                self.bindings.insert((mods | KeyModifiers::SHIFT, KeyCode::Char(c)), action);
                self.bindings.insert((mods & !KeyModifiers::SHIFT, KeyCode::Char(c)), action);
                return;
            }
        }
        self.bindings.insert(key, action);
    }

    /// Load from `explicit` if given, else from the first `keybinds.conf`
    /// found in the config locations; defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => super::config::config_file_read_path("keybinds.conf"),
        };
        path.and_then(|p| Self::from_file(&p)).unwrap_or_default()
    }

    /// Defaults overridden by the bindings in `path`.
    ///
    /// Lines read `<Action> = <KeySpec>`; the older `<KeySpec> = <Action>`
    /// order is accepted too. Returns `None` if the file can't be read.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if let (Some(action), Some(key)) = (KeyAction::parse(lhs), parse_key(rhs)) {
                map.bind(key, action);
            } else if let (Some(key), Some(action)) = (parse_key(lhs), KeyAction::parse(rhs)) {
                map.bind(key, action);
            } else {
                tracing::warn!(line, "ignoring keybinding");
            }
        }
        map
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Display specs of every key bound to `action`, sorted.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| Self::format_key(*m, *c))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Human-readable spec like "Ctrl+u", "PageDown".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            Home => "Home".to_string(),
            End => "End".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}
