//! Settings file: parse `userpager.conf` and resolve config locations.
//!
//! The file uses the same `key = value` format as `keybinds.conf`. Lines
//! starting with `#` are comments; unknown keys and bad values are skipped.
//! Command-line flags are layered on top by the binary.
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use super::Theme;
use crate::debounce::DEFAULT_WINDOW;
use crate::error::{Context, Result};

/// Which [`crate::sys::UserSource`] to read users from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Accounts known to this machine.
    #[default]
    System,
    /// A passwd-format file (defaults to /etc/passwd).
    Passwd,
    /// A JSON array of user records.
    Json,
}

impl SourceKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Some(SourceKind::System),
            "passwd" => Some(SourceKind::Passwd),
            "json" => Some(SourceKind::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Quiescence window for the search box.
    pub debounce: Duration,
    pub source: SourceKind,
    /// File backing the `passwd`/`json` sources.
    pub file: Option<PathBuf>,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_WINDOW,
            source: SourceKind::default(),
            file: None,
            theme: Theme::mocha(),
        }
    }
}

impl Settings {
    /// Load from `explicit` if given, else from the first `userpager.conf`
    /// found by [`config_file_read_path`]. Falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => config_file_read_path("userpager.conf"),
        };
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(s) => {
                tracing::debug!(path = %path.display(), "settings loaded");
                s
            }
            Err(e) => {
                tracing::warn!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_ctx(|| format!("read settings {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let pairs: Vec<(&str, &str)> = contents
            .lines()
            .filter_map(|raw| {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let (k, v) = line.split_once('=')?;
                let (k, v) = (k.trim(), v.trim());
                if k.is_empty() || v.is_empty() { None } else { Some((k, v)) }
            })
            .collect();

        let mut cfg = Self::default();
        // base palette first so colour keys override it regardless of order
        if let Some((_, name)) = pairs.iter().rev().find(|(k, _)| *k == "theme") {
            if let Some(t) = Theme::named(name) {
                cfg.theme = t;
            }
        }
        for (key, val) in pairs {
            match key {
                "theme" => {}
                "debounce_ms" => {
                    if let Ok(ms) = val.parse::<u64>() {
                        cfg.debounce = Duration::from_millis(ms);
                    }
                }
                "source" => {
                    if let Some(kind) = SourceKind::parse(val) {
                        cfg.source = kind;
                    }
                }
                "file" => cfg.file = Some(PathBuf::from(val)),
                _ => {
                    cfg.theme.set(key, val);
                }
            }
        }
        cfg
    }
}

/// First existing `name` in the user config dir (`<config>/userpager/`) or
/// the working directory.
pub fn config_file_read_path(name: &str) -> Option<PathBuf> {
    let candidates = [
        dirs::config_dir().map(|d| d.join("userpager").join(name)),
        Some(PathBuf::from(name)),
    ];
    candidates.into_iter().flatten().find(|p| p.is_file())
}
