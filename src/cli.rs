//! Command-line flags and the glue that turns them into a user source.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use crate::app::config::{Settings, SourceKind};
use crate::error::{Context, Result};
use crate::sys::{JsonFileSource, PasswdFileSource, SYSTEM_PASSWD, SystemSource, UserSource};

#[derive(Debug, Parser)]
#[command(name = "userpager", version, about = "Search and page through user accounts")]
pub struct Cli {
    /// Where to read users from (overrides `source` in the settings file).
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// File for the passwd/json sources.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// View to open, e.g. "?search=ann&page=2&size=10" or a full userpager:// link.
    #[arg(short, long, env = "USERPAGER_LINK")]
    pub link: Option<String>,

    /// Settings file (default: userpager.conf in the config dir or cwd).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keybindings file (default: keybinds.conf in the config dir or cwd).
    #[arg(long)]
    pub keymap: Option<PathBuf>,

    /// Log file (default: userpager.log in the local data dir).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the linked page to stdout and exit instead of starting the TUI.
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    /// Settings from the config file with command-line overrides applied.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::load(self.config.as_deref());
        if let Some(kind) = self.source {
            settings.source = kind;
        }
        if let Some(file) = &self.file {
            settings.file = Some(file.clone());
        }
        settings
    }
}

/// Build the source selected by `kind`.
pub fn build_source(kind: SourceKind, file: Option<&Path>) -> Result<Arc<dyn UserSource>> {
    let source: Arc<dyn UserSource> = match kind {
        SourceKind::System => Arc::new(SystemSource::new()),
        SourceKind::Passwd => {
            Arc::new(PasswdFileSource::new(file.unwrap_or(Path::new(SYSTEM_PASSWD))))
        }
        SourceKind::Json => {
            let file = file.with_ctx(|| "the json source needs --file <PATH>".to_string())?;
            Arc::new(JsonFileSource::new(file))
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "userpager", "--source", "json", "-f", "users.json", "--link", "?page=1", "--print",
        ])
        .unwrap();
        assert_eq!(cli.source, Some(SourceKind::Json));
        assert_eq!(cli.file.as_deref(), Some(Path::new("users.json")));
        assert_eq!(cli.link.as_deref(), Some("?page=1"));
        assert!(cli.print);
    }

    #[test]
    fn json_source_requires_file() {
        assert!(build_source(SourceKind::Json, None).is_err());
        let src = build_source(SourceKind::Passwd, None).unwrap();
        assert_eq!(src.describe(), "passwd:/etc/passwd");
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "userpager", "--config", "/no/such/file.conf", "--source", "passwd", "--file", "/tmp/pw",
        ])
        .unwrap();
        let s = cli.settings();
        assert_eq!(s.source, SourceKind::Passwd);
        assert_eq!(s.file.as_deref(), Some(Path::new("/tmp/pw")));
    }
}
