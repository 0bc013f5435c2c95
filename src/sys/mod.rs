//! User data sources.
//!
//! The app never filters or pages on the source side: a source hands back the
//! whole list and everything else happens in memory.
use crate::error::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One user account as shown in the list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub full_name: Option<String>,
    pub home_dir: String,
    pub shell: String,
}

/// Anything that can produce the full user list.
///
/// Fetches run on the loader's worker thread, hence `Send + Sync`.
pub trait UserSource: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<UserRecord>>;

    /// Short label for the status bar and logs.
    fn describe(&self) -> String;
}

/// System passwd database path.
pub const SYSTEM_PASSWD: &str = "/etc/passwd";

/// Accounts known to the local system, read from [`SYSTEM_PASSWD`] and
/// ordered by uid.
#[derive(Clone, Debug, Default)]
pub struct SystemSource;

impl SystemSource {
    pub fn new() -> Self {
        Self
    }
}

impl UserSource for SystemSource {
    fn fetch_all(&self) -> Result<Vec<UserRecord>> {
        let mut out = parse_passwd(SYSTEM_PASSWD)?;
        out.sort_by_key(|u| u.id);
        Ok(out)
    }

    fn describe(&self) -> String {
        "system".to_string()
    }
}

/// A passwd-format file (`name:x:uid:gid:gecos:home:shell`).
#[derive(Clone, Debug)]
pub struct PasswdFileSource {
    pub path: PathBuf,
}

impl PasswdFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserSource for PasswdFileSource {
    fn fetch_all(&self) -> Result<Vec<UserRecord>> {
        parse_passwd(&self.path)
    }

    fn describe(&self) -> String {
        format!("passwd:{}", self.path.display())
    }
}

/// A JSON array of user records. Only `name` is required per entry.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserSource for JsonFileSource {
    fn fetch_all(&self) -> Result<Vec<UserRecord>> {
        let raw = fs::read_to_string(&self.path)
            .with_ctx(|| format!("read {}", self.path.display()))?;
        let users: Vec<UserRecord> = serde_json::from_str(&raw)
            .with_ctx(|| format!("parse {}", self.path.display()))?;
        Ok(users)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

fn parse_passwd<P: AsRef<Path>>(path: P) -> Result<Vec<UserRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).with_ctx(|| format!("read {}", path.display()))?;
    let mut users = Vec::new();
    for line in contents.lines() {
        if line.is_empty() || line.starts_with('#') { continue; }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 7 { continue; }
        let full_name = parts[4].split(',').next().unwrap_or("").trim();
        users.push(UserRecord {
            id: parts[2].parse::<u32>().unwrap_or(0),
            name: parts[0].to_string(),
            full_name: if full_name.is_empty() { None } else { Some(full_name.to_string()) },
            home_dir: parts[5].to_string(),
            shell: parts[6].to_string(),
        });
    }
    Ok(users)
}

/// Login name of the user running the app.
pub fn current_username() -> Option<String> {
    users::get_current_username().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::{SystemTime, UNIX_EPOCH};

	fn tmp_path(tag: &str) -> PathBuf {
		let mut p = std::env::temp_dir();
		let n = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
		p.push(format!("userpager_rs_{tag}_{}_{}", std::process::id(), n));
		p
	}

	#[test]
	fn parse_passwd_basic() {
		let path = tmp_path("passwd");
		let data = "\
root:x:0:0:root:/root:/bin/bash
# comment
broken:line
jdoe:x:1000:1000:John Doe,,,:/home/jdoe:/bin/zsh
";
		fs::write(&path, data).unwrap();

		let users = parse_passwd(&path).unwrap();
		fs::remove_file(&path).ok();

		assert_eq!(users.len(), 2);
		assert_eq!(users[0].name, "root");
		assert_eq!(users[0].id, 0);
		assert_eq!(users[1].name, "jdoe");
		assert_eq!(users[1].id, 1000);
		assert_eq!(users[1].full_name.as_deref(), Some("John Doe"));
		assert_eq!(users[1].home_dir, "/home/jdoe");
		assert_eq!(users[1].shell, "/bin/zsh");
	}

	#[test]
	fn json_source_fills_missing_fields() {
		let path = tmp_path("json");
		fs::write(&path, r#"[{"name":"Leanne Graham","id":1},{"name":"Ervin Howell"}]"#).unwrap();

		let users = JsonFileSource::new(&path).fetch_all().unwrap();
		fs::remove_file(&path).ok();

		assert_eq!(users.len(), 2);
		assert_eq!(users[0].id, 1);
		assert_eq!(users[1].name, "Ervin Howell");
		assert_eq!(users[1].id, 0);
		assert!(users[1].full_name.is_none());
	}

	#[test]
	fn system_source_reads_passwd_sorted_by_uid() {
		if !Path::new(SYSTEM_PASSWD).exists() {
			return;
		}
		let users = SystemSource::new().fetch_all().unwrap();
		assert!(users.windows(2).all(|w| w[0].id <= w[1].id));
		assert_eq!(users.len(), parse_passwd(SYSTEM_PASSWD).unwrap().len());
	}

	#[test]
	fn missing_file_reports_path() {
		let err = PasswdFileSource::new("/definitely/not/here").fetch_all().unwrap_err();
		assert!(err.to_string().contains("/definitely/not/here"));
	}
}
