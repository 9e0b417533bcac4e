//! Persisted browser session: a Chrome profile directory that holds the
//! Amazon cookies, plus a small metadata file written at login time.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::browser::{BrowserConfig, BrowserError, BrowserManager};
use crate::config::Config;
use crate::notebook::NOTEBOOK_URL;

const SESSION_FILE: &str = "session.json";
const PROFILE_DIR: &str = "browser-profile";

// Generous watchdog so the browser survives a slow manual login (2FA,
// captcha) without any CDP traffic.
const LOGIN_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub enum SessionError {
    Missing(String),
    Corrupt(String),
    Io(String),
    Browser(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Missing(path) => {
                write!(
                    f,
                    "No saved session at {}. Run `kindle-highlights login` first.",
                    path
                )
            }
            SessionError::Corrupt(e) => {
                write!(
                    f,
                    "Saved session is unreadable ({}). Run `kindle-highlights login` again.",
                    e
                )
            }
            SessionError::Io(e) => write!(f, "Session state error: {}", e),
            SessionError::Browser(e) => write!(f, "Browser error during login: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<BrowserError> for SessionError {
    fn from(e: BrowserError) -> Self {
        SessionError::Browser(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionMeta {
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    state_dir: PathBuf,
}

impl SessionStore {
    /// Open an existing session for an export run. Fails if the login
    /// step has not produced a profile and metadata file yet.
    pub fn open(state_dir: &Path) -> Result<(Self, SessionMeta), SessionError> {
        let store = SessionStore {
            state_dir: state_dir.to_path_buf(),
        };

        if !store.meta_path().is_file() || !store.profile_dir().is_dir() {
            return Err(SessionError::Missing(state_dir.display().to_string()));
        }

        let raw = fs::read_to_string(store.meta_path())
            .map_err(|e| SessionError::Io(e.to_string()))?;
        let meta: SessionMeta =
            serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt(e.to_string()))?;

        Ok((store, meta))
    }

    /// Create the session directories for a fresh login.
    pub fn initialize(state_dir: &Path) -> Result<Self, SessionError> {
        let store = SessionStore {
            state_dir: state_dir.to_path_buf(),
        };

        fs::create_dir_all(store.profile_dir()).map_err(|e| SessionError::Io(e.to_string()))?;

        Ok(store)
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.state_dir.join(PROFILE_DIR)
    }

    fn meta_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    pub fn save_meta(&self, meta: &SessionMeta) -> Result<(), SessionError> {
        let json =
            serde_json::to_string_pretty(meta).map_err(|e| SessionError::Io(e.to_string()))?;

        fs::write(self.meta_path(), json).map_err(|e| SessionError::Io(e.to_string()))
    }
}

/// Interactive login: open a visible browser on the session profile, wait
/// for the user to finish logging in, then persist the session metadata.
/// Chrome itself persists the cookies into the profile directory.
pub fn capture(config: &Config) -> Result<(), SessionError> {
    let store = SessionStore::initialize(&config.state_dir)?;

    let browser = BrowserManager::launch(BrowserConfig {
        headless: false,
        executable: config.browser_path.clone(),
        profile_dir: store.profile_dir(),
        idle_timeout: LOGIN_IDLE_TIMEOUT,
    })?;

    browser.goto(NOTEBOOK_URL)?;

    println!("Please log into your Amazon account in the browser window.");
    println!("After you see your Kindle notebook page, press Enter here to save the session.");
    print!("\nPress Enter when logged in and notebook page is visible... ");
    io::stdout().flush().map_err(|e| SessionError::Io(e.to_string()))?;

    wait_for_enter().map_err(|e| SessionError::Io(e.to_string()))?;

    // Save the marker before the browser (and its profile flush) goes away.
    store.save_meta(&SessionMeta {
        captured_at: Utc::now(),
    })?;

    drop(browser);
    println!("Session saved to {}", config.state_dir.display());

    Ok(())
}

fn wait_for_enter() -> io::Result<()> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_session_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = SessionStore::open(dir.path());

        assert!(matches!(result, Err(SessionError::Missing(_))));
    }

    #[test]
    fn test_meta_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::initialize(dir.path()).unwrap();
        let meta = SessionMeta {
            captured_at: Utc::now(),
        };

        store.save_meta(&meta).unwrap();
        let (_, loaded) = SessionStore::open(dir.path()).unwrap();

        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_open_corrupt_meta_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::initialize(dir.path()).unwrap();
        fs::write(store.meta_path(), "not json").unwrap();

        let result = SessionStore::open(dir.path());

        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn test_initialize_creates_profile_dir() {
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::initialize(dir.path()).unwrap();

        assert!(store.profile_dir().is_dir());
    }
}
