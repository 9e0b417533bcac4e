//! Managed Chrome/Chromium instance driven over the DevTools protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};

#[derive(Debug)]
pub enum BrowserError {
    Launch(String),
    Navigation(String),
}

impl std::fmt::Display for BrowserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserError::Launch(e) => write!(f, "Failed to launch browser: {}", e),
            BrowserError::Navigation(e) => write!(f, "Navigation failed: {}", e),
        }
    }
}

impl std::error::Error for BrowserError {}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Alternate Chrome/Chromium binary. `None` uses the system default.
    pub executable: Option<PathBuf>,
    /// Chrome user-data directory carrying the persisted login cookies.
    pub profile_dir: PathBuf,
    /// How long the browser may sit without CDP traffic before the
    /// watchdog closes it.
    pub idle_timeout: Duration,
}

pub struct BrowserManager {
    // Dropping the Browser terminates the Chrome process, so it must
    // outlive every use of the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserManager {
    pub fn launch(config: BrowserConfig) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .path(config.executable)
            .user_data_dir(Some(config.profile_dir))
            .idle_browser_timeout(config.idle_timeout)
            .window_size(Some((1280, 1024)))
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(BrowserManager {
            _browser: browser,
            tab,
        })
    }

    pub fn tab(&self) -> &Tab {
        &self.tab
    }

    pub fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(())
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }
}
