use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_NOTES_DIR: &str = "./notes";
const DEFAULT_STATE_DIR: &str = "./state";

#[derive(Parser, Debug)]
#[command(name = "kindle-highlights")]
#[command(about = "Export Kindle highlights from read.amazon.com/notebook to markdown files")]
pub struct CliArgs {
    /// Directory where per-book markdown files are written
    #[arg(short, long, global = true)]
    pub notes_dir: Option<String>,

    /// Directory holding the persisted browser session
    #[arg(short, long, global = true)]
    pub state_dir: Option<String>,

    /// Path to an alternate Chrome/Chromium binary
    #[arg(short, long, global = true)]
    pub browser: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a visible browser to log into Amazon and save the session
    Login,
    /// Scrape the notebook and write per-book markdown files
    Export {
        /// Re-export all books (default: skip books that already have a file)
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub notes_dir: PathBuf,
    pub state_dir: PathBuf,
    pub browser_path: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    BrowserNotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::BrowserNotFound(path) => {
                write!(f, "Browser binary not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let cli = CliArgs::parse();
        Self::from_args(cli)
    }

    fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        if let Some(ref path) = cli.browser {
            if !path.exists() {
                return Err(ConfigError::BrowserNotFound(path.display().to_string()));
            }
        }

        let notes_dir = cli
            .notes_dir
            .or_else(|| std::env::var("NOTES_DIR").ok())
            .unwrap_or_else(|| DEFAULT_NOTES_DIR.to_string());

        let state_dir = cli
            .state_dir
            .or_else(|| std::env::var("STATE_DIR").ok())
            .unwrap_or_else(|| DEFAULT_STATE_DIR.to_string());

        Ok(Config {
            notes_dir: PathBuf::from(notes_dir),
            state_dir: PathBuf::from(state_dir),
            browser_path: cli.browser,
            command: cli.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cli(
        notes_dir: Option<&str>,
        state_dir: Option<&str>,
        browser: Option<&str>,
    ) -> CliArgs {
        CliArgs {
            notes_dir: notes_dir.map(String::from),
            state_dir: state_dir.map(String::from),
            browser: browser.map(PathBuf::from),
            command: Command::Export { force: false },
        }
    }

    #[test]
    fn test_default_paths() {
        let config = Config::from_args(make_cli(None, None, None)).unwrap();

        assert_eq!(config.notes_dir, PathBuf::from("./notes"));
        assert_eq!(config.state_dir, PathBuf::from("./state"));
        assert_eq!(config.browser_path, None);
    }

    #[test]
    fn test_explicit_paths_win() {
        let config =
            Config::from_args(make_cli(Some("/tmp/my-notes"), Some("/tmp/my-state"), None))
                .unwrap();

        assert_eq!(config.notes_dir, PathBuf::from("/tmp/my-notes"));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/my-state"));
    }

    #[test]
    fn test_existing_browser_path_accepted() {
        let config = Config::from_args(make_cli(None, None, Some("/"))).unwrap();

        assert_eq!(config.browser_path, Some(PathBuf::from("/")));
    }

    #[test]
    fn test_missing_browser_path_is_error() {
        let result = Config::from_args(make_cli(None, None, Some("/no/such/browser-binary")));

        assert_eq!(
            result,
            Err(ConfigError::BrowserNotFound(
                "/no/such/browser-binary".to_string()
            ))
        );
    }

    #[test]
    fn test_command_is_carried() {
        let config = Config::from_args(CliArgs {
            notes_dir: None,
            state_dir: None,
            browser: None,
            command: Command::Export { force: true },
        })
        .unwrap();

        assert_eq!(config.command, Command::Export { force: true });
    }
}
