use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use walkdir::WalkDir;

use crate::browser::{BrowserConfig, BrowserError, BrowserManager};
use crate::config::Config;
use crate::models::Book;
use crate::notebook::{self, ScrapeError, NOTEBOOK_URL};
use crate::session::{SessionError, SessionStore};
use crate::writer::{self, WriteError};

const EXPORT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub enum ExportError {
    Session(SessionError),
    SessionExpired,
    Browser(BrowserError),
    Scrape(ScrapeError),
    Write(WriteError),
    Io(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Session(e) => write!(f, "{}", e),
            ExportError::SessionExpired => {
                write!(
                    f,
                    "Session expired. Run `kindle-highlights login` to log in again."
                )
            }
            ExportError::Browser(e) => write!(f, "{}", e),
            ExportError::Scrape(e) => write!(f, "{}", e),
            ExportError::Write(e) => write!(f, "{}", e),
            ExportError::Io(e) => write!(f, "Filesystem error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<SessionError> for ExportError {
    fn from(e: SessionError) -> Self {
        ExportError::Session(e)
    }
}

impl From<BrowserError> for ExportError {
    fn from(e: BrowserError) -> Self {
        ExportError::Browser(e)
    }
}

impl From<ScrapeError> for ExportError {
    fn from(e: ScrapeError) -> Self {
        ExportError::Scrape(e)
    }
}

impl From<WriteError> for ExportError {
    fn from(e: WriteError) -> Self {
        ExportError::Write(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub total: usize,
    pub exported: usize,
    pub skipped: usize,
}

/// File stems of the markdown files already present in the notes
/// directory. Unreadable entries are ignored.
pub fn existing_exports(notes_dir: &Path) -> HashSet<String> {
    WalkDir::new(notes_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.to_string_lossy() == "md")
                .unwrap_or(false)
        })
        .filter_map(|e| {
            e.path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .collect()
}

/// Select the books to scrape this run, keeping their sidebar position.
/// Incremental mode drops books whose output file already exists; forced
/// mode keeps everything.
pub fn work_set<'a>(
    books: &'a [Book],
    existing: &HashSet<String>,
    force: bool,
) -> Vec<(usize, &'a Book)> {
    books
        .iter()
        .enumerate()
        .filter(|(_, book)| force || !existing.contains(&writer::file_stem(book)))
        .collect()
}

/// One full export run: open the session, list the books, then scrape
/// and write each book in the work set strictly in sequence.
pub fn run(config: &Config, force: bool) -> Result<ExportSummary, ExportError> {
    let (store, meta) = SessionStore::open(&config.state_dir)?;

    fs::create_dir_all(&config.notes_dir).map_err(|e| ExportError::Io(e.to_string()))?;
    let existing = existing_exports(&config.notes_dir);

    let browser = BrowserManager::launch(BrowserConfig {
        headless: true,
        executable: config.browser_path.clone(),
        profile_dir: store.profile_dir(),
        idle_timeout: EXPORT_IDLE_TIMEOUT,
    })?;

    println!(
        "Navigating to Kindle notebook (session saved {})...",
        meta.captured_at.format("%Y-%m-%d")
    );
    browser.goto(NOTEBOOK_URL)?;

    if notebook::looks_like_login(&browser.current_url()) {
        return Err(ExportError::SessionExpired);
    }

    let books = notebook::list_books(browser.tab())?;
    println!("Found {} books", books.len());

    let work = work_set(&books, &existing, force);
    let skipped = books.len() - work.len();
    let mut exported = 0;

    for (index, book) in work {
        println!(
            "  [{}/{}] {} by {}...",
            index + 1,
            books.len(),
            book.title,
            book.author
        );

        notebook::open_book(browser.tab(), index, &book.title)?;
        let entries = notebook::scrape_annotations(browser.tab());

        if entries.is_empty() {
            println!("    No highlights found, skipping");
            continue;
        }

        let path = writer::write_book(&config.notes_dir, book, &entries)?;
        println!("    Wrote {} highlights to {}", entries.len(), path.display());
        exported += 1;
    }

    Ok(ExportSummary {
        total: books.len(),
        exported,
        skipped,
    })
}
