//! Scraping of the Kindle notebook page: the library sidebar and the
//! annotation pane of the currently selected book.

use std::thread;
use std::time::Duration;

use headless_chrome::{Element, Tab};

use crate::models::{Book, Entry};
use crate::parser::{clean_author, parse_annotation_header};

pub const NOTEBOOK_URL: &str = "https://read.amazon.com/notebook";

const BOOK_SELECTOR: &str = "#kp-notebook-library .kp-notebook-library-each-book";
const ANNOTATION_PANE: &str = "#kp-notebook-annotations";
const ANNOTATION_ROW: &str = "#kp-notebook-annotations > .a-row.a-spacing-base";
const ANY_ANNOTATION: &str = "#kp-notebook-annotations .a-row";

const LIBRARY_TIMEOUT: Duration = Duration::from_secs(30);
const PANE_TIMEOUT: Duration = Duration::from_secs(15);
const ROWS_TIMEOUT: Duration = Duration::from_secs(10);

// The pane swaps content in place; give it a moment to finish rendering
// after the selector first matches.
const RENDER_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum ScrapeError {
    LibraryUnavailable(String),
    BookVanished(usize),
    Interaction(String),
    AnnotationsUnavailable(String, String),
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::LibraryUnavailable(e) => {
                write!(f, "Notebook library did not load: {}", e)
            }
            ScrapeError::BookVanished(index) => {
                write!(f, "Book #{} disappeared from the library sidebar", index + 1)
            }
            ScrapeError::Interaction(e) => write!(f, "Page interaction failed: {}", e),
            ScrapeError::AnnotationsUnavailable(title, e) => {
                write!(f, "Annotations did not load for \"{}\": {}", title, e)
            }
        }
    }
}

impl std::error::Error for ScrapeError {}

/// True when Amazon redirected us to a sign-in page instead of the
/// notebook.
pub fn looks_like_login(url: &str) -> bool {
    url.contains("signin") || url.contains("/ap/")
}

/// Read the library sidebar into the list of books currently visible.
pub fn list_books(tab: &Tab) -> Result<Vec<Book>, ScrapeError> {
    tab.wait_for_element_with_custom_timeout(BOOK_SELECTOR, LIBRARY_TIMEOUT)
        .map_err(|e| ScrapeError::LibraryUnavailable(e.to_string()))?;

    let elements = tab
        .find_elements(BOOK_SELECTOR)
        .map_err(|e| ScrapeError::LibraryUnavailable(e.to_string()))?;

    let books = elements
        .iter()
        .map(|el| Book {
            title: inner_text(el, "h2").unwrap_or_else(|| "Unknown Title".to_string()),
            author: inner_text(el, "p")
                .map(|raw| clean_author(&raw))
                .unwrap_or_else(|| "Unknown Author".to_string()),
        })
        .collect();

    Ok(books)
}

/// Select the book at `index` in the sidebar and wait for its annotation
/// pane. The sidebar is re-queried rather than holding element handles
/// across clicks.
pub fn open_book(tab: &Tab, index: usize, title: &str) -> Result<(), ScrapeError> {
    let elements = tab
        .find_elements(BOOK_SELECTOR)
        .map_err(|e| ScrapeError::LibraryUnavailable(e.to_string()))?;

    let element = elements.get(index).ok_or(ScrapeError::BookVanished(index))?;
    element
        .click()
        .map_err(|e| ScrapeError::Interaction(e.to_string()))?;

    tab.wait_for_element_with_custom_timeout(ANNOTATION_PANE, PANE_TIMEOUT)
        .map_err(|e| ScrapeError::AnnotationsUnavailable(title.to_string(), e.to_string()))?;

    thread::sleep(RENDER_SETTLE);

    Ok(())
}

/// Extract the annotations of the currently selected book, in page order.
/// A book with no annotations yields an empty list, not an error.
pub fn scrape_annotations(tab: &Tab) -> Vec<Entry> {
    if tab
        .wait_for_element_with_custom_timeout(ANY_ANNOTATION, ROWS_TIMEOUT)
        .is_err()
    {
        return Vec::new();
    }

    thread::sleep(RENDER_SETTLE);

    let rows = tab.find_elements(ANNOTATION_ROW).unwrap_or_default();

    rows.iter().filter_map(row_to_entry).collect()
}

fn row_to_entry(row: &Element) -> Option<Entry> {
    // The notebook page reuses the same ids inside every row, so all
    // lookups are scoped to the row element.
    let text = inner_text(row, "#highlight");
    let note = inner_text(row, "#note");

    if text.is_none() && note.is_none() {
        return None;
    }

    let header = inner_text(row, "#annotationHighlightHeader")
        .or_else(|| inner_text(row, "#annotationNoteHeader"))
        .map(|h| parse_annotation_header(&h))
        .unwrap_or_default();

    Some(Entry {
        text: text.unwrap_or_default(),
        note,
        location: header.location,
        page: header.page,
    })
}

fn inner_text(el: &Element, selector: &str) -> Option<String> {
    el.find_element(selector)
        .ok()
        .and_then(|child| child.get_inner_text().ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_redirect_is_detected() {
        assert!(looks_like_login(
            "https://www.amazon.com/ap/signin?openid.pape.max_auth_age=0"
        ));
        assert!(looks_like_login("https://read.amazon.com/ap/mfa"));
    }

    #[test]
    fn test_notebook_url_is_not_login() {
        assert!(!looks_like_login(NOTEBOOK_URL));
        assert!(!looks_like_login("https://read.amazon.com/notebook?ref=x"));
    }
}
