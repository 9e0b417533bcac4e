use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Book, Entry};

const MAX_STEM_LEN: usize = 200;

#[derive(Debug)]
pub enum WriteError {
    Io(String, String),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::Io(path, e) => write!(f, "Failed to write {}: {}", path, e),
        }
    }
}

impl std::error::Error for WriteError {}

/// Remove characters that are unsafe for filenames, trim stray
/// dots/spaces, and cap the length.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();

    cleaned
        .trim_matches(|c| c == '.' || c == ' ')
        .chars()
        .take(MAX_STEM_LEN)
        .collect()
}

/// Output filename stem for a book. Two books with identical sanitized
/// titles and authors share a stem and the later one overwrites the file.
pub fn file_stem(book: &Book) -> String {
    sanitize_filename(&format!("{} - {}", book.title, book.author))
}

pub fn render_markdown(book: &Book, entries: &[Entry]) -> String {
    let mut lines: Vec<String> = vec![
        format!("# {}", book.title),
        format!("**Author:** {}", book.author),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for entry in entries {
        if !entry.text.is_empty() {
            lines.push(format!("> {}", entry.text));
            lines.push(String::new());
        }

        if let Some(ref note) = entry.note {
            lines.push(format!("**Note:** {}", note));
        }

        let mut meta = Vec::new();
        if let Some(ref location) = entry.location {
            meta.push(format!("**Location:** {}", location));
        }
        if let Some(ref page) = entry.page {
            meta.push(format!("**Page:** {}", page));
        }
        if !meta.is_empty() {
            lines.push(meta.join(" | "));
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Write (or fully overwrite) the markdown file for one book.
pub fn write_book(notes_dir: &Path, book: &Book, entries: &[Entry]) -> Result<PathBuf, WriteError> {
    let path = notes_dir.join(format!("{}.md", file_stem(book)));

    fs::write(&path, render_markdown(book, entries))
        .map_err(|e| WriteError::Io(path.display().to_string(), e.to_string()))?;

    Ok(path)
}
