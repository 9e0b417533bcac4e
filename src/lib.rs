//! Export Kindle highlights/notes from read.amazon.com/notebook to
//! per-book markdown files.

pub mod browser;
pub mod config;
pub mod export;
pub mod models;
pub mod notebook;
pub mod parser;
pub mod session;
pub mod writer;

pub use config::Config;
pub use models::{Book, Entry};
