use crate::error::LoadError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub type BookId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub file_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: i64,
    pub book_id: BookId,
    pub page: usize,
    pub line: usize,
    pub selected_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reads a plain-text book as a list of lines.
///
/// Invalid UTF-8 is replaced rather than rejected. Both `\n` and `\r\n`
/// terminate a line, and a trailing terminator does not add an empty line.
pub fn read_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    info!("Reading book file: {:?}", path);

    if path.is_dir() {
        return Err(LoadError::NotAFile(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8_lossy(&bytes);
    if let std::borrow::Cow::Owned(_) = text {
        warn!("{:?} is not valid UTF-8, invalid sequences were replaced", path);
    }

    Ok(text.lines().map(str::to_string).collect())
}

pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}
