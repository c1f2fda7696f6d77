use crate::book::{Book, BookId, Bookmark};
use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS books (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    author      TEXT,
    file_path   TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bookmarks (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id        INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    page           INTEGER NOT NULL,
    line           INTEGER NOT NULL,
    selected_text  TEXT,
    created_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS bookmarks_by_book ON bookmarks(book_id, page, line);
";

pub trait BookRepository {
    /// All books, sorted by title.
    fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Registers a book file. Adding a path that is already known returns
    /// the existing id.
    fn add_book(&self, file_path: &Path, title: &str, author: Option<&str>)
    -> Result<BookId, StoreError>;

    fn find_book_by_path(&self, file_path: &Path) -> Result<Option<Book>, StoreError>;

    fn get_book(&self, id: BookId) -> Result<Book, StoreError>;
}

pub trait BookmarkRepository {
    fn add_bookmark(
        &self,
        book_id: BookId,
        page: usize,
        line: usize,
        selected_text: Option<&str>,
    ) -> Result<i64, StoreError>;

    /// Bookmarks of one book, ordered by page then line.
    fn list_bookmarks(&self, book_id: BookId) -> Result<Vec<Bookmark>, StoreError>;
}

pub struct LibraryStore {
    conn: Connection,
}

impl std::fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl LibraryStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening library database: {:?}", path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
        let path: String = row.get("file_path")?;
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            file_path: PathBuf::from(path),
            created_at: row.get("created_at")?,
        })
    }

    fn bookmark_from_row(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
        let page: i64 = row.get("page")?;
        let line: i64 = row.get("line")?;
        Ok(Bookmark {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            page: page.max(0) as usize,
            line: line.max(0) as usize,
            selected_text: row.get("selected_text")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl BookRepository for LibraryStore {
    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, author, file_path, created_at FROM books
             ORDER BY title COLLATE NOCASE, id",
        )?;
        let books = stmt
            .query_map([], Self::book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Listed {} books", books.len());
        Ok(books)
    }

    fn add_book(
        &self,
        file_path: &Path,
        title: &str,
        author: Option<&str>,
    ) -> Result<BookId, StoreError> {
        if let Some(existing) = self.find_book_by_path(file_path)? {
            debug!("Book already in library: {:?}", file_path);
            return Ok(existing.id);
        }

        self.conn.execute(
            "INSERT INTO books (title, author, file_path, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, author, file_path.to_string_lossy(), Utc::now()],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Added book {} ({:?}) as id {}", title, file_path, id);
        Ok(id)
    }

    fn find_book_by_path(&self, file_path: &Path) -> Result<Option<Book>, StoreError> {
        let book = self
            .conn
            .query_row(
                "SELECT id, title, author, file_path, created_at FROM books WHERE file_path = ?1",
                params![file_path.to_string_lossy()],
                Self::book_from_row,
            )
            .optional()?;
        Ok(book)
    }

    fn get_book(&self, id: BookId) -> Result<Book, StoreError> {
        self.conn
            .query_row(
                "SELECT id, title, author, file_path, created_at FROM books WHERE id = ?1",
                params![id],
                Self::book_from_row,
            )
            .optional()?
            .ok_or(StoreError::BookNotFound(id))
    }
}

impl BookmarkRepository for LibraryStore {
    fn add_bookmark(
        &self,
        book_id: BookId,
        page: usize,
        line: usize,
        selected_text: Option<&str>,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO bookmarks (book_id, page, line, selected_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![book_id, page as i64, line as i64, selected_text, Utc::now()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Saved bookmark {} for book {} at line {}", id, book_id, line);
        Ok(id)
    }

    fn list_bookmarks(&self, book_id: BookId) -> Result<Vec<Bookmark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, book_id, page, line, selected_text, created_at FROM bookmarks
             WHERE book_id = ?1 ORDER BY page, line, id",
        )?;
        let bookmarks = stmt
            .query_map(params![book_id], Self::bookmark_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookmarks)
    }
}
