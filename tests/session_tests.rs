use chrono::Utc;
use lectern::book::read_lines;
use lectern::{
    Book, BookRepository, BookmarkRepository, LibraryStore, LoadError, PageSize, ReadingSession,
    TranslateError, TranslationUpdate, Translator,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn write_book(dir: &Path, name: &str, lines: usize) -> PathBuf {
    let path = dir.join(name);
    let content: Vec<String> = (0..lines).map(|i| format!("{} line {}", name, i)).collect();
    fs::write(&path, content.join("\n")).unwrap();
    path
}

fn setup() -> (TempDir, Rc<LibraryStore>, ReadingSession) {
    let temp_dir = TempDir::new().unwrap();
    let store = Rc::new(LibraryStore::open_in_memory().unwrap());
    let session = ReadingSession::new(PageSize::new(29).unwrap(), store.clone());
    (temp_dir, store, session)
}

fn library_book(store: &LibraryStore, path: &Path) -> Book {
    let id = store.add_book(path, "Test", None).unwrap();
    store.get_book(id).unwrap()
}

#[test]
fn test_read_lines_handles_crlf_and_invalid_utf8() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mixed.txt");
    fs::write(&path, b"first\r\nsecond\n\xff third\n").unwrap();

    let lines = read_lines(&path).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "first");
    assert_eq!(lines[1], "second");
    assert!(lines[2].ends_with("third"));
}

#[test]
fn test_read_lines_rejects_missing_and_directories() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        read_lines(&temp_dir.path().join("missing.txt")),
        Err(LoadError::Io { .. })
    ));
    assert!(matches!(
        read_lines(temp_dir.path()),
        Err(LoadError::NotAFile(_))
    ));
}

#[test]
fn test_open_book_loads_first_page() {
    let (temp_dir, store, mut session) = setup();
    let path = write_book(temp_dir.path(), "novel.txt", 87);
    let book = library_book(&store, &path);

    assert_eq!(session.status_message(), "Ready to load a book");
    assert_eq!(session.open_book(book).unwrap(), 87);
    assert_eq!(session.paginator().total_pages(), 3);
    assert_eq!(session.paginator().page_index(), 0);
    assert_eq!(session.status_message(), "Book loaded! Lines: 87");
    assert_eq!(session.book().map(|b| b.title.as_str()), Some("Test"));
}

#[test]
fn test_failed_load_keeps_previous_state() {
    let (temp_dir, store, mut session) = setup();
    let path = write_book(temp_dir.path(), "novel.txt", 87);
    session.open_book(library_book(&store, &path)).unwrap();
    session.go_to(1);
    let page_text = session.paginator().current_page_text();

    let missing = Book {
        id: 999,
        title: "Ghost".to_string(),
        author: None,
        file_path: temp_dir.path().join("ghost.txt"),
        created_at: Utc::now(),
    };
    assert!(session.open_book(missing).is_err());

    assert_eq!(session.paginator().page_index(), 1);
    assert_eq!(session.paginator().current_page_text(), page_text);
    assert_eq!(session.book().map(|b| b.title.as_str()), Some("Test"));
    assert_eq!(session.status_message(), "Failed to load book");
}

#[test]
fn test_selection_saves_bookmark_for_active_book() {
    let (temp_dir, store, mut session) = setup();
    let first = library_book(&store, &write_book(temp_dir.path(), "one.txt", 87));
    let second_path = write_book(temp_dir.path(), "two.txt", 40);
    let second = {
        let id = store.add_book(&second_path, "Two", None).unwrap();
        store.get_book(id).unwrap()
    };

    session.open_book(first.clone()).unwrap();
    session.go_to(2);
    let fan_out = session.select("a long enough selection", 5);
    assert!(fan_out.failures.is_empty());
    assert_eq!(fan_out.event.as_ref().map(|e| e.absolute_line), Some(63));

    session.open_book(second.clone()).unwrap();
    session.select("another long selection", 1);
    session.select("short", 2);

    let first_marks = store.list_bookmarks(first.id).unwrap();
    assert_eq!(first_marks.len(), 1);
    assert_eq!((first_marks[0].page, first_marks[0].line), (2, 63));

    let second_marks = store.list_bookmarks(second.id).unwrap();
    assert_eq!(second_marks.len(), 1);
    assert_eq!(second_marks[0].line, 1);
    assert_eq!(session.bookmarks().unwrap(), second_marks);
}

#[test]
fn test_observer_order_survives_book_switch() {
    let (temp_dir, store, mut session) = setup();
    let _rx = session.enable_translation(Arc::new(Upper), "en", "de");
    assert_eq!(
        session.notifier().observer_names(),
        vec!["log", "bookmark", "translation"]
    );

    let path = write_book(temp_dir.path(), "one.txt", 10);
    session.open_book(library_book(&store, &path)).unwrap();
    assert_eq!(
        session.notifier().observer_names(),
        vec!["log", "bookmark", "translation"]
    );
}

struct Upper;

impl Translator for Upper {
    fn translate(&self, text: &str, _: &str, _: &str) -> Result<String, TranslateError> {
        Ok(text.to_uppercase())
    }
}

#[test]
fn test_opening_book_makes_translations_stale() {
    let (temp_dir, store, mut session) = setup();
    let rx = session.enable_translation(Arc::new(Upper), "en", "de");
    let path = write_book(temp_dir.path(), "one.txt", 10);
    let book = library_book(&store, &path);
    session.open_book(book.clone()).unwrap();

    session.select("guten tag", 0);
    let requested = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(requested, TranslationUpdate::Requested { .. }));
    assert!(session.sequence().is_current(requested.seq()));

    session.open_book(book).unwrap();
    assert!(!session.sequence().is_current(requested.seq()));
}

#[test]
fn test_search_finds_lines_and_pages() {
    let (temp_dir, store, mut session) = setup();
    let path = temp_dir.path().join("search.txt");
    let mut lines: Vec<String> = (0..60).map(|i| format!("filler {}", i)).collect();
    lines[5] = "The Magic Crystal glows".to_string();
    lines[40] = "another magic crystal appears".to_string();
    fs::write(&path, lines.join("\n")).unwrap();
    session.open_book(library_book(&store, &path)).unwrap();

    let hits = session.search("MAGIC crystal");
    assert_eq!(hits.len(), 2);
    assert_eq!((hits[0].line, hits[0].page), (5, 0));
    assert_eq!((hits[1].line, hits[1].page), (40, 1));

    assert!(session.search("m").is_empty());

    session.go_to_line(hits[1].line);
    assert_eq!(session.paginator().page_index(), 1);
}
