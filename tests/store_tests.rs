use lectern::{BookRepository, BookmarkRepository, LibraryStore, StoreError};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_books_listed_by_title() {
    let store = LibraryStore::open_in_memory().unwrap();
    store
        .add_book(Path::new("/b/zebra.txt"), "Zebra Tales", Some("Z. Author"))
        .unwrap();
    store
        .add_book(Path::new("/b/alpha.txt"), "alpha and omega", None)
        .unwrap();
    store
        .add_book(Path::new("/b/middle.txt"), "Middlemarch", Some("George Eliot"))
        .unwrap();

    let titles: Vec<String> = store
        .list_books()
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["alpha and omega", "Middlemarch", "Zebra Tales"]);
}

#[test]
fn test_add_book_roundtrips_metadata() {
    let store = LibraryStore::open_in_memory().unwrap();
    let id = store
        .add_book(Path::new("/b/middle.txt"), "Middlemarch", Some("George Eliot"))
        .unwrap();

    let book = store.get_book(id).unwrap();
    assert_eq!(book.title, "Middlemarch");
    assert_eq!(book.author.as_deref(), Some("George Eliot"));
    assert_eq!(book.file_path, Path::new("/b/middle.txt"));

    let found = store.find_book_by_path(Path::new("/b/middle.txt")).unwrap();
    assert_eq!(found, Some(book));
    assert!(store.find_book_by_path(Path::new("/nope")).unwrap().is_none());
}

#[test]
fn test_adding_same_path_returns_existing_id() {
    let store = LibraryStore::open_in_memory().unwrap();
    let first = store.add_book(Path::new("/b/a.txt"), "A", None).unwrap();
    let second = store.add_book(Path::new("/b/a.txt"), "Another title", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(store.list_books().unwrap().len(), 1);
}

#[test]
fn test_missing_book_is_an_error() {
    let store = LibraryStore::open_in_memory().unwrap();
    assert!(matches!(store.get_book(42), Err(StoreError::BookNotFound(42))));
}

#[test]
fn test_bookmarks_ordered_by_page_then_line() {
    let store = LibraryStore::open_in_memory().unwrap();
    let book = store.add_book(Path::new("/b/a.txt"), "A", None).unwrap();
    let other = store.add_book(Path::new("/b/b.txt"), "B", None).unwrap();

    store.add_bookmark(book, 3, 90, Some("third")).unwrap();
    store.add_bookmark(book, 0, 12, Some("first")).unwrap();
    store.add_bookmark(book, 3, 88, None).unwrap();
    store.add_bookmark(other, 1, 30, Some("elsewhere")).unwrap();

    let bookmarks = store.list_bookmarks(book).unwrap();
    let positions: Vec<(usize, usize)> = bookmarks.iter().map(|b| (b.page, b.line)).collect();
    assert_eq!(positions, vec![(0, 12), (3, 88), (3, 90)]);
    assert_eq!(bookmarks[1].selected_text, None);
    assert!(bookmarks.iter().all(|b| b.book_id == book));
}

#[test]
fn test_store_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("library.db");

    let id = {
        let store = LibraryStore::open(&db_path).unwrap();
        let id = store.add_book(Path::new("/b/a.txt"), "A", None).unwrap();
        store.add_bookmark(id, 2, 60, Some("kept across runs")).unwrap();
        id
    };

    let store = LibraryStore::open(&db_path).unwrap();
    assert_eq!(store.list_books().unwrap().len(), 1);
    assert_eq!(store.list_bookmarks(id).unwrap().len(), 1);
}
