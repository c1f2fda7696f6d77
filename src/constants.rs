use std::time::Duration;

// Pagination
pub const DEFAULT_PAGE_SIZE: usize = 29;

// Selection observers
pub const BOOKMARK_MIN_TEXT_LENGTH: usize = 10;

// Translation
pub const DEFAULT_TRANSLATION_ENDPOINT: &str = "http://localhost:5000/translate";
pub const DEFAULT_SOURCE_LANG: &str = "en";
pub const DEFAULT_TARGET_LANG: &str = "ru";
pub const DEFAULT_TRANSLATION_TIMEOUT_SECS: u64 = 10;
pub const TRANSLATION_UNAVAILABLE: &str = "Translation unavailable";

// Search and display
pub const MIN_SEARCH_QUERY_LENGTH: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 200;
pub const MAX_DISPLAY_LINE_LENGTH: usize = 80;

// UI
pub const HEADER_HEIGHT: u16 = 4;
pub const FOOTER_HEIGHT: u16 = 3;
pub const CONTENT_PADDING_LEFT: u16 = 2;
pub const POPUP_MAX_WIDTH: u16 = 50;
pub const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// Storage
pub const DATABASE_FILENAME: &str = "library.db";
pub const CONFIG_FILENAME: &str = "config.json";
pub const LOG_FILENAME: &str = "lectern.log";
