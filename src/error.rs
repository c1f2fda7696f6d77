use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    NotAFile(PathBuf),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            LoadError::NotAFile(path) => write!(f, "Not a readable file: {}", path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::NotAFile(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    BookNotFound(i64),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(err) => write!(f, "Database error: {}", err),
            StoreError::Io(err) => write!(f, "Database IO error: {}", err),
            StoreError::BookNotFound(id) => write!(f, "Book not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(err) => Some(err),
            StoreError::Io(err) => Some(err),
            StoreError::BookNotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

#[derive(Debug)]
pub enum TranslateError {
    Http(reqwest::Error),
    EmptyResponse,
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Http(err) => write!(f, "Translation request failed: {}", err),
            TranslateError::EmptyResponse => write!(f, "Translation service returned no text"),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslateError::Http(err) => Some(err),
            TranslateError::EmptyResponse => None,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Http(err)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidPageSize(usize),
    NoConfigDirectory,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Config IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Config parse error: {}", err),
            ConfigError::InvalidPageSize(size) => {
                write!(f, "Invalid page size: {} (must be at least 1)", size)
            }
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine a configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Failure reported by a single selection observer during fan-out.
#[derive(Debug)]
pub enum ObserverError {
    Store(StoreError),
    Disconnected,
    Panicked(String),
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverError::Store(err) => write!(f, "{}", err),
            ObserverError::Disconnected => write!(f, "Receiver for observer output is gone"),
            ObserverError::Panicked(msg) => write!(f, "Observer panicked: {}", msg),
        }
    }
}

impl std::error::Error for ObserverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObserverError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ObserverError {
    fn from(err: StoreError) -> Self {
        ObserverError::Store(err)
    }
}

#[derive(Debug)]
pub enum UiError {
    Terminal(Box<dyn std::error::Error + Send + Sync>),
    Load(LoadError),
    Store(StoreError),
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::Terminal(err) => write!(f, "Terminal error: {}", err),
            UiError::Load(err) => write!(f, "Load error: {}", err),
            UiError::Store(err) => write!(f, "Library error: {}", err),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Terminal(err) => Some(err.as_ref()),
            UiError::Load(err) => Some(err),
            UiError::Store(err) => Some(err),
        }
    }
}

impl From<LoadError> for UiError {
    fn from(err: LoadError) -> Self {
        UiError::Load(err)
    }
}

impl From<StoreError> for UiError {
    fn from(err: StoreError) -> Self {
        UiError::Store(err)
    }
}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError::Terminal(Box::new(err))
    }
}
