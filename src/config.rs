use crate::constants::{
    CONFIG_FILENAME, DATABASE_FILENAME, DEFAULT_PAGE_SIZE, DEFAULT_SOURCE_LANG,
    DEFAULT_TARGET_LANG, DEFAULT_TRANSLATION_ENDPOINT, DEFAULT_TRANSLATION_TIMEOUT_SECS,
    LOG_FILENAME,
};
use crate::error::ConfigError;
use crate::paginator::PageSize;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_TRANSLATION_ENDPOINT.to_string()
}

fn default_source_lang() -> String {
    DEFAULT_SOURCE_LANG.to_string()
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TRANSLATION_TIMEOUT_SECS
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            api_key: None,
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reader configuration, stored as `config.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Library database location. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub translation: TranslationConfig,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            database_path: None,
            log_file: None,
            translation: TranslationConfig::default(),
        }
    }
}

impl Config {
    pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
        ProjectDirs::from("", "", "lectern").ok_or(ConfigError::NoConfigDirectory)
    }

    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.page_size()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<(), ConfigError> {
        let config_dir = config_dir.as_ref();
        std::fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn page_size(&self) -> Result<PageSize, ConfigError> {
        PageSize::new(self.page_size).ok_or(ConfigError::InvalidPageSize(self.page_size))
    }

    pub fn resolve_database_path(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir.join(DATABASE_FILENAME))
    }

    pub fn resolve_log_file(&self, data_dir: &Path) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir.join(LOG_FILENAME))
    }
}
