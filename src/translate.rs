use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("lectern")
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        debug!("Requesting translation {} -> {}", source_lang, target_lang);
        let response: TranslateResponse = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest {
                q: text,
                source: source_lang,
                target: target_lang,
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()?
            .error_for_status()?
            .json()?;

        let translated = response.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(translated)
    }
}

/// Monotonic counter shared between the translation observer and whoever
/// displays results. Only the most recently issued number is current.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Makes every number issued so far stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationUpdate {
    Requested {
        seq: u64,
        text: String,
        absolute_line: usize,
    },
    Completed {
        seq: u64,
        result: Result<String, String>,
    },
}

impl TranslationUpdate {
    pub fn seq(&self) -> u64 {
        match self {
            TranslationUpdate::Requested { seq, .. } | TranslationUpdate::Completed { seq, .. } => {
                *seq
            }
        }
    }
}
