//! Mock translator for tests and offline runs

use crate::error::TranslationError;
use crate::translators::Translator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the mock produces its output
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" → "hello_fr"
    Suffix,

    /// Look up `(text, target_language)`, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Fail every call with the given message
    Error(String),

    /// Return input unchanged
    NoOp,
}

/// Deterministic translator that counts its calls
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, Duration::ZERO)
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        Self {
            mode,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `translate` calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target))),
            MockMode::Error(msg) => Err(TranslationError::Unavailable(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.apply(text, target_language)
    }

    fn translator_name(&self) -> &str {
        "mock"
    }
}
