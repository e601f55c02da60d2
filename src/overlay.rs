//! Per-instance translation of displayed text
//!
//! Each piece of displayed text gets its own [`TranslatedText`], whose state
//! moves through [`TranslationPhase`]: `Idle` until the first resolve, then
//! `Translating` while the translator works, then `Resolved`. Text in the
//! default language (and empty text) resolves on the spot without touching
//! the translator.
//!
//! A resolve bumps the instance's revision; a translation that finishes
//! after a newer resolve is dropped. Translator failures resolve to the
//! source text and are only logged.
//!
//! Nothing is cached: two instances showing the same text in the same
//! language translate independently.

use crate::locale::LocalePreferenceService;
use crate::translators::{normalize_language, Translator};
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shown in place of the text while a translation is running
pub const TRANSLATING_PLACEHOLDER: &str = "Translating...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationPhase {
    Idle,
    Translating,
    Resolved,
}

/// State of one translated text instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationState {
    pub source_text: String,
    pub language_code: String,
    /// The text to show once resolved; the source text until then
    pub resolved_text: String,
    pub phase: TranslationPhase,
    revision: u64,
}

impl TranslationState {
    fn idle() -> Self {
        Self {
            source_text: String::new(),
            language_code: String::new(),
            resolved_text: String::new(),
            phase: TranslationPhase::Idle,
            revision: 0,
        }
    }

    /// Number of resolves applied to this instance
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_translating(&self) -> bool {
        self.phase == TranslationPhase::Translating
    }

    /// What a rendering layer should display right now
    pub fn display_text(&self) -> &str {
        match self.phase {
            TranslationPhase::Idle => &self.source_text,
            TranslationPhase::Translating => TRANSLATING_PLACEHOLDER,
            TranslationPhase::Resolved => &self.resolved_text,
        }
    }
}

/// Factory for translated text instances sharing one translator
#[derive(Clone)]
pub struct TranslationOverlay {
    translator: Arc<dyn Translator>,
    default_language: String,
}

impl TranslationOverlay {
    pub fn new(translator: Arc<dyn Translator>, default_language: impl Into<String>) -> Self {
        Self {
            translator,
            default_language: default_language.into(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Whether `text` shown in `language_code` goes through the translator
    pub fn needs_translation(&self, text: &str, language_code: &str) -> bool {
        needs_translation(&self.default_language, text, language_code)
    }

    /// A new, idle instance
    pub fn text(&self) -> TranslatedText {
        TranslatedText {
            slot: Arc::new(Slot {
                translator: Arc::clone(&self.translator),
                default_language: self.default_language.clone(),
                state: watch::channel(TranslationState::idle()).0,
                in_flight: Mutex::new(None),
            }),
            follower: None,
        }
    }

    /// A new instance already resolving `source_text` into `language_code`
    pub fn resolve(&self, source_text: &str, language_code: &str) -> TranslatedText {
        let text = self.text();
        text.resolve(source_text, language_code);
        text
    }

    /// A new instance that tracks the language selected in `locale`
    pub fn follow(&self, source_text: &str, locale: &LocalePreferenceService) -> TranslatedText {
        let mut text = self.text();
        text.follow(source_text, locale);
        text
    }

    /// Translate once and wait for the outcome, falling back to the source
    pub async fn translate_once(&self, source_text: &str, language_code: &str) -> String {
        let text = self.resolve(source_text, language_code);
        text.resolved().await.resolved_text
    }
}

fn needs_translation(default_language: &str, text: &str, language_code: &str) -> bool {
    !text.is_empty() && normalize_language(language_code) != normalize_language(default_language)
}

struct Slot {
    translator: Arc<dyn Translator>,
    default_language: String,
    state: watch::Sender<TranslationState>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl Slot {
    fn resolve(self: &Arc<Self>, source_text: &str, language_code: &str) {
        let translate = needs_translation(&self.default_language, source_text, language_code);
        let mut revision = None;

        self.state.send_if_modified(|state| {
            if state.phase != TranslationPhase::Idle
                && state.source_text == source_text
                && state.language_code == language_code
            {
                return false;
            }

            state.revision += 1;
            state.source_text = source_text.to_string();
            state.language_code = language_code.to_string();
            state.resolved_text = source_text.to_string();
            state.phase = if translate {
                TranslationPhase::Translating
            } else {
                TranslationPhase::Resolved
            };
            revision = Some(state.revision);
            true
        });

        let Some(revision) = revision.filter(|_| translate) else {
            return;
        };

        let slot = Arc::clone(self);
        let source = source_text.to_string();
        let language = language_code.to_string();
        let handle = tokio::spawn(async move {
            let translated = match slot.translator.translate(&source, &language).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "{} could not translate into {}, showing source text: {}",
                        slot.translator.translator_name(),
                        language,
                        e
                    );
                    source
                }
            };
            slot.finish(revision, translated);
        });

        // The previous task keeps running; its result is dropped on arrival
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *in_flight = Some(handle);
    }

    fn finish(&self, revision: u64, translated: String) {
        let applied = self.state.send_if_modified(|state| {
            if state.revision != revision {
                return false;
            }
            state.resolved_text = translated;
            state.phase = TranslationPhase::Resolved;
            true
        });
        if !applied {
            debug!("Dropping superseded translation (revision {})", revision);
        }
    }

    fn abort(&self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
    }
}

/// One displayed piece of text and its translation state
///
/// Resolving into a non-default language spawns a task, so it must happen
/// inside a Tokio runtime. Dropping the instance stops its work.
pub struct TranslatedText {
    slot: Arc<Slot>,
    follower: Option<JoinHandle<()>>,
}

impl TranslatedText {
    /// Show `source_text` in `language_code`
    ///
    /// Resolving the same pair again is a no-op.
    pub fn resolve(&self, source_text: &str, language_code: &str) {
        self.slot.resolve(source_text, language_code);
    }

    /// Replace the text, keeping the current language
    pub fn set_source(&self, source_text: &str) {
        let language = {
            let state = self.slot.state.borrow();
            if state.language_code.is_empty() {
                self.slot.default_language.clone()
            } else {
                state.language_code.clone()
            }
        };
        self.slot.resolve(source_text, &language);
    }

    /// Replace the language, keeping the current text
    pub fn set_language(&self, language_code: &str) {
        let source = self.slot.state.borrow().source_text.clone();
        self.slot.resolve(&source, language_code);
    }

    /// Resolve into the locale's current language and re-resolve on every
    /// language switch until dropped
    pub fn follow(&mut self, source_text: &str, locale: &LocalePreferenceService) {
        if let Some(previous) = self.follower.take() {
            previous.abort();
        }

        let mut languages = locale.subscribe();
        let current = languages.borrow_and_update().clone();
        self.slot.resolve(source_text, &current);

        let slot = Arc::clone(&self.slot);
        self.follower = Some(tokio::spawn(async move {
            while languages.changed().await.is_ok() {
                let language = languages.borrow_and_update().clone();
                let source = slot.state.borrow().source_text.clone();
                debug!("Language changed to {}, re-resolving", language);
                slot.resolve(&source, &language);
            }
        }));
    }

    pub fn state(&self) -> TranslationState {
        self.slot.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TranslationState> {
        self.slot.state.subscribe()
    }

    /// Wait until the latest resolve has finished
    pub async fn resolved(&self) -> TranslationState {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|state| !state.is_translating())
            .await
            .map(|state| state.clone());
        state.unwrap_or_else(|_| self.state())
    }
}

impl Drop for TranslatedText {
    fn drop(&mut self) {
        if let Some(follower) = self.follower.take() {
            follower.abort();
        }
        self.slot.abort();
    }
}
