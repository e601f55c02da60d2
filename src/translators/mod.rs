//! Machine translation of recipe text
//!
//! The [`Translator`] trait decouples the translation overlay from any
//! specific backend. [`MyMemoryTranslator`] talks to the public MyMemory
//! API; [`MockTranslator`] is deterministic and needs no network.

mod mock;
mod mymemory;

pub use mock::{MockMode, MockTranslator};
pub use mymemory::MyMemoryTranslator;

use crate::error::TranslationError;
use async_trait::async_trait;

/// Generic trait for machine translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the language identified by `target_language`
    ///
    /// The source language is a property of the backend (recipes are
    /// published in a single language).
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;

    /// Get the name of this translation backend, used in log lines
    fn translator_name(&self) -> &str;
}

/// Strip region and script subtags: `pt-BR` becomes `pt`
pub fn normalize_language(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(code)
        .trim()
        .to_lowercase()
}
