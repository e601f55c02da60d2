use crate::config::{Language, LocaleConfig};
use crate::error::LocaleError;
use crate::storage::KeyValueStore;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::watch;

/// Storage key holding the selected language code
pub const LANGUAGE_KEY: &str = "recipeBookLanguage";

/// The user's display language
///
/// Changes are saved to the store and broadcast to subscribers, which is how
/// translated text instances learn that they must re-translate.
pub struct LocalePreferenceService {
    store: Arc<dyn KeyValueStore>,
    default_language: String,
    available: Vec<Language>,
    current: watch::Sender<String>,
}

impl LocalePreferenceService {
    /// Restore the saved language, ignoring codes that are not available
    pub fn load(store: Arc<dyn KeyValueStore>, config: &LocaleConfig) -> Self {
        let saved = match store.get(LANGUAGE_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                error!("Failed to read language preference: {}", e);
                None
            }
        };

        let initial = saved
            .filter(|code| config.available.iter().any(|lang| &lang.code == code))
            .unwrap_or_else(|| config.default_language.clone());
        debug!("Initial language: {}", initial);

        let (current, _) = watch::channel(initial);
        Self {
            store,
            default_language: config.default_language.clone(),
            available: config.available.clone(),
            current,
        }
    }

    pub fn current_language(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn is_default(&self) -> bool {
        *self.current.borrow() == self.default_language
    }

    pub fn available_languages(&self) -> &[Language] {
        &self.available
    }

    /// Switch language, persist it and notify subscribers
    pub fn set_language(&self, code: &str) -> Result<(), LocaleError> {
        if !self.available.iter().any(|lang| lang.code == code) {
            return Err(LocaleError::UnsupportedLanguage(code.to_string()));
        }

        self.store.set(LANGUAGE_KEY, code)?;
        let changed = self.current.send_if_modified(|current| {
            if current.as_str() == code {
                return false;
            }
            *current = code.to_string();
            true
        });
        if changed {
            info!("Language switched to {}", code);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }
}
