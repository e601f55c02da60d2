use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::SortOrder;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Recipe provider (Spoonacular) settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Machine translation settings
    #[serde(default)]
    pub translator: TranslatorConfig,
    /// Search coordinator tuning
    #[serde(default)]
    pub search: SearchConfig,
    /// UI language settings
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Where session and preferences are persisted
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for the recipe provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// API key for authentication (can also be set via SPOONACULAR_API_KEY)
    pub api_key: Option<String>,
    /// Base URL of the recipes API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Number of results requested from a filtered search
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    /// Number of similar recipes shown on the detail view
    #[serde(default = "default_similar_limit")]
    pub similar_limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
            timeout_secs: default_timeout(),
            result_limit: default_result_limit(),
            similar_limit: default_similar_limit(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for the translation service
#[derive(Debug, Deserialize, Clone)]
pub struct TranslatorConfig {
    #[serde(default = "default_translator_base_url")]
    pub base_url: String,
    /// Language the recipe provider writes in
    #[serde(default = "default_language")]
    pub source_language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_translator_base_url(),
            source_language: default_language(),
            timeout_secs: default_timeout(),
        }
    }
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for the search coordinator
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Quiet period before a filter change triggers a fetch
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Number of recipes shown when no filter is set
    #[serde(default = "default_random_count")]
    pub random_count: u32,
    #[serde(default)]
    pub default_sort: SortOrder,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            random_count: default_random_count(),
            default_sort: SortOrder::default(),
        }
    }
}

/// A language the UI can be translated into
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
}

impl Language {
    pub fn new(code: &str, name: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
        }
    }
}

/// Configuration for UI languages
#[derive(Debug, Deserialize, Clone)]
pub struct LocaleConfig {
    /// Language that is displayed without translation
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_languages")]
    pub available: Vec<Language>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            available: default_languages(),
        }
    }
}

/// Configuration for the local key-value store
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

// Default value functions
fn default_provider_base_url() -> String {
    "https://api.spoonacular.com/recipes".to_string()
}

fn default_translator_base_url() -> String {
    "https://api.mymemory.translated.net".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_result_limit() -> u32 {
    12
}

fn default_similar_limit() -> u32 {
    4
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_random_count() -> u32 {
    12
}

fn default_language() -> String {
    "en".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("recipe-discovery.json")
}

fn default_languages() -> Vec<Language> {
    vec![
        Language::new("en", "English", "🇺🇸"),
        Language::new("es", "Español", "🇪🇸"),
        Language::new("fr", "Français", "🇫🇷"),
        Language::new("de", "Deutsch", "🇩🇪"),
        Language::new("it", "Italiano", "🇮🇹"),
        Language::new("pt", "Português", "🇵🇹"),
        Language::new("zh", "中文", "🇨🇳"),
        Language::new("ja", "日本語", "🇯🇵"),
        Language::new("ko", "한국어", "🇰🇷"),
        Language::new("ar", "العربية", "🇸🇦"),
        Language::new("hi", "हिन्दी", "🇮🇳"),
    ]
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPES__ prefix
    /// 2. recipes.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPES__PROVIDER__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_from(
        // Optional config file (can be missing)
        File::with_name("recipes").required(false),
        // Use double underscore for nested: RECIPES__SEARCH__DEBOUNCE_MS
        Environment::with_prefix("RECIPES")
            .separator("__")
            .try_parsing(true),
    )
}

/// Layer `env` over `file` over the defaults
fn load_from<S>(file: S, env: Environment) -> Result<AppConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    settings.try_deserialize()
}
