pub mod builder;
pub mod config;
pub mod details;
pub mod error;
pub mod locale;
pub mod model;
pub mod overlay;
pub mod providers;
pub mod search;
pub mod session;
pub mod storage;
pub mod text;
pub mod translators;

use log::debug;

pub use builder::{RecipeApp, RecipeAppBuilder};
pub use config::{AppConfig, Language};
pub use details::RecipeDetails;
pub use error::{AppError, FetchError, LocaleError, SessionError, StorageError, TranslationError};
pub use locale::LocalePreferenceService;
pub use model::{Recipe, RecipeId, SearchFilters, SortOrder, User};
pub use overlay::{TranslatedText, TranslationOverlay, TranslationPhase, TranslationState};
pub use providers::{MockProvider, RecipeProvider, SpoonacularProvider};
pub use search::{SearchCoordinator, SearchPhase, SearchSettings, SearchSnapshot};
pub use session::{FavoritesStore, SessionService};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use translators::{MockMode, MockTranslator, MyMemoryTranslator, Translator};

/// Run one search against Spoonacular, bypassing the debounce
///
/// Filters without any constraint return random recipes instead, the same
/// routing the search view uses.
///
/// # Errors
/// Returns `AppError` if the configuration cannot be loaded, the API key is
/// missing or the request fails.
pub async fn search_recipes(filters: &SearchFilters) -> Result<Vec<Recipe>, AppError> {
    let config = AppConfig::load()?;
    let provider = SpoonacularProvider::new(&config.provider)?;

    let recipes = if filters.has_constraints() {
        provider.search(filters).await?
    } else {
        debug!("No search constraints, fetching random recipes");
        provider.get_random(config.search.random_count).await?
    };
    Ok(recipes)
}

/// Fetch `count` random recipes from Spoonacular
pub async fn random_recipes(count: u32) -> Result<Vec<Recipe>, AppError> {
    let config = AppConfig::load()?;
    let provider = SpoonacularProvider::new(&config.provider)?;
    Ok(provider.get_random(count).await?)
}

/// Fetch a recipe with its similar recipes from Spoonacular
pub async fn recipe_details(id: RecipeId) -> Result<RecipeDetails, AppError> {
    let config = AppConfig::load()?;
    let provider = SpoonacularProvider::new(&config.provider)?;
    Ok(details::load_recipe_details(&provider, id, config.provider.similar_limit).await?)
}

/// Translate `text` with MyMemory
///
/// Unlike [`TranslationOverlay`], failures are returned rather than replaced
/// by the source text.
pub async fn translate_text(text: &str, target_language: &str) -> Result<String, AppError> {
    let config = AppConfig::load()?;
    let translator = MyMemoryTranslator::new(&config.translator)?;
    Ok(translator.translate(text, target_language).await?)
}
