use std::sync::Arc;

use crate::config::AppConfig;
use crate::details::{load_favorite_recipes, load_recipe_details, RecipeDetails};
use crate::locale::LocalePreferenceService;
use crate::model::{Recipe, RecipeId, SearchFilters};
use crate::overlay::TranslationOverlay;
use crate::providers::{RecipeProvider, SpoonacularProvider};
use crate::search::{SearchCoordinator, SearchSettings};
use crate::session::SessionService;
use crate::storage::{FileStore, KeyValueStore};
use crate::translators::{MyMemoryTranslator, Translator};
use crate::{AppError, FetchError};

/// Builder for wiring the application services together
///
/// Any collaborator that is not supplied is created from the configuration:
/// Spoonacular for recipes, MyMemory for translation and a JSON file for
/// the session and language preference.
#[derive(Default)]
pub struct RecipeAppBuilder {
    config: Option<AppConfig>,
    provider: Option<Arc<dyn RecipeProvider>>,
    translator: Option<Arc<dyn Translator>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl RecipeAppBuilder {
    /// Use an explicit configuration instead of loading one
    ///
    /// # Example
    /// ```
    /// use recipe_discovery::{AppConfig, RecipeApp};
    ///
    /// let builder = RecipeApp::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom recipe provider
    pub fn provider(mut self, provider: Arc<dyn RecipeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a custom translator
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Use a custom store for the session and language preference
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the services
    ///
    /// # Errors
    /// Returns `AppError` if:
    /// - no configuration was given and loading one fails
    /// - the default provider cannot be created (usually a missing API key)
    /// - the default translator cannot be created
    ///
    /// # Example
    /// ```
    /// # use std::sync::Arc;
    /// use recipe_discovery::{AppConfig, MemoryStore, MockMode, MockProvider, MockTranslator, RecipeApp};
    ///
    /// let app = RecipeApp::builder()
    ///     .config(AppConfig::default())
    ///     .provider(Arc::new(MockProvider::with_sample_catalogue()))
    ///     .translator(Arc::new(MockTranslator::new(MockMode::NoOp)))
    ///     .store(Arc::new(MemoryStore::new()))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(app.locale().current_language(), "en");
    /// ```
    pub fn build(self) -> Result<RecipeApp, AppError> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };

        let provider: Arc<dyn RecipeProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(SpoonacularProvider::new(&config.provider)?),
        };

        let translator: Arc<dyn Translator> = match self.translator {
            Some(translator) => translator,
            None => Arc::new(MyMemoryTranslator::new(&config.translator)?),
        };

        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileStore::new(config.storage.path.clone())),
        };

        let overlay = TranslationOverlay::new(translator, config.locale.default_language.clone());
        let session = Arc::new(SessionService::load(Arc::clone(&store)));
        let locale = Arc::new(LocalePreferenceService::load(store, &config.locale));

        Ok(RecipeApp {
            config,
            provider,
            overlay,
            session,
            locale,
        })
    }
}

/// The application services, framework agnostic
pub struct RecipeApp {
    config: AppConfig,
    provider: Arc<dyn RecipeProvider>,
    overlay: TranslationOverlay,
    session: Arc<SessionService>,
    locale: Arc<LocalePreferenceService>,
}

impl RecipeApp {
    /// Creates a new builder
    pub fn builder() -> RecipeAppBuilder {
        RecipeAppBuilder::default()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn provider(&self) -> Arc<dyn RecipeProvider> {
        Arc::clone(&self.provider)
    }

    pub fn overlay(&self) -> &TranslationOverlay {
        &self.overlay
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    pub fn locale(&self) -> &Arc<LocalePreferenceService> {
        &self.locale
    }

    /// Default filters for a fresh search view, optionally seeded with a query
    pub fn initial_filters(&self, query: Option<&str>) -> SearchFilters {
        SearchFilters {
            query: query.unwrap_or_default().to_string(),
            sort: self.config.search.default_sort,
            ..Default::default()
        }
    }

    /// A search coordinator over this app's provider
    pub fn search_coordinator(&self, initial_filters: SearchFilters) -> SearchCoordinator {
        SearchCoordinator::new(
            self.provider(),
            SearchSettings::from(&self.config.search),
            initial_filters,
        )
    }

    /// The detail view of one recipe
    pub async fn recipe_details(&self, id: RecipeId) -> Result<RecipeDetails, FetchError> {
        load_recipe_details(
            self.provider.as_ref(),
            id,
            self.config.provider.similar_limit,
        )
        .await
    }

    /// The logged-in user's favorite recipes; empty when logged out
    pub async fn favorite_recipes(&self) -> Result<Vec<Recipe>, FetchError> {
        load_favorite_recipes(self.provider(), &self.session.favorites()).await
    }

    /// Translate into the currently selected language, falling back to the
    /// source text
    pub async fn translate(&self, text: &str) -> String {
        self.overlay
            .translate_once(text, &self.locale.current_language())
            .await
    }
}
