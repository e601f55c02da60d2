mod mock;
mod spoonacular;

pub use mock::{CallKind, MockProvider, ProviderCall};
pub use spoonacular::SpoonacularProvider;

use crate::error::FetchError;
use crate::model::{Recipe, RecipeId, SearchFilters};
use async_trait::async_trait;

/// Source of recipe data
///
/// Every operation may fail with a classified [`FetchError`]; callers show
/// the error's message as-is.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Get the provider name (e.g., "spoonacular", "mock")
    fn provider_name(&self) -> &str;

    /// Recipes matching the filters, in the order requested by `filters.sort`
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Recipe>, FetchError>;

    /// Full recipe information including nutrition
    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe, FetchError>;

    /// Up to `limit` recipes similar to the given one
    async fn get_similar(&self, id: RecipeId, limit: u32) -> Result<Vec<Recipe>, FetchError>;

    /// `limit` random recipes, used when no filter is set
    async fn get_random(&self, limit: u32) -> Result<Vec<Recipe>, FetchError>;
}
