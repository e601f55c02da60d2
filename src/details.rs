use crate::error::FetchError;
use crate::model::{Recipe, RecipeId};
use crate::providers::RecipeProvider;
use crate::text::display_image;
use log::{debug, error, warn};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Size of the thumbnails in the similar-recipes strip
pub const SIMILAR_IMAGE_SIZE: (u32, u32) = (312, 231);

/// Everything the detail view shows
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub similar: Vec<Recipe>,
}

impl RecipeDetails {
    /// Thumbnail for a similar recipe, taken from the recipe's own image field
    pub fn similar_image(recipe: &Recipe) -> String {
        display_image(recipe, SIMILAR_IMAGE_SIZE.0, SIMILAR_IMAGE_SIZE.1)
    }
}

/// Load a recipe together with its similar recipes
///
/// Both requests run concurrently. Only the recipe itself can fail the load;
/// similar recipes degrade to an empty list.
pub async fn load_recipe_details(
    provider: &dyn RecipeProvider,
    id: RecipeId,
    similar_limit: u32,
) -> Result<RecipeDetails, FetchError> {
    let (recipe, similar) = tokio::join!(
        provider.get_by_id(id),
        provider.get_similar(id, similar_limit)
    );

    let recipe = recipe?;
    let similar = similar.unwrap_or_else(|e| {
        warn!("Error fetching similar recipes for {}: {}", id, e);
        Vec::new()
    });

    Ok(RecipeDetails { recipe, similar })
}

/// Load every favorite recipe, in the order of `ids`
///
/// Requests run concurrently; the first failure fails the whole load and
/// cancels the remaining requests.
pub async fn load_favorite_recipes(
    provider: Arc<dyn RecipeProvider>,
    ids: &[RecipeId],
) -> Result<Vec<Recipe>, FetchError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    debug!("Loading {} favorite recipes", ids.len());

    let mut requests = JoinSet::new();
    for (index, id) in ids.iter().copied().enumerate() {
        let provider = Arc::clone(&provider);
        requests.spawn(async move { (index, provider.get_by_id(id).await) });
    }

    let mut loaded: Vec<Option<Recipe>> = vec![None; ids.len()];
    while let Some(joined) = requests.join_next().await {
        let (index, result) = joined.map_err(|e| {
            error!("Favorite recipe request did not complete: {}", e);
            FetchError::Unknown
        })?;
        loaded[index] = Some(result?);
    }

    Ok(loaded.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CallKind, MockProvider, ProviderCall};
    use std::time::Duration;

    #[tokio::test]
    async fn test_details_with_similar() {
        let provider = MockProvider::with_sample_catalogue();
        let details = load_recipe_details(&provider, 4, 4).await.unwrap();
        assert_eq!(details.recipe.title, "Chicken Tikka Masala");
        assert_eq!(details.similar.len(), 1);
        assert_eq!(details.similar[0].title, "Chana Masala");
        assert_eq!(
            RecipeDetails::similar_image(&details.similar[0]),
            "https://img.example.com/5.jpg"
        );
    }

    #[tokio::test]
    async fn test_similar_failure_is_swallowed() {
        let provider = MockProvider::with_sample_catalogue();
        provider.push_failure_for(CallKind::GetSimilar, FetchError::ServerError);

        let details = load_recipe_details(&provider, 1, 4).await.unwrap();
        assert_eq!(details.recipe.id, 1);
        assert!(details.similar.is_empty());
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::GetById(1), ProviderCall::GetSimilar(1, 4)]
        );
    }

    #[tokio::test]
    async fn test_recipe_fetch_failure_fails_details() {
        let provider = MockProvider::with_sample_catalogue();
        provider.push_failure_for(CallKind::GetById, FetchError::QuotaExceeded);
        let err = load_recipe_details(&provider, 1, 4).await.unwrap_err();
        assert_eq!(err, FetchError::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_recipe_failure_propagates() {
        let provider = MockProvider::with_sample_catalogue();
        let err = load_recipe_details(&provider, 404, 4).await.unwrap_err();
        assert_eq!(err, FetchError::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_favorites_keep_requested_order() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        provider.push_delay(Duration::from_millis(300));
        provider.push_delay(Duration::from_millis(10));
        let recipes = load_favorite_recipes(provider.clone(), &[9, 2, 6]).await.unwrap();
        let ids: Vec<_> = recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 2, 6]);
    }

    #[tokio::test]
    async fn test_favorites_fail_together() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let result = load_favorite_recipes(provider, &[1, 999]).await;
        assert_eq!(result.unwrap_err(), FetchError::Unknown);
    }

    #[tokio::test]
    async fn test_no_favorites_skips_provider() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let recipes = load_favorite_recipes(provider.clone(), &[]).await.unwrap();
        assert!(recipes.is_empty());
        assert_eq!(provider.call_count(), 0);
    }
}
