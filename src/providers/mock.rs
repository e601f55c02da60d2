//! In-memory recipe provider
//!
//! Serves a fixed catalogue without network access. Per-call delays and
//! failures can be scripted to reproduce slow or failing backends, and every
//! call is recorded with the (tokio) instant it was made.

use crate::error::FetchError;
use crate::model::{Recipe, RecipeId, SearchFilters};
use crate::providers::RecipeProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Search(SearchFilters),
    GetById(RecipeId),
    GetSimilar(RecipeId, u32),
    GetRandom(u32),
}

/// Which provider operation a call is, ignoring its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Search,
    GetById,
    GetSimilar,
    GetRandom,
}

impl ProviderCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ProviderCall::Search(_) => CallKind::Search,
            ProviderCall::GetById(_) => CallKind::GetById,
            ProviderCall::GetSimilar(..) => CallKind::GetSimilar,
            ProviderCall::GetRandom(_) => CallKind::GetRandom,
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    delays: VecDeque<Duration>,
    failures: VecDeque<FetchError>,
    targeted_failures: Vec<(CallKind, FetchError)>,
    calls: Vec<(ProviderCall, Instant)>,
}

/// Deterministic provider for tests and offline use
#[derive(Debug, Default)]
pub struct MockProvider {
    catalogue: Vec<Recipe>,
    script: Mutex<Script>,
}

impl MockProvider {
    pub fn new(catalogue: Vec<Recipe>) -> Self {
        Self {
            catalogue,
            script: Mutex::new(Script::default()),
        }
    }

    /// A small built-in catalogue
    pub fn with_sample_catalogue() -> Self {
        let sample = [
            (1, "Spaghetti Carbonara", "italian", ""),
            (2, "Pasta Primavera", "italian", "vegetarian"),
            (3, "Penne Arrabbiata", "italian", "vegan"),
            (4, "Chicken Tikka Masala", "indian", ""),
            (5, "Chana Masala", "indian", "vegan"),
            (6, "Pad Thai", "thai", ""),
            (7, "Green Curry", "thai", "dairyFree"),
            (8, "Beef Tacos", "mexican", ""),
            (9, "Miso Soup", "japanese", "vegetarian"),
            (10, "French Onion Soup", "french", "vegetarian"),
            (11, "Greek Salad", "mediterranean", "glutenFree"),
            (12, "Cheeseburger", "american", ""),
            (13, "Kung Pao Chicken", "chinese", ""),
        ];

        let catalogue = sample
            .iter()
            .map(|(id, title, cuisine, diet)| Recipe {
                id: *id,
                title: title.to_string(),
                image: format!("https://img.example.com/{}.jpg", id),
                summary: format!("<p>A classic <b>{}</b> dish.</p>", cuisine),
                ready_in_minutes: 15 + (*id as u32 * 5),
                servings: 2 + (*id as u32 % 4),
                cuisines: vec![cuisine.to_string()],
                diets: if diet.is_empty() {
                    Vec::new()
                } else {
                    vec![diet.to_string()]
                },
                ..Default::default()
            })
            .collect();

        Self::new(catalogue)
    }

    /// Delay the next not-yet-delayed call by `delay`
    pub fn push_delay(&self, delay: Duration) {
        self.lock().delays.push_back(delay);
    }

    /// Make the next call fail with `error`
    pub fn push_failure(&self, error: FetchError) {
        self.lock().failures.push_back(error);
    }

    /// Make the next call of `kind` fail with `error`, whatever the call order
    ///
    /// Targeted failures take precedence over the ones queued with
    /// `push_failure`.
    pub fn push_failure_for(&self, kind: CallKind, error: FetchError) {
        self.lock().targeted_failures.push((kind, error));
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.iter().map(|(call, _)| call.clone()).collect()
    }

    /// Calls made so far with the instant each one started
    pub fn timed_calls(&self) -> Vec<(ProviderCall, Instant)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not wedge the other tests
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call, then apply any scripted delay and failure
    async fn begin(&self, call: ProviderCall) -> Result<(), FetchError> {
        let (delay, failure) = {
            let mut script = self.lock();
            let kind = call.kind();
            script.calls.push((call, Instant::now()));
            let targeted = script
                .targeted_failures
                .iter()
                .position(|(k, _)| *k == kind)
                .map(|index| script.targeted_failures.remove(index).1);
            let failure = targeted.or_else(|| script.failures.pop_front());
            (script.delays.pop_front(), failure)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn matches(recipe: &Recipe, filters: &SearchFilters) -> bool {
        let query_ok = filters.query.is_empty()
            || recipe
                .title
                .to_lowercase()
                .contains(&filters.query.to_lowercase());
        let diet_ok = filters.diet.is_empty() || recipe.diets.iter().any(|d| d == &filters.diet);
        let cuisine_ok = filters.cuisine.is_empty()
            || recipe
                .cuisines
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&filters.cuisine));
        query_ok && diet_ok && cuisine_ok
    }
}

#[async_trait]
impl RecipeProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Recipe>, FetchError> {
        self.begin(ProviderCall::Search(filters.clone())).await?;
        Ok(self
            .catalogue
            .iter()
            .filter(|recipe| Self::matches(recipe, filters))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe, FetchError> {
        self.begin(ProviderCall::GetById(id)).await?;
        self.catalogue
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or(FetchError::Unknown)
    }

    async fn get_similar(&self, id: RecipeId, limit: u32) -> Result<Vec<Recipe>, FetchError> {
        self.begin(ProviderCall::GetSimilar(id, limit)).await?;
        let cuisines = self
            .catalogue
            .iter()
            .find(|recipe| recipe.id == id)
            .map(|recipe| recipe.cuisines.clone())
            .unwrap_or_default();

        Ok(self
            .catalogue
            .iter()
            .filter(|recipe| recipe.id != id)
            .filter(|recipe| recipe.cuisines.iter().any(|c| cuisines.contains(c)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_random(&self, limit: u32) -> Result<Vec<Recipe>, FetchError> {
        self.begin(ProviderCall::GetRandom(limit)).await?;
        Ok(self
            .catalogue
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
