//! Debounced search over a recipe provider
//!
//! [`SearchCoordinator`] turns filter edits into provider calls:
//!
//! - filter changes are debounced (trailing edge, [`SearchSettings::debounce`])
//! - filters with any textual constraint go to `search`, otherwise to
//!   `get_random`
//! - every fetch gets a sequence number when it starts; only the completion
//!   carrying the highest issued number may change the visible state
//!
//! State is published as [`SearchSnapshot`] values on a `tokio::sync::watch`
//! channel so any rendering layer can subscribe without knowing about the
//! coordinator's internals.

mod timer;

pub use timer::DebounceTimer;

use crate::config::SearchConfig;
use crate::error::FetchError;
use crate::model::{Recipe, SearchFilters};
use crate::providers::RecipeProvider;
use log::{debug, error, info};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// Tunables of the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Quiet period after the last filter change before fetching
    pub debounce: Duration,
    /// How many random recipes to show when no filter is set
    pub random_count: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            random_count: 12,
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            random_count: config.random_count,
        }
    }
}

/// What the recipe list currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPhase {
    Loading,
    Ready(Vec<Recipe>),
    Failed(FetchError),
}

impl SearchPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchPhase::Loading)
    }

    pub fn recipes(&self) -> Option<&[Recipe]> {
        match self {
            SearchPhase::Ready(recipes) => Some(recipes),
            _ => None,
        }
    }
}

/// A published state of the coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    /// The active filters (possibly not fetched yet while debouncing)
    pub filters: SearchFilters,
    /// Highest sequence number issued so far, 0 before the first fetch
    pub sequence: u64,
    pub phase: SearchPhase,
}

impl SearchSnapshot {
    /// The message to show next to the retry control, if the last fetch failed
    pub fn error_message(&self) -> Option<String> {
        match &self.phase {
            SearchPhase::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

struct Shared {
    provider: Arc<dyn RecipeProvider>,
    random_count: u32,
    state: watch::Sender<SearchSnapshot>,
}

impl Shared {
    /// Start a fetch for the active filters
    ///
    /// The sequence bump and the switch to `Loading` happen before this
    /// returns; the provider call runs on a spawned task.
    fn initiate(self: &Arc<Self>) -> u64 {
        let mut issued = None;
        self.state.send_modify(|snapshot| {
            snapshot.sequence += 1;
            snapshot.phase = SearchPhase::Loading;
            issued = Some((snapshot.sequence, snapshot.filters.clone()));
        });
        let Some((sequence, filters)) = issued else {
            return 0;
        };

        debug!("Starting fetch #{} for {:?}", sequence, filters);
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = shared.fetch(&filters).await;
            shared.complete(sequence, result);
        });
        sequence
    }

    async fn fetch(&self, filters: &SearchFilters) -> Result<Vec<Recipe>, FetchError> {
        if filters.has_constraints() {
            self.provider.search(filters).await
        } else {
            self.provider.get_random(self.random_count).await
        }
    }

    /// Apply a completion if it belongs to the latest fetch
    fn complete(&self, sequence: u64, result: Result<Vec<Recipe>, FetchError>) -> bool {
        let mut latest = 0;
        let applied = self.state.send_if_modified(|snapshot| {
            latest = snapshot.sequence;
            if snapshot.sequence != sequence {
                return false;
            }
            snapshot.phase = match result {
                Ok(recipes) => {
                    info!("Fetch #{} returned {} recipes", sequence, recipes.len());
                    SearchPhase::Ready(recipes)
                }
                Err(err) => {
                    error!("Fetch #{} failed: {}", sequence, err);
                    SearchPhase::Failed(err)
                }
            };
            true
        });

        if !applied {
            debug!(
                "Discarding stale response #{} (latest is #{})",
                sequence, latest
            );
        }
        applied
    }
}

/// Keeps a recipe list in sync with the most recently intended filters
///
/// Methods that start work (`set_filters`, `retry`) must be called from
/// within a Tokio runtime.
pub struct SearchCoordinator {
    shared: Arc<Shared>,
    timer: Mutex<DebounceTimer>,
}

impl SearchCoordinator {
    /// Create a coordinator; nothing is fetched until `set_filters` or
    /// `retry` is called
    pub fn new(
        provider: Arc<dyn RecipeProvider>,
        settings: SearchSettings,
        initial_filters: SearchFilters,
    ) -> Self {
        let (state, _) = watch::channel(SearchSnapshot {
            filters: initial_filters,
            sequence: 0,
            phase: SearchPhase::Loading,
        });

        Self {
            shared: Arc::new(Shared {
                provider,
                random_count: settings.random_count,
                state,
            }),
            timer: Mutex::new(DebounceTimer::new(settings.debounce)),
        }
    }

    /// Replace the active filters and (re)start the debounce window
    pub fn set_filters(&self, filters: SearchFilters) {
        self.shared.state.send_modify(|snapshot| snapshot.filters = filters);
        let shared = Arc::clone(&self.shared);
        self.timer().schedule(move || {
            shared.initiate();
        });
    }

    /// Fetch the active filters right away, dropping any pending debounce
    ///
    /// Returns the sequence number of the new fetch.
    pub fn retry(&self) -> u64 {
        if self.timer().cancel() {
            debug!("Retry supersedes a pending debounced fetch");
        }
        self.shared.initiate()
    }

    pub fn filters(&self) -> SearchFilters {
        self.shared.state.borrow().filters.clone()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.state.subscribe()
    }

    /// Whether a debounced fetch is waiting for its quiet period to end
    pub fn has_pending_fetch(&self) -> bool {
        self.timer().is_pending()
    }

    pub fn provider_name(&self) -> &str {
        self.shared.provider.provider_name()
    }

    /// Wait until the latest intended fetch has completed
    ///
    /// A pending debounced fetch counts: the wait covers the fetch it will
    /// start, not the results already shown. When nothing has been issued
    /// and nothing is pending, the current (`Loading`, sequence 0) snapshot
    /// is returned right away.
    pub async fn settled(&self) -> SearchSnapshot {
        let mut rx = self.subscribe();
        // Read the sequence before the timer so a firing in between is seen
        let issued = rx.borrow().sequence;
        let pending = self.has_pending_fetch();
        if issued == 0 && !pending {
            return self.snapshot();
        }

        let target = if pending { issued + 1 } else { issued };
        let settled = rx
            .wait_for(|snapshot| snapshot.sequence >= target && !snapshot.phase.is_loading())
            .await
            .map(|snapshot| snapshot.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    fn timer(&self) -> MutexGuard<'_, DebounceTimer> {
        self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortOrder;
    use crate::providers::{MockProvider, ProviderCall};
    use tokio::time::{sleep, Instant};

    fn coordinator(provider: &Arc<MockProvider>) -> SearchCoordinator {
        SearchCoordinator::new(
            Arc::clone(provider) as Arc<dyn RecipeProvider>,
            SearchSettings::default(),
            SearchFilters::default(),
        )
    }

    fn titles(snapshot: &SearchSnapshot) -> Vec<String> {
        snapshot
            .phase
            .recipes()
            .unwrap_or_default()
            .iter()
            .map(|r| r.title.clone())
            .collect()
    }

    fn pasta_catalogue() -> Vec<Recipe> {
        ["Pasta alla Norma", "Pasta e Fagioli", "Pasta al Limone"]
            .iter()
            .enumerate()
            .map(|(i, title)| Recipe {
                id: i as u64 + 1,
                title: title.to_string(),
                cuisines: vec!["Italian".to_string()],
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_pasta_search_becomes_ready() {
        let provider = Arc::new(MockProvider::new(pasta_catalogue()));
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::new("pasta", "", "italian", SortOrder::Popularity));
        let snapshot = coordinator.settled().await;

        assert_eq!(snapshot.phase.recipes().map(|r| r.len()), Some(3));
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::Search(SearchFilters::new(
                "pasta",
                "",
                "italian",
                SortOrder::Popularity
            ))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_within_window_issues_single_random_fetch() {
        let provider = Arc::new(MockProvider::new(pasta_catalogue()));
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::new("pasta", "", "italian", SortOrder::Popularity));
        sleep(Duration::from_millis(200)).await;
        coordinator.set_filters(SearchFilters::default());
        let second_call = Instant::now();

        sleep(Duration::from_millis(499)).await;
        assert_eq!(provider.call_count(), 0);

        coordinator.settled().await;
        let calls = provider.timed_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ProviderCall::GetRandom(12));
        let waited = calls[0].1 - second_call;
        assert!(waited >= Duration::from_millis(500), "fired after {:?}", waited);
        assert!(waited < Duration::from_millis(520), "fired after {:?}", waited);

        // Nothing else fires later
        sleep(Duration::from_secs(2)).await;
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_only_fetches_last_value() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        for query in ["c", "cu", "cur", "curr", "curry"] {
            coordinator.set_filters(SearchFilters::with_query(query));
            sleep(Duration::from_millis(100)).await;
        }
        let snapshot = coordinator.settled().await;

        assert_eq!(
            provider.calls(),
            vec![ProviderCall::Search(SearchFilters::with_query("curry"))]
        );
        assert_eq!(titles(&snapshot), vec!["Green Curry"]);
        assert_eq!(snapshot.sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_routing_between_search_and_random() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::new("", "", "", SortOrder::Price));
        coordinator.settled().await;
        sleep(Duration::from_millis(600)).await;

        let diet_only = SearchFilters::new("", "vegan", "", SortOrder::Popularity);
        coordinator.set_filters(diet_only.clone());
        sleep(Duration::from_millis(600)).await;
        let snapshot = coordinator.settled().await;

        assert_eq!(
            provider.calls(),
            vec![ProviderCall::GetRandom(12), ProviderCall::Search(diet_only)]
        );
        assert_eq!(titles(&snapshot), vec!["Penne Arrabbiata", "Chana Masala"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_older_response_is_discarded() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        provider.push_delay(Duration::from_millis(1000));
        provider.push_delay(Duration::from_millis(10));
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::with_query("pasta"));
        sleep(Duration::from_millis(600)).await;
        assert_eq!(provider.call_count(), 1);
        assert!(coordinator.snapshot().phase.is_loading());

        coordinator.set_filters(SearchFilters::with_query("soup"));
        sleep(Duration::from_millis(600)).await;
        let snapshot = coordinator.snapshot();
        assert_eq!(titles(&snapshot), vec!["Miso Soup", "French Onion Soup"]);
        assert_eq!(snapshot.sequence, 2);

        // The pasta response arrives long after the soup one
        sleep(Duration::from_secs(2)).await;
        let snapshot = coordinator.snapshot();
        assert_eq!(titles(&snapshot), vec!["Miso Soup", "French Onion Soup"]);
        assert_eq!(snapshot.filters, SearchFilters::with_query("soup"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_does_not_override() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        provider.push_delay(Duration::from_millis(800));
        provider.push_failure(FetchError::ServerError);
        let coordinator = coordinator(&provider);

        let first = coordinator.retry();
        let second = coordinator.retry();
        assert!(second > first);

        sleep(Duration::from_secs(1)).await;
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.sequence, second);
        assert_eq!(snapshot.phase.recipes().map(|r| r.len()), Some(12));
        assert!(snapshot.error_message().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_published_before_fetch_completes() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        coordinator.retry();
        coordinator.settled().await;
        assert!(!coordinator.snapshot().phase.is_loading());

        provider.push_delay(Duration::from_millis(300));
        coordinator.retry();
        // No await in between: the switch is synchronous
        assert!(coordinator.snapshot().phase.is_loading());

        let snapshot = coordinator.settled().await;
        assert!(snapshot.phase.recipes().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_message_and_retry() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        provider.push_failure(FetchError::QuotaExceeded);
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::with_query("taco"));
        let snapshot = coordinator.settled().await;
        assert_eq!(snapshot.phase, SearchPhase::Failed(FetchError::QuotaExceeded));
        assert_eq!(
            snapshot.error_message().as_deref(),
            Some("API quota exceeded. Please upgrade your Spoonacular plan.")
        );

        let retried_at = Instant::now();
        coordinator.retry();
        let snapshot = coordinator.settled().await;
        assert_eq!(titles(&snapshot), vec!["Beef Tacos"]);

        // The retry went out immediately, without waiting for a debounce
        let calls = provider.timed_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1, retried_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_cancels_pending_debounce() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::with_query("salad"));
        assert!(coordinator.has_pending_fetch());
        coordinator.retry();
        assert!(!coordinator.has_pending_fetch());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::Search(SearchFilters::with_query("salad"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_phase_transitions() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        provider.push_delay(Duration::from_millis(50));
        let coordinator = coordinator(&provider);
        let mut rx = coordinator.subscribe();

        coordinator.set_filters(SearchFilters::with_query("soup"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().filters, SearchFilters::with_query("soup"));

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().phase.is_loading());

        rx.changed().await.unwrap();
        assert_eq!(titles(&rx.borrow_and_update()), vec!["Miso Soup", "French Onion Soup"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_before_any_fetch_returns_at_once() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        let snapshot = coordinator.settled().await;
        assert_eq!(snapshot.sequence, 0);
        assert!(snapshot.phase.is_loading());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_waits_for_pending_debounce() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = coordinator(&provider);

        coordinator.set_filters(SearchFilters::with_query("soup"));
        let first = coordinator.settled().await;
        assert_eq!(titles(&first), vec!["Miso Soup", "French Onion Soup"]);

        // Results for "soup" are still shown while "tacos" is debouncing
        coordinator.set_filters(SearchFilters::with_query("tacos"));
        let second = coordinator.settled().await;
        assert_eq!(second.sequence, 2);
        assert_eq!(titles(&second), vec!["Beef Tacos"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_debounce_window() {
        let provider = Arc::new(MockProvider::with_sample_catalogue());
        let coordinator = SearchCoordinator::new(
            Arc::clone(&provider) as Arc<dyn RecipeProvider>,
            SearchSettings {
                debounce: Duration::from_millis(50),
                random_count: 3,
            },
            SearchFilters::default(),
        );

        coordinator.set_filters(SearchFilters::default());
        sleep(Duration::from_millis(60)).await;
        assert_eq!(provider.calls(), vec![ProviderCall::GetRandom(3)]);
    }
}
