use crate::config::ProviderConfig;
use crate::error::{AppError, FetchError};
use crate::model::{Recipe, RecipeId, SearchFilters};
use crate::providers::RecipeProvider;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com/recipes";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Recipe>,
}

#[derive(Deserialize)]
struct RandomResponse {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

/// Recipe provider backed by the Spoonacular REST API
pub struct SpoonacularProvider {
    client: Client,
    api_key: String,
    base_url: String,
    result_limit: u32,
}

impl SpoonacularProvider {
    /// Create a new Spoonacular provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, AppError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Setup(
                    "Spoonacular API key is required. Set provider.api_key or SPOONACULAR_API_KEY"
                        .to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Setup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(SpoonacularProvider {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
        })
    }

    /// Create a provider with simple parameters against the public endpoint
    pub fn with_api_key(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        SpoonacularProvider {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            result_limit: 12,
        }
    }

    /// Issue a GET request and decode the JSON body, classifying failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| {
            debug!("Failed to decode response from {}: {}", url, e);
            FetchError::Unknown
        })
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularProvider {
    fn provider_name(&self) -> &str {
        "spoonacular"
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Recipe>, FetchError> {
        let mut params = vec![
            ("addRecipeInformation", "true".to_string()),
            ("number", self.result_limit.to_string()),
            ("sort", filters.sort.as_str().to_string()),
            ("sortDirection", "desc".to_string()),
        ];
        if !filters.query.is_empty() {
            params.push(("query", filters.query.clone()));
        }
        if !filters.diet.is_empty() {
            params.push(("diet", filters.diet.clone()));
        }
        if !filters.cuisine.is_empty() {
            params.push(("cuisine", filters.cuisine.clone()));
        }

        match self.get_json::<SearchResponse>("/complexSearch", &params).await {
            Ok(body) => Ok(body.results),
            Err(e) => {
                error!("Error searching recipes: {}", e);
                Err(e)
            }
        }
    }

    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe, FetchError> {
        let params = [("includeNutrition", "true".to_string())];
        self.get_json::<Recipe>(&format!("/{}/information", id), &params)
            .await
            .map_err(|e| {
                error!("Error fetching recipe details for {}: {}", id, e);
                e
            })
    }

    async fn get_similar(&self, id: RecipeId, limit: u32) -> Result<Vec<Recipe>, FetchError> {
        let params = [("number", limit.to_string())];
        let similar = self
            .get_json::<Option<Vec<Recipe>>>(&format!("/{}/similar", id), &params)
            .await?;
        Ok(similar.unwrap_or_default())
    }

    async fn get_random(&self, limit: u32) -> Result<Vec<Recipe>, FetchError> {
        let params = [("number", limit.to_string())];
        match self.get_json::<RandomResponse>("/random", &params).await {
            Ok(body) => Ok(body.recipes),
            Err(e) => {
                error!("Error fetching random recipes: {}", e);
                Err(e)
            }
        }
    }
}
