//! Arena REST API Client
//!
//! Thin reqwest wrapper: one GET per resource, envelope unwrapped, every
//! failure mapped onto `ApiError`.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::*;
use super::{ApiError, ApiResponse, DashboardApi, Resource};

/// HTTP client for the arena backend
#[derive(Debug, Clone)]
pub struct ArenaClient {
    client: Client,
    base_url: String,
}

impl ArenaClient {
    /// Create a new client. `base_url` already includes the `/api` prefix.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(resource);
        debug!(resource = %resource, url = %url, "Fetching");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport { resource, source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { resource, source })?;

        // Error responses still carry the envelope, so the body wins over the status
        match serde_json::from_slice::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope.into_result(resource),
            Err(_) if !status.is_success() => Err(ApiError::Status { resource, status }),
            Err(source) => Err(ApiError::Malformed { resource, source }),
        }
    }
}

#[async_trait]
impl DashboardApi for ArenaClient {
    async fn robots(&self) -> Result<Vec<Robot>, ApiError> {
        self.get(Resource::Robots, &[]).await
    }

    async fn detailed_trades(&self, limit: usize) -> Result<Vec<DetailedTrade>, ApiError> {
        let query = [
            ("details", "true".to_string()),
            ("limit", limit.to_string()),
        ];
        self.get(Resource::DetailedTrades, &query).await
    }

    async fn live_trades(&self) -> Result<Vec<LiveTrade>, ApiError> {
        self.get(Resource::LiveTrades, &[]).await
    }

    async fn market_condition(&self) -> Result<MarketCondition, ApiError> {
        self.get(Resource::MarketCondition, &[]).await
    }

    async fn sector_performance(&self) -> Result<Vec<SectorPerformance>, ApiError> {
        self.get(Resource::SectorPerformance, &[]).await
    }

    async fn trending_stocks(&self) -> Result<Vec<TrendingStock>, ApiError> {
        self.get(Resource::TrendingStocks, &[]).await
    }

    async fn leaderboard(&self) -> Result<Vec<PredictionUser>, ApiError> {
        self.get(Resource::Leaderboard, &[]).await
    }

    async fn meta_model(&self) -> Result<MetaModel, ApiError> {
        self.get(Resource::MetaModel, &[]).await
    }
}
