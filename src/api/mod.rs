//! Arena Backend API
//!
//! The eight read-only resources the dashboard polls, the `{ success, data }`
//! envelope they share, and the error taxonomy for calls that go wrong.

mod client;
pub mod models;

pub use client::ArenaClient;
pub use models::*;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Response envelope shared by every backend endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, mapping `success=false` and missing data to errors
    pub fn into_result(self, resource: Resource) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Unsuccessful {
                resource,
                message: self.error.unwrap_or_else(|| "no error message".to_string()),
            });
        }
        self.data.ok_or(ApiError::MissingData { resource })
    }
}

/// Why a resource could not be loaded
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{resource}: request failed: {source}")]
    Transport {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource}: HTTP {status} with unreadable body")]
    Status {
        resource: Resource,
        status: reqwest::StatusCode,
    },

    #[error("{resource}: backend reported failure: {message}")]
    Unsuccessful { resource: Resource, message: String },

    #[error("{resource}: malformed payload: {source}")]
    Malformed {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("{resource}: success without data")]
    MissingData { resource: Resource },
}

impl ApiError {
    pub fn resource(&self) -> Resource {
        match self {
            ApiError::Transport { resource, .. }
            | ApiError::Status { resource, .. }
            | ApiError::Unsuccessful { resource, .. }
            | ApiError::Malformed { resource, .. }
            | ApiError::MissingData { resource } => *resource,
        }
    }
}

/// The resources fetched on every refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Robots,
    DetailedTrades,
    LiveTrades,
    MarketCondition,
    SectorPerformance,
    TrendingStocks,
    Leaderboard,
    MetaModel,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Robots,
        Resource::DetailedTrades,
        Resource::LiveTrades,
        Resource::MarketCondition,
        Resource::SectorPerformance,
        Resource::TrendingStocks,
        Resource::Leaderboard,
        Resource::MetaModel,
    ];

    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Robots => "/robots",
            Resource::DetailedTrades => "/trades/recent",
            Resource::LiveTrades => "/trades/live",
            Resource::MarketCondition => "/market/condition",
            Resource::SectorPerformance => "/trades/sectors",
            Resource::TrendingStocks => "/market/trending",
            Resource::Leaderboard => "/predictions/leaderboard",
            Resource::MetaModel => "/meta-model/performance",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Resource::Robots => "robots",
            Resource::DetailedTrades => "detailed_trades",
            Resource::LiveTrades => "live_trades",
            Resource::MarketCondition => "market_condition",
            Resource::SectorPerformance => "sector_performance",
            Resource::TrendingStocks => "trending_stocks",
            Resource::Leaderboard => "leaderboard",
            Resource::MetaModel => "meta_model",
        };
        write!(f, "{}", label)
    }
}

/// Read access to the arena backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn robots(&self) -> Result<Vec<Robot>, ApiError>;

    async fn detailed_trades(&self, limit: usize) -> Result<Vec<DetailedTrade>, ApiError>;

    async fn live_trades(&self) -> Result<Vec<LiveTrade>, ApiError>;

    async fn market_condition(&self) -> Result<MarketCondition, ApiError>;

    async fn sector_performance(&self) -> Result<Vec<SectorPerformance>, ApiError>;

    async fn trending_stocks(&self) -> Result<Vec<TrendingStock>, ApiError>;

    async fn leaderboard(&self) -> Result<Vec<PredictionUser>, ApiError>;

    async fn meta_model(&self) -> Result<MetaModel, ApiError>;
}
