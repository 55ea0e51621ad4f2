//! Dashboard Module
//!
//! Owned view state for the dashboard and the controller that refreshes it.
//! Views only ever see a published `Arc<DashboardState>`; the refresh task is
//! the single writer.

mod refresh;

pub use refresh::{RefreshController, RefreshHandle};

use crate::api::{
    DetailedTrade, LiveTrade, MarketCondition, MetaModel, PredictionUser, Resource, Robot,
    SectorPerformance, TrendingStock,
};
use chrono::{DateTime, Local};

/// Everything the views render, as of one completed refresh cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub robots: Vec<Robot>,
    pub detailed_trades: Vec<DetailedTrade>,
    pub live_trades: Vec<LiveTrade>,
    pub market_condition: MarketCondition,
    pub sector_performance: Vec<SectorPerformance>,
    pub trending_stocks: Vec<TrendingStock>,
    pub leaderboard: Vec<PredictionUser>,
    pub meta_model: MetaModel,
    /// Wall-clock start of the cycle that produced this state
    pub refreshed_at: Option<DateTime<Local>>,
    /// Number of the cycle that produced this state, 0 before the first one
    pub cycle: u64,
    /// Resources that fell back to their empty default in this cycle
    pub unavailable: Vec<Resource>,
}

impl DashboardState {
    /// True until the first cycle has been published
    pub fn is_initial(&self) -> bool {
        self.cycle == 0
    }

    pub fn is_degraded(&self) -> bool {
        !self.unavailable.is_empty()
    }
}
