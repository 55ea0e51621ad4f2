//! Backend payload models
//!
//! Read-only snapshots as the arena backend serves them. Anything the
//! dashboard can live without defaults when it is missing or null, so one
//! sloppy row does not take a whole resource down.

use crate::types::{RiskLevel, SectorTrend, Sentiment, TradeSide};
use serde::{Deserialize, Deserializer};

/// Treat `null` the same as an absent field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One autonomous trading strategy instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Robot {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub strategy_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_return: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub win_rate: f64,
    #[serde(default)]
    pub current_capital: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub initial_capital: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Position sizing and exit plan attached to a trade
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TradeStrategy {
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    /// Days
    #[serde(default)]
    pub holding_period: Option<f64>,
    #[serde(default)]
    pub position_size_pct: Option<f64>,
    /// 1..=10
    #[serde(default)]
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub moving_avg_20: Option<f64>,
    #[serde(default)]
    pub moving_avg_50: Option<f64>,
    #[serde(default)]
    pub volume_ratio: Option<f64>,
}

/// Intraday quote context at the moment of the trade
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TradeMarketData {
    #[serde(default)]
    pub day_open: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub prev_close: Option<f64>,
    #[serde(default)]
    pub market_price_at_trade: Option<f64>,
}

/// Trade with the reasoning and analysis behind it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailedTrade {
    pub id: i64,
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub trade_type: TradeSide,
    #[serde(default, deserialize_with = "nullable")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub price: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_amount: f64,
    #[serde(default)]
    pub robot_id: Option<i64>,
    #[serde(default)]
    pub robot_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub market_condition: Option<Sentiment>,
    #[serde(default)]
    pub trade_strategy: Option<TradeStrategy>,
    #[serde(default)]
    pub technical_indicators: Option<TechnicalIndicators>,
    #[serde(default)]
    pub market_data: Option<TradeMarketData>,
    /// ISO-8601, naive timestamps are UTC
    #[serde(default)]
    pub trade_date: Option<String>,
}

/// Lightweight feed item
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveTrade {
    pub symbol: String,
    #[serde(default, deserialize_with = "nullable")]
    pub trade_type: TradeSide,
    #[serde(default, deserialize_with = "nullable")]
    pub price: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub robot_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub time_ago: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketChanges {
    #[serde(default)]
    pub sp500: Option<f64>,
    #[serde(default)]
    pub nasdaq: Option<f64>,
    #[serde(default)]
    pub dow: Option<f64>,
}

/// Singleton market snapshot. An empty object deserializes to the default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketCondition {
    #[serde(default)]
    pub overall_sentiment: Option<Sentiment>,
    #[serde(default)]
    pub vix_level: Option<f64>,
    #[serde(default)]
    pub market_changes: Option<MarketChanges>,
    #[serde(default)]
    pub volume_trend: Option<String>,
    #[serde(default)]
    pub news_sentiment: Option<f64>,
}

impl MarketCondition {
    /// True when the backend sent nothing worth showing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectorPerformance {
    pub sector: String,
    #[serde(default, deserialize_with = "nullable")]
    pub trade_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_confidence: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub performance: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub trend: SectorTrend,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingStock {
    pub symbol: String,
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub change_percent: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub trade_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_confidence: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub sector: String,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionUser {
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub accuracy: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub points: f64,
    #[serde(default, alias = "predictions", deserialize_with = "nullable")]
    pub predictions_count: u64,
}

/// Aggregate across all robots
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetaModel {
    #[serde(default)]
    pub total_return: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub current_capital: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
}

impl MetaModel {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
