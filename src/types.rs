//! Core types used throughout Arena Dash
//!
//! Closed enums for the category strings the backend sends, and the mapping
//! tables from those categories to display styling.

use serde::Deserialize;
use std::fmt;

/// Side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum TradeSide {
    Buy,
    Sell,
    #[default]
    Unknown,
}

impl TradeSide {
    /// Parse from string
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "BUY" => TradeSide::Buy,
            "SELL" => TradeSide::Sell,
            _ => TradeSide::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            TradeSide::Buy => BadgeVariant::Default,
            TradeSide::Sell => BadgeVariant::Destructive,
            TradeSide::Unknown => BadgeVariant::Secondary,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            TradeSide::Buy => Tone::Up,
            TradeSide::Sell => Tone::Down,
            TradeSide::Unknown => Tone::Neutral,
        }
    }
}

impl From<String> for TradeSide {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
            TradeSide::Unknown => write!(f, "?"),
        }
    }
}

/// Market mood, used for both the overall market and per-trade condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    #[default]
    Unknown,
}

impl Sentiment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Sentiment::Bullish,
            "bearish" => Sentiment::Bearish,
            "neutral" | "sideways" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            Sentiment::Bullish => BadgeVariant::Default,
            Sentiment::Bearish => BadgeVariant::Destructive,
            Sentiment::Neutral | Sentiment::Unknown => BadgeVariant::Secondary,
        }
    }
}

impl From<String> for Sentiment {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "bullish"),
            Sentiment::Bearish => write!(f, "bearish"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Unknown => write!(f, "unknown"),
        }
    }
}

/// Direction a sector is moving in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum SectorTrend {
    Up,
    Down,
    #[default]
    Flat,
}

impl SectorTrend {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "up" => SectorTrend::Up,
            "down" => SectorTrend::Down,
            _ => SectorTrend::Flat,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            SectorTrend::Up => Tone::Up,
            SectorTrend::Down => Tone::Down,
            SectorTrend::Flat => Tone::Neutral,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            SectorTrend::Up => "▲",
            SectorTrend::Down => "▼",
            SectorTrend::Flat => "●",
        }
    }
}

impl From<String> for SectorTrend {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Robot risk appetite. The backend labels these in Korean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "높음" | "high" => RiskLevel::High,
            "중간" | "medium" => RiskLevel::Medium,
            "낮음" | "low" => RiskLevel::Low,
            _ => RiskLevel::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            RiskLevel::High => BadgeVariant::Destructive,
            RiskLevel::Medium => BadgeVariant::Default,
            RiskLevel::Low | RiskLevel::Unknown => BadgeVariant::Secondary,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Unknown => write!(f, "n/a"),
        }
    }
}

/// Color family for signed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Up,
    Down,
    Neutral,
}

impl Tone {
    /// Zero counts as up, matching how gains are colored everywhere else
    pub fn of(value: f64) -> Self {
        if value.is_nan() {
            Tone::Neutral
        } else if value >= 0.0 {
            Tone::Up
        } else {
            Tone::Down
        }
    }
}

/// Badge look for categorical values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeVariant {
    Default,
    Destructive,
    Secondary,
    Outline,
}

/// Badge shown next to a leaderboard position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Plain,
}

impl RankBadge {
    /// `index` is zero-based
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => RankBadge::Gold,
            1 => RankBadge::Silver,
            2 => RankBadge::Bronze,
            _ => RankBadge::Plain,
        }
    }
}

/// Label derived from the numeric news sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsMood {
    Positive,
    Negative,
    Neutral,
}

impl NewsMood {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > 0.0 => NewsMood::Positive,
            Some(s) if s < 0.0 => NewsMood::Negative,
            _ => NewsMood::Neutral,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            NewsMood::Positive => Tone::Up,
            NewsMood::Negative => Tone::Down,
            NewsMood::Neutral => Tone::Neutral,
        }
    }
}

impl fmt::Display for NewsMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsMood::Positive => write!(f, "positive"),
            NewsMood::Negative => write!(f, "negative"),
            NewsMood::Neutral => write!(f, "neutral"),
        }
    }
}
