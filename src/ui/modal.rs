//! Trade detail modal
//!
//! Four read-only panels computed from a single `DetailedTrade`. Nested
//! blocks the backend left out render as placeholders.

use crate::api::{DetailedTrade, TechnicalIndicators, TradeMarketData, TradeStrategy};
use crate::types::{BadgeVariant, Tone};

use super::format::{self, PLACEHOLDER};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
    /// Drawn as a badge instead of plain text
    pub badge: Option<BadgeVariant>,
}

impl DetailRow {
    fn text(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            tone: Tone::Neutral,
            badge: None,
        }
    }

    fn toned(label: &'static str, value: String, tone: Tone) -> Self {
        Self {
            label,
            value,
            tone,
            badge: None,
        }
    }

    fn badge(label: &'static str, value: String, variant: BadgeVariant) -> Self {
        Self {
            label,
            value,
            tone: Tone::Neutral,
            badge: Some(variant),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub title: &'static str,
    pub rows: Vec<DetailRow>,
}

impl DetailPanel {
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeDetail {
    pub trade_id: i64,
    pub title: String,
    pub panels: [DetailPanel; 4],
}

impl TradeDetail {
    /// `None` when nothing is selected
    pub fn build(selected: Option<&DetailedTrade>) -> Option<Self> {
        selected.map(Self::from_trade)
    }

    pub fn from_trade(trade: &DetailedTrade) -> Self {
        let title = match trade.company_name.as_deref() {
            Some(company) if !company.trim().is_empty() => {
                format!("{} - {}", trade.symbol, company)
            }
            _ => trade.symbol.clone(),
        };

        Self {
            trade_id: trade.id,
            title,
            panels: [
                trade_info(trade),
                analysis(trade),
                technical(trade.technical_indicators.as_ref()),
                market_data(trade.market_data.as_ref()),
            ],
        }
    }
}

fn trade_info(trade: &DetailedTrade) -> DetailPanel {
    DetailPanel {
        title: "Trade",
        rows: vec![
            DetailRow::badge(
                "Type",
                trade.trade_type.to_string(),
                trade.trade_type.badge(),
            ),
            DetailRow::text(
                "Quantity",
                format!("{} shares", format::grouped(trade.quantity)),
            ),
            DetailRow::text("Price", format::currency(trade.price)),
            DetailRow::text("Total", format::currency(trade.total_amount)),
            DetailRow::text("Robot", format::opt_text(trade.robot_name.as_deref())),
            DetailRow::text("Sector", format::opt_text(trade.sector.as_deref())),
            DetailRow::text(
                "Confidence",
                format::opt_with(trade.confidence_score, format::percent),
            ),
            DetailRow::text("Time", format::local_time(trade.trade_date.as_deref())),
        ],
    }
}

fn analysis(trade: &DetailedTrade) -> DetailPanel {
    let strategy = trade.trade_strategy.clone().unwrap_or_default();
    let TradeStrategy {
        expected_return,
        stop_loss,
        take_profit,
        holding_period,
        position_size_pct,
        risk_score,
    } = strategy;

    let condition = match trade.market_condition {
        Some(sentiment) => DetailRow::badge("Market", sentiment.to_string(), sentiment.badge()),
        None => DetailRow::text("Market", PLACEHOLDER.to_string()),
    };

    DetailPanel {
        title: "Analysis",
        rows: vec![
            DetailRow::text("Reason", format::opt_text(trade.reason.as_deref())),
            condition,
            DetailRow::toned(
                "Expected return",
                format::opt_with(expected_return, format::signed_percent),
                expected_return.map(Tone::of).unwrap_or(Tone::Neutral),
            ),
            DetailRow::toned(
                "Stop loss",
                format::opt_with(stop_loss, format::currency),
                Tone::Down,
            ),
            DetailRow::toned(
                "Take profit",
                format::opt_with(take_profit, format::currency),
                Tone::Up,
            ),
            DetailRow::text(
                "Holding period",
                format::opt_with(holding_period, |d| format!("{} days", format::number(d))),
            ),
            DetailRow::text(
                "Position size",
                format::opt_with(position_size_pct, format::percent),
            ),
            DetailRow::text(
                "Risk score",
                format::opt_with(risk_score, |r| format!("{}/10", format::number(r))),
            ),
        ],
    }
}

fn technical(indicators: Option<&TechnicalIndicators>) -> DetailPanel {
    let indicators = indicators.cloned().unwrap_or_default();
    DetailPanel {
        title: "Technical indicators",
        rows: vec![
            DetailRow::text("RSI", format::opt_with(indicators.rsi, format::number)),
            DetailRow::text("MACD", format::opt_with(indicators.macd, format::number)),
            DetailRow::text(
                "MA20",
                format::opt_with(indicators.moving_avg_20, format::currency),
            ),
            DetailRow::text(
                "MA50",
                format::opt_with(indicators.moving_avg_50, format::currency),
            ),
            DetailRow::text(
                "Volume ratio",
                format::opt_with(indicators.volume_ratio, |v| {
                    format!("{}x", format::number(v))
                }),
            ),
        ],
    }
}

fn market_data(data: Option<&TradeMarketData>) -> DetailPanel {
    let data = data.cloned().unwrap_or_default();
    DetailPanel {
        title: "Market data",
        rows: vec![
            DetailRow::text("Open", format::opt_with(data.day_open, format::currency)),
            DetailRow::text("High", format::opt_with(data.day_high, format::currency)),
            DetailRow::text("Low", format::opt_with(data.day_low, format::currency)),
            DetailRow::text(
                "Prev close",
                format::opt_with(data.prev_close, format::currency),
            ),
            DetailRow::text(
                "At trade",
                format::opt_with(data.market_price_at_trade, format::currency),
            ),
        ],
    }
}
