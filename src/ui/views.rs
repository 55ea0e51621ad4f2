//! View models
//!
//! Pure functions from the published state to what each panel shows. No
//! sorting or filtering happens here: rows keep the order the backend sent,
//! at most truncated to the number of rows a panel has room for.

use crate::api::{
    DetailedTrade, LiveTrade, MarketCondition, MetaModel, PredictionUser, Robot,
    SectorPerformance, TrendingStock,
};
use crate::dashboard::DashboardState;
use crate::types::{BadgeVariant, NewsMood, RankBadge, Tone};

use super::format::{self, PLACEHOLDER};

/// Text with the color family it should be drawn in
#[derive(Debug, Clone, PartialEq)]
pub struct Toned {
    pub text: String,
    pub tone: Tone,
}

impl Toned {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn neutral(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Neutral)
    }

    /// Signed percentage colored by its sign
    pub fn signed_percent(value: f64) -> Self {
        Self::new(format::signed_percent(value), Tone::of(value))
    }

    pub fn signed_percent_opt(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::signed_percent(v),
            None => Self::neutral(PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub text: String,
    pub variant: BadgeVariant,
}

impl Badge {
    pub fn new(text: impl Into<String>, variant: BadgeVariant) -> Self {
        Self {
            text: text.into(),
            variant,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Banners
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MarketBanner {
    pub sentiment: Badge,
    pub vix: String,
    pub sp500: Toned,
    pub nasdaq: Toned,
    pub dow: Toned,
}

/// Hidden while the market snapshot is empty
pub fn market_banner(market: &MarketCondition) -> Option<MarketBanner> {
    if market.is_empty() {
        return None;
    }
    let changes = market.market_changes.clone().unwrap_or_default();
    let sentiment = match market.overall_sentiment {
        Some(s) => Badge::new(s.to_string(), s.badge()),
        None => Badge::new(PLACEHOLDER, BadgeVariant::Secondary),
    };
    Some(MarketBanner {
        sentiment,
        vix: format::opt_with(market.vix_level, format::number),
        sp500: Toned::signed_percent_opt(changes.sp500),
        nasdaq: Toned::signed_percent_opt(changes.nasdaq),
        dow: Toned::signed_percent_opt(changes.dow),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaModelBanner {
    pub subtitle: String,
    pub total_return: Toned,
    pub win_rate: String,
    pub current_capital: String,
    pub sharpe_ratio: String,
    pub max_drawdown: String,
}

/// Hidden while the aggregate is empty. Missing fields show a placeholder,
/// never a made-up figure.
pub fn meta_model_banner(meta: &MetaModel, robot_count: usize) -> Option<MetaModelBanner> {
    if meta.is_empty() {
        return None;
    }
    Some(MetaModelBanner {
        subtitle: format!("Combines the strengths of {} robots", robot_count),
        total_return: Toned::signed_percent_opt(meta.total_return),
        win_rate: format::opt_with(meta.win_rate, format::percent),
        current_capital: format::opt_with(meta.current_capital, format::currency),
        sharpe_ratio: format::opt_with(meta.sharpe_ratio, format::number),
        max_drawdown: format::opt_with(meta.max_drawdown, format::percent),
    })
}

// ─────────────────────────────────────────────────────────────────
// Robots tab
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RobotCard {
    pub name: String,
    pub strategy: String,
    pub risk: Badge,
    pub status: Badge,
    pub description: String,
    pub total_return: Toned,
    pub win_rate: String,
    /// Fill of the win-rate bar, 0.0..=1.0
    pub win_rate_ratio: f64,
    pub current_capital: String,
    pub initial_capital: String,
    pub sharpe_ratio: String,
    pub max_drawdown: String,
}

/// Robots the backend does not flag count as active
fn robot_status(is_active: Option<bool>) -> Badge {
    match is_active {
        Some(false) => Badge::new("Paused", BadgeVariant::Secondary),
        _ => Badge::new("Active", BadgeVariant::Default),
    }
}

pub fn robot_cards(robots: &[Robot]) -> Vec<RobotCard> {
    robots
        .iter()
        .map(|robot| RobotCard {
            name: robot.name.clone(),
            strategy: robot.strategy_type.clone(),
            risk: Badge::new(robot.risk_level.to_string(), robot.risk_level.badge()),
            status: robot_status(robot.is_active),
            description: robot.description.clone(),
            total_return: Toned::signed_percent(robot.total_return),
            win_rate: format::percent(robot.win_rate),
            win_rate_ratio: bar_ratio(robot.win_rate),
            current_capital: format::opt_with(robot.current_capital, format::currency),
            initial_capital: format::opt_with(robot.initial_capital, format::currency),
            sharpe_ratio: format::opt_with(robot.sharpe_ratio, format::number),
            max_drawdown: format::opt_with(robot.max_drawdown, format::percent),
        })
        .collect()
}

/// Percentage to bar fill, clamped to the bar
pub fn bar_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ─────────────────────────────────────────────────────────────────
// Trades tab
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LiveTradeRow {
    pub side: Badge,
    pub tone: Tone,
    pub symbol: String,
    pub robot: String,
    pub price: String,
    /// Quantity and confidence when the feed carries them, else empty
    pub detail: String,
    pub time_ago: String,
}

fn live_detail(trade: &LiveTrade) -> String {
    let mut parts = Vec::new();
    if let Some(quantity) = trade.quantity {
        parts.push(format!("{} sh", format::grouped(quantity)));
    }
    if let Some(confidence) = trade.confidence_score {
        parts.push(format!("conf {}", format::percent(confidence)));
    }
    parts.join(" · ")
}

pub fn live_trade_rows(trades: &[LiveTrade]) -> Vec<LiveTradeRow> {
    trades
        .iter()
        .map(|trade| LiveTradeRow {
            side: Badge::new(trade.trade_type.to_string(), trade.trade_type.badge()),
            tone: trade.trade_type.tone(),
            symbol: trade.symbol.clone(),
            robot: trade.robot_name.clone(),
            price: format::currency(trade.price),
            detail: live_detail(trade),
            time_ago: trade.time_ago.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailedTradeRow {
    pub id: i64,
    pub side: Badge,
    pub symbol: String,
    pub sector: String,
    pub confidence: String,
    pub robot: String,
    pub reason: String,
    pub price_quantity: String,
    pub time: String,
}

pub fn detailed_trade_rows(trades: &[DetailedTrade], limit: usize) -> Vec<DetailedTradeRow> {
    trades
        .iter()
        .take(limit)
        .map(|trade| DetailedTradeRow {
            id: trade.id,
            side: Badge::new(trade.trade_type.to_string(), trade.trade_type.badge()),
            symbol: trade.symbol.clone(),
            sector: format::opt_text(trade.sector.as_deref()),
            confidence: format::opt_with(trade.confidence_score, format::percent),
            robot: format::opt_text(trade.robot_name.as_deref()),
            reason: format::opt_text(trade.reason.as_deref()),
            price_quantity: format!(
                "{} × {}",
                format::currency(trade.price),
                format::grouped(trade.quantity)
            ),
            time: format::local_time(trade.trade_date.as_deref()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendingRow {
    pub symbol: String,
    pub sector: Badge,
    pub company: String,
    pub price: String,
    pub change: Toned,
    pub activity: String,
}

pub fn trending_rows(stocks: &[TrendingStock], limit: usize) -> Vec<TrendingRow> {
    stocks
        .iter()
        .take(limit)
        .map(|stock| TrendingRow {
            symbol: stock.symbol.clone(),
            sector: Badge::new(stock.sector.clone(), BadgeVariant::Outline),
            company: stock.company_name.clone(),
            price: format::currency(stock.current_price),
            change: Toned::signed_percent(stock.change_percent),
            activity: format!(
                "Trades: {} | Confidence: {} | Volume: {}",
                stock.trade_count,
                format::percent(stock.avg_confidence),
                format::opt_with(stock.total_volume.or(stock.volume), format::grouped)
            ),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// Market tab
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SectorRow {
    pub sector: String,
    pub activity: String,
    pub performance: Toned,
    pub trend: Toned,
}

pub fn sector_rows(sectors: &[SectorPerformance]) -> Vec<SectorRow> {
    sectors
        .iter()
        .map(|row| SectorRow {
            sector: row.sector.clone(),
            activity: format!(
                "{} trades | confidence {}",
                row.trade_count,
                format::percent(row.avg_confidence)
            ),
            performance: Toned::signed_percent(row.performance),
            trend: Toned::new(row.trend.glyph(), row.trend.tone()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketIndicators {
    pub vix: String,
    pub volume_trend: String,
    pub news: Toned,
}

pub fn market_indicators(market: &MarketCondition) -> MarketIndicators {
    let mood = NewsMood::from_score(market.news_sentiment);
    MarketIndicators {
        vix: format::opt_with(market.vix_level, format::number),
        volume_trend: format::opt_text(market.volume_trend.as_deref()),
        news: Toned::new(mood.to_string(), mood.tone()),
    }
}

// ─────────────────────────────────────────────────────────────────
// Predictions tab
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// 1-based position in the payload
    pub position: usize,
    pub badge: RankBadge,
    pub user: String,
    pub accuracy: String,
    pub points: String,
    pub predictions: String,
}

pub fn leaderboard_rows(users: &[PredictionUser]) -> Vec<LeaderboardRow> {
    users
        .iter()
        .enumerate()
        .map(|(index, user)| LeaderboardRow {
            position: index + 1,
            badge: RankBadge::for_index(index),
            user: user.user_name.clone(),
            accuracy: format!("Accuracy: {}", format::percent(user.accuracy)),
            points: format!("{} pts", format::grouped(user.points.round())),
            predictions: format!("{} predictions", user.predictions_count),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// Footer and headless summary
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub last_update: String,
    pub robots_note: String,
    pub unavailable_note: Option<String>,
}

pub fn footer(state: &DashboardState, interval_secs: u64) -> Footer {
    let last_update = match &state.refreshed_at {
        Some(at) => format!("Last update: {}", format::clock(at)),
        None => "Loading…".to_string(),
    };
    let unavailable_note = match state.unavailable.len() {
        0 => None,
        1 => Some("1 source unavailable".to_string()),
        n => Some(format!("{} sources unavailable", n)),
    };
    Footer {
        last_update,
        robots_note: format!(
            "Data refreshes every {}s. {} robots trading.",
            interval_secs,
            state.robots.len()
        ),
        unavailable_note,
    }
}

/// Plain-text rendering of a state, one line per panel
pub fn summary_lines(state: &DashboardState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(market) = market_banner(&state.market_condition) {
        lines.push(format!(
            "market: {} vix={} sp500={} nasdaq={} dow={}",
            market.sentiment.text,
            market.vix,
            market.sp500.text,
            market.nasdaq.text,
            market.dow.text
        ));
    }
    if let Some(meta) = meta_model_banner(&state.meta_model, state.robots.len()) {
        lines.push(format!(
            "meta: return={} win={} capital={} sharpe={} mdd={}",
            meta.total_return.text,
            meta.win_rate,
            meta.current_capital,
            meta.sharpe_ratio,
            meta.max_drawdown
        ));
    }
    for card in robot_cards(&state.robots) {
        lines.push(format!(
            "robot: {} [{}] {} return={} win={} capital={} mdd={}",
            card.name,
            card.risk.text,
            card.status.text,
            card.total_return.text,
            card.win_rate,
            card.current_capital,
            card.max_drawdown
        ));
    }
    for row in live_trade_rows(&state.live_trades) {
        lines.push(format!(
            "live: {} {} {} by {} ({})",
            row.side.text, row.symbol, row.price, row.robot, row.time_ago
        ));
    }
    for row in detailed_trade_rows(&state.detailed_trades, state.detailed_trades.len()) {
        lines.push(format!(
            "trade #{}: {} {} {} conf={} by {} at {}",
            row.id, row.side.text, row.symbol, row.price_quantity, row.confidence, row.robot, row.time
        ));
    }
    for row in trending_rows(&state.trending_stocks, state.trending_stocks.len()) {
        lines.push(format!(
            "trending: {} {} {} {}",
            row.symbol, row.price, row.change.text, row.activity
        ));
    }
    for row in sector_rows(&state.sector_performance) {
        lines.push(format!(
            "sector: {} {} {}",
            row.sector, row.performance.text, row.trend.text
        ));
    }
    for row in leaderboard_rows(&state.leaderboard) {
        lines.push(format!("rank {}: {} {}", row.position, row.user, row.points));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MarketChanges;
    use crate::types::{RiskLevel, SectorTrend, TradeSide};

    fn robot(id: i64, name: &str, win_rate: f64) -> Robot {
        Robot {
            id,
            name: name.to_string(),
            strategy_type: "Momentum".to_string(),
            risk_level: RiskLevel::Medium,
            description: String::new(),
            total_return: 10.0,
            win_rate,
            current_capital: Some(100_000.0),
            sharpe_ratio: Some(1.2),
            initial_capital: None,
            max_drawdown: None,
            is_active: Some(true),
        }
    }

    fn detailed(id: i64, symbol: &str) -> DetailedTrade {
        DetailedTrade {
            id,
            symbol: symbol.to_string(),
            company_name: None,
            trade_type: TradeSide::Sell,
            quantity: 100.0,
            price: 175.23,
            total_amount: 17_523.0,
            robot_id: Some(1),
            robot_name: Some("Momentum Hunter".to_string()),
            sector: Some("Technology".to_string()),
            market_cap: None,
            confidence_score: Some(85.0),
            reason: None,
            market_condition: None,
            trade_strategy: None,
            technical_indicators: None,
            market_data: None,
            trade_date: None,
        }
    }

    fn trending(symbol: &str, total_volume: Option<f64>, volume: Option<f64>) -> TrendingStock {
        TrendingStock {
            symbol: symbol.to_string(),
            company_name: "NVIDIA Corp".to_string(),
            current_price: 875.3,
            change_percent: 2.4,
            trade_count: 12,
            avg_confidence: 78.0,
            sector: "Technology".to_string(),
            total_volume,
            volume,
        }
    }

    fn market_with(sp500: f64) -> MarketCondition {
        MarketCondition {
            market_changes: Some(MarketChanges {
                sp500: Some(sp500),
                nasdaq: None,
                dow: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn robot_cards_keep_order_and_scale_win_rate_bars() {
        let robots = vec![
            robot(1, "A", 70.0),
            robot(2, "B", 55.0),
            robot(3, "C", 40.0),
        ];

        let cards = robot_cards(&robots);

        assert_eq!(cards.len(), 3);
        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!((cards[0].win_rate_ratio - 0.70).abs() < 1e-9);
        assert!((cards[1].win_rate_ratio - 0.55).abs() < 1e-9);
        assert!((cards[2].win_rate_ratio - 0.40).abs() < 1e-9);
        assert_eq!(cards[0].win_rate, "70%");
    }

    #[test]
    fn robot_cards_show_drawdown_starting_capital_and_status() {
        let mut paused = robot(1, "A", 60.0);
        paused.initial_capital = Some(100_000.0);
        paused.max_drawdown = Some(-8.2);
        paused.is_active = Some(false);
        let unflagged = Robot {
            is_active: None,
            ..robot(2, "B", 50.0)
        };

        let cards = robot_cards(&[paused, unflagged]);

        assert_eq!(cards[0].initial_capital, "$100,000");
        assert_eq!(cards[0].max_drawdown, "-8.2%");
        assert_eq!(cards[0].status, Badge::new("Paused", BadgeVariant::Secondary));
        assert_eq!(cards[1].status.text, "Active");
        assert_eq!(cards[1].initial_capital, PLACEHOLDER);
        assert_eq!(cards[1].max_drawdown, PLACEHOLDER);
    }

    #[test]
    fn live_rows_carry_quantity_and_confidence_when_present() {
        let full = LiveTrade {
            symbol: "AAPL".to_string(),
            trade_type: TradeSide::Buy,
            price: 175.23,
            robot_name: "Momentum Hunter".to_string(),
            time_ago: "2m ago".to_string(),
            quantity: Some(1500.0),
            confidence_score: Some(85.0),
        };
        let bare = LiveTrade {
            quantity: None,
            confidence_score: None,
            ..full.clone()
        };

        let rows = live_trade_rows(&[full, bare]);

        assert_eq!(rows[0].detail, "1,500 sh · conf 85%");
        assert_eq!(rows[1].detail, "");
    }

    #[test]
    fn trending_activity_prefers_total_volume() {
        let rows = trending_rows(
            &[
                trending("NVDA", Some(1_250_000.0), Some(3.0)),
                trending("AMD", None, Some(4200.0)),
                trending("INTC", None, None),
            ],
            10,
        );
        assert!(rows[0].activity.ends_with("Volume: 1,250,000"));
        assert!(rows[1].activity.ends_with("Volume: 4,200"));
        assert!(rows[2].activity.ends_with(&format!("Volume: {}", PLACEHOLDER)));
        assert!(rows[0].activity.starts_with("Trades: 12 | Confidence: 78%"));
    }

    #[test]
    fn bar_ratio_is_clamped() {
        assert_eq!(bar_ratio(140.0), 1.0);
        assert_eq!(bar_ratio(-5.0), 0.0);
        assert_eq!(bar_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn market_changes_are_signed_and_toned() {
        let down = market_banner(&market_with(-0.5)).unwrap();
        assert_eq!(down.sp500.text, "-0.5%");
        assert_eq!(down.sp500.tone, Tone::Down);

        let up = market_banner(&market_with(1.2)).unwrap();
        assert_eq!(up.sp500.text, "+1.2%");
        assert_eq!(up.sp500.tone, Tone::Up);
        assert_eq!(up.nasdaq.text, PLACEHOLDER);
        assert_eq!(up.dow.text, PLACEHOLDER);

        let mut with_dow = market_with(0.3);
        if let Some(changes) = with_dow.market_changes.as_mut() {
            changes.dow = Some(-0.8);
        }
        let banner = market_banner(&with_dow).unwrap();
        assert_eq!(banner.dow.text, "-0.8%");
        assert_eq!(banner.dow.tone, Tone::Down);
    }

    #[test]
    fn empty_singletons_hide_their_banners() {
        assert!(market_banner(&MarketCondition::default()).is_none());
        assert!(meta_model_banner(&MetaModel::default(), 5).is_none());
    }

    #[test]
    fn meta_model_missing_fields_show_placeholder_not_fallback_numbers() {
        let meta = MetaModel {
            total_return: Some(15.64),
            ..Default::default()
        };
        let banner = meta_model_banner(&meta, 5).unwrap();
        assert_eq!(banner.total_return.text, "+15.64%");
        assert_eq!(banner.win_rate, PLACEHOLDER);
        assert_eq!(banner.current_capital, PLACEHOLDER);
        assert_eq!(banner.sharpe_ratio, PLACEHOLDER);
        assert_eq!(banner.max_drawdown, PLACEHOLDER);
        assert!(banner.subtitle.contains("5 robots"));
    }

    #[test]
    fn sector_rows_keep_backend_order() {
        let sectors = vec![
            SectorPerformance {
                sector: "Energy".to_string(),
                trade_count: 3,
                avg_confidence: 70.0,
                performance: -1.4,
                trend: SectorTrend::Down,
            },
            SectorPerformance {
                sector: "Technology".to_string(),
                trade_count: 9,
                avg_confidence: 81.5,
                performance: 2.3,
                trend: SectorTrend::Up,
            },
        ];
        let rows = sector_rows(&sectors);
        assert_eq!(rows[0].sector, "Energy");
        assert_eq!(rows[0].performance.tone, Tone::Down);
        assert_eq!(rows[0].trend.text, "▼");
        assert_eq!(rows[1].performance.text, "+2.3%");
        assert_eq!(rows[1].activity, "9 trades | confidence 81.5%");
    }

    #[test]
    fn leaderboard_badges_follow_position() {
        let users: Vec<PredictionUser> = (0..4)
            .map(|i| PredictionUser {
                user_name: format!("user{}", i),
                accuracy: 70.0,
                points: 2850.0,
                predictions_count: 45,
            })
            .collect();
        let rows = leaderboard_rows(&users);
        assert_eq!(rows[0].badge, RankBadge::Gold);
        assert_eq!(rows[1].badge, RankBadge::Silver);
        assert_eq!(rows[2].badge, RankBadge::Bronze);
        assert_eq!(rows[3].badge, RankBadge::Plain);
        assert_eq!(rows[3].position, 4);
        assert_eq!(rows[0].points, "2,850 pts");
    }

    #[test]
    fn market_indicators_use_placeholders_when_absent() {
        let indicators = market_indicators(&MarketCondition::default());
        assert_eq!(indicators.vix, PLACEHOLDER);
        assert_eq!(indicators.volume_trend, PLACEHOLDER);
        assert_eq!(indicators.news.text, "neutral");
    }

    #[test]
    fn footer_reports_unavailable_sources() {
        let mut state = DashboardState::default();
        assert_eq!(footer(&state, 30).last_update, "Loading…");
        assert!(footer(&state, 30).unavailable_note.is_none());

        state.unavailable = vec![
            crate::api::Resource::Robots,
            crate::api::Resource::MetaModel,
        ];
        assert_eq!(
            footer(&state, 30).unavailable_note.as_deref(),
            Some("2 sources unavailable")
        );
    }

    #[test]
    fn summary_lists_robots_in_order() {
        let state = DashboardState {
            robots: vec![robot(1, "A", 70.0), robot(2, "B", 55.0)],
            market_condition: market_with(-0.5),
            ..Default::default()
        };
        let lines = summary_lines(&state);
        assert!(lines[0].contains("sp500=-0.5%"));
        assert!(lines[1].starts_with("robot: A"));
        assert!(lines[2].starts_with("robot: B"));
    }

    #[test]
    fn summary_covers_detailed_trades_and_trending_stocks() {
        let state = DashboardState {
            detailed_trades: vec![detailed(42, "AAPL"), detailed(43, "MSFT")],
            trending_stocks: vec![trending("NVDA", Some(900.0), None)],
            ..Default::default()
        };
        let lines = summary_lines(&state);

        let trades: Vec<&String> = lines.iter().filter(|l| l.starts_with("trade #")).collect();
        assert_eq!(trades.len(), 2);
        assert!(trades[0].starts_with("trade #42: SELL AAPL $175.23 × 100"));
        assert!(trades[0].contains("conf=85%"));
        assert!(trades[0].contains("by Momentum Hunter"));
        assert!(trades[1].starts_with("trade #43"));

        let trending = lines.iter().find(|l| l.starts_with("trending:")).unwrap();
        assert!(trending.contains("NVDA $875.3 +2.4%"));
        assert!(trending.contains("Volume: 900"));
    }
}
