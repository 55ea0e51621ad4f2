//! Drawing
//!
//! Every function here takes the view models from `views` and `modal` and
//! turns them into ratatui widgets. Nothing is computed beyond layout, apart
//! from clamping the app's scroll offset to what the viewport can show.

use std::sync::Arc;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::types::{BadgeVariant, RankBadge, Tone};

use super::app::{App, Tab};
use super::format;
use super::modal::{DetailPanel, TradeDetail};
use super::views::{self, Badge, RobotCard, Toned};

const CARD_HEIGHT: u16 = 7;

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Up => Style::default().fg(Color::Green),
        Tone::Down => Style::default().fg(Color::Red),
        Tone::Neutral => Style::default(),
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn toned(value: &Toned) -> Span<'static> {
    Span::styled(value.text.clone(), tone_style(value.tone))
}

fn badge_style(variant: BadgeVariant) -> Style {
    match variant {
        BadgeVariant::Default => Style::default().fg(Color::Black).bg(Color::Cyan),
        BadgeVariant::Destructive => Style::default().fg(Color::White).bg(Color::Red),
        BadgeVariant::Secondary => Style::default().fg(Color::White).bg(Color::DarkGray),
        BadgeVariant::Outline => Style::default().fg(Color::Gray),
    }
}

fn badge(badge: &Badge) -> Span<'static> {
    let text = match badge.variant {
        BadgeVariant::Outline => format!("[{}]", badge.text),
        _ => format!(" {} ", badge.text),
    };
    Span::styled(text, badge_style(badge.variant))
}

fn rank_style(rank: RankBadge) -> Style {
    match rank {
        RankBadge::Gold => Style::default().fg(Color::Black).bg(Color::Yellow),
        RankBadge::Silver => Style::default().fg(Color::Black).bg(Color::Gray),
        RankBadge::Bronze => Style::default().fg(Color::Black).bg(Color::Rgb(205, 127, 50)),
        RankBadge::Plain => dim(),
    }
}

/// Clamp `scroll` so the last page stays full, returning the offset to draw from
fn clamp_scroll(scroll: &mut usize, total: usize, visible: usize) -> usize {
    *scroll = (*scroll).min(total.saturating_sub(visible));
    *scroll
}

/// Bottom-border note for a list that does not fit its area
fn overflow_note(offset: usize, shown: usize, total: usize, scrollable: bool) -> Option<Line<'static>> {
    if shown >= total {
        return None;
    }
    let text = if scrollable {
        format!(" {}-{} of {} · ↑/↓ scroll ", offset + 1, offset + shown, total)
    } else {
        format!(" +{} more ", total - shown)
    };
    Some(Line::styled(text, dim()))
}

/// Bordered list of same-height items. With `scroll` the list starts at the
/// app's offset; without it the overflow is only counted.
fn draw_overflowing_list<'a>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem<'a>>,
    item_height: u16,
    scroll: Option<&mut usize>,
) {
    let total = items.len();
    let visible = (area.height.saturating_sub(2) / item_height.max(1)).max(1) as usize;
    let scrollable = scroll.is_some();
    let offset = match scroll {
        Some(scroll) => clamp_scroll(scroll, total, visible),
        None => 0,
    };
    let shown = visible.min(total - offset);

    let mut block = Block::bordered().title(title.to_string());
    if let Some(note) = overflow_note(offset, shown, total, scrollable) {
        block = block.title_bottom(note);
    }
    let mut list_state = ListState::default().with_offset(offset);
    frame.render_stateful_widget(List::new(items).block(block), area, &mut list_state);
}

/// Draw the whole dashboard for one frame
pub fn draw(frame: &mut Frame, app: &mut App) {
    let state = Arc::clone(&app.state);
    let market = views::market_banner(&state.market_condition);
    let meta = views::meta_model_banner(&state.meta_model, state.robots.len());

    let mut constraints = vec![Constraint::Length(1)];
    if market.is_some() {
        constraints.push(Constraint::Length(3));
    }
    if meta.is_some() {
        constraints.push(Constraint::Length(4));
    }
    constraints.extend([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ]);
    let areas = Layout::vertical(constraints).split(frame.area());

    let mut slot = 0;
    draw_header(frame, areas[slot], app);
    slot += 1;
    if let Some(market) = &market {
        draw_market_banner(frame, areas[slot], market);
        slot += 1;
    }
    if let Some(meta) = &meta {
        draw_meta_banner(frame, areas[slot], meta);
        slot += 1;
    }
    draw_tabs(frame, areas[slot], app.tab);
    let body = areas[slot + 1];
    match app.tab {
        Tab::Robots => draw_robots(frame, body, app),
        Tab::Trades => draw_trades(frame, body, app),
        Tab::Market => draw_market(frame, body, app),
        Tab::Predictions => draw_predictions(frame, body, app),
    }
    draw_footer(frame, areas[slot + 2], app);

    if let Some(detail) = TradeDetail::build(app.selected.as_ref()) {
        draw_modal(frame, &detail);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            "AI Trading Robot Arena",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("● LIVE", Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::raw(format::date_time(&app.now)),
        Span::styled("  r refresh · q quit", dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_market_banner(frame: &mut Frame, area: Rect, market: &views::MarketBanner) {
    let line = Line::from(vec![
        Span::raw("Sentiment "),
        badge(&market.sentiment),
        Span::raw("   VIX "),
        Span::raw(market.vix.clone()),
        Span::raw("   S&P 500 "),
        toned(&market.sp500),
        Span::raw("   NASDAQ "),
        toned(&market.nasdaq),
        Span::raw("   DOW "),
        toned(&market.dow),
    ]);
    let block = Block::bordered().title("Market");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_meta_banner(frame: &mut Frame, area: Rect, meta: &views::MetaModelBanner) {
    let lines = vec![
        Line::styled(meta.subtitle.clone(), dim()),
        Line::from(vec![
            Span::raw("Return "),
            toned(&meta.total_return),
            Span::raw("   Win rate "),
            Span::raw(meta.win_rate.clone()),
            Span::raw("   Capital "),
            Span::raw(meta.current_capital.clone()),
            Span::raw("   Sharpe "),
            Span::raw(meta.sharpe_ratio.clone()),
            Span::raw("   Max DD "),
            Span::raw(meta.max_drawdown.clone()),
        ]),
    ];
    let block = Block::bordered().title("Meta model");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, active: Tab) {
    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::bordered())
        .select(active.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = Block::bordered().title(title.to_string());
    frame.render_widget(Paragraph::new(Line::styled(message.to_string(), dim())).block(block), area);
}

// ─────────────────────────────────────────────────────────────────
// Robots
// ─────────────────────────────────────────────────────────────────

fn draw_robots(frame: &mut Frame, area: Rect, app: &mut App) {
    let cards = views::robot_cards(&app.state.robots);
    if cards.is_empty() {
        draw_empty(frame, area, "Robots", "No robots yet");
        return;
    }

    let columns: usize = match area.width {
        w if w >= 120 => 3,
        w if w >= 80 => 2,
        _ => 1,
    };
    let total_rows = cards.len().div_ceil(columns);
    let mut grid = area;
    let mut visible_rows = (grid.height / CARD_HEIGHT).max(1) as usize;

    // Scroll whole card rows, keeping one line for the position note
    if total_rows > visible_rows {
        let [cards_area, note_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        grid = cards_area;
        visible_rows = (grid.height / CARD_HEIGHT).max(1) as usize;

        let offset = clamp_scroll(&mut app.scroll, total_rows, visible_rows);
        let first = offset * columns;
        let shown = (visible_rows * columns).min(cards.len() - first);
        if let Some(note) = overflow_note(first, shown, cards.len(), true) {
            frame.render_widget(Paragraph::new(note), note_area);
        }
    } else {
        app.scroll = 0;
    }

    let rows = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(grid);
    let chunks = cards.chunks(columns).skip(app.scroll);
    for (row_area, chunk) in rows.iter().zip(chunks) {
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for (cell, card) in cells.iter().zip(chunk) {
            draw_robot_card(frame, *cell, card);
        }
    }
}

fn draw_robot_card(frame: &mut Frame, area: Rect, card: &RobotCard) {
    let block = Block::bordered().title(Span::styled(
        card.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [kind, figures, ratios, bar, description] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(card.strategy.clone()),
            Span::raw(" "),
            badge(&card.risk),
            Span::raw(" "),
            badge(&card.status),
        ])),
        kind,
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Return "),
            toned(&card.total_return),
            Span::raw("  Capital "),
            Span::raw(card.current_capital.clone()),
        ])),
        figures,
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Sharpe "),
            Span::raw(card.sharpe_ratio.clone()),
            Span::raw("  MDD "),
            Span::raw(card.max_drawdown.clone()),
            Span::styled(format!("  Start {}", card.initial_capital), dim()),
        ])),
        ratios,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .ratio(card.win_rate_ratio)
            .label(format!("Win rate {}", card.win_rate)),
        bar,
    );
    frame.render_widget(
        Paragraph::new(Line::styled(card.description.clone(), dim())).wrap(Wrap { trim: true }),
        description,
    );
}

// ─────────────────────────────────────────────────────────────────
// Trades
// ─────────────────────────────────────────────────────────────────

fn draw_trades(frame: &mut Frame, area: Rect, app: &App) {
    // Arrow keys drive the analysis cursor here, so the feeds only count overflow
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
    let [live, trending] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(left);

    draw_live_trades(frame, live, app);
    draw_trending(frame, trending, app);
    draw_detailed_trades(frame, right, app);
}

fn draw_live_trades(frame: &mut Frame, area: Rect, app: &App) {
    let rows = views::live_trade_rows(&app.state.live_trades);
    if rows.is_empty() {
        draw_empty(frame, area, "Live trades", "No trades yet");
        return;
    }
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let mut spans = vec![
                badge(&row.side),
                Span::raw(" "),
                Span::styled(row.symbol.clone(), tone_style(row.tone).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {} ", row.price)),
                Span::raw(row.robot.clone()),
            ];
            if !row.detail.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", row.detail),
                    Style::default().fg(Color::Cyan),
                ));
            }
            spans.push(Span::styled(format!("  {}", row.time_ago), dim()));
            ListItem::new(Line::from(spans))
        })
        .collect();
    draw_overflowing_list(frame, area, "Live trades", items, 1, None);
}

fn draw_trending(frame: &mut Frame, area: Rect, app: &App) {
    let rows = views::trending_rows(&app.state.trending_stocks, app.trending_shown);
    if rows.is_empty() {
        draw_empty(frame, area, "Trending", "Nothing trending");
        return;
    }
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(row.symbol.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    badge(&row.sector),
                    Span::raw(format!(" {} ", row.price)),
                    toned(&row.change),
                ]),
                Line::styled(format!("{} · {}", row.company, row.activity), dim()),
            ])
        })
        .collect();
    draw_overflowing_list(frame, area, "Trending", items, 2, None);
}

fn draw_detailed_trades(frame: &mut Frame, area: Rect, app: &App) {
    let rows = views::detailed_trade_rows(app.visible_trades(), app.trades_shown);
    if rows.is_empty() {
        draw_empty(frame, area, "Trade analysis", "No analyzed trades yet");
        return;
    }
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            ListItem::new(vec![
                Line::from(vec![
                    badge(&row.side),
                    Span::raw(" "),
                    Span::styled(row.symbol.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" {} ", row.sector)),
                    Span::styled(format!("conf {}", row.confidence), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("  {}", row.time), dim()),
                ]),
                Line::from(format!("  {} · {}", row.robot, row.price_quantity)),
                Line::styled(format!("  {}", row.reason), dim()),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::bordered()
                .title("Trade analysis")
                .title_bottom(Line::styled(" ↑/↓ select · Enter details ", dim())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(app.cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

// ─────────────────────────────────────────────────────────────────
// Market
// ─────────────────────────────────────────────────────────────────

fn draw_market(frame: &mut Frame, area: Rect, app: &mut App) {
    let [sectors_area, indicators_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

    let rows = views::sector_rows(&app.state.sector_performance);
    if rows.is_empty() {
        draw_empty(frame, sectors_area, "Sectors", "No sector data");
    } else {
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                ListItem::new(vec![
                    Line::from(vec![
                        toned(&row.trend),
                        Span::raw(" "),
                        Span::styled(row.sector.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw("  "),
                        toned(&row.performance),
                    ]),
                    Line::styled(format!("  {}", row.activity), dim()),
                ])
            })
            .collect();
        draw_overflowing_list(frame, sectors_area, "Sectors", items, 2, Some(&mut app.scroll));
    }

    let indicators = views::market_indicators(&app.state.market_condition);
    let lines = vec![
        Line::from(vec![Span::raw("VIX           "), Span::raw(indicators.vix)]),
        Line::from(vec![
            Span::raw("Volume trend  "),
            Span::raw(indicators.volume_trend),
        ]),
        Line::from(vec![Span::raw("News          "), toned(&indicators.news)]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Indicators")),
        indicators_area,
    );
}

// ─────────────────────────────────────────────────────────────────
// Predictions
// ─────────────────────────────────────────────────────────────────

fn draw_predictions(frame: &mut Frame, area: Rect, app: &mut App) {
    let rows = views::leaderboard_rows(&app.state.leaderboard);
    if rows.is_empty() {
        draw_empty(frame, area, "Leaderboard", "No predictions yet");
        return;
    }
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{} ", row.position), rank_style(row.badge)),
                Span::raw(" "),
                Span::styled(row.user.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("  {}  ", row.accuracy)),
                Span::styled(row.points.clone(), Style::default().fg(Color::Yellow)),
                Span::styled(format!("  {}", row.predictions), dim()),
            ]))
        })
        .collect();
    draw_overflowing_list(frame, area, "Leaderboard", items, 1, Some(&mut app.scroll));
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let footer = views::footer(&app.state, app.interval_secs);
    let mut spans = vec![
        Span::raw(footer.last_update),
        Span::raw(" · "),
        Span::raw(footer.robots_note),
    ];
    if let Some(note) = footer.unavailable_note {
        spans.push(Span::styled(format!("  ({})", note), Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans).style(dim())), area);
}

// ─────────────────────────────────────────────────────────────────
// Modal
// ─────────────────────────────────────────────────────────────────

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, popup, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);
    popup
}

fn draw_modal(frame: &mut Frame, detail: &TradeDetail) {
    let popup = popup_area(frame.area(), 90, 85);
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(Span::styled(
            detail.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(" Esc/Enter close ", dim()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [top, bottom] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(inner);
    let [a, b] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
    let [c, d] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom);

    for (panel, area) in detail.panels.iter().zip([a, b, c, d]) {
        draw_panel(frame, area, panel);
    }
}

fn draw_panel(frame: &mut Frame, area: Rect, panel: &DetailPanel) {
    let lines: Vec<Line> = panel
        .rows
        .iter()
        .map(|row| {
            let value = match row.badge {
                Some(variant) => badge(&Badge::new(row.value.clone(), variant)),
                None => Span::styled(row.value.clone(), tone_style(row.tone)),
            };
            Line::from(vec![Span::styled(format!("{:<16}", row.label), dim()), value])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(panel.title)),
        area,
    );
}
