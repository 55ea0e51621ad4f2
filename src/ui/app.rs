//! Terminal App
//!
//! UI-local state (active tab, detailed-trade cursor, scroll, open modal) and the
//! event loop that ties key presses, published states and the clock
//! together. The dashboard state itself is never mutated here.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::DetailedTrade;
use crate::config::AppConfig;
use crate::dashboard::{DashboardState, RefreshHandle};

use super::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Robots,
    Trades,
    Market,
    Predictions,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Robots, Tab::Trades, Tab::Market, Tab::Predictions];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Robots => "Robots",
            Tab::Trades => "Trades",
            Tab::Market => "Market",
            Tab::Predictions => "Predictions",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Robots => 0,
            Tab::Trades => 1,
            Tab::Market => 2,
            Tab::Predictions => 3,
        }
    }

    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
}

#[derive(Debug)]
pub struct App {
    pub state: Arc<DashboardState>,
    pub tab: Tab,
    /// Index into the visible detailed trades
    pub cursor: usize,
    /// First visible robot row, sector or leaderboard entry on the active tab.
    /// The draw pulls it back so the last page stays full.
    pub scroll: usize,
    /// Trade shown in the detail modal
    pub selected: Option<DetailedTrade>,
    pub now: DateTime<Local>,
    pub trades_shown: usize,
    pub trending_shown: usize,
    pub interval_secs: u64,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            state: Arc::new(DashboardState::default()),
            tab: Tab::default(),
            cursor: 0,
            scroll: 0,
            selected: None,
            now: Local::now(),
            trades_shown: config.ui.detailed_trades_shown,
            trending_shown: config.ui.trending_shown,
            interval_secs: config.refresh.interval_secs,
        }
    }

    /// Swap in a newly published state. An open modal keeps its own copy of
    /// the trade, so it stays put even if the trade scrolled out of the feed.
    pub fn apply_state(&mut self, state: Arc<DashboardState>) {
        self.state = state;
        self.clamp_cursor();
        self.scroll = self.scroll.min(self.scroll_len().saturating_sub(1));
    }

    /// The slice of the detailed-trade feed that is on screen
    pub fn visible_trades(&self) -> &[DetailedTrade] {
        let trades = &self.state.detailed_trades;
        &trades[..trades.len().min(self.trades_shown)]
    }

    pub fn highlighted(&self) -> Option<&DetailedTrade> {
        self.visible_trades().get(self.cursor)
    }

    pub fn modal_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn open_modal(&mut self) {
        self.selected = self.highlighted().cloned();
    }

    pub fn close_modal(&mut self) {
        self.selected = None;
    }

    /// Entries the arrow keys scroll through on the active tab
    fn scroll_len(&self) -> usize {
        match self.tab {
            Tab::Robots => self.state.robots.len(),
            Tab::Trades => 0,
            Tab::Market => self.state.sector_performance.len(),
            Tab::Predictions => self.state.leaderboard.len(),
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.scroll_len().saturating_sub(1) as isize;
        self.scroll = (self.scroll as isize + delta).clamp(0, max) as usize;
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab != self.tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_trades().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_trades().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if self.modal_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.close_modal();
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('r') => return Action::Refresh,
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.switch_tab(Tab::ALL[index]);
            }
            KeyCode::Up | KeyCode::Char('k') if self.tab == Tab::Trades => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') if self.tab == Tab::Trades => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Enter if self.tab == Tab::Trades => self.open_modal(),
            _ => {}
        }
        Action::None
    }
}

/// Drive the terminal until the user quits or the refresh task goes away
pub async fn run(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    handle: &RefreshHandle,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    let mut state_rx = handle.subscribe();
    app.apply_state(state_rx.borrow_and_update().clone());

    let mut events = EventStream::new();
    let mut ticker = interval(tick_rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        terminal.draw(|frame| render::draw(frame, app))?;

        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    warn!("Refresh task stopped, leaving the dashboard");
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                debug!(cycle = state.cycle, "State received");
                app.apply_state(state);
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match app.handle_key(key) {
                        Action::Quit => {
                            info!("Quit requested");
                            break;
                        }
                        Action::Refresh => handle.refresh(),
                        Action::None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            _ = ticker.tick() => {
                app.now = Local::now();
            }
        }
    }

    Ok(())
}
