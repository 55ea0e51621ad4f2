//! Refresh Controller
//!
//! Polls all eight resources on a fixed interval, plus on demand. A cycle
//! issues every request at once and waits for all of them to settle; a
//! failed resource falls back to its empty default without touching the
//! others. The finished state is published in one replacement so readers
//! never see slices from two different cycles.

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::DashboardState;
use crate::api::{ApiError, DashboardApi, Resource};

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Scheduled,
    Manual,
}

/// Owns the fetch routine and, once spawned, the published state
pub struct RefreshController<A> {
    api: Arc<A>,
    interval: Duration,
    trades_limit: usize,
}

impl<A: DashboardApi + 'static> RefreshController<A> {
    pub fn new(api: Arc<A>, interval: Duration, trades_limit: usize) -> Self {
        Self {
            api,
            interval,
            trades_limit,
        }
    }

    /// Fetch all resources concurrently and assemble the next state
    pub async fn run_cycle(&self, cycle: u64) -> DashboardState {
        let started_at = Local::now();
        let api = self.api.as_ref();

        let (robots, detailed, live, market, sectors, trending, leaderboard, meta) = tokio::join!(
            api.robots(),
            api.detailed_trades(self.trades_limit),
            api.live_trades(),
            api.market_condition(),
            api.sector_performance(),
            api.trending_stocks(),
            api.leaderboard(),
            api.meta_model(),
        );

        let mut unavailable = Vec::new();
        let state = DashboardState {
            robots: settle(Resource::Robots, robots, &mut unavailable),
            detailed_trades: settle(Resource::DetailedTrades, detailed, &mut unavailable),
            live_trades: settle(Resource::LiveTrades, live, &mut unavailable),
            market_condition: settle(Resource::MarketCondition, market, &mut unavailable),
            sector_performance: settle(Resource::SectorPerformance, sectors, &mut unavailable),
            trending_stocks: settle(Resource::TrendingStocks, trending, &mut unavailable),
            leaderboard: settle(Resource::Leaderboard, leaderboard, &mut unavailable),
            meta_model: settle(Resource::MetaModel, meta, &mut unavailable),
            refreshed_at: Some(started_at),
            cycle,
            unavailable,
        };

        info!(
            cycle,
            robots = state.robots.len(),
            trades = state.detailed_trades.len(),
            unavailable = state.unavailable.len(),
            "Refresh cycle complete"
        );
        state
    }

    /// Start the periodic task. The first cycle runs immediately.
    pub fn spawn(self) -> RefreshHandle {
        let (state_tx, state_rx) = watch::channel(Arc::new(DashboardState::default()));
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(self.run(state_tx, refresh_rx, shutdown_rx));

        RefreshHandle {
            state_rx,
            refresh_tx,
            shutdown_tx,
            task,
        }
    }

    async fn run(
        self,
        state_tx: watch::Sender<Arc<DashboardState>>,
        mut refresh_rx: mpsc::Receiver<()>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        info!(interval_secs = self.interval.as_secs(), "Refresh loop started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle = 0_u64;

        loop {
            let trigger = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => Trigger::Scheduled,
                Some(()) = refresh_rx.recv() => Trigger::Manual,
            };
            // Requests queued before this cycle starts are served by it
            while refresh_rx.try_recv().is_ok() {}

            cycle += 1;
            debug!(cycle, ?trigger, "Starting refresh cycle");

            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!(cycle, "Shutdown during refresh, discarding in-flight results");
                    break;
                }
                state = self.run_cycle(cycle) => {
                    state_tx.send_replace(Arc::new(state));
                }
            }
        }

        info!("Refresh loop stopped");
    }
}

fn settle<T: Default>(
    resource: Resource,
    result: Result<T, ApiError>,
    unavailable: &mut Vec<Resource>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(resource = %resource, error = %e, "Resource unavailable, using empty default");
            unavailable.push(resource);
            T::default()
        }
    }
}

/// Control surface of a spawned refresh task
#[derive(Debug)]
pub struct RefreshHandle {
    state_rx: watch::Receiver<Arc<DashboardState>>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Receiver that wakes on every published state
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.state_rx.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.state_rx.borrow().clone()
    }

    /// Run a cycle now, out of band. Does not move the schedule.
    pub fn refresh(&self) {
        match self.refresh_tx.try_send(()) {
            Ok(()) => debug!("Manual refresh requested"),
            Err(TrySendError::Full(())) => debug!("Manual refresh already queued"),
            Err(TrySendError::Closed(())) => warn!("Manual refresh ignored, loop has stopped"),
        }
    }

    /// Stop the timer and wait for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            warn!("Refresh task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::*;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::Instant;

    fn robot(id: i64, name: &str) -> Robot {
        Robot {
            id,
            name: name.to_string(),
            strategy_type: String::new(),
            risk_level: Default::default(),
            description: String::new(),
            total_return: 0.0,
            win_rate: 50.0,
            current_capital: None,
            sharpe_ratio: None,
            initial_capital: None,
            max_drawdown: None,
            is_active: None,
        }
    }

    fn backend_down(resource: Resource) -> ApiError {
        ApiError::Unsuccessful {
            resource,
            message: "backend down".to_string(),
        }
    }

    fn failing_mock() -> MockDashboardApi {
        let mut api = MockDashboardApi::new();
        api.expect_robots()
            .returning(|| Err(backend_down(Resource::Robots)));
        api.expect_detailed_trades()
            .returning(|_| Err(backend_down(Resource::DetailedTrades)));
        api.expect_live_trades()
            .returning(|| Err(backend_down(Resource::LiveTrades)));
        api.expect_market_condition()
            .returning(|| Err(backend_down(Resource::MarketCondition)));
        api.expect_sector_performance()
            .returning(|| Err(backend_down(Resource::SectorPerformance)));
        api.expect_trending_stocks()
            .returning(|| Err(backend_down(Resource::TrendingStocks)));
        api.expect_leaderboard()
            .returning(|| Err(backend_down(Resource::Leaderboard)));
        api.expect_meta_model()
            .returning(|| Err(backend_down(Resource::MetaModel)));
        api
    }

    #[tokio::test]
    async fn every_failing_resource_yields_its_empty_default() {
        let controller =
            RefreshController::new(Arc::new(failing_mock()), Duration::from_secs(30), 20);

        let state = controller.run_cycle(1).await;

        assert!(state.robots.is_empty());
        assert!(state.detailed_trades.is_empty());
        assert!(state.live_trades.is_empty());
        assert!(state.market_condition.is_empty());
        assert!(state.sector_performance.is_empty());
        assert!(state.trending_stocks.is_empty());
        assert!(state.leaderboard.is_empty());
        assert!(state.meta_model.is_empty());
        assert_eq!(state.unavailable.len(), 8);
        for resource in Resource::ALL {
            assert!(state.unavailable.contains(&resource), "{} missing", resource);
        }
        assert_eq!(state.cycle, 1);
        assert!(state.refreshed_at.is_some());
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_the_other_resources() {
        let mut api = MockDashboardApi::new();
        api.expect_robots()
            .returning(|| Ok(vec![robot(1, "Momentum Master"), robot(2, "Value Hunter")]));
        api.expect_detailed_trades()
            .with(eq(20))
            .times(1)
            .returning(|_| Err(backend_down(Resource::DetailedTrades)));
        api.expect_live_trades().returning(|| Ok(Vec::new()));
        api.expect_market_condition().returning(|| {
            Ok(MarketCondition {
                vix_level: Some(22.5),
                ..Default::default()
            })
        });
        api.expect_sector_performance().returning(|| Ok(Vec::new()));
        api.expect_trending_stocks().returning(|| Ok(Vec::new()));
        api.expect_leaderboard().returning(|| Ok(Vec::new()));
        api.expect_meta_model().returning(|| {
            Ok(MetaModel {
                win_rate: Some(69.2),
                ..Default::default()
            })
        });

        let controller = RefreshController::new(Arc::new(api), Duration::from_secs(30), 20);
        let state = controller.run_cycle(3).await;

        assert_eq!(state.robots.len(), 2);
        assert_eq!(state.robots[0].name, "Momentum Master");
        assert!(state.detailed_trades.is_empty());
        assert_eq!(state.market_condition.vix_level, Some(22.5));
        assert_eq!(state.meta_model.win_rate, Some(69.2));
        assert_eq!(state.unavailable, vec![Resource::DetailedTrades]);
    }

    /// Answers every call with data stamped by how often that method has
    /// been called, so all slices of one cycle carry the same number.
    #[derive(Default)]
    struct GenerationApi {
        robots: AtomicU64,
        detailed: AtomicU64,
        live: AtomicU64,
        market: AtomicU64,
        sectors: AtomicU64,
        trending: AtomicU64,
        leaderboard: AtomicU64,
        meta: AtomicU64,
    }

    impl GenerationApi {
        fn next(counter: &AtomicU64) -> u64 {
            counter.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn total_calls(&self) -> u64 {
            [
                &self.robots,
                &self.detailed,
                &self.live,
                &self.market,
                &self.sectors,
                &self.trending,
                &self.leaderboard,
                &self.meta,
            ]
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
        }
    }

    #[async_trait]
    impl DashboardApi for GenerationApi {
        async fn robots(&self) -> Result<Vec<Robot>, ApiError> {
            let generation = Self::next(&self.robots);
            Ok(vec![robot(generation as i64, "gen")])
        }

        async fn detailed_trades(&self, _limit: usize) -> Result<Vec<DetailedTrade>, ApiError> {
            let generation = Self::next(&self.detailed);
            Ok(vec![DetailedTrade {
                id: generation as i64,
                symbol: "AAPL".to_string(),
                company_name: None,
                trade_type: Default::default(),
                quantity: 1.0,
                price: 1.0,
                total_amount: 1.0,
                robot_id: None,
                robot_name: None,
                sector: None,
                market_cap: None,
                confidence_score: None,
                reason: None,
                market_condition: None,
                trade_strategy: None,
                technical_indicators: None,
                market_data: None,
                trade_date: None,
            }])
        }

        async fn live_trades(&self) -> Result<Vec<LiveTrade>, ApiError> {
            let generation = Self::next(&self.live);
            Ok(vec![LiveTrade {
                symbol: "MSFT".to_string(),
                trade_type: Default::default(),
                price: generation as f64,
                robot_name: String::new(),
                time_ago: String::new(),
                quantity: None,
                confidence_score: None,
            }])
        }

        async fn market_condition(&self) -> Result<MarketCondition, ApiError> {
            let generation = Self::next(&self.market);
            Ok(MarketCondition {
                vix_level: Some(generation as f64),
                ..Default::default()
            })
        }

        async fn sector_performance(&self) -> Result<Vec<SectorPerformance>, ApiError> {
            let generation = Self::next(&self.sectors);
            Ok(vec![SectorPerformance {
                sector: "Tech".to_string(),
                trade_count: generation,
                avg_confidence: 0.0,
                performance: 0.0,
                trend: Default::default(),
            }])
        }

        async fn trending_stocks(&self) -> Result<Vec<TrendingStock>, ApiError> {
            let generation = Self::next(&self.trending);
            Ok(vec![TrendingStock {
                symbol: "NVDA".to_string(),
                company_name: String::new(),
                current_price: 0.0,
                change_percent: 0.0,
                trade_count: generation,
                avg_confidence: 0.0,
                sector: String::new(),
                total_volume: None,
                volume: None,
            }])
        }

        async fn leaderboard(&self) -> Result<Vec<PredictionUser>, ApiError> {
            let generation = Self::next(&self.leaderboard);
            Ok(vec![PredictionUser {
                user_name: "kim".to_string(),
                accuracy: 0.0,
                points: 0.0,
                predictions_count: generation,
            }])
        }

        async fn meta_model(&self) -> Result<MetaModel, ApiError> {
            let generation = Self::next(&self.meta);
            Ok(MetaModel {
                win_rate: Some(generation as f64),
                ..Default::default()
            })
        }
    }

    fn generations(state: &DashboardState) -> Vec<u64> {
        vec![
            state.robots[0].id as u64,
            state.detailed_trades[0].id as u64,
            state.live_trades[0].price as u64,
            state.market_condition.vix_level.unwrap_or_default() as u64,
            state.sector_performance[0].trade_count,
            state.trending_stocks[0].trade_count,
            state.leaderboard[0].predictions_count,
            state.meta_model.win_rate.unwrap_or_default() as u64,
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn published_states_never_mix_cycles() {
        let api = Arc::new(GenerationApi::default());
        let handle = RefreshController::new(api, Duration::from_secs(30), 20).spawn();
        let mut rx = handle.subscribe();

        for expected in 1..=4_u64 {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            assert_eq!(state.cycle, expected);
            assert!(generations(&state).iter().all(|g| *g == expected));
            handle.refresh();
        }

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_refresh_fires_on_interval_and_stops_after_shutdown() {
        let api = Arc::new(GenerationApi::default());
        let handle =
            RefreshController::new(api.clone(), Duration::from_secs(30), 20).spawn();
        let mut rx = handle.subscribe();
        let start = Instant::now();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(30));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(60));

        handle.shutdown().await;
        let calls_at_shutdown = api.total_calls();
        assert_eq!(calls_at_shutdown, 24);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.total_calls(), calls_at_shutdown);
        assert_eq!(rx.borrow().cycle, 3);
        assert!(rx.has_changed().is_err(), "sender should be gone after shutdown");
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_runs_out_of_band_without_moving_the_schedule() {
        let api = Arc::new(GenerationApi::default());
        let handle = RefreshController::new(api, Duration::from_secs(30), 20).spawn();
        let mut rx = handle.subscribe();
        let start = Instant::now();

        rx.changed().await.unwrap();
        rx.borrow_and_update();

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.refresh();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(10));

        // the scheduled tick still lands on the original 30s baseline
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(30));

        handle.shutdown().await;
    }

    /// Takes 20s to answer the robots call, everything else is immediate
    #[derive(Default)]
    struct SlowApi {
        inner: GenerationApi,
    }

    #[async_trait]
    impl DashboardApi for SlowApi {
        async fn robots(&self) -> Result<Vec<Robot>, ApiError> {
            tokio::time::sleep(Duration::from_secs(20)).await;
            self.inner.robots().await
        }
        async fn detailed_trades(&self, limit: usize) -> Result<Vec<DetailedTrade>, ApiError> {
            self.inner.detailed_trades(limit).await
        }
        async fn live_trades(&self) -> Result<Vec<LiveTrade>, ApiError> {
            self.inner.live_trades().await
        }
        async fn market_condition(&self) -> Result<MarketCondition, ApiError> {
            self.inner.market_condition().await
        }
        async fn sector_performance(&self) -> Result<Vec<SectorPerformance>, ApiError> {
            self.inner.sector_performance().await
        }
        async fn trending_stocks(&self) -> Result<Vec<TrendingStock>, ApiError> {
            self.inner.trending_stocks().await
        }
        async fn leaderboard(&self) -> Result<Vec<PredictionUser>, ApiError> {
            self.inner.leaderboard().await
        }
        async fn meta_model(&self) -> Result<MetaModel, ApiError> {
            self.inner.meta_model().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn request_queued_behind_a_due_tick_runs_one_cycle_not_two() {
        let api = Arc::new(SlowApi::default());
        let handle = RefreshController::new(api, Duration::from_secs(30), 20).spawn();
        let mut rx = handle.subscribe();
        let start = Instant::now();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(20));

        // Cycle 2 runs 20s..40s, across the 30s tick
        handle.refresh();
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.refresh();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(40));

        // The overdue tick and the queued request share cycle 3
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(60));

        // Nothing left queued, so cycle 4 waits for the 70s tick
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cycle, 4);
        assert_eq!(start.elapsed(), Duration::from_secs(90));

        handle.shutdown().await;
    }

    /// Never answers the robots call
    struct StuckApi;

    #[async_trait]
    impl DashboardApi for StuckApi {
        async fn robots(&self) -> Result<Vec<Robot>, ApiError> {
            std::future::pending().await
        }
        async fn detailed_trades(&self, _limit: usize) -> Result<Vec<DetailedTrade>, ApiError> {
            Ok(Vec::new())
        }
        async fn live_trades(&self) -> Result<Vec<LiveTrade>, ApiError> {
            Ok(Vec::new())
        }
        async fn market_condition(&self) -> Result<MarketCondition, ApiError> {
            Ok(MarketCondition::default())
        }
        async fn sector_performance(&self) -> Result<Vec<SectorPerformance>, ApiError> {
            Ok(Vec::new())
        }
        async fn trending_stocks(&self) -> Result<Vec<TrendingStock>, ApiError> {
            Ok(Vec::new())
        }
        async fn leaderboard(&self) -> Result<Vec<PredictionUser>, ApiError> {
            Ok(Vec::new())
        }
        async fn meta_model(&self) -> Result<MetaModel, ApiError> {
            Ok(MetaModel::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_an_in_flight_cycle() {
        let handle =
            RefreshController::new(Arc::new(StuckApi), Duration::from_secs(30), 20).spawn();
        tokio::task::yield_now().await;

        handle.refresh();
        let snapshot_before = handle.snapshot();
        let rx = handle.subscribe();
        handle.shutdown().await;

        assert!(snapshot_before.is_initial());
        assert!(rx.borrow().is_initial());
    }
}
