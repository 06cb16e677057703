use crate::params::FeedParams;
use crate::series::{self, PricePoint};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokensim_core::model::PropertyId;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// A continuously-updating synthetic price series for one asset.
///
/// Construction backfills the full window; [`PriceFeed::spawn_ticker`] then
/// appends one live point per interval and drops the oldest, so the window
/// length is invariant. Every appended point is broadcast to subscribers.
pub struct PriceFeed {
    asset: PropertyId,
    params: FeedParams,
    window: Mutex<VecDeque<PricePoint>>,
    rng: Mutex<StdRng>,
    sender: broadcast::Sender<PricePoint>,
}

impl PriceFeed {
    pub fn new(asset: PropertyId, params: FeedParams) -> Self {
        Self::with_rng(asset, params, StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    pub fn with_seed(asset: PropertyId, params: FeedParams, seed: u64) -> Self {
        Self::with_rng(asset, params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(asset: PropertyId, params: FeedParams, mut rng: StdRng) -> Self {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window = series::backfill(&params, now_ms, &mut rng);
        let (sender, _) = broadcast::channel(64);

        Self {
            asset,
            params,
            window: Mutex::new(window.into()),
            rng: Mutex::new(rng),
            sender,
        }
    }

    pub fn asset(&self) -> &PropertyId {
        &self.asset
    }

    pub fn params(&self) -> &FeedParams {
        &self.params
    }

    /// Snapshot of the current window, oldest first.
    pub fn series(&self) -> Vec<PricePoint> {
        self.window().iter().copied().collect()
    }

    /// Most recent point, or `None` when there is no data yet.
    pub fn latest(&self) -> Option<PricePoint> {
        self.window().back().copied()
    }

    /// Default unit price for an order form, in cents. Only a suggestion;
    /// submitted orders carry their own explicit price.
    pub fn suggested_price_cents(&self) -> Option<i64> {
        self.latest().map(|p| (p.price * 100.0).round() as i64)
    }

    /// New points only; pair with [`PriceFeed::series`] for the backfill.
    pub fn subscribe(&self) -> broadcast::Receiver<PricePoint> {
        self.sender.subscribe()
    }

    /// Advances the walk by one live point, sliding the window. Returns the
    /// appended point, or `None` when the window holds no data to walk from.
    pub fn tick(&self) -> Option<PricePoint> {
        let mut window = self.window();
        let last = window.back().copied()?;

        let price = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            series::next_price(last.price, &self.params, &mut *rng)
        };
        let point = PricePoint {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            price,
        };

        window.push_back(point);
        while window.len() > self.params.points {
            window.pop_front();
        }
        drop(window);

        let _ = self.sender.send(point);
        Some(point)
    }

    /// Starts the live ticker on the range's interval. Dropping the returned
    /// handle stops it.
    pub fn spawn_ticker(self: Arc<Self>) -> FeedHandle {
        let period = self.params.range.tick_interval();
        let feed = self;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of a tokio interval fires immediately; the
            // backfill already holds "now", so skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if feed.tick().is_none() {
                    debug!("PriceFeed[{}]: no data to walk from", feed.asset);
                }
            }
        });

        FeedHandle { task }
    }

    fn window(&self) -> MutexGuard<'_, VecDeque<PricePoint>> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unsubscribe handle for a live ticker; aborts the task when dropped.
pub struct FeedHandle {
    task: JoinHandle<()>,
}

impl FeedHandle {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
