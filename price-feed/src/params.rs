use std::time::Duration;

/// Directional bias of the simulated walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Per-tick drift applied in forward (live) direction.
    pub(crate) fn drift(self) -> f64 {
        match self {
            Trend::Up => 0.0008,
            Trend::Down => -0.0008,
            Trend::Flat => 0.0,
        }
    }
}

/// Chart range. Wider ranges use larger per-step volatility (macro noise) and
/// slower live ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Live tick cadence: shortest for the intraday view.
    pub fn tick_interval(self) -> Duration {
        match self {
            TimeRange::Day => Duration::from_secs(2),
            TimeRange::Week => Duration::from_secs(5),
            TimeRange::Month => Duration::from_secs(10),
            TimeRange::Year => Duration::from_secs(30),
        }
    }

    /// Maximum relative step size of the backfill walk, before volatility
    /// scaling.
    pub(crate) fn step_scale(self) -> f64 {
        match self {
            TimeRange::Day => 0.004,
            TimeRange::Week => 0.008,
            TimeRange::Month => 0.012,
            TimeRange::Year => 0.02,
        }
    }

    /// Wall-clock spacing between backfilled points so the series spans the
    /// whole range.
    pub(crate) fn point_spacing_ms(self, points: usize) -> i64 {
        let span_ms: i64 = match self {
            TimeRange::Day => 24 * 60 * 60 * 1000,
            TimeRange::Week => 7 * 24 * 60 * 60 * 1000,
            TimeRange::Month => 30 * 24 * 60 * 60 * 1000,
            TimeRange::Year => 365 * 24 * 60 * 60 * 1000,
        };
        span_ms / points.max(1) as i64
    }
}

/// Parameters of one asset's simulated feed.
#[derive(Debug, Clone, Copy)]
pub struct FeedParams {
    pub base_price: f64,
    /// Noise amplitude, clamped into `[0, 1]` at use sites.
    pub volatility: f64,
    pub trend: Trend,
    pub range: TimeRange,
    /// Sliding window length; backfill produces exactly this many points.
    pub points: usize,
}

impl FeedParams {
    pub(crate) fn clamped_volatility(&self) -> f64 {
        self.volatility.clamp(0.0, 1.0)
    }
}

impl Default for FeedParams {
    fn default() -> Self {
        Self {
            base_price: 100.0,
            volatility: 0.5,
            trend: Trend::Flat,
            range: TimeRange::Day,
            points: 150,
        }
    }
}
