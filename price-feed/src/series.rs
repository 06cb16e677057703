use crate::params::FeedParams;
use rand::Rng;
use serde::Serialize;

/// Prices never fall through this floor, mirroring how the walk is kept away
/// from zero and negative territory.
pub const PRICE_FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Generates the historical window, walking backward in time from
/// `base_price` at `now_ms`. The drift is applied opposite to the configured
/// trend because generation runs backward.
pub(crate) fn backfill(params: &FeedParams, now_ms: i64, rng: &mut impl Rng) -> Vec<PricePoint> {
    let step = params.range.step_scale() * params.clamped_volatility();
    let spacing = params.range.point_spacing_ms(params.points);

    let mut series = Vec::with_capacity(params.points);
    let mut price = params.base_price.max(PRICE_FLOOR);

    for i in 0..params.points {
        let timestamp_ms = now_ms - spacing * i as i64;
        series.push(PricePoint {
            timestamp_ms,
            price,
        });

        let noise = rng.gen_range(-step..=step);
        price = sanitize(price * (1.0 - params.trend.drift() + noise), price);
    }

    series.reverse();
    series
}

/// One live step forward from the last price: a smaller perturbation than the
/// backfill walk, plus the trend drift.
pub(crate) fn next_price(last: f64, params: &FeedParams, rng: &mut impl Rng) -> f64 {
    let step = params.range.step_scale() * params.clamped_volatility() * 0.5;
    let noise = rng.gen_range(-step..=step);
    sanitize(last * (1.0 + params.trend.drift() + noise), last)
}

fn sanitize(candidate: f64, fallback: f64) -> f64 {
    if candidate.is_finite() {
        candidate.max(PRICE_FLOOR)
    } else {
        fallback.max(PRICE_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{TimeRange, Trend};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn backfill_produces_the_requested_window() {
        let params = FeedParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let series = backfill(&params, 1_700_000_000_000, &mut rng);

        assert_eq!(series.len(), 150);
        assert!(series.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
        // The newest point anchors at the base price.
        let last = series.last().unwrap();
        assert_eq!(last.timestamp_ms, 1_700_000_000_000);
        assert_eq!(last.price, 100.0);
    }

    #[test]
    fn backfill_never_emits_nan_or_sub_floor_prices() {
        for trend in [Trend::Up, Trend::Down, Trend::Flat] {
            let params = FeedParams {
                base_price: 0.02,
                volatility: 1.0,
                trend,
                range: TimeRange::Year,
                ..FeedParams::default()
            };
            let mut rng = StdRng::seed_from_u64(42);
            let series = backfill(&params, 0, &mut rng);
            assert!(series
                .iter()
                .all(|p| p.price.is_finite() && p.price >= PRICE_FLOOR));
        }
    }

    #[test]
    fn zero_volatility_flat_trend_is_constant() {
        let params = FeedParams {
            volatility: 0.0,
            trend: Trend::Flat,
            ..FeedParams::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let series = backfill(&params, 0, &mut rng);
        assert!(series.iter().all(|p| p.price == 100.0));
    }

    #[test]
    fn same_seed_same_series() {
        let params = FeedParams::default();
        let a = backfill(&params, 0, &mut StdRng::seed_from_u64(9));
        let b = backfill(&params, 0, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_volatility_is_clamped_not_explosive() {
        let params = FeedParams {
            volatility: 250.0,
            ..FeedParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let series = backfill(&params, 0, &mut rng);
        // Max step is the range's scale; a single hop can never exceed it.
        for w in series.windows(2) {
            let ratio = (w[1].price / w[0].price - 1.0).abs();
            assert!(ratio < 0.006, "step {ratio} exceeds clamped bound");
        }
    }
}
