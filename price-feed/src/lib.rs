//! Synthetic price series for tokenized assets.
//!
//! Generates a bounded random walk per asset: a fixed-length historical
//! backfill plus live ticks on a range-dependent interval. The series is
//! read-only to every other component; order execution consumes it only as a
//! default unit-price suggestion, never as an authoritative clearing price.

pub mod feed;
pub mod params;
pub mod series;

pub use feed::{FeedHandle, PriceFeed};
pub use params::{FeedParams, TimeRange, Trend};
pub use series::PricePoint;
