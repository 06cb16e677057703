//! Scripted end-to-end run of the simulated backend.
//!
//! Opens durable storage, signs a user up (or back in on a rerun), seeds a
//! cash balance, follows a live price feed for a few ticks, then settles a
//! buy, demonstrates a typed rejection, and sells part of the position.

use anyhow::Result;
use log::info;
use order_engine::{Engine, OrderRequest};
use price_feed::{FeedParams, PriceFeed, TimeRange, Trend};
use session_manager::{AuthError, NewProfile, SessionManager};
use std::sync::Arc;
use tokensim_core::bus::ChangeBus;
use tokensim_core::model::{PropertyId, Side};
use tokensim_core::repository::Repository;
use tokensim_core::store::{DiskStore, Kvs};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "./data".into());
    let store = Arc::new(DiskStore::open(&data_dir)?);
    info!(
        "storage open at {data_dir} ({} of {} bytes used)",
        store.used_bytes(),
        store.quota_bytes()
    );

    let repository = Repository::new(store, ChangeBus::new());
    let sessions = SessionManager::new(repository.clone());

    // A second run of the demo hits DuplicateEmail; fall back to sign-in.
    let session = match sessions.sign_up(
        "demo@tokensim.dev",
        "hunter2",
        NewProfile {
            full_name: "Demo Investor".into(),
            country: "PT".into(),
            avatar_url: None,
        },
    ) {
        Ok(session) => session,
        Err(AuthError::DuplicateEmail) => sessions.sign_in("demo@tokensim.dev", "hunter2")?,
        Err(e) => return Err(e.into()),
    };
    info!("signed in as {} ({})", session.email, session.user_id);

    let mut engine = Engine::new(repository, sessions.clone());
    engine.deposit(session.user_id, 100_000);
    info!(
        "seeded balance: {} cents",
        engine.available_balance(session.user_id)
    );

    let property = PropertyId::new("P1");
    let feed = Arc::new(PriceFeed::new(
        property.clone(),
        FeedParams {
            base_price: 50.0,
            volatility: 0.4,
            trend: Trend::Up,
            range: TimeRange::Day,
            ..FeedParams::default()
        },
    ));
    let mut ticks = feed.subscribe();
    let ticker = feed.clone().spawn_ticker();

    for _ in 0..3 {
        let point = ticks.recv().await?;
        info!("{property} tick: {:.2}", point.price);
    }
    ticker.unsubscribe();

    let unit_price_cents = feed
        .suggested_price_cents()
        .ok_or_else(|| anyhow::anyhow!("price feed produced no data"))?;

    let execution = engine.submit(OrderRequest {
        user_id: session.user_id,
        property_id: property.clone(),
        tokens: 10,
        unit_price_cents,
        side: Side::Buy,
    })?;
    info!(
        "bought {} tokens @ {}c, holding now {}, balance {}c",
        execution.order.tokens(),
        execution.order.unit_price_cents(),
        execution.holding.tokens_owned,
        engine.available_balance(session.user_id)
    );

    // An over-sized sell comes back as a typed rejection, not a crash.
    match engine.submit(OrderRequest {
        user_id: session.user_id,
        property_id: property.clone(),
        tokens: execution.holding.tokens_owned + 5,
        unit_price_cents,
        side: Side::Sell,
    }) {
        Ok(_) => anyhow::bail!("over-sized sell unexpectedly settled"),
        Err(e) => info!("over-sized sell rejected: {e}"),
    }

    let execution = engine.submit(OrderRequest {
        user_id: session.user_id,
        property_id: property,
        tokens: 4,
        unit_price_cents,
        side: Side::Sell,
    })?;
    info!(
        "sold 4 tokens, holding now {}, balance {}c",
        execution.holding.tokens_owned,
        engine.available_balance(session.user_id)
    );

    sessions.sign_out();
    info!("signed out; session persisted state cleared");

    Ok(())
}
