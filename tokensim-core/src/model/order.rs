use super::ids::{PropertyId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Settlement state of an order. This simulation settles instantly, so every
/// committed order is written as `Paid`; `Pending` and `Failed` exist for
/// display parity with recency dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

/// An executed buy/sell action against an asset. Append-only execution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    user_id: UserId,
    property_id: PropertyId,
    tokens: u64,
    unit_price_cents: i64,
    gross_amount_cents: i64,
    status: OrderStatus,
    side: Side,
    created_at: i64,
}

impl Order {
    pub fn new(
        id: Uuid,
        user_id: UserId,
        property_id: PropertyId,
        tokens: u64,
        unit_price_cents: i64,
        gross_amount_cents: i64,
        status: OrderStatus,
        side: Side,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            property_id,
            tokens,
            unit_price_cents,
            gross_amount_cents,
            status,
            side,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn property_id(&self) -> &PropertyId {
        &self.property_id
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn unit_price_cents(&self) -> i64 {
        self.unit_price_cents
    }

    pub fn gross_amount_cents(&self) -> i64 {
        self.gross_amount_cents
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}
