use super::ids::{PropertyId, UserId};
use serde::{Deserialize, Serialize};

/// A user's net token position in one asset.
///
/// Conceptually unique per `(user_id, property_id)`: settlement must treat
/// this as an upsert target, never an append-only log, or positions double
/// count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub tokens_owned: u64,
    pub investment_amount_cents: i64,
}
