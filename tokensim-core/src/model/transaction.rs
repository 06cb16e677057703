use super::ids::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger-style record of one cash movement.
///
/// Append-only and write-only: nothing reads it back into a balance
/// computation. It exists for audit display and capacity bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    /// Signed cents: negative for cash leaving the account (a buy), positive
    /// for cash entering it (a sell).
    pub amount_cents: i64,
    pub description: String,
    pub created_at: i64,
}

impl CashTransaction {
    pub fn new(user_id: UserId, amount_cents: i64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            description: description.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_debit(&self) -> bool {
        self.amount_cents < 0
    }
}
