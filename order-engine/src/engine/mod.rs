use crate::error::{OrderError, Result};
use log::{info, warn};
use serde::Serialize;
use session_manager::SessionManager;
use std::collections::HashMap;
use tokensim_core::model::{
    CashTransaction, Investment, Order, OrderStatus, PropertyId, Side, UserId,
};
use tokensim_core::repository::{Repository, Table};
use uuid::Uuid;

/// A buy/sell instruction as submitted by the order form.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub tokens: u64,
    pub unit_price_cents: i64,
    pub side: Side,
}

/// Outcome of a settled order: the committed execution record and the
/// refreshed holding it produced.
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub order: Order,
    pub holding: Investment,
}

/// Validates and settles orders against balances and holdings.
///
/// Cash balances live here in memory; the persisted transaction table is a
/// write-only audit trail, never read back. Holdings and execution records
/// go through the entity repository.
pub struct Engine {
    repository: Repository,
    sessions: SessionManager,
    balances: HashMap<UserId, i64>,
}

impl Engine {
    pub fn new(repository: Repository, sessions: SessionManager) -> Self {
        Self {
            repository,
            sessions,
            balances: HashMap::new(),
        }
    }

    /// Seeds simulated cash for a user.
    pub fn deposit(&mut self, user_id: UserId, amount_cents: i64) {
        *self.balances.entry(user_id).or_insert(0) += amount_cents;
    }

    pub fn available_balance(&self, user_id: UserId) -> i64 {
        self.balances.get(&user_id).copied().unwrap_or(0)
    }

    /// Current net position of one user in one asset.
    pub fn holding(&self, user_id: UserId, property_id: &PropertyId) -> Option<Investment> {
        self.repository
            .read_all::<Investment>(Table::Investments)
            .into_iter()
            .find(|i| i.user_id == user_id && &i.property_id == property_id)
    }

    /// Validates and instantly settles one order.
    ///
    /// On any rejection nothing has been written. On success the order
    /// record, the upserted holding, and the audit transaction are all
    /// committed before this returns, with no suspension point in between,
    /// so no cooperative reader sees a partial settlement.
    pub fn submit(&mut self, request: OrderRequest) -> Result<Execution> {
        let session = self
            .sessions
            .session()
            .filter(|s| s.user_id == request.user_id)
            .ok_or(OrderError::NotAuthenticated)?;

        if request.tokens == 0 {
            return Err(OrderError::InvalidOrder("token quantity must be positive"));
        }
        if request.unit_price_cents <= 0 {
            return Err(OrderError::InvalidOrder("unit price must be positive"));
        }
        let gross_cents = i64::try_from(request.tokens)
            .ok()
            .and_then(|tokens| tokens.checked_mul(request.unit_price_cents))
            .ok_or(OrderError::InvalidOrder("order amount overflows"))?;

        let mut holdings: Vec<Investment> = self.repository.read_all(Table::Investments);
        let position = holdings
            .iter()
            .position(|i| i.user_id == request.user_id && i.property_id == request.property_id);

        match request.side {
            Side::Buy => {
                let available_cents = self.available_balance(request.user_id);
                if gross_cents > available_cents {
                    return Err(OrderError::InsufficientFunds {
                        required_cents: gross_cents,
                        available_cents,
                    });
                }
            }
            Side::Sell => {
                let held = position.map(|i| holdings[i].tokens_owned).unwrap_or(0);
                if held < request.tokens {
                    return Err(OrderError::InsufficientHoldings {
                        requested: request.tokens,
                        held,
                    });
                }
            }
        }

        // Validation passed; from here on everything commits in this turn.
        let now = chrono::Utc::now().timestamp_millis();
        let order = Order::new(
            Uuid::new_v4(),
            request.user_id,
            request.property_id.clone(),
            request.tokens,
            request.unit_price_cents,
            gross_cents,
            OrderStatus::Paid,
            request.side,
            now,
        );

        let holding = match (request.side, position) {
            (Side::Buy, Some(i)) => {
                let existing = &mut holdings[i];
                existing.tokens_owned += request.tokens;
                existing.investment_amount_cents += gross_cents;
                existing.clone()
            }
            (Side::Buy, None) => {
                let fresh = Investment {
                    user_id: request.user_id,
                    property_id: request.property_id.clone(),
                    tokens_owned: request.tokens,
                    investment_amount_cents: gross_cents,
                };
                holdings.push(fresh.clone());
                fresh
            }
            (Side::Sell, Some(i)) => {
                let existing = &mut holdings[i];
                existing.tokens_owned -= request.tokens;
                existing.investment_amount_cents -= gross_cents;
                existing.clone()
            }
            // Validation guarantees a sell has a covering position.
            (Side::Sell, None) => {
                return Err(OrderError::InsufficientHoldings {
                    requested: request.tokens,
                    held: 0,
                })
            }
        };

        if let Err(e) = self.repository.insert(Table::Orders, order.clone()) {
            warn!("Engine: order {} not persisted: {e}", order.id());
        }
        if let Err(e) = self.repository.write_all(Table::Investments, &holdings) {
            warn!("Engine: holdings for {} not persisted: {e}", session.user_id);
        }

        let signed_cents = match request.side {
            Side::Buy => -gross_cents,
            Side::Sell => gross_cents,
        };
        let audit = CashTransaction::new(
            request.user_id,
            signed_cents,
            format!(
                "{} {} x {}",
                match request.side {
                    Side::Buy => "Buy",
                    Side::Sell => "Sell",
                },
                request.tokens,
                request.property_id
            ),
        );
        if let Err(e) = self.repository.insert(Table::Transactions, audit) {
            warn!("Engine: audit transaction not persisted: {e}");
        }

        *self.balances.entry(request.user_id).or_insert(0) += signed_cents;

        info!(
            "Engine: settled {:?} {} x {} @ {}c for {}",
            request.side, request.tokens, request.property_id, request.unit_price_cents, session.user_id
        );

        Ok(Execution { order, holding })
    }
}

#[cfg(test)]
mod tests;
