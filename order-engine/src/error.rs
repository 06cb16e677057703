use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    /// No active session, or the session belongs to a different user.
    #[error("no active session for the ordering user")]
    NotAuthenticated,

    #[error("insufficient funds: need {required_cents} cents, have {available_cents}")]
    InsufficientFunds {
        required_cents: i64,
        available_cents: i64,
    },

    #[error("insufficient holdings: tried to sell {requested} tokens, hold {held}")]
    InsufficientHoldings { requested: u64, held: u64 },

    /// Degenerate input (zero quantity, non-positive price, overflow).
    #[error("invalid order: {0}")]
    InvalidOrder(&'static str),
}

pub type Result<T> = std::result::Result<T, OrderError>;
