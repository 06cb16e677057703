//! Authentication session lifecycle for the simulated backend.
//!
//! Owns the single current [`tokensim_core::model::Session`]: minting it on
//! sign-in/sign-up, persisting it in the key-value store so it survives a
//! reload, and announcing every transition on the change bus so other open
//! execution contexts converge without a server.

pub mod error;
pub mod manager;

pub use error::{AuthError, Result};
pub use manager::{NewProfile, SessionManager, SESSION_TTL_MS};
