use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Presentation fields carried alongside the session so dependent pages can
/// render a header without a profile lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The current authenticated identity. Exactly one session is "current" at a
/// time per origin; it is owned by the session manager and read-only to every
/// other component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub display: DisplayMetadata,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}
