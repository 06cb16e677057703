use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// A registered user. Created once at sign-up, mutated by settings edits,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub country: String,
    pub kyc_verified: bool,
    pub avatar_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
