use crate::error::{AuthError, Result};
use log::warn;
use tokensim_core::bus::{ChangeEvent, ChangeKind};
use tokensim_core::model::{
    AccreditationStatus, DisplayMetadata, KycStatus, Role, Session, UserId, UserProfile, UserRole,
};
use tokensim_core::repository::{Repository, Table};
use tokensim_core::store::Kvs;
use tokio::sync::broadcast;

/// How long a minted session stays valid. The source system only ever renews
/// by signing in again.
pub const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Profile fields collected by the sign-up form.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub full_name: String,
    pub country: String,
    pub avatar_url: Option<String>,
}

/// Two-state machine over the persisted `session` key: SignedOut or
/// SignedIn(Session).
///
/// All transitions persist best-effort: when the store is full the manager
/// still transitions and notifies, but the session will not survive a reload.
/// That degraded mode is logged, never hidden.
///
/// A clone shares storage and bus with the original: the same origin opened
/// in another execution context.
#[derive(Clone)]
pub struct SessionManager {
    repository: Repository,
}

impl SessionManager {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Synchronous read of the current persisted session. Expired or corrupt
    /// blobs read as signed out.
    pub fn session(&self) -> Option<Session> {
        let raw = self.repository.kvs().get(Table::Session.key())?;
        let session: Session = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                warn!("SessionManager: corrupt session blob treated as signed out: {e}");
                return None;
            }
        };

        if session.is_expired(chrono::Utc::now().timestamp_millis()) {
            return None;
        }
        Some(session)
    }

    /// Registers a listener: returns the current state immediately plus a
    /// receiver for every future change notification, including ones
    /// published from other execution contexts.
    pub fn subscribe(&self) -> (Option<Session>, broadcast::Receiver<ChangeEvent>) {
        // Subscribe before reading so no transition lands in the gap.
        let rx = self.repository.bus().subscribe();
        (self.session(), rx)
    }

    /// Creates a profile + role pair and signs the new user in.
    ///
    /// The password is accepted but never stored or verified, a simulation
    /// shortcut preserved from the source system rather than a security
    /// model.
    pub fn sign_up(&self, email: &str, _password: &str, profile: NewProfile) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let profiles: Vec<UserProfile> = self.repository.read_all(Table::Profiles);
        if profiles
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(email))
        {
            return Err(AuthError::DuplicateEmail);
        }

        let now = chrono::Utc::now().timestamp_millis();
        let user_id = UserId::generate();

        let record = UserProfile {
            id: user_id,
            email: email.to_string(),
            full_name: profile.full_name.clone(),
            country: profile.country,
            kyc_verified: false,
            avatar_url: profile.avatar_url.clone(),
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.repository.insert(Table::Profiles, record) {
            warn!("SessionManager: profile for '{email}' not persisted: {e}");
        }

        let role = UserRole {
            user_id,
            role: Role::User,
            kyc_status: KycStatus::Pending,
            accreditation_status: AccreditationStatus::None,
            updated_at: now,
        };
        if let Err(e) = self.repository.insert(Table::Roles, role) {
            warn!("SessionManager: role for '{email}' not persisted: {e}");
        }

        let session = self.mint_session(
            user_id,
            email,
            DisplayMetadata {
                full_name: Some(profile.full_name),
                avatar_url: profile.avatar_url,
            },
            now,
        );
        Ok(session)
    }

    /// Signs in by email. The password is ignored; an unknown email mints a
    /// throwaway guest session rather than failing. That is the source
    /// system's observable behavior, kept for test parity.
    pub fn sign_in(&self, email: &str, _password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let profiles: Vec<UserProfile> = self.repository.read_all(Table::Profiles);
        let known = profiles.iter().find(|p| p.email.eq_ignore_ascii_case(email));

        let now = chrono::Utc::now().timestamp_millis();
        let session = match known {
            Some(profile) => self.mint_session(
                profile.id,
                &profile.email,
                DisplayMetadata {
                    full_name: Some(profile.full_name.clone()),
                    avatar_url: profile.avatar_url.clone(),
                },
                now,
            ),
            None => self.mint_session(UserId::generate(), email, DisplayMetadata::default(), now),
        };
        Ok(session)
    }

    /// Deletes the persisted session and announces the transition.
    pub fn sign_out(&self) {
        self.repository.kvs().remove(Table::Session.key());
        self.repository.bus().publish(ChangeEvent {
            table: Table::Session,
            kind: ChangeKind::Removed,
        });
    }

    fn mint_session(
        &self,
        user_id: UserId,
        email: &str,
        display: DisplayMetadata,
        now: i64,
    ) -> Session {
        let session = Session {
            user_id,
            email: email.to_string(),
            issued_at: now,
            expires_at: now + SESSION_TTL_MS,
            display,
        };
        self.persist(&session);
        self.repository.bus().publish(ChangeEvent {
            table: Table::Session,
            kind: ChangeKind::Updated,
        });
        session
    }

    fn persist(&self, session: &Session) {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(e) => {
                warn!("SessionManager: session not serializable, will not survive reload: {e}");
                return;
            }
        };
        if let Err(e) = self.repository.kvs().set(Table::Session.key(), &json) {
            warn!("SessionManager: session not persisted, will not survive reload: {e}");
        }
    }
}
