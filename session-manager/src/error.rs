use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// A profile with this email already exists; the existing profile is
    /// left untouched.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// No session could be constructed at all. In this simulation that only
    /// happens for a blank email; passwords are never verified.
    #[error("could not establish a session with the supplied credentials")]
    InvalidCredentials,
}

pub type Result<T> = std::result::Result<T, AuthError>;
