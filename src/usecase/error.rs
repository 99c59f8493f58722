//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::{ResolveError, RoomId, VerifyError};

/// Authentication failure, reported to the originating connection only.
/// The connection stays open and may retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticateError {
    #[error("invalid or expired credential")]
    InvalidCredential,

    #[error("no application user for subject '{0}'")]
    UnknownUser(String),

    /// The connection already carries a user binding; re-authentication is
    /// refused rather than overwriting it.
    #[error("connection is already bound to a user")]
    AlreadyBound,

    /// The connection disconnected while the external verification was in
    /// flight. The result is discarded, nothing to report.
    #[error("connection closed during authentication")]
    ConnectionGone,
}

impl From<VerifyError> for AuthenticateError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::InvalidCredential => Self::InvalidCredential,
        }
    }
}

impl From<ResolveError> for AuthenticateError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownUser(subject_id) => Self::UnknownUser(subject_id),
        }
    }
}

/// Subscribe failure, reported to the originating connection only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("access denied to room '{0}'")]
    AccessDenied(RoomId),
}
