//! Ports for the external collaborators the core depends on.
//!
//! The identity provider, the user store and the membership store live
//! outside this process. The use case layer depends on these traits only;
//! concrete implementations sit in the infrastructure layer (dependency
//! inversion).

use async_trait::async_trait;
use thiserror::Error;

use super::entity::{Membership, UserProfile};
use super::value_object::{RoomId, UserId};

/// Result of a successful credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable subject identifier issued by the identity provider.
    pub subject_id: String,
}

/// Credential verification failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid or expired credential")]
    InvalidCredential,
}

/// User lookup failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no application user for subject '{0}'")]
    UnknownUser(String),
}

/// Validates a bearer credential against the external identity provider.
///
/// Token cryptography is entirely the provider's concern; the core only
/// consumes the verdict. The implementation is expected to apply its own
/// timeout and fail rather than hang the calling connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError>;
}

/// Resolves a verified subject id to the application user record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn find_by_subject_id(&self, subject_id: &str) -> Result<UserProfile, ResolveError>;
}

/// Durable mapping of which users belong to which rooms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// All rooms the user currently belongs to, with roles.
    async fn memberships_of(&self, user_id: &UserId) -> Vec<Membership>;

    /// Whether the user belongs to the given room right now.
    async fn is_member(&self, user_id: &UserId, room_id: &RoomId) -> bool;
}
