//! UseCase: authenticate a connection.
//!
//! Verifies the bearer credential with the identity provider, resolves the
//! application user, binds the connection in the registry and
//! auto-subscribes it to the user's current membership snapshot.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, IdentityVerifier, MembershipStore, RegistryError, RoomId,
    UserProfile, UserResolver,
};

use super::error::AuthenticateError;

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Display snapshot taken now; not live-refreshed for the session.
    pub profile: UserProfile,
    /// Full membership snapshot the connection was auto-subscribed to.
    pub rooms: Vec<RoomId>,
    /// Rooms in which the user was not visible before this connection;
    /// presence joins are announced for these only.
    pub newly_present_rooms: Vec<RoomId>,
}

pub struct AuthenticateConnectionUseCase {
    verifier: Arc<dyn IdentityVerifier>,
    resolver: Arc<dyn UserResolver>,
    memberships: Arc<dyn MembershipStore>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl AuthenticateConnectionUseCase {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        resolver: Arc<dyn UserResolver>,
        memberships: Arc<dyn MembershipStore>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            verifier,
            resolver,
            memberships,
            registry,
        }
    }

    /// Execute the authenticate transition.
    ///
    /// The connection stays in its pre-transition state until the external
    /// calls resolve; on failure nothing is bound and nothing is broadcast.
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        credential: &str,
    ) -> Result<AuthenticatedSession, AuthenticateError> {
        let identity = self.verifier.verify(credential).await?;
        let profile = self.resolver.find_by_subject_id(&identity.subject_id).await?;

        let rooms: Vec<RoomId> = self
            .memberships
            .memberships_of(&profile.user_id)
            .await
            .into_iter()
            .map(|membership| membership.room_id)
            .collect();

        let outcome = self
            .registry
            .bind(connection, profile.clone(), rooms.clone())
            .await
            .map_err(|err| match err {
                RegistryError::AlreadyBound(_) => AuthenticateError::AlreadyBound,
                RegistryError::UnknownConnection(_) => AuthenticateError::ConnectionGone,
            })?;

        tracing::info!(
            connection = %connection,
            user_id = %profile.user_id,
            rooms = rooms.len(),
            "connection authenticated"
        );

        Ok(AuthenticatedSession {
            profile,
            rooms,
            newly_present_rooms: outcome.newly_present_rooms,
        })
    }
}
