//! In-memory implementations of the external collaborator ports.
//!
//! Real deployments back these with the identity provider and the
//! application database; the in-memory versions serve the demo binary and
//! the integration tests. Data can be seeded programmatically or from a
//! JSON fixture file.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::{
    IdentityVerifier, MemberRole, Membership, MembershipStore, ResolveError, RoomId, UserId,
    UserProfile, UserResolver, ValueObjectError, VerifiedIdentity, VerifyError,
};

/// Credential-to-subject map standing in for the identity provider.
#[derive(Default)]
pub struct StaticIdentityVerifier {
    tokens: RwLock<HashMap<String, String>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `credential` as proof of `subject_id`.
    pub async fn insert_token(&self, credential: String, subject_id: String) {
        self.tokens.write().await.insert(credential, subject_id);
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError> {
        let tokens = self.tokens.read().await;
        tokens
            .get(credential)
            .map(|subject_id| VerifiedIdentity {
                subject_id: subject_id.clone(),
            })
            .ok_or(VerifyError::InvalidCredential)
    }
}

#[derive(Default)]
struct DirectoryState {
    users: HashMap<String, UserProfile>,
    memberships: HashMap<UserId, Vec<Membership>>,
}

/// User store plus membership store over in-memory maps.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application user for a provider subject id.
    pub async fn add_user(&self, subject_id: String, profile: UserProfile) {
        self.state.write().await.users.insert(subject_id, profile);
    }

    /// Record that `user_id` belongs to `room_id` with `role`.
    pub async fn add_membership(&self, user_id: UserId, room_id: RoomId, role: MemberRole) {
        self.state
            .write()
            .await
            .memberships
            .entry(user_id)
            .or_default()
            .push(Membership::new(room_id, role));
    }
}

#[async_trait]
impl UserResolver for InMemoryDirectory {
    async fn find_by_subject_id(&self, subject_id: &str) -> Result<UserProfile, ResolveError> {
        let state = self.state.read().await;
        state
            .users
            .get(subject_id)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownUser(subject_id.to_string()))
    }
}

#[async_trait]
impl MembershipStore for InMemoryDirectory {
    async fn memberships_of(&self, user_id: &UserId) -> Vec<Membership> {
        let state = self.state.read().await;
        state.memberships.get(user_id).cloned().unwrap_or_default()
    }

    async fn is_member(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        let state = self.state.read().await;
        state
            .memberships
            .get(user_id)
            .is_some_and(|memberships| memberships.iter().any(|m| &m.room_id == room_id))
    }
}

/// JSON fixture shape for seeding the in-memory collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryFixture {
    pub users: Vec<UserFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub token: String,
    pub subject_id: String,
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub rooms: Vec<RoomFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomFixture {
    pub room_id: String,
    #[serde(default)]
    pub role: MemberRole,
}

/// Build seeded collaborators from a fixture.
pub async fn seed(
    fixture: DirectoryFixture,
) -> Result<(StaticIdentityVerifier, InMemoryDirectory), ValueObjectError> {
    let verifier = StaticIdentityVerifier::new();
    let directory = InMemoryDirectory::new();

    for user in fixture.users {
        let user_id = UserId::new(user.user_id)?;
        verifier
            .insert_token(user.token, user.subject_id.clone())
            .await;
        directory
            .add_user(
                user.subject_id,
                UserProfile::new(user_id.clone(), user.display_name, user.avatar_url),
            )
            .await;
        for room in user.rooms {
            directory
                .add_membership(user_id.clone(), RoomId::new(room.room_id)?, room.role)
                .await;
        }
    }

    Ok((verifier, directory))
}
