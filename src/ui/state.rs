//! Shared application state.

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, IdentityVerifier, MembershipStore, UserResolver};

/// Process-wide singletons handed to every handler. The registry is the
/// single source of truth for live connections; the three collaborator
/// ports front the external identity provider and stores.
pub struct AppState {
    pub registry: Arc<dyn ConnectionRegistry>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub resolver: Arc<dyn UserResolver>,
    pub memberships: Arc<dyn MembershipStore>,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        resolver: Arc<dyn UserResolver>,
        memberships: Arc<dyn MembershipStore>,
    ) -> Self {
        Self {
            registry,
            verifier,
            resolver,
            memberships,
        }
    }
}
