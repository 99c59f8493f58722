//! Domain layer for the real-time coordination core.
//!
//! This module contains business types and ports that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod collaborator;
pub mod entity;
pub mod error;
pub mod registry;
pub mod value_object;

pub use collaborator::{
    IdentityVerifier, MembershipStore, ResolveError, UserResolver, VerifiedIdentity, VerifyError,
};
pub use entity::{DomainEvent, EventKind, MemberRole, Membership, UserProfile};
pub use error::{RegistryError, ValueObjectError};
pub use registry::{BindOutcome, ConnectionRegistry, Unregistered};
pub use value_object::{ConnectionId, RoomId, Timestamp, UserId};
