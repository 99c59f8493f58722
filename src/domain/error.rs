//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },
}

/// Errors raised by the connection registry.
///
/// The session state machine prevents double binding by construction; the
/// registry refuses it independently with `AlreadyBound` instead of
/// overwriting the earlier binding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection already carries a user binding.
    #[error("connection {0} is already bound to a user")]
    AlreadyBound(ConnectionId),

    /// The connection is not (or no longer) registered.
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}
