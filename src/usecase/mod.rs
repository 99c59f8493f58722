//! UseCase layer.
//!
//! Business logic of the real-time core: one use case per protocol
//! transition, plus the room broadcaster and presence tracker services.
//! Called from the UI layer; depends on the domain ports only.

pub mod authenticate_connection;
pub mod broadcast;
pub mod disconnect_connection;
pub mod error;
pub mod presence;
pub mod relay_event;
pub mod subscribe_room;
pub mod unsubscribe_room;

pub use authenticate_connection::{AuthenticateConnectionUseCase, AuthenticatedSession};
pub use broadcast::RoomBroadcaster;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{AuthenticateError, SubscribeError};
pub use presence::PresenceTracker;
pub use relay_event::RelayEventUseCase;
pub use subscribe_room::SubscribeRoomUseCase;
pub use unsubscribe_room::UnsubscribeRoomUseCase;
