pub mod inmemory;

pub use inmemory::{
    DirectoryFixture, InMemoryDirectory, RoomFixture, StaticIdentityVerifier, UserFixture, seed,
};
