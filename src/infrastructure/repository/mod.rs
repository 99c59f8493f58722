//! Concrete implementations of the domain registry port.
//!
//! The use case layer depends on the trait (domain layer) only, never on
//! these implementations directly (dependency inversion).

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;
