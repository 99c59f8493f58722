pub mod registry;

pub use registry::InMemoryConnectionRegistry;
