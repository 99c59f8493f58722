//! Infrastructure layer: wire DTOs and concrete implementations of the
//! domain ports.

pub mod collaborator;
pub mod dto;
pub mod repository;
