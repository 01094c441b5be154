//! Test doubles for the persistence gateway.

pub mod memory;
pub mod repositories;

pub use memory::InMemoryGateway;
pub use repositories::MockGateway;
