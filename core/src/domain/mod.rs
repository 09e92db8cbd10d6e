//! Domain layer containing the token and role entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
