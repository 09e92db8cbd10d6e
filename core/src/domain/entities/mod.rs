//! Domain entities representing core business objects.

pub mod role;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use role::Role;
pub use token::{Identity, TokenKind, TokenPair, JWT_ISSUER};
