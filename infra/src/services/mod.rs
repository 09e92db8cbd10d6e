//! Infrastructure service implementations

pub mod credentials;

#[cfg(test)]
mod tests;

pub use credentials::{CredentialParseError, InMemoryCredentialVerifier};
