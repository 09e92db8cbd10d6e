//! Credential verification at login

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::Role;
use crate::errors::DomainError;

/// An authenticated user, ready to have tokens issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject_id: String,
    pub role: Role,
}

/// Checks a login's email and password
///
/// Credential storage and hashing policy belong to the implementation.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// # Returns
    ///
    /// * `Ok(Some(Principal))` - The credentials are valid
    /// * `Ok(None)` - Unknown email or wrong password
    /// * `Err(DomainError)` - The check itself failed
    async fn verify(&self, email: &str, password: &str) -> Result<Option<Principal>, DomainError>;
}
