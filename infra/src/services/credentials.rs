//! bcrypt-backed credential verification over a fixed user table
//!
//! Users are seeded at startup from `BOOTSTRAP_USERS`, a `;`-separated list of
//! `email:role:subject_id:bcrypt_hash` records. bcrypt hashes contain `$` but
//! never `:`, so the hash is always the last field.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use tw_core::domain::entities::Role;
use tw_core::errors::DomainError;
use tw_core::services::credentials::{CredentialVerifier, Principal};

/// Hash compared against when the email is unknown, so both paths cost one
/// bcrypt verification
const DUMMY_HASH: &str = "$2b$12$C6UzMDM.H6dfI/f/IKxGhuYV3WOCr4l7ZS6qC2vFSOxUxH/C1BvDi";

#[derive(Debug, Clone)]
struct CredentialRecord {
    subject_id: String,
    role: Role,
    password_hash: String,
}

/// A `BOOTSTRAP_USERS` record that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid bootstrap user record {index}: {reason}")]
pub struct CredentialParseError {
    pub index: usize,
    pub reason: String,
}

/// Credential verifier over an in-memory table of bcrypt hashes
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialVerifier {
    users: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentialVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with an already computed bcrypt hash
    pub fn with_user(
        mut self,
        email: &str,
        role: Role,
        subject_id: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        self.users.insert(
            normalize_email(email),
            CredentialRecord {
                subject_id: subject_id.into(),
                role,
                password_hash: password_hash.into(),
            },
        );
        self
    }

    /// Parse `email:role:subject_id:bcrypt_hash;...`
    pub fn parse(raw: &str) -> Result<Self, CredentialParseError> {
        let mut verifier = Self::new();

        for (index, record) in raw
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .enumerate()
        {
            let fields: Vec<&str> = record.splitn(4, ':').collect();
            let &[email, role, subject_id, hash] = fields.as_slice() else {
                return Err(CredentialParseError {
                    index,
                    reason: "expected email:role:subject_id:bcrypt_hash".to_string(),
                });
            };

            let role: Role = role.parse().map_err(|e| CredentialParseError {
                index,
                reason: format!("{}", e),
            })?;

            if email.trim().is_empty() || subject_id.trim().is_empty() || !hash.starts_with("$2") {
                return Err(CredentialParseError {
                    index,
                    reason: "empty email or subject id, or hash is not bcrypt".to_string(),
                });
            }

            verifier = verifier.with_user(email, role, subject_id.trim(), hash.trim());
        }

        Ok(verifier)
    }

    /// Load from the `BOOTSTRAP_USERS` environment variable; empty if unset
    pub fn from_env() -> Result<Self, CredentialParseError> {
        match std::env::var("BOOTSTRAP_USERS") {
            Ok(raw) => {
                let verifier = Self::parse(&raw)?;
                info!(users = verifier.len(), "Loaded bootstrap users");
                Ok(verifier)
            }
            Err(_) => {
                warn!("BOOTSTRAP_USERS not set, no user can log in");
                Ok(Self::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl CredentialVerifier for InMemoryCredentialVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<Option<Principal>, DomainError> {
        let record = self.users.get(&normalize_email(email)).cloned();
        let hash = record
            .as_ref()
            .map(|r| r.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password = password.to_string();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password verification task failed: {}", e),
            })?
            .unwrap_or(false);

        match record {
            Some(record) if matches => Ok(Some(Principal {
                subject_id: record.subject_id,
                role: record.role,
            })),
            _ => {
                debug!("Credential check failed");
                Ok(None)
            }
        }
    }
}
