//! Token entities for JWT-based session credentials.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::role::Role;

/// Default JWT issuer
pub const JWT_ISSUER: &str = "tokenward";

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, presented on every request
    Access,
    /// Long-lived, only exchanged for a new pair
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims embedded in a signed token
///
/// Immutable once issued. A token stops being usable when `exp` passes or when
/// its `jti` (or its whole session `sid`) is on the blacklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject (user ID)
    pub sub: String,

    /// Authorization role of the subject
    pub role: Role,

    /// Access or refresh
    pub kind: TokenKind,

    /// JWT ID, the revocation key for this token
    pub jti: String,

    /// Linkage id shared by every token descending from one login
    pub sid: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl Identity {
    /// Creates claims for a new token with a fresh `jti`
    ///
    /// # Arguments
    ///
    /// * `subject` - The user's id
    /// * `role` - The user's role
    /// * `kind` - Access or refresh
    /// * `sid` - Linkage id of the login session
    /// * `issued_at` - Current time from the service clock
    /// * `ttl` - Lifetime of the token
    /// * `issuer` - Value for the `iss` claim
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        kind: TokenKind,
        sid: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: impl Into<String>,
    ) -> Self {
        let expires_at = issued_at + ttl;
        Self {
            sub: subject.into(),
            role,
            kind,
            jti: Uuid::new_v4().to_string(),
            sid: sid.into(),
            iat: issued_at.timestamp(),
            // Round up so the token never expires before its full ttl
            exp: expires_at.timestamp() + i64::from(expires_at.timestamp_subsec_nanos() > 0),
            iss: issuer.into(),
        }
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Time left until expiry at `now`, zero once expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> std::time::Duration {
        let remaining = self.exp - now.timestamp();
        std::time::Duration::from_secs(remaining.max(0) as u64)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Token type for the Authorization header
    pub token_type: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,

    /// Linkage id shared by both tokens
    pub session_id: String,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
        session_id: String,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_in,
            refresh_expires_in,
            session_id,
        }
    }
}
