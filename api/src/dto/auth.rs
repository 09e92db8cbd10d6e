use serde::{Deserialize, Serialize};
use tw_core::domain::entities::{Identity, Role, TokenKind};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Optional body of `POST /auth/logout`
///
/// When the client also sends its refresh token, that token is consumed too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Verified claims returned by `GET /auth/validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub subject_id: String,
    pub role: Role,
    pub kind: TokenKind,
    pub jti: String,
    pub session_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            subject_id: identity.sub,
            role: identity.role,
            kind: identity.kind,
            jti: identity.jti,
            session_id: identity.sid,
            issued_at: identity.iat,
            expires_at: identity.exp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRevocationsResponse {
    pub session_id: String,
    /// Sorted for stable output
    pub revoked_jtis: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub blacklist: String,
    pub version: String,
    pub timestamp: String,
}
