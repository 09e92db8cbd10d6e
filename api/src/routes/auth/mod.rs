//! Authentication route handlers
//!
//! - Login with email and password
//! - Refresh token rotation
//! - Token validation
//! - Logout of one token or a whole session

pub mod login;
pub mod logout;
pub mod refresh;
pub mod validate;

use std::sync::Arc;
use tw_core::{
    repositories::BlacklistStore,
    services::{CredentialVerifier, RoleAuthorizer, TokenService},
};

pub use login::login;
pub use logout::{logout, logout_all};
pub use refresh::refresh;
pub use validate::validate;

/// Shared application state handed to every handler
pub struct AppState<B, V>
where
    B: BlacklistStore,
    V: CredentialVerifier,
{
    pub token_service: Arc<TokenService<B>>,
    pub credentials: Arc<V>,
    pub authorizer: Arc<RoleAuthorizer>,
}
