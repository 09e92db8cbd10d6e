//! Signed token encoding and decoding

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use std::sync::Arc;

use crate::domain::entities::Identity;
use crate::errors::TokenError;

use super::clock::ClockSource;
use super::key_manager::SigningKeyProvider;

/// Encodes identities into signed JWTs and decodes them back
///
/// Decoding checks structure, signature, issuer and expiry in that order. It
/// never consults the blacklist.
pub struct TokenCodec {
    keys: Arc<SigningKeyProvider>,
    clock: Arc<dyn ClockSource>,
    issuer: String,
}

impl TokenCodec {
    pub fn new(
        keys: Arc<SigningKeyProvider>,
        clock: Arc<dyn ClockSource>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            clock,
            issuer: issuer.into(),
        }
    }

    /// Signs `identity` with the active keys
    pub fn encode(&self, identity: &Identity) -> Result<String, TokenError> {
        let keys = self.keys.snapshot()?;
        let header = Header::new(keys.algorithm());
        encode(&header, identity, keys.encoding_key()).map_err(|e| TokenError::Signing {
            message: e.to_string(),
        })
    }

    /// Verifies and decodes `token`
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::MalformedToken)` - Not a JWT, or claims do not parse
    /// * `Err(TokenError::InvalidSignature)` - Signature or algorithm mismatch
    /// * `Err(TokenError::ExpiredToken)` - `now >= exp`
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        let keys = self.keys.snapshot()?;

        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_aud = false;
        // Expiry is compared against the injected clock below, without leeway
        validation.validate_exp = false;
        validation.leeway = 0;

        let identity = decode::<Identity>(token, keys.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))?;

        if identity.is_expired_at(self.clock.now()) {
            return Err(TokenError::ExpiredToken);
        }

        Ok(identity)
    }

    pub fn clock(&self) -> &Arc<dyn ClockSource> {
        &self.clock
    }

    pub fn keys(&self) -> &Arc<SigningKeyProvider> {
        &self.keys
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidEcdsaKey => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::MalformedToken,
    }
}
