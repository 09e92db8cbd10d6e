//! Signing key management for JWT encoding and decoding

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;
use tw_shared::JwtConfig;

use crate::errors::TokenError;

/// Immutable key material for one algorithm
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// Creates HMAC keys from a shared secret
    ///
    /// # Arguments
    ///
    /// * `algorithm` - One of HS256, HS384 or HS512
    /// * `secret` - The shared secret, must not be empty
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self, TokenError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::KeyLoad {
                message: format!("{:?} is not an HMAC algorithm", algorithm),
            });
        }
        if secret.is_empty() {
            return Err(TokenError::KeyLoad {
                message: "HMAC secret is empty".to_string(),
            });
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Creates RS256 keys from PEM strings
    ///
    /// # Arguments
    ///
    /// * `private_key_pem` - PEM-encoded private key (PKCS#1 or PKCS#8)
    /// * `public_key_pem` - PEM-encoded public key
    pub fn rs256_from_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self, TokenError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
                TokenError::KeyLoad {
                    message: format!("Invalid private key format: {}", e),
                }
            })?;

        let decoding_key =
            DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
                TokenError::KeyLoad {
                    message: format!("Invalid public key format: {}", e),
                }
            })?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
        })
    }

    /// Creates RS256 keys from PEM files
    pub fn rs256_from_files<P: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, TokenError> {
        let private_key_pem =
            fs::read_to_string(private_key_path.as_ref()).map_err(|e| TokenError::KeyLoad {
                message: format!("Failed to read private key: {}", e),
            })?;

        let public_key_pem =
            fs::read_to_string(public_key_path.as_ref()).map_err(|e| TokenError::KeyLoad {
                message: format!("Failed to read public key: {}", e),
            })?;

        Self::rs256_from_pem(&private_key_pem, &public_key_pem)
    }

    /// Loads keys as described by the JWT configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        let algorithm: Algorithm =
            config
                .algorithm
                .parse()
                .map_err(|_| TokenError::KeyLoad {
                    message: format!("Unsupported JWT algorithm: {}", config.algorithm),
                })?;

        match algorithm {
            Algorithm::RS256 => {
                let (Some(private_key_path), Some(public_key_path)) =
                    (&config.private_key_path, &config.public_key_path)
                else {
                    return Err(TokenError::KeyLoad {
                        message: "RS256 requires JWT_PRIVATE_KEY_PATH and JWT_PUBLIC_KEY_PATH"
                            .to_string(),
                    });
                };
                Self::rs256_from_files(private_key_path, public_key_path)
            }
            other => Self::hmac(other, config.secret.as_bytes()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Process-wide holder of the active signing keys
///
/// Readers take a snapshot per operation, so a rotation never tears an
/// in-flight encode or decode.
#[derive(Debug)]
pub struct SigningKeyProvider {
    current: RwLock<Arc<SigningKeys>>,
}

impl SigningKeyProvider {
    pub fn new(keys: SigningKeys) -> Self {
        Self {
            current: RwLock::new(Arc::new(keys)),
        }
    }

    /// Loads keys from the JWT configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        let keys = SigningKeys::from_config(config)?;
        info!(algorithm = ?keys.algorithm(), "Signing keys loaded");
        Ok(Self::new(keys))
    }

    /// Returns the keys active at the time of the call
    pub fn snapshot(&self) -> Result<Arc<SigningKeys>, TokenError> {
        self.current
            .read()
            .map(|keys| Arc::clone(&*keys))
            .map_err(|_| TokenError::Signing {
                message: "signing key lock poisoned".to_string(),
            })
    }

    /// Swaps in new keys; tokens signed with the old keys stop verifying
    pub fn rotate(&self, keys: SigningKeys) -> Result<(), TokenError> {
        let algorithm = keys.algorithm();
        let mut current = self.current.write().map_err(|_| TokenError::Signing {
            message: "signing key lock poisoned".to_string(),
        })?;
        *current = Arc::new(keys);
        info!(algorithm = ?algorithm, "Signing keys rotated");
        Ok(())
    }

    /// Reloads keys from the JWT configuration and swaps them in
    pub fn reload(&self, config: &JwtConfig) -> Result<(), TokenError> {
        self.rotate(SigningKeys::from_config(config)?)
    }
}
