//! Token signing and role authorization configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared secret for HMAC algorithms
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// Algorithm for JWT signing (HS256, HS384, HS512 or RS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// PEM private key path (RS256 only)
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key path (RS256 only)
    #[serde(default)]
    pub public_key_path: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("tokenward"),
            algorithm: default_algorithm(),
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: parse_env("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: parse_env(
                "JWT_REFRESH_TOKEN_EXPIRY",
                defaults.refresh_token_expiry,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            algorithm: std::env::var("JWT_ALGORITHM")
                .map(|a| a.to_uppercase())
                .unwrap_or(defaults.algorithm),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }

    /// Set access token expiry in seconds
    pub fn with_access_expiry_seconds(mut self, seconds: i64) -> Self {
        self.access_token_expiry = seconds;
        self
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Role authorization configuration
///
/// Roles are matched by exact membership unless an implication is listed
/// here. `ROLE_IMPLICATIONS=ADMIN>HOSPITAL,HOSPITAL>DOCTOR` lets ADMIN pass
/// checks requiring HOSPITAL and HOSPITAL pass checks requiring DOCTOR.
/// Implications are not chained.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthorizationConfig {
    /// `(granting_role, implied_role)` pairs, by role name
    #[serde(default)]
    pub role_implications: Vec<(String, String)>,
}

impl AuthorizationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        std::env::var("ROLE_IMPLICATIONS")
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    /// Parse `A>B,C>D` into implication pairs, skipping malformed items
    pub fn parse(raw: &str) -> Self {
        let role_implications = raw
            .split(',')
            .filter_map(|pair| {
                let (from, to) = pair.split_once('>')?;
                let (from, to) = (from.trim(), to.trim());
                if from.is_empty() || to.is_empty() {
                    return None;
                }
                Some((from.to_uppercase(), to.to_uppercase()))
            })
            .collect();
        Self { role_implications }
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert_eq!(config.algorithm, "HS256");
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.secret, "my-secret");
        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_role_implications_parse() {
        let config = AuthorizationConfig::parse("admin>HOSPITAL, HOSPITAL > doctor,broken,>X");
        assert_eq!(
            config.role_implications,
            vec![
                ("ADMIN".to_string(), "HOSPITAL".to_string()),
                ("HOSPITAL".to_string(), "DOCTOR".to_string()),
            ]
        );
    }

    #[test]
    fn test_role_implications_empty() {
        assert!(AuthorizationConfig::parse("").role_implications.is_empty());
    }
}
