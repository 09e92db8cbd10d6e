//! Business services containing domain logic and use cases.

pub mod authorization;
pub mod credentials;
pub mod token;

// Re-export commonly used types
pub use authorization::RoleAuthorizer;
pub use credentials::{CredentialVerifier, Principal};
pub use token::{
    ClockSource, ManualClock, SigningKeyProvider, SigningKeys, SystemClock, TokenCodec,
    TokenService, TokenServiceConfig,
};
