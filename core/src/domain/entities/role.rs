//! Authorization roles carried in every token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AuthError;

/// Closed set of authorization levels
///
/// There is no ordering between roles: ADMIN does not pass a check that only
/// lists DOCTOR unless a role implication is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hospital,
    Doctor,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Hospital, Role::Doctor];

    /// Returns the wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hospital => "HOSPITAL",
            Role::Doctor => "DOCTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "HOSPITAL" => Ok(Role::Hospital),
            "DOCTOR" => Ok(Role::Doctor),
            _ => Err(AuthError::UnknownRole {
                name: s.to_string(),
            }),
        }
    }
}
