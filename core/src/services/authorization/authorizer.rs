//! Role checks against an operation's declared role set

use std::collections::HashSet;
use tw_shared::AuthorizationConfig;

use crate::domain::entities::Role;
use crate::errors::AuthError;

/// Decides whether a role may perform an operation
///
/// Pure set membership. With no implications configured, a role passes only
/// when it is listed in the required set. Implications grant one extra role
/// each and are not chained: `ADMIN>HOSPITAL` and `HOSPITAL>DOCTOR` do not
/// let ADMIN pass a DOCTOR-only check.
#[derive(Debug, Clone, Default)]
pub struct RoleAuthorizer {
    implications: HashSet<(Role, Role)>,
}

impl RoleAuthorizer {
    /// Exact-membership authorizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorizer where each `(granting, implied)` pair lets `granting` pass
    /// checks that require `implied`
    pub fn with_implications(pairs: impl IntoIterator<Item = (Role, Role)>) -> Self {
        Self {
            implications: pairs.into_iter().collect(),
        }
    }

    /// Builds the authorizer from configured role names
    ///
    /// # Returns
    ///
    /// * `Err(AuthError::UnknownRole)` - A configured name is not a role
    pub fn from_config(config: &AuthorizationConfig) -> Result<Self, AuthError> {
        let pairs = config
            .role_implications
            .iter()
            .map(|(granting, implied)| Ok((granting.parse::<Role>()?, implied.parse::<Role>()?)))
            .collect::<Result<Vec<(Role, Role)>, AuthError>>()?;
        Ok(Self::with_implications(pairs))
    }

    /// Allows `role` if it is in `required`, or directly implies a role that is
    pub fn check(&self, role: Role, required: &[Role]) -> Result<(), AuthError> {
        if self.permits(role, required) {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole { role })
        }
    }

    pub fn permits(&self, role: Role, required: &[Role]) -> bool {
        required
            .iter()
            .any(|needed| *needed == role || self.implications.contains(&(role, *needed)))
    }

    /// Configured implication pairs
    pub fn implications(&self) -> impl Iterator<Item = &(Role, Role)> {
        self.implications.iter()
    }
}
