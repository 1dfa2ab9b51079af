//! Capability checks for staff principals
//!
//! Which roles hold which capability is defined once, in
//! [`Capability::roles`]. The guard only answers whether a principal is
//! allowed to exercise a capability right now.

use crate::types::{Capability, LedgerError, Principal};

/// Stateless capability checker
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Check that `principal` holds `capability`
    ///
    /// # Arguments
    ///
    /// * `principal` - The caller, or `None` for an unidentified caller
    /// * `capability` - The capability the operation requires
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PermissionDenied` if the principal is absent,
    /// suspended, or has a role outside the capability's role set.
    pub fn authorize(
        principal: Option<&Principal>,
        capability: Capability,
    ) -> Result<(), LedgerError> {
        match principal {
            Some(p) if !p.suspended && capability.roles().contains(&p.role) => Ok(()),
            other => Err(LedgerError::permission_denied(
                other.map(|p| p.id),
                capability,
            )),
        }
    }

    /// Like [`authorize`](Self::authorize), handing back the admitted principal
    pub fn require<'p>(
        principal: Option<&'p Principal>,
        capability: Capability,
    ) -> Result<&'p Principal, LedgerError> {
        Self::authorize(principal, capability)?;
        principal.ok_or(LedgerError::permission_denied(None, capability))
    }
}
