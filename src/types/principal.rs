//! Staff principals, their roles and the capabilities roles grant

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff member identifier
pub type StaffId = u32;

/// Role of a staff member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teller,
    Manager,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Teller => write!(f, "teller"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teller" => Ok(Role::Teller),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role '{}'", other)),
        }
    }
}

/// A permission an operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Move funds, open accounts and read the ledger
    LedgerWrite,
    /// Approve or reject held transactions
    ApprovalResolve,
}

impl Capability {
    /// Roles holding this capability
    pub fn roles(self) -> &'static [Role] {
        match self {
            Capability::LedgerWrite => &[Role::Teller, Role::Manager, Role::Admin],
            Capability::ApprovalResolve => &[Role::Manager, Role::Admin],
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::LedgerWrite => write!(f, "ledger-write"),
            Capability::ApprovalResolve => write!(f, "approval-resolve"),
        }
    }
}

/// The staff member on whose behalf an operation runs
///
/// Passed explicitly to every engine call; there is no ambient session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: StaffId,
    pub username: String,
    pub role: Role,
    pub suspended: bool,
}

impl Principal {
    /// Active (not suspended) principal
    pub fn new(id: StaffId, username: impl Into<String>, role: Role) -> Self {
        Principal {
            id,
            username: username.into(),
            role,
            suspended: false,
        }
    }

    /// Mark the principal as suspended
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    pub fn is_teller(&self) -> bool {
        self.role == Role::Teller
    }
}
