//! Roles, capabilities and per-user permission grants
//!
//! The role set is closed: the permission matrix in [`crate::matrix`]
//! matches on it exhaustively, so adding a role is a compile-time event,
//! not a string comparison scattered across handlers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user deletion and the activity log
    Administrator,
    /// Operational management; may only manage front-desk users
    Manager,
    /// Front desk: cash operations plus explicitly granted capabilities
    Reception,
    /// Salesperson: clients and own sales records only
    Sales,
}

impl Role {
    /// Returns the stable snake_case name used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Manager => "manager",
            Role::Reception => "reception",
            Role::Sales => "sales",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "manager" => Ok(Role::Manager),
            "reception" => Ok(Role::Reception),
            "sales" => Ok(Role::Sales),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Named capabilities a Reception user can be granted beyond the baseline
///
/// Grants are only consulted for the Reception role; for every other role the
/// matrix decides from the role alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Bill and installment management
    Bills,
    /// Product management
    Products,
    /// Client create/update (read is baseline)
    Clients,
    /// Report and dashboard access
    Reports,
}

impl Capability {
    /// Returns the stable snake_case name used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Bills => "bills",
            Capability::Products => "products",
            Capability::Clients => "clients",
            Capability::Reports => "reports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bills" => Ok(Capability::Bills),
            "products" => Ok(Capability::Products),
            "clients" => Ok(Capability::Clients),
            "reports" => Ok(Capability::Reports),
            other => Err(format!("unknown capability: {other}")),
        }
    }
}

/// Per-user capability overrides
///
/// A capability is unlocked only when it is present *and* true; an absent
/// entry is a deny, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionGrants(BTreeMap<Capability, bool>);

impl PermissionGrants {
    /// Creates an empty grant set
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets a capability flag
    pub fn set(&mut self, capability: Capability, granted: bool) {
        self.0.insert(capability, granted);
    }

    /// Builder-style grant
    pub fn with(mut self, capability: Capability) -> Self {
        self.set(capability, true);
        self
    }

    /// Returns true only for a capability explicitly present and true
    pub fn allows(&self, capability: Capability) -> bool {
        self.0.get(&capability).copied().unwrap_or(false)
    }

    /// Iterates over all explicit entries
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.0.iter().map(|(c, g)| (*c, *g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            Role::Administrator,
            Role::Manager,
            Role::Reception,
            Role::Sales,
        ] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn absent_grant_is_deny() {
        let grants = PermissionGrants::none();
        assert!(!grants.allows(Capability::Bills));
    }

    #[test]
    fn explicit_false_grant_is_deny() {
        let mut grants = PermissionGrants::none();
        grants.set(Capability::Bills, false);
        assert!(!grants.allows(Capability::Bills));
    }

    #[test]
    fn explicit_true_grant_allows() {
        let grants = PermissionGrants::none().with(Capability::Bills);
        assert!(grants.allows(Capability::Bills));
        assert!(!grants.allows(Capability::Reports));
    }
}
