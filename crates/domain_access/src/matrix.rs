//! The permission matrix
//!
//! `authorize` is the single decision point for every operation in the
//! system. Services call it before touching any entity, so a 403 never
//! depends on whether the target exists.
//!
//! Precedence, most specific first:
//!
//! 1. Self-service password change is allowed for the owning user, any role.
//! 2. Administrator passes every remaining check.
//! 3. Manager manages front-desk (reception/sales) users and all operational
//!    data, but never administrators, other managers, user deletion or the
//!    activity log.
//! 4. Sales manages clients and own sales records, reads products/clients.
//! 5. Reception has a fixed cash-desk baseline plus explicit grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::UserId;

use crate::role::{Capability, PermissionGrants, Role};

/// The resolved identity the authentication boundary hands to the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub grants: PermissionGrants,
}

impl Actor {
    pub fn new(id: UserId, name: impl Into<String>, role: Role, grants: PermissionGrants) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            grants,
        }
    }
}

/// Every operation the matrix can rule on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // User management
    CreateUser { role: Role },
    UpdateUser { target_role: Role },
    DeleteUser,
    ListUsers,
    // Audit
    ViewActivityLog,
    // Registry
    ManageProducts,
    ViewProducts,
    CreateClient,
    UpdateClient,
    ViewClients,
    // Billing
    ManageBills,
    ViewBills,
    // Ledger / cash desk
    RecordCashTransaction,
    CancelTransaction,
    ViewTransactions,
    // Sales
    RecordSale,
    ViewOwnSales,
    // Reporting
    ViewReports,
    // Self service
    ChangeOwnPassword { target: UserId },
}

/// Stable, role-appropriate reasons surfaced on every deny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    AdministratorOnly,
    ManagersManageFrontDeskOnly,
    UserManagementNotAllowed,
    CapabilityNotGranted(Capability),
    RoleNotAllowed,
    NotAccountOwner,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::AdministratorOnly => {
                write!(f, "only administrators may perform this action")
            }
            DenyReason::ManagersManageFrontDeskOnly => {
                write!(f, "managers may only manage reception and sales users")
            }
            DenyReason::UserManagementNotAllowed => {
                write!(f, "this role may not manage users")
            }
            DenyReason::CapabilityNotGranted(capability) => {
                write!(f, "capability not granted: {capability}")
            }
            DenyReason::RoleNotAllowed => {
                write!(f, "this role may not perform this action")
            }
            DenyReason::NotAccountOwner => {
                write!(f, "password can only be changed by the account owner")
            }
        }
    }
}

/// An authorization denial
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied: {reason}")]
pub struct AccessDenied {
    pub reason: DenyReason,
}

impl AccessDenied {
    fn new(reason: DenyReason) -> Self {
        Self { reason }
    }
}

/// Decides whether `actor` may perform `action`.
///
/// This is the whole rule table of the system in one exhaustive match;
/// review it top to bottom against the precedence in the module docs.
pub fn authorize(actor: &Actor, action: &Action) -> Result<(), AccessDenied> {
    use Action::*;

    // Rule 1: self-service password change, any role, own account only.
    if let ChangeOwnPassword { target } = action {
        return if *target == actor.id {
            Ok(())
        } else if actor.role == Role::Administrator {
            Ok(())
        } else {
            Err(AccessDenied::new(DenyReason::NotAccountOwner))
        };
    }

    // Rule 2: administrators pass every check.
    if actor.role == Role::Administrator {
        return Ok(());
    }

    match (actor.role, action) {
        // Unreachable: handled above, kept so the match stays exhaustive
        // for every remaining role.
        (Role::Administrator, _) => Ok(()),

        // Rule 3: managers.
        (Role::Manager, CreateUser { role } | UpdateUser { target_role: role }) => {
            match role {
                Role::Reception | Role::Sales => Ok(()),
                Role::Administrator | Role::Manager => {
                    Err(AccessDenied::new(DenyReason::ManagersManageFrontDeskOnly))
                }
            }
        }
        (Role::Manager, DeleteUser) => Err(AccessDenied::new(DenyReason::AdministratorOnly)),
        (Role::Manager, ViewActivityLog) => Err(AccessDenied::new(DenyReason::AdministratorOnly)),
        (Role::Manager, _) => Ok(()),

        // Rule 4: sales.
        (
            Role::Sales,
            CreateClient | UpdateClient | ViewClients | ViewProducts | RecordSale | ViewOwnSales,
        ) => Ok(()),
        (Role::Sales, CreateUser { .. } | UpdateUser { .. } | DeleteUser | ListUsers) => {
            Err(AccessDenied::new(DenyReason::UserManagementNotAllowed))
        }
        (Role::Sales, ViewActivityLog) => Err(AccessDenied::new(DenyReason::AdministratorOnly)),
        (Role::Sales, _) => Err(AccessDenied::new(DenyReason::RoleNotAllowed)),

        // Rule 5: reception baseline, then explicit grants.
        (
            Role::Reception,
            RecordCashTransaction | CancelTransaction | ViewTransactions | ViewClients
            | ViewProducts,
        ) => Ok(()),
        (Role::Reception, ManageBills | ViewBills) => {
            granted(actor, Capability::Bills)
        }
        (Role::Reception, ManageProducts) => granted(actor, Capability::Products),
        (Role::Reception, CreateClient | UpdateClient) => granted(actor, Capability::Clients),
        (Role::Reception, ViewReports) => granted(actor, Capability::Reports),
        (Role::Reception, CreateUser { .. } | UpdateUser { .. } | DeleteUser | ListUsers) => {
            Err(AccessDenied::new(DenyReason::UserManagementNotAllowed))
        }
        (Role::Reception, ViewActivityLog) => Err(AccessDenied::new(DenyReason::AdministratorOnly)),
        (Role::Reception, RecordSale | ViewOwnSales) => {
            Err(AccessDenied::new(DenyReason::RoleNotAllowed))
        }
        (Role::Reception, ChangeOwnPassword { .. }) => Ok(()),
    }
}

fn granted(actor: &Actor, capability: Capability) -> Result<(), AccessDenied> {
    if actor.grants.allows(capability) {
        Ok(())
    } else {
        Err(AccessDenied::new(DenyReason::CapabilityNotGranted(
            capability,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::PermissionGrants;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(), "TEST", role, PermissionGrants::none())
    }

    fn reception_with(capability: Capability) -> Actor {
        Actor::new(
            UserId::new(),
            "FRONT DESK",
            Role::Reception,
            PermissionGrants::none().with(capability),
        )
    }

    #[test]
    fn administrator_passes_every_check() {
        let admin = actor(Role::Administrator);
        let actions = [
            Action::CreateUser {
                role: Role::Administrator,
            },
            Action::DeleteUser,
            Action::ViewActivityLog,
            Action::ManageProducts,
            Action::ManageBills,
            Action::RecordCashTransaction,
            Action::ViewReports,
            Action::RecordSale,
        ];
        for action in actions {
            assert!(authorize(&admin, &action).is_ok(), "denied: {action:?}");
        }
    }

    #[test]
    fn manager_creates_front_desk_users_only() {
        let manager = actor(Role::Manager);

        assert!(authorize(&manager, &Action::CreateUser { role: Role::Reception }).is_ok());
        assert!(authorize(&manager, &Action::CreateUser { role: Role::Sales }).is_ok());

        for role in [Role::Administrator, Role::Manager] {
            let denied = authorize(&manager, &Action::CreateUser { role }).unwrap_err();
            assert_eq!(denied.reason, DenyReason::ManagersManageFrontDeskOnly);
        }
    }

    #[test]
    fn manager_cannot_edit_peers_or_admins() {
        let manager = actor(Role::Manager);

        assert!(authorize(
            &manager,
            &Action::UpdateUser {
                target_role: Role::Sales
            }
        )
        .is_ok());

        let denied = authorize(
            &manager,
            &Action::UpdateUser {
                target_role: Role::Manager,
            },
        )
        .unwrap_err();
        assert_eq!(denied.reason, DenyReason::ManagersManageFrontDeskOnly);
    }

    #[test]
    fn manager_denied_audit_log_and_user_deletion() {
        let manager = actor(Role::Manager);

        assert_eq!(
            authorize(&manager, &Action::ViewActivityLog)
                .unwrap_err()
                .reason,
            DenyReason::AdministratorOnly
        );
        assert_eq!(
            authorize(&manager, &Action::DeleteUser).unwrap_err().reason,
            DenyReason::AdministratorOnly
        );
    }

    #[test]
    fn manager_manages_operational_data() {
        let manager = actor(Role::Manager);
        for action in [
            Action::ManageProducts,
            Action::ManageBills,
            Action::CreateClient,
            Action::ViewReports,
            Action::RecordCashTransaction,
        ] {
            assert!(authorize(&manager, &action).is_ok());
        }
    }

    #[test]
    fn sales_scope_is_clients_and_own_sales() {
        let sales = actor(Role::Sales);

        for action in [
            Action::CreateClient,
            Action::UpdateClient,
            Action::ViewClients,
            Action::ViewProducts,
            Action::RecordSale,
            Action::ViewOwnSales,
        ] {
            assert!(authorize(&sales, &action).is_ok(), "denied: {action:?}");
        }

        for action in [
            Action::ManageProducts,
            Action::ManageBills,
            Action::ViewReports,
            Action::ViewTransactions,
            Action::RecordCashTransaction,
        ] {
            assert!(authorize(&sales, &action).is_err(), "allowed: {action:?}");
        }

        assert_eq!(
            authorize(&sales, &Action::CreateUser { role: Role::Sales })
                .unwrap_err()
                .reason,
            DenyReason::UserManagementNotAllowed
        );
    }

    #[test]
    fn reception_baseline_covers_cash_desk() {
        let reception = actor(Role::Reception);

        for action in [
            Action::RecordCashTransaction,
            Action::CancelTransaction,
            Action::ViewTransactions,
            Action::ViewClients,
            Action::ViewProducts,
        ] {
            assert!(authorize(&reception, &action).is_ok(), "denied: {action:?}");
        }
    }

    #[test]
    fn reception_bills_requires_grant() {
        let without = actor(Role::Reception);
        let denied = authorize(&without, &Action::ManageBills).unwrap_err();
        assert_eq!(
            denied.reason,
            DenyReason::CapabilityNotGranted(Capability::Bills)
        );

        let with = reception_with(Capability::Bills);
        assert!(authorize(&with, &Action::ManageBills).is_ok());
        assert!(authorize(&with, &Action::ViewBills).is_ok());
        // An unrelated grant unlocks nothing else.
        assert!(authorize(&with, &Action::ViewReports).is_err());
    }

    #[test]
    fn self_service_password_change_any_role() {
        for role in [Role::Manager, Role::Reception, Role::Sales] {
            let user = actor(role);
            assert!(authorize(
                &user,
                &Action::ChangeOwnPassword { target: user.id }
            )
            .is_ok());

            let other = UserId::new();
            assert!(authorize(&user, &Action::ChangeOwnPassword { target: other }).is_err());
        }
    }

    #[test]
    fn admin_may_change_any_password() {
        let admin = actor(Role::Administrator);
        let other = UserId::new();
        assert!(authorize(&admin, &Action::ChangeOwnPassword { target: other }).is_ok());
    }
}
