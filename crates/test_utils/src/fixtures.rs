//! Pre-built actors and common test data

use core_kernel::UserId;
use domain_access::{Actor, Capability, PermissionGrants, Role};

/// A CPF that passes check-digit validation
pub const VALID_CPF: &str = "52998224725";
/// The same CPF in canonical form
pub const VALID_CPF_CANONICAL: &str = "529.982.247-25";
/// A second valid CPF for uniqueness tests
pub const VALID_CPF_2: &str = "11144477735";

/// Administrator actor
pub fn admin_actor() -> Actor {
    Actor::new(
        UserId::new(),
        "ADMIN",
        Role::Administrator,
        PermissionGrants::none(),
    )
}

/// Manager actor
pub fn manager_actor() -> Actor {
    Actor::new(
        UserId::new(),
        "GERENTE",
        Role::Manager,
        PermissionGrants::none(),
    )
}

/// Reception actor with no extra grants
pub fn reception_actor() -> Actor {
    Actor::new(
        UserId::new(),
        "RECEPCAO",
        Role::Reception,
        PermissionGrants::none(),
    )
}

/// Reception actor with one granted capability
pub fn reception_actor_with(capability: Capability) -> Actor {
    Actor::new(
        UserId::new(),
        "VERONICA",
        Role::Reception,
        PermissionGrants::none().with(capability),
    )
}

/// Sales actor
pub fn sales_actor() -> Actor {
    Actor::new(
        UserId::new(),
        "VENDEDOR",
        Role::Sales,
        PermissionGrants::none(),
    )
}
