//! API-side authorization guard for handlers.
//!
//! This enforces authorization at the route boundary (before touching the
//! orchestrator or any plugin), while keeping domain code auth-agnostic.

use coreflow_auth::{AuthzError, Permission, Principal, TenantMembership, authorize};

use crate::context::{PrincipalContext, TenantContext};

/// Check that the request principal holds every listed permission.
///
/// This is intended to be called at the **top** of each protected handler.
pub fn require(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    required: &[Permission],
) -> Result<(), AuthzError> {
    let membership = TenantMembership {
        tenant_id: tenant.tenant_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let resolved = Principal {
        principal_id: principal.principal_id(),
        active_tenant_id: tenant.tenant_id(),
        membership,
    };

    for perm in required {
        authorize(&resolved, perm)?;
    }

    Ok(())
}

/// Minimal role→permission mapping stub.
///
/// This is intentionally simple until a real policy source exists (e.g. DB-backed).
fn permissions_from_roles(roles: &[coreflow_auth::Role]) -> Vec<Permission> {
    // Convention: "admin" grants all permissions in the current tenant.
    if roles.iter().any(|r| r.as_str() == "admin") {
        return vec![Permission::new("*")];
    }

    Vec::new()
}
