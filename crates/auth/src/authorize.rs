use std::collections::HashSet;

use thiserror::Error;

use coreflow_core::TenantId;

use crate::{Permission, PrincipalId, TenantMembership};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API layer derives memberships from claims and a policy
/// mapping before any handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_tenant_id: TenantId,
    pub membership: TenantMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within its active tenant context.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_tenant_id != principal.membership.tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    let perms: HashSet<&str> = principal
        .membership
        .permissions
        .iter()
        .map(|p| p.as_str())
        .collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn principal(perms: &[&'static str]) -> Principal {
        let tenant_id = TenantId::new();
        Principal {
            principal_id: PrincipalId::new(),
            active_tenant_id: tenant_id,
            membership: TenantMembership {
                tenant_id,
                roles: vec![Role::new("user")],
                permissions: perms.iter().map(|p| Permission::new(*p)).collect(),
            },
        }
    }

    #[test]
    fn explicit_permission_is_granted() {
        let p = principal(&["inventory.read"]);
        assert_eq!(authorize(&p, &Permission::new("inventory.read")), Ok(()));
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(&["*"]);
        assert_eq!(authorize(&p, &Permission::new("legal.ai")), Ok(()));
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let p = principal(&["inventory.read"]);
        assert_eq!(
            authorize(&p, &Permission::new("inventory.write")),
            Err(AuthzError::Forbidden("inventory.write".into()))
        );
    }

    #[test]
    fn foreign_membership_is_a_tenant_mismatch() {
        let mut p = principal(&["*"]);
        p.active_tenant_id = TenantId::new();
        assert_eq!(
            authorize(&p, &Permission::new("inventory.read")),
            Err(AuthzError::TenantMismatch)
        );
    }
}
