use coreflow_core::TenantId;

use crate::SyncEnvelope;

/// Helper trait for tenant-scoped messages.
///
/// Marks types carrying a tenant id so infrastructure (subscription loops,
/// per-tenant orchestrators) can filter or assert scope without knowing the
/// payload type.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}

impl<P> TenantScoped for SyncEnvelope<P> {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id()
    }
}
