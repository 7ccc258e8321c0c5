use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::post,
};
use serde_json::Value;

use coreflow_adapters::EntityPayload;
use coreflow_auth::Permission;
use coreflow_events::{EventBus, SyncEnvelope};

use crate::app::services::{AppServices, RealtimeMessage};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/sync", post(sync_entity))
}

/// Fan a changed entity out to every module routed for its kind.
pub async fn sync_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(payload): Json<EntityPayload>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("sync.execute")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let envelope = SyncEnvelope::entity_changed(
        tenant.tenant_id(),
        payload.kind(),
        payload.entity_id(),
        payload,
    );

    let state = services.tenant(tenant.tenant_id());
    let report = match state.orchestrator.handle_entity_sync(&envelope) {
        Ok(report) => report,
        Err(e) => return errors::registry_error_to_response(e),
    };

    // Re-publish for bus listeners outside the orchestrator (SSE bridge, tests).
    let as_value = envelope.map_payload(|p| serde_json::to_value(p).unwrap_or(Value::Null));
    if let Err(error) = services.bus().publish(as_value) {
        tracing::warn!(?error, "failed to publish entity-changed event");
    }

    let _ = services.realtime_tx().send(RealtimeMessage {
        tenant_id: tenant.tenant_id(),
        topic: format!("{}.sync_completed", report.entity.as_str()),
        payload: serde_json::json!({
            "entity_id": report.entity_id.to_string(),
            "delivered": report.delivered,
            "failed": report.failed.len(),
            "skipped": report.skipped,
        }),
    });

    dto::ok(report)
}
