use std::collections::HashMap;
use std::sync::Arc;

use axum::{Router, extract::Extension, http::StatusCode, routing::get};
use chrono::Utc;

use coreflow_auth::Permission;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/observability/analytics", get(analytics))
}

/// Compact counters for dashboards and probes.
pub async fn metrics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::require(&tenant, &principal, &[Permission::new("observability.read")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let tenant_id = tenant.tenant_id();
    let state = services.tenant(tenant_id);
    dto::ok(serde_json::json!({
        "uptime_seconds": (Utc::now() - services.started_at()).num_seconds(),
        "plugin_count": state.orchestrator.plugin_count(),
        "adapter_count": state.orchestrator.adapter_count(),
        "tasks": services.tasks().stats(tenant_id),
        "sync_deliveries": state.connector.delivery_count(),
    }))
}

/// Cross-module analytics rollup for the current tenant.
pub async fn analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::require(&tenant, &principal, &[Permission::new("observability.read")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let tenant_id = tenant.tenant_id();
    let state = services.tenant(tenant_id);

    let insights = services.insights_for(tenant_id);
    let mut by_kind: HashMap<String, usize> = HashMap::new();
    for record in &insights {
        *by_kind.entry(record.kind.type_name().to_string()).or_insert(0) += 1;
    }

    dto::ok(serde_json::json!({
        "uptime_seconds": (Utc::now() - services.started_at()).num_seconds(),
        "plugins": state.orchestrator.list_plugins(),
        "tasks": services.tasks().stats(tenant_id),
        "insights": {
            "total": insights.len(),
            "by_kind": by_kind,
        },
        "sync": {
            "deliveries": state.connector.delivery_count(),
        },
        "entities": {
            "inventory_items": state.inventory.item_count(),
            "employees": state.hr.employee_count(),
            "timesheets": state.hr.timesheet_count(),
            "cases": state.legal.case_count(),
            "documents": state.legal.document_count(),
        },
    }))
}
