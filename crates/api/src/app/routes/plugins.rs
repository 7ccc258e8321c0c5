use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use coreflow_auth::Permission;
use coreflow_core::PluginId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/plugins", get(list_plugins))
        .route("/plugins/:id/activate", post(activate_plugin))
        .route("/plugins/:id/deactivate", post(deactivate_plugin))
}

pub async fn list_plugins(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("plugins.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    dto::ok(state.orchestrator.list_plugins())
}

pub async fn activate_plugin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("plugins.manage")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let plugin_id = PluginId::new(id);
    let state = services.tenant(tenant.tenant_id());
    match state.orchestrator.activate_plugin(&plugin_id) {
        Ok(()) => dto::ok(serde_json::json!({
            "id": plugin_id.as_str(),
            "status": state.orchestrator.plugin_status(&plugin_id),
        })),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn deactivate_plugin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("plugins.manage")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let plugin_id = PluginId::new(id);
    let state = services.tenant(tenant.tenant_id());
    match state.orchestrator.deactivate_plugin(&plugin_id) {
        Ok(()) => dto::ok(serde_json::json!({
            "id": plugin_id.as_str(),
            "status": state.orchestrator.plugin_status(&plugin_id),
        })),
        Err(e) => errors::registry_error_to_response(e),
    }
}
