use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use coreflow_auth::Permission;
use coreflow_tasks::{TaskId, TaskKind, TaskOrchestrator, TaskRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/tasks", post(submit_task))
        .route("/tasks/:id", get(get_task))
        .route("/tasks/:id/cancel", post(cancel_task))
}

pub async fn submit_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::SubmitTaskRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("tasks.submit")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let kind = TaskKind::from_name(&body.kind);
    let mut request =
        TaskRequest::new(tenant.tenant_id(), kind, body.payload).with_context(body.context);
    if let Some(requirements) = body.requirements {
        request = request.with_requirements(requirements.into_requirements());
    }
    if let Some(priority) = body.priority {
        request = request.with_priority(priority);
    }

    match services.tasks().submit(request) {
        Ok(task_id) => dto::accepted(serde_json::json!({ "task_id": task_id.to_string() })),
        Err(e) => errors::task_error_to_response(e),
    }
}

pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("tasks.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let uuid: Uuid = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid task id"),
    };

    match services.tasks().task(tenant.tenant_id(), TaskId::from_uuid(uuid)) {
        Ok(task) => dto::ok(dto::task_to_json(&task)),
        Err(e) => errors::task_error_to_response(e),
    }
}

pub async fn cancel_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("tasks.cancel")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let uuid: Uuid = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid task id"),
    };

    match services.tasks().cancel(tenant.tenant_id(), TaskId::from_uuid(uuid)) {
        Ok(task) => dto::ok(dto::task_to_json(&task)),
        Err(e) => errors::task_error_to_response(e),
    }
}
