use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use coreflow_core::DomainError;
use coreflow_hr::HrError;
use coreflow_inventory::InventoryError;
use coreflow_legal::LegalError;
use coreflow_orchestrator::RegistryError;
use coreflow_tasks::TaskError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message.into(),
            },
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
    }
}

pub fn registry_error_to_response(err: RegistryError) -> axum::response::Response {
    match err {
        RegistryError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        RegistryError::Duplicate(id) => json_error(
            StatusCode::CONFLICT,
            "duplicate_plugin",
            format!("plugin '{id}' is already registered"),
        ),
        RegistryError::MissingDependency { plugin, dependency } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_dependency",
            format!("plugin '{plugin}' requires '{dependency}'"),
        ),
        RegistryError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("plugin '{id}' is not registered"),
        ),
        RegistryError::DependedUpon { plugin, dependent } => json_error(
            StatusCode::CONFLICT,
            "depended_upon",
            format!("plugin '{plugin}' is required by '{dependent}'"),
        ),
        RegistryError::Plugin(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "plugin_error", e.to_string())
        }
        RegistryError::TenantIsolation => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", "tenant mismatch")
        }
    }
}

pub fn task_error_to_response(err: TaskError) -> axum::response::Response {
    match err {
        TaskError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("task '{id}' does not exist"),
        ),
        TaskError::TenantIsolation => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", "tenant mismatch")
        }
        TaskError::Rejected(msg) => json_error(StatusCode::BAD_REQUEST, "task_rejected", msg),
        TaskError::Timeout { task_id, waited } => json_error(
            StatusCode::GATEWAY_TIMEOUT,
            "task_timeout",
            format!("task '{task_id}' did not finish within {waited:?}"),
        ),
        TaskError::Failed(msg) => json_error(StatusCode::BAD_GATEWAY, "task_failed", msg),
        TaskError::Cancelled(id) => json_error(
            StatusCode::CONFLICT,
            "task_cancelled",
            format!("task '{id}' was cancelled"),
        ),
        TaskError::ChannelClosed => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "channel_closed",
            "task completion channel closed",
        ),
    }
}

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    match err {
        InventoryError::Domain(e) => domain_error_to_response(e),
        other => json_error(StatusCode::BAD_GATEWAY, "ai_task_failed", other.to_string()),
    }
}

pub fn hr_error_to_response(err: HrError) -> axum::response::Response {
    match err {
        HrError::Domain(e) => domain_error_to_response(e),
        other => json_error(StatusCode::BAD_GATEWAY, "ai_task_failed", other.to_string()),
    }
}

pub fn legal_error_to_response(err: LegalError) -> axum::response::Response {
    match err {
        LegalError::Domain(e) => domain_error_to_response(e),
        other => json_error(StatusCode::BAD_GATEWAY, "ai_task_failed", other.to_string()),
    }
}
