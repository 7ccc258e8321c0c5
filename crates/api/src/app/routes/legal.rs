use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use coreflow_auth::Permission;
use coreflow_core::EntityId;
use coreflow_legal::{AddDeadline, CreateCase, CreateDocument};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/cases", get(list_cases).post(create_case))
        .route("/cases/:id", get(get_case))
        .route("/cases/:id/deadlines", post(add_deadline))
        .route("/cases/:id/strategy", post(generate_strategy))
        .route("/cases/:id/deadlines/analyze", post(analyze_deadlines))
        .route("/documents", post(create_document))
        .route("/documents/:id/analyze", post(analyze_document))
}

pub async fn create_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CreateCase>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.write")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    match state.legal.create_case(body) {
        Ok(case) => dto::created(case),
        Err(e) => errors::legal_error_to_response(e),
    }
}

pub async fn list_cases(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    dto::ok(state.legal.list_cases())
}

pub async fn get_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let case_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    let state = services.tenant(tenant.tenant_id());
    match state.legal.case(case_id) {
        Ok(case) => dto::ok(case),
        Err(e) => errors::legal_error_to_response(e),
    }
}

pub async fn add_deadline(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<AddDeadline>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.write")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let case_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    let state = services.tenant(tenant.tenant_id());
    match state.legal.add_deadline(case_id, body) {
        Ok(deadline) => dto::created(deadline),
        Err(e) => errors::legal_error_to_response(e),
    }
}

pub async fn create_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CreateDocument>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.write")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    match state.legal.create_document(body) {
        Ok(document) => dto::created(document),
        Err(e) => errors::legal_error_to_response(e),
    }
}

pub async fn analyze_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let document_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id");
        }
    };

    // Blocks on task completion, so shift off the async worker.
    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.legal.analyze_document(document_id)).await;
    match result {
        Ok(Ok(analysis)) => dto::ok(analysis),
        Ok(Err(e)) => errors::legal_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}

pub async fn generate_strategy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let case_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    let state = services.tenant(tenant.tenant_id());
    let result =
        tokio::task::spawn_blocking(move || state.legal.generate_case_strategy(case_id)).await;
    match result {
        Ok(Ok(strategy)) => dto::ok(strategy),
        Ok(Err(e)) => errors::legal_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}

pub async fn analyze_deadlines(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("legal.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let case_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.legal.analyze_deadlines(case_id)).await;
    match result {
        Ok(Ok(assessment)) => dto::ok(assessment),
        Ok(Err(e)) => errors::legal_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}
