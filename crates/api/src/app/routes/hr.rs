use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use coreflow_auth::Permission;
use coreflow_core::EntityId;
use coreflow_hr::{AttritionRequest, CreateEmployee, CreateTimesheet, TalentRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/:id", get(get_employee))
        .route("/timesheets", post(create_timesheet))
        .route("/attrition", post(analyze_attrition))
        .route("/talent", post(optimize_talent))
}

pub async fn create_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CreateEmployee>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.write")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    match state.hr.create_employee(body) {
        Ok(employee) => dto::created(employee),
        Err(e) => errors::hr_error_to_response(e),
    }
}

pub async fn list_employees(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    dto::ok(state.hr.list_employees())
}

pub async fn get_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.read")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let employee_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid employee id");
        }
    };

    let state = services.tenant(tenant.tenant_id());
    match state.hr.employee(employee_id) {
        Ok(employee) => dto::ok(employee),
        Err(e) => errors::hr_error_to_response(e),
    }
}

pub async fn create_timesheet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CreateTimesheet>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.write")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    match state.hr.create_timesheet(body) {
        Ok(timesheet) => dto::created(timesheet),
        Err(e) => errors::hr_error_to_response(e),
    }
}

pub async fn analyze_attrition(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<AttritionRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    // Blocks on task completion, so shift off the async worker.
    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.hr.analyze_attrition_risk(body)).await;
    match result {
        Ok(Ok(report)) => dto::ok(report),
        Ok(Err(e)) => errors::hr_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}

pub async fn optimize_talent(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<TalentRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("hr.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.hr.optimize_talent(body)).await;
    match result {
        Ok(Ok(plan)) => dto::ok(plan),
        Ok(Err(e)) => errors::hr_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}
