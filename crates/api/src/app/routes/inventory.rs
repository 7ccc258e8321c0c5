use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use coreflow_auth::Permission;
use coreflow_core::EntityId;
use coreflow_inventory::{CreateItem, ForecastRequest, RecordMovement, SupplierAnalysisRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/movements", get(list_movements).post(record_movement))
        .route("/forecast", post(generate_forecast))
        .route("/optimize", post(optimize_stock))
        .route("/suppliers/analyze", post(analyze_supplier))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<CreateItem>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::require(&tenant, &principal, &[Permission::new("inventory.write")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    match state.inventory.create_item(body) {
        Ok(item) => dto::created(item),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.read")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    dto::ok(state.inventory.list_items())
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.read")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let item_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    let state = services.tenant(tenant.tenant_id());
    match state.inventory.item(item_id) {
        Ok(item) => dto::ok(item),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordMovementRequest>,
) -> axum::response::Response {
    if let Err(e) =
        crate::authz::require(&tenant, &principal, &[Permission::new("inventory.write")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let item_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    let state = services.tenant(tenant.tenant_id());
    let input = RecordMovement {
        item_id,
        kind: body.kind,
        quantity: body.quantity,
        reference: body.reference,
    };
    match state.inventory.record_movement(input) {
        Ok((movement, item)) => dto::created(serde_json::json!({
            "movement": movement,
            "item": item,
        })),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.read")])
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let item_id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    let state = services.tenant(tenant.tenant_id());
    dto::ok(state.inventory.movements_for(item_id))
}

pub async fn generate_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<ForecastRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    // Blocks on task completion, so shift off the async worker.
    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.inventory.generate_demand_forecast(body))
        .await;
    match result {
        Ok(Ok(forecast)) => dto::ok(forecast),
        Ok(Err(e)) => errors::inventory_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}

pub async fn optimize_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.inventory.optimize_stock()).await;
    match result {
        Ok(Ok(plan)) => dto::ok(plan),
        Ok(Err(e)) => errors::inventory_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}

pub async fn analyze_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<SupplierAnalysisRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&tenant, &principal, &[Permission::new("inventory.ai")]) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let state = services.tenant(tenant.tenant_id());
    let result = tokio::task::spawn_blocking(move || state.inventory.analyze_supplier(body)).await;
    match result {
        Ok(Ok(assessment)) => dto::ok(assessment),
        Ok(Err(e)) => errors::inventory_error_to_response(e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "task_join_error",
            e.to_string(),
        ),
    }
}
