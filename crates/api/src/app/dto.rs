use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use coreflow_inventory::MovementKind;
use coreflow_tasks::{Task, TaskContext, TaskPriority, TaskRequirements, TaskStatus};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitTaskRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub context: TaskContext,
    pub requirements: Option<TaskRequirementsDto>,
    pub priority: Option<TaskPriority>,
}

/// Wire form of [`TaskRequirements`]; anything omitted keeps the default.
#[derive(Debug, Deserialize)]
pub struct TaskRequirementsDto {
    pub max_execution_time_ms: Option<u64>,
    pub accuracy_threshold: Option<f64>,
    pub explainability: Option<bool>,
    pub real_time: Option<bool>,
}

impl TaskRequirementsDto {
    pub fn into_requirements(self) -> TaskRequirements {
        let mut req = TaskRequirements::default();
        if let Some(ms) = self.max_execution_time_ms {
            req.max_execution_time = std::time::Duration::from_millis(ms);
        }
        if let Some(threshold) = self.accuracy_threshold {
            req.accuracy_threshold = threshold;
        }
        if let Some(explainability) = self.explainability {
            req.explainability = explainability;
        }
        if let Some(real_time) = self.real_time {
            req.real_time = real_time;
        }
        req
    }
}

/// Body for `POST /inventory/items/:id/movements`; the item id rides the path.
#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reference: Option<String>,
}

// -------------------------
// Response envelope helpers
// -------------------------

pub fn envelope(status: StatusCode, data: impl serde::Serialize) -> axum::response::Response {
    match serde_json::to_value(data) {
        Ok(value) => (
            status,
            axum::Json(serde_json::json!({
                "success": true,
                "data": value,
            })),
        )
            .into_response(),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "serialize_error",
            e.to_string(),
        ),
    }
}

pub fn ok(data: impl serde::Serialize) -> axum::response::Response {
    envelope(StatusCode::OK, data)
}

pub fn created(data: impl serde::Serialize) -> axum::response::Response {
    envelope(StatusCode::CREATED, data)
}

pub fn accepted(data: impl serde::Serialize) -> axum::response::Response {
    envelope(StatusCode::ACCEPTED, data)
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn task_to_json(task: &Task) -> serde_json::Value {
    let (status, error) = match &task.status {
        TaskStatus::Pending => ("pending", None),
        TaskStatus::Completed => ("completed", None),
        TaskStatus::Failed { error } => ("failed", Some(error.clone())),
        TaskStatus::Cancelled => ("cancelled", None),
    };

    serde_json::json!({
        "id": task.id.to_string(),
        "kind": task.kind.type_name(),
        "priority": task.priority,
        "status": status,
        "error": error,
        "insight": task.insight,
        "created_at": task.created_at.to_rfc3339(),
        "updated_at": task.updated_at.to_rfc3339(),
    })
}
