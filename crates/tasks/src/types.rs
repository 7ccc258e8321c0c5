//! Core task types and request envelope.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coreflow_core::{EntityId, EntityKind, TenantId};

/// Unique task identifier, minted at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task kind, one per AI-backed operation.
///
/// `Custom` carries engine-side task types this crate does not model; the
/// request envelope is the only contract at this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    DemandForecast,
    StockOptimization,
    SupplierAnalysis,
    AttritionRisk,
    TalentOptimization,
    DocumentAnalysis,
    CaseStrategy,
    DeadlineAnalysis,
    Custom { kind: String },
}

impl TaskKind {
    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom { kind: kind.into() }
    }

    pub fn type_name(&self) -> &str {
        match self {
            TaskKind::DemandForecast => "demand_forecast",
            TaskKind::StockOptimization => "stock_optimization",
            TaskKind::SupplierAnalysis => "supplier_analysis",
            TaskKind::AttritionRisk => "attrition_risk",
            TaskKind::TalentOptimization => "talent_optimization",
            TaskKind::DocumentAnalysis => "document_analysis",
            TaskKind::CaseStrategy => "case_strategy",
            TaskKind::DeadlineAnalysis => "deadline_analysis",
            TaskKind::Custom { kind } => kind,
        }
    }

    /// Total mapping from a wire name; unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "demand_forecast" => TaskKind::DemandForecast,
            "stock_optimization" => TaskKind::StockOptimization,
            "supplier_analysis" => TaskKind::SupplierAnalysis,
            "attrition_risk" => TaskKind::AttritionRisk,
            "talent_optimization" => TaskKind::TalentOptimization,
            "document_analysis" => TaskKind::DocumentAnalysis,
            "case_strategy" => TaskKind::CaseStrategy,
            "deadline_analysis" => TaskKind::DeadlineAnalysis,
            other => TaskKind::custom(other),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Scheduling priority hint forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Business context attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Entity the task is about, when there is one.
    pub entity_kind: Option<EntityKind>,
    pub entity_id: Option<EntityId>,

    /// Free-form tenant business rules the engine should respect.
    pub business_rules: Vec<String>,

    /// Industry vertical hint (e.g. "legal", "manufacturing").
    pub industry_context: Option<String>,
}

/// Execution requirements forwarded to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequirements {
    /// Upper bound on end-to-end execution; also the default wait deadline.
    pub max_execution_time: Duration,

    /// Minimum acceptable model accuracy in \[0, 1\].
    pub accuracy_threshold: f64,

    /// Whether a human-readable explanation must accompany the result.
    pub explainability: bool,

    /// Whether the task should be scheduled on the low-latency path.
    pub real_time: bool,
}

impl Default for TaskRequirements {
    fn default() -> Self {
        Self {
            max_execution_time: Duration::from_secs(60),
            accuracy_threshold: 0.8,
            explainability: false,
            real_time: false,
        }
    }
}

/// A task submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub tenant_id: TenantId,
    pub kind: TaskKind,

    /// Opaque task input; its schema belongs to the engine.
    pub payload: serde_json::Value,

    pub context: TaskContext,
    pub requirements: TaskRequirements,
    pub priority: TaskPriority,
}

impl TaskRequest {
    pub fn new(tenant_id: TenantId, kind: TaskKind, payload: serde_json::Value) -> Self {
        Self {
            tenant_id,
            kind,
            payload,
            context: TaskContext::default(),
            requirements: TaskRequirements::default(),
            priority: TaskPriority::default(),
        }
    }

    pub fn with_context(mut self, context: TaskContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_requirements(mut self, requirements: TaskRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Task execution status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, awaiting the engine.
    Pending,
    /// Finished successfully; the task carries an insight.
    Completed,
    /// Finished unsuccessfully.
    Failed { error: String },
    /// Cancelled before completion; waiters were released.
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Result envelope returned by the engine for a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInsight {
    /// Primary score of the inference (task-kind-specific meaning).
    pub score: f64,

    /// Confidence in \[0, 1\] (convention; not enforced).
    pub confidence: f64,

    /// Optional human-readable explanation.
    pub explanation: Option<String>,

    /// Free-form result detail (model output, timings, feature weights).
    pub payload: serde_json::Value,
}

impl TaskInsight {
    pub fn new(score: f64, confidence: f64) -> Self {
        Self {
            score,
            confidence,
            explanation: None,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A submitted task and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub tenant_id: TenantId,
    pub kind: TaskKind,
    pub priority: TaskPriority,
    pub context: TaskContext,
    pub requirements: TaskRequirements,
    pub payload: serde_json::Value,
    pub status: TaskStatus,

    /// Present exactly when `status` is `Completed`.
    pub insight: Option<TaskInsight>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(request: TaskRequest) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            tenant_id: request.tenant_id,
            kind: request.kind,
            priority: request.priority,
            context: request.context,
            requirements: request.requirements,
            payload: request.payload,
            status: TaskStatus::Pending,
            insight: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_completed(&mut self, insight: TaskInsight) {
        self.status = TaskStatus::Completed;
        self.insight = Some(insight);
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed { error: error.into() };
        self.updated_at = Utc::now();
    }

    pub fn mark_cancelled(&mut self) {
        self.status = TaskStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}

/// Task boundary error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("tenant isolation violation")]
    TenantIsolation,

    #[error("task rejected: {0}")]
    Rejected(String),

    #[error("timed out after {waited:?} waiting for task {task_id}")]
    Timeout { task_id: TaskId, waited: Duration },

    #[error("task failed: {0}")]
    Failed(String),

    #[error("task was cancelled: {0}")]
    Cancelled(TaskId),

    #[error("completion channel closed before the task resolved")]
    ChannelClosed,
}
