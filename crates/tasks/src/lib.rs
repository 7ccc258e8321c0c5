//! `coreflow-tasks` — AI task envelope and orchestration boundary.
//!
//! The AI engine that executes tasks is an external system. This crate owns
//! everything this side of that boundary: the request/response envelope, the
//! `TaskOrchestrator` contract, channel-based completion waiting, and an
//! in-process implementation whose resolution hooks let tests and the dev
//! loopback play the engine's role.

pub mod in_process;
pub mod orchestrator;
pub mod sink;
pub mod types;

pub use in_process::{InProcessTaskOrchestrator, TaskStats};
pub use orchestrator::{TaskOrchestrator, TaskWaiter, run_to_insight, wait_for_completion};
pub use sink::{InMemoryInsightSink, InsightRecord, InsightSink};
pub use types::{
    Task, TaskContext, TaskError, TaskId, TaskInsight, TaskKind, TaskPriority, TaskRequest,
    TaskRequirements, TaskStatus,
};
