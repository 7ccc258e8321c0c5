//! Task orchestration boundary and completion protocol.
//!
//! Completion is signalled over a per-task channel: waiters register a sender
//! with the orchestrator and block on the receiver until the first terminal
//! transition or a deadline. There is no status polling anywhere on this
//! path, and cancellation releases waiters immediately.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use coreflow_core::TenantId;

use crate::types::{Task, TaskError, TaskId, TaskInsight, TaskRequest, TaskStatus};

/// Boundary to the AI engine that executes tasks.
///
/// All read paths are tenant-isolated: a task is only visible to the tenant
/// that submitted it.
pub trait TaskOrchestrator: Send + Sync {
    /// Submit a task; returns the minted id without waiting for execution.
    fn submit(&self, request: TaskRequest) -> Result<TaskId, TaskError>;

    /// Fetch the current snapshot of a task.
    fn task(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError>;

    /// Register interest in the first terminal transition of a task.
    ///
    /// If the task is already terminal the waiter resolves immediately.
    fn watch(&self, tenant_id: TenantId, task_id: TaskId) -> Result<TaskWaiter, TaskError>;

    /// Cancel a pending task, releasing any waiters. Cancelling an already
    /// terminal task is a no-op that returns the task unchanged.
    fn cancel(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError>;
}

impl<O> TaskOrchestrator for Arc<O>
where
    O: TaskOrchestrator + ?Sized,
{
    fn submit(&self, request: TaskRequest) -> Result<TaskId, TaskError> {
        (**self).submit(request)
    }

    fn task(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError> {
        (**self).task(tenant_id, task_id)
    }

    fn watch(&self, tenant_id: TenantId, task_id: TaskId) -> Result<TaskWaiter, TaskError> {
        (**self).watch(tenant_id, task_id)
    }

    fn cancel(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError> {
        (**self).cancel(tenant_id, task_id)
    }
}

/// One-shot handle on a task's first terminal transition.
#[derive(Debug)]
pub struct TaskWaiter {
    task_id: TaskId,
    receiver: Receiver<Task>,
}

impl TaskWaiter {
    pub fn new(task_id: TaskId, receiver: Receiver<Task>) -> Self {
        Self { task_id, receiver }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Block until the task resolves or `timeout` elapses.
    pub fn wait(self, timeout: Duration) -> Result<Task, TaskError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => Ok(task),
            Err(RecvTimeoutError::Timeout) => Err(TaskError::Timeout {
                task_id: self.task_id,
                waited: timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(TaskError::ChannelClosed),
        }
    }
}

/// Wait until a task first reports a terminal status.
///
/// Returns the terminal task snapshot (whatever the terminal status is) or
/// `TaskError::Timeout` if nothing terminal arrives within the deadline.
pub fn wait_for_completion<O>(
    orchestrator: &O,
    tenant_id: TenantId,
    task_id: TaskId,
    timeout: Duration,
) -> Result<Task, TaskError>
where
    O: TaskOrchestrator + ?Sized,
{
    orchestrator.watch(tenant_id, task_id)?.wait(timeout)
}

/// Submit a request and block until it yields an insight.
///
/// This is the shared shape of every AI-backed operation: submit, wait up to
/// the request's `max_execution_time`, then unwrap the completed insight or
/// surface the failure. Callers map the error to their operation's fixed
/// domain message.
pub fn run_to_insight<O>(orchestrator: &O, request: TaskRequest) -> Result<TaskInsight, TaskError>
where
    O: TaskOrchestrator + ?Sized,
{
    let tenant_id = request.tenant_id;
    let timeout = request.requirements.max_execution_time;

    let task_id = orchestrator.submit(request)?;
    let task = wait_for_completion(orchestrator, tenant_id, task_id, timeout)?;

    match task.status {
        TaskStatus::Completed => task
            .insight
            .ok_or_else(|| TaskError::Failed("completed task carried no insight".to_string())),
        TaskStatus::Failed { error } => Err(TaskError::Failed(error)),
        TaskStatus::Cancelled => Err(TaskError::Cancelled(task_id)),
        // Waiters only resolve on terminal transitions.
        TaskStatus::Pending => Err(TaskError::Failed(
            "waiter resolved before a terminal status".to_string(),
        )),
    }
}
