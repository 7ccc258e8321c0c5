//! In-process task orchestrator for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};

use tracing::{info, warn};

use coreflow_core::TenantId;
use coreflow_events::Subscription;

use crate::orchestrator::{TaskOrchestrator, TaskWaiter};
use crate::types::{Task, TaskError, TaskId, TaskInsight, TaskRequest, TaskStatus};

/// Per-status task counts for one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TaskStats {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug)]
struct TaskSlot {
    task: Task,
    /// Waiters released (and cleared) on the first terminal transition.
    waiters: Vec<mpsc::Sender<Task>>,
}

/// In-memory `TaskOrchestrator`.
///
/// The engine side of the boundary is simulated through the resolution hooks
/// [`complete`](Self::complete) and [`fail`](Self::fail); whoever calls them
/// plays the engine. Submission announcements can be watched via
/// [`watch_submissions`](Self::watch_submissions), which is how a loopback
/// resolver discovers work without polling.
#[derive(Debug, Default)]
pub struct InProcessTaskOrchestrator {
    tasks: Mutex<HashMap<TaskId, TaskSlot>>,
    submissions: Mutex<Vec<mpsc::Sender<Task>>>,
}

impl InProcessTaskOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Subscribe to task submissions (all tenants).
    pub fn watch_submissions(&self) -> Subscription<Task> {
        let (tx, rx) = mpsc::channel();
        self.submissions.lock().unwrap().push(tx);
        Subscription::new(rx)
    }

    /// Engine hook: resolve a task successfully.
    pub fn complete(&self, task_id: TaskId, insight: TaskInsight) -> Result<(), TaskError> {
        self.resolve(task_id, |task| task.mark_completed(insight))
    }

    /// Engine hook: resolve a task as failed.
    pub fn fail(&self, task_id: TaskId, error: impl Into<String>) -> Result<(), TaskError> {
        self.resolve(task_id, |task| task.mark_failed(error.into()))
    }

    /// Per-status counts for a tenant.
    pub fn stats(&self, tenant_id: TenantId) -> TaskStats {
        let tasks = self.tasks.lock().unwrap();
        let mut stats = TaskStats::default();
        for slot in tasks.values() {
            if slot.task.tenant_id != tenant_id {
                continue;
            }
            match slot.task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Failed { .. } => stats.failed += 1,
                TaskStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    fn resolve(&self, task_id: TaskId, apply: impl FnOnce(&mut Task)) -> Result<(), TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        let slot = tasks.get_mut(&task_id).ok_or(TaskError::NotFound(task_id))?;

        if slot.task.status.is_terminal() {
            // Late engine responses lose the race against cancel/first-resolve.
            warn!(task = %task_id, "ignoring resolution for already terminal task");
            return Ok(());
        }

        apply(&mut slot.task);
        notify_waiters(slot);
        Ok(())
    }
}

/// Send the terminal snapshot to every waiter, then drop them.
///
/// Sends on unbounded channels never block, so holding the map lock here is
/// fine.
fn notify_waiters(slot: &mut TaskSlot) {
    for waiter in slot.waiters.drain(..) {
        let _ = waiter.send(slot.task.clone());
    }
}

impl TaskOrchestrator for InProcessTaskOrchestrator {
    fn submit(&self, request: TaskRequest) -> Result<TaskId, TaskError> {
        if let crate::types::TaskKind::Custom { kind } = &request.kind {
            if kind.trim().is_empty() {
                return Err(TaskError::Rejected("custom task kind must not be empty".into()));
            }
        }

        let task = Task::new(request);
        let id = task.id;
        info!(task = %id, kind = %task.kind, tenant = %task.tenant_id, "task submitted");

        self.tasks.lock().unwrap().insert(
            id,
            TaskSlot {
                task: task.clone(),
                waiters: Vec::new(),
            },
        );

        // Announce to submission watchers, dropping dead ones.
        let mut subs = self.submissions.lock().unwrap();
        subs.retain(|tx| tx.send(task.clone()).is_ok());

        Ok(id)
    }

    fn task(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError> {
        let tasks = self.tasks.lock().unwrap();
        match tasks.get(&task_id) {
            Some(slot) if slot.task.tenant_id == tenant_id => Ok(slot.task.clone()),
            Some(_) => Err(TaskError::TenantIsolation),
            None => Err(TaskError::NotFound(task_id)),
        }
    }

    fn watch(&self, tenant_id: TenantId, task_id: TaskId) -> Result<TaskWaiter, TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        let slot = match tasks.get_mut(&task_id) {
            Some(slot) if slot.task.tenant_id == tenant_id => slot,
            Some(_) => return Err(TaskError::TenantIsolation),
            None => return Err(TaskError::NotFound(task_id)),
        };

        let (tx, rx) = mpsc::channel();
        if slot.task.status.is_terminal() {
            // Already resolved: deliver the snapshot straight away.
            let _ = tx.send(slot.task.clone());
        } else {
            slot.waiters.push(tx);
        }

        Ok(TaskWaiter::new(task_id, rx))
    }

    fn cancel(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        let slot = match tasks.get_mut(&task_id) {
            Some(slot) if slot.task.tenant_id == tenant_id => slot,
            Some(_) => return Err(TaskError::TenantIsolation),
            None => return Err(TaskError::NotFound(task_id)),
        };

        if !slot.task.status.is_terminal() {
            slot.task.mark_cancelled();
            notify_waiters(slot);
            info!(task = %task_id, tenant = %tenant_id, "task cancelled");
        }

        Ok(slot.task.clone())
    }
}
