use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use coreflow_adapters::{
    AccountingAdapter, CrmAdapter, HrAdapter, InventoryAdapter, ModuleConnector,
    ProjectManagementAdapter, RecordingConnector,
};
use coreflow_core::TenantId;
use coreflow_events::{EventBus, InMemoryEventBus, SyncEnvelope};
use coreflow_hr::HrPlugin;
use coreflow_inventory::InventoryPlugin;
use coreflow_legal::LegalPlugin;
use coreflow_orchestrator::Orchestrator;
use coreflow_tasks::{
    InMemoryInsightSink, InProcessTaskOrchestrator, InsightRecord, InsightSink, Task, TaskInsight,
    TaskKind, TaskOrchestrator,
};

/// Event bus shared by every tenant orchestrator (module-sync, entity-sync and
/// prediction channels all ride the same in-memory bus).
pub type ApiBus = Arc<InMemoryEventBus<SyncEnvelope<Value>>>;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub tenant_id: TenantId,
    pub topic: String,
    pub payload: serde_json::Value,
}

/// API-local insight sink: persists AI results and announces each one on the
/// event bus plus the realtime channel.
pub struct ApiInsightSink {
    store: InMemoryInsightSink,
    bus: ApiBus,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl ApiInsightSink {
    pub fn new(bus: ApiBus, realtime_tx: broadcast::Sender<RealtimeMessage>) -> Self {
        Self {
            store: InMemoryInsightSink::new(),
            bus,
            realtime_tx,
        }
    }

    pub fn insights_for(&self, tenant_id: TenantId) -> Vec<InsightRecord> {
        self.store.for_tenant(tenant_id)
    }
}

impl InsightSink for ApiInsightSink {
    fn record(&self, tenant_id: TenantId, kind: TaskKind, insight: TaskInsight) {
        self.store.record(tenant_id, kind.clone(), insight.clone());

        let payload = serde_json::json!({
            "kind": kind.type_name(),
            "score": insight.score,
            "confidence": insight.confidence,
            "explanation": insight.explanation,
        });

        if let Err(error) = self
            .bus
            .publish(SyncEnvelope::prediction_ready(tenant_id, payload.clone()))
        {
            tracing::warn!(?error, "failed to publish prediction-ready event");
        }

        // Broadcast that a new insight is available (lossy; no backpressure on core).
        let _ = self.realtime_tx.send(RealtimeMessage {
            tenant_id,
            topic: "ai.prediction_ready".to_string(),
            payload,
        });
    }
}

/// Per-tenant wiring: one orchestrator with the three business plugins
/// registered on it and all five module adapters attached.
pub struct TenantState {
    pub orchestrator: Orchestrator<ApiBus>,
    pub inventory: Arc<InventoryPlugin>,
    pub hr: Arc<HrPlugin>,
    pub legal: Arc<LegalPlugin>,
    pub connector: Arc<RecordingConnector>,
}

impl TenantState {
    fn build(
        tenant_id: TenantId,
        tasks: Arc<InProcessTaskOrchestrator>,
        sink: Arc<ApiInsightSink>,
        bus: ApiBus,
    ) -> Self {
        let orchestrator = Orchestrator::new(tenant_id, bus);

        let connector = RecordingConnector::arc();
        let target: Arc<dyn ModuleConnector> = connector.clone();
        orchestrator.register_adapter(Arc::new(InventoryAdapter::new(target.clone())));
        orchestrator.register_adapter(Arc::new(AccountingAdapter::new(target.clone())));
        orchestrator.register_adapter(Arc::new(CrmAdapter::new(target.clone())));
        orchestrator.register_adapter(Arc::new(HrAdapter::new(target.clone())));
        orchestrator.register_adapter(Arc::new(ProjectManagementAdapter::new(target)));

        let task_port: Arc<dyn TaskOrchestrator> = tasks;
        let insight_port: Arc<dyn InsightSink> = sink;

        let inventory = Arc::new(InventoryPlugin::new(
            tenant_id,
            task_port.clone(),
            insight_port.clone(),
        ));
        let hr = Arc::new(HrPlugin::new(
            tenant_id,
            task_port.clone(),
            insight_port.clone(),
        ));
        let legal = Arc::new(LegalPlugin::new(tenant_id, task_port, insight_port));

        // Registration only fails on a bad descriptor; for the built-in
        // plugins that would be a programming error.
        orchestrator
            .register_plugin(inventory.clone())
            .expect("failed to register inventory plugin");
        orchestrator
            .register_plugin(hr.clone())
            .expect("failed to register hr plugin");
        orchestrator
            .register_plugin(legal.clone())
            .expect("failed to register legal plugin");

        Self {
            orchestrator,
            inventory,
            hr,
            legal,
            connector,
        }
    }
}

/// Shared application services handed to every request handler.
pub struct AppServices {
    tasks: Arc<InProcessTaskOrchestrator>,
    bus: ApiBus,
    sink: Arc<ApiInsightSink>,
    tenants: Mutex<HashMap<TenantId, Arc<TenantState>>>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
    started_at: DateTime<Utc>,
}

impl AppServices {
    pub fn tasks(&self) -> &Arc<InProcessTaskOrchestrator> {
        &self.tasks
    }

    pub fn bus(&self) -> &ApiBus {
        &self.bus
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn insights_for(&self, tenant_id: TenantId) -> Vec<InsightRecord> {
        self.sink.insights_for(tenant_id)
    }

    /// Fetch (or lazily build) the plugin wiring for a tenant.
    pub fn tenant(&self, tenant_id: TenantId) -> Arc<TenantState> {
        let mut tenants = self.tenants.lock().unwrap();
        tenants
            .entry(tenant_id)
            .or_insert_with(|| {
                Arc::new(TenantState::build(
                    tenant_id,
                    self.tasks.clone(),
                    self.sink.clone(),
                    self.bus.clone(),
                ))
            })
            .clone()
    }
}

pub fn build_services() -> AppServices {
    // Realtime channel (SSE): lossy broadcast, tenant-filtered in handlers.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    let bus: ApiBus = Arc::new(InMemoryEventBus::new());
    let tasks = InProcessTaskOrchestrator::arc();
    let sink = Arc::new(ApiInsightSink::new(bus.clone(), realtime_tx.clone()));

    // Without an external inference engine the queue would never drain, so the
    // loopback resolver answers submissions in-process. Opt out via LOOPBACK_AI=false.
    let loopback = std::env::var("LOOPBACK_AI")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);
    if loopback {
        spawn_loopback_resolver(&tasks);
    }

    AppServices {
        tasks,
        bus,
        sink,
        tenants: Mutex::new(HashMap::new()),
        realtime_tx,
        started_at: Utc::now(),
    }
}

/// Dev/test resolver: completes every submitted task with a synthetic insight.
///
/// Runs on a detached thread holding only a `Weak` handle, so dropping the
/// services tears the loop down: `recv` errors out once the submission
/// sender inside the task orchestrator goes away.
fn spawn_loopback_resolver(tasks: &Arc<InProcessTaskOrchestrator>) {
    let sub = tasks.watch_submissions();
    let weak = Arc::downgrade(tasks);
    std::thread::Builder::new()
        .name("ai-loopback".to_string())
        .spawn(move || {
            while let Ok(task) = sub.recv() {
                let Some(tasks) = weak.upgrade() else { break };
                let insight = synthetic_insight(&task);
                if let Err(error) = tasks.complete(task.id, insight) {
                    tracing::warn!(task_id = %task.id, ?error, "loopback completion failed");
                }
            }
        })
        .expect("failed to spawn ai-loopback thread");
}

/// Deterministic per task id so callers see stable scores across polls.
fn synthetic_insight(task: &Task) -> TaskInsight {
    let seed = (task.id.0.as_u128() % 1000) as f64;
    let score = 0.35 + seed / 2000.0;
    let confidence = task.requirements.accuracy_threshold.max(0.85);

    TaskInsight::new(score, confidence)
        .with_explanation(format!(
            "synthetic {} insight from the loopback resolver",
            task.kind.type_name()
        ))
        .with_payload(serde_json::json!({ "engine": "loopback" }))
}

pub fn tenant_sse_stream(
    services: Arc<AppServices>,
    tenant_id: TenantId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.tenant_id == tenant_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
