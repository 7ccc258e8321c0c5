//! Per-tenant plugin registry and cross-module sync fan-out.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use coreflow_adapters::{EntityPayload, ModuleAdapter};
use coreflow_core::{EntityId, EntityKind, ModuleKind, PluginId, TenantId};
use coreflow_events::{EventBus, EventKind, SyncEnvelope};

use crate::descriptor::{
    ApiEndpoint, PluginCapabilities, PluginDescriptor, PluginHealth, PluginStatus,
};
use crate::plugin::{Plugin, PluginError};
use crate::routing::RouteTable;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid plugin descriptor: {0}")]
    Validation(String),
    #[error("plugin `{0}` is already registered")]
    Duplicate(PluginId),
    #[error("plugin `{plugin}` depends on unregistered plugin `{dependency}`")]
    MissingDependency { plugin: PluginId, dependency: PluginId },
    #[error("plugin `{0}` is not registered")]
    NotFound(PluginId),
    #[error("plugin `{plugin}` is still required by `{dependent}`")]
    DependedUpon { plugin: PluginId, dependent: PluginId },
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("envelope belongs to a different tenant")]
    TenantIsolation,
}

struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    descriptor: PluginDescriptor,
    status: PluginStatus,
    registered_at: DateTime<Utc>,
}

#[derive(Default)]
struct OrchestratorState {
    plugins: HashMap<PluginId, PluginEntry>,
    /// Event kind to subscribed plugin ids, from webhook subscriptions.
    handlers: HashMap<EventKind, Vec<PluginId>>,
    adapters: HashMap<ModuleKind, Arc<dyn ModuleAdapter>>,
}

/// Listing row for one registered plugin.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginSummary {
    pub id: PluginId,
    pub name: String,
    pub module: ModuleKind,
    pub version: String,
    pub status: PluginStatus,
    pub priority: i32,
    pub capabilities: PluginCapabilities,
    pub health: PluginHealth,
    pub registered_at: DateTime<Utc>,
}

/// Outcome of one entity-sync fan-out.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    pub entity: EntityKind,
    pub entity_id: EntityId,
    /// Modules whose adapter accepted the payload.
    pub delivered: Vec<ModuleKind>,
    /// Modules whose adapter errored; the rest of the fan-out continued.
    pub failed: Vec<SyncFailure>,
    /// Routed modules with no adapter registered.
    pub skipped: Vec<ModuleKind>,
    /// Active plugins that consumed the payload via their data hook.
    pub notified: Vec<PluginId>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncFailure {
    pub module: ModuleKind,
    pub error: String,
}

/// The per-tenant plugin orchestrator.
///
/// Owns every registered plugin and adapter for one tenant behind a single
/// `RwLock`. Lifecycle hooks run under the write lock; the sync fan-out
/// clones the `Arc`s it needs and runs unlocked.
pub struct Orchestrator<B: EventBus<SyncEnvelope<Value>>> {
    tenant_id: TenantId,
    routes: RouteTable,
    state: RwLock<OrchestratorState>,
    bus: B,
}

impl<B: EventBus<SyncEnvelope<Value>>> Orchestrator<B> {
    pub fn new(tenant_id: TenantId, bus: B) -> Self {
        Self::with_routes(tenant_id, RouteTable::default(), bus)
    }

    pub fn with_routes(tenant_id: TenantId, routes: RouteTable, bus: B) -> Self {
        Self {
            tenant_id,
            routes,
            state: RwLock::new(OrchestratorState::default()),
            bus,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Register a plugin and, if its config says so, activate it.
    ///
    /// On a failed `initialize` the plugin is removed again; on a failed
    /// `activate` it stays registered as `Inactive` so a later explicit
    /// activation can retry.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<PluginStatus, RegistryError> {
        let descriptor = plugin.descriptor();
        validate_descriptor(&descriptor)?;
        let id = descriptor.id.clone();
        let module = descriptor.module;

        let status = {
            let mut state = self.state.write().unwrap();

            if state.plugins.contains_key(&id) {
                return Err(RegistryError::Duplicate(id));
            }
            for dependency in &descriptor.config.dependencies {
                if !state.plugins.contains_key(dependency) {
                    return Err(RegistryError::MissingDependency {
                        plugin: id,
                        dependency: dependency.clone(),
                    });
                }
            }

            state.plugins.insert(
                id.clone(),
                PluginEntry {
                    plugin: plugin.clone(),
                    descriptor: descriptor.clone(),
                    status: PluginStatus::Loading,
                    registered_at: Utc::now(),
                },
            );

            if let Err(error) = plugin.initialize() {
                state.plugins.remove(&id);
                return Err(error.into());
            }

            for webhook in &descriptor.config.webhooks {
                state
                    .handlers
                    .entry(webhook.event)
                    .or_default()
                    .push(id.clone());
            }

            let status = if descriptor.config.enabled {
                match plugin.activate() {
                    Ok(()) => PluginStatus::Active,
                    Err(error) => {
                        // Keep the registration; a later activate can retry.
                        set_status(&mut state, &id, PluginStatus::Inactive);
                        warn!(plugin = %id, error = %error, "activation failed during registration");
                        return Err(error.into());
                    }
                }
            } else {
                PluginStatus::Inactive
            };
            set_status(&mut state, &id, status);
            status
        };

        info!(plugin = %id, module = %module, %status, "plugin registered");
        self.emit(EventKind::PluginRegistered, module, &id, status);
        Ok(status)
    }

    /// Activate a registered plugin. Already-active plugins are a no-op.
    pub fn activate_plugin(&self, id: &PluginId) -> Result<(), RegistryError> {
        {
            let mut state = self.state.write().unwrap();
            let entry = state.plugins.get(id).ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            if entry.status == PluginStatus::Active {
                return Ok(());
            }

            for dependency in &entry.descriptor.config.dependencies {
                if !state.plugins.contains_key(dependency) {
                    return Err(RegistryError::MissingDependency {
                        plugin: id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }

            entry.plugin.clone().activate()?;
            set_status(&mut state, id, PluginStatus::Active);
        }

        let module = self.module_of(id)?;
        info!(plugin = %id, "plugin activated");
        self.emit(EventKind::PluginActivated, module, id, PluginStatus::Active);
        Ok(())
    }

    /// Deactivate a registered plugin. Already-inactive plugins are a no-op.
    pub fn deactivate_plugin(&self, id: &PluginId) -> Result<(), RegistryError> {
        {
            let mut state = self.state.write().unwrap();
            let entry = state.plugins.get(id).ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            if entry.status != PluginStatus::Active {
                return Ok(());
            }

            entry.plugin.clone().deactivate()?;
            set_status(&mut state, id, PluginStatus::Inactive);
        }

        let module = self.module_of(id)?;
        info!(plugin = %id, "plugin deactivated");
        self.emit(EventKind::PluginDeactivated, module, id, PluginStatus::Inactive);
        Ok(())
    }

    /// Tear a plugin down and remove it.
    ///
    /// Refused while any other registered plugin declares it as a
    /// dependency.
    pub fn destroy_plugin(&self, id: &PluginId) -> Result<(), RegistryError> {
        let module = {
            let mut state = self.state.write().unwrap();
            let entry = state.plugins.get(id).ok_or_else(|| RegistryError::NotFound(id.clone()))?;

            if let Some(dependent) = state
                .plugins
                .values()
                .find(|other| other.descriptor.config.dependencies.contains(id))
            {
                return Err(RegistryError::DependedUpon {
                    plugin: id.clone(),
                    dependent: dependent.descriptor.id.clone(),
                });
            }

            let plugin = entry.plugin.clone();
            if entry.status == PluginStatus::Active {
                plugin.deactivate()?;
                set_status(&mut state, id, PluginStatus::Inactive);
            }
            plugin.destroy()?;

            let module = state
                .plugins
                .remove(id)
                .map(|entry| entry.descriptor.module)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            for subscribers in state.handlers.values_mut() {
                subscribers.retain(|subscriber| subscriber != id);
            }
            module
        };

        info!(plugin = %id, "plugin destroyed");
        self.emit(EventKind::PluginDestroyed, module, id, PluginStatus::Inactive);
        Ok(())
    }

    pub fn plugin_status(&self, id: &PluginId) -> Option<PluginStatus> {
        self.state.read().unwrap().plugins.get(id).map(|entry| entry.status)
    }

    pub fn plugin_count(&self) -> usize {
        self.state.read().unwrap().plugins.len()
    }

    /// All registered plugins, highest priority first, id as tie-break.
    pub fn list_plugins(&self) -> Vec<PluginSummary> {
        let state = self.state.read().unwrap();
        let mut summaries: Vec<PluginSummary> = state
            .plugins
            .values()
            .map(|entry| PluginSummary {
                id: entry.descriptor.id.clone(),
                name: entry.descriptor.name.clone(),
                module: entry.descriptor.module,
                version: entry.descriptor.version.clone(),
                status: entry.status,
                priority: entry.descriptor.config.priority,
                capabilities: entry.descriptor.capabilities,
                health: entry.plugin.health(),
                registered_at: entry.registered_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Plugin ids subscribed to an event kind, in registration order.
    pub fn handlers_for(&self, event: EventKind) -> Vec<PluginId> {
        self.state
            .read()
            .unwrap()
            .handlers
            .get(&event)
            .cloned()
            .unwrap_or_default()
    }

    /// Every HTTP endpoint contributed by registered plugins.
    pub fn endpoints(&self) -> Vec<(PluginId, ApiEndpoint)> {
        let state = self.state.read().unwrap();
        state
            .plugins
            .values()
            .flat_map(|entry| {
                let id = entry.descriptor.id.clone();
                entry
                    .descriptor
                    .config
                    .endpoints
                    .iter()
                    .map(move |endpoint| (id.clone(), endpoint.clone()))
            })
            .collect()
    }

    /// Install a module adapter, replacing any previous one for the module.
    pub fn register_adapter(&self, adapter: Arc<dyn ModuleAdapter>) {
        let module = adapter.module();
        self.state.write().unwrap().adapters.insert(module, adapter);
        info!(%module, "module adapter registered");
    }

    pub fn adapter_count(&self) -> usize {
        self.state.read().unwrap().adapters.len()
    }

    /// Fan a changed entity out to every routed module, best effort.
    ///
    /// One failing adapter never stops the rest; the report says per module
    /// whether delivery happened, failed or was skipped for lack of an
    /// adapter. Active plugins subscribed to entity changes are notified
    /// afterwards.
    pub fn handle_entity_sync(
        &self,
        envelope: &SyncEnvelope<EntityPayload>,
    ) -> Result<SyncReport, RegistryError> {
        if envelope.tenant_id() != self.tenant_id {
            return Err(RegistryError::TenantIsolation);
        }

        let payload = envelope.payload();
        let entity = payload.kind();
        let mut report = SyncReport {
            entity,
            entity_id: payload.entity_id(),
            delivered: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            notified: Vec::new(),
        };

        // Snapshot targets and subscribers, then fan out unlocked.
        let (targets, subscribers) = {
            let state = self.state.read().unwrap();
            let targets: Vec<(ModuleKind, Option<Arc<dyn ModuleAdapter>>)> = self
                .routes
                .targets(entity)
                .iter()
                .map(|&module| (module, state.adapters.get(&module).cloned()))
                .collect();
            let subscribers: Vec<(PluginId, Arc<dyn Plugin>)> = state
                .handlers
                .get(&EventKind::EntityChanged)
                .into_iter()
                .flatten()
                .filter_map(|id| {
                    let entry = state.plugins.get(id)?;
                    (entry.status == PluginStatus::Active)
                        .then(|| (id.clone(), entry.plugin.clone()))
                })
                .collect();
            (targets, subscribers)
        };

        for (module, adapter) in targets {
            match adapter {
                Some(adapter) => match adapter.sync(payload) {
                    Ok(()) => report.delivered.push(module),
                    Err(error) => {
                        warn!(%module, %entity, error = %error, "module sync failed");
                        report.failed.push(SyncFailure { module, error: error.to_string() });
                    }
                },
                None => report.skipped.push(module),
            }
        }

        for (id, plugin) in subscribers {
            match plugin.sync_data(payload) {
                Ok(()) => report.notified.push(id),
                Err(error) => {
                    warn!(plugin = %id, %entity, error = %error, "plugin sync hook failed");
                }
            }
        }

        info!(
            %entity,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "entity sync fanned out"
        );
        Ok(report)
    }

    fn module_of(&self, id: &PluginId) -> Result<ModuleKind, RegistryError> {
        self.state
            .read()
            .unwrap()
            .plugins
            .get(id)
            .map(|entry| entry.descriptor.module)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Publish a lifecycle event; delivery problems are logged, never
    /// propagated.
    fn emit(&self, kind: EventKind, module: ModuleKind, id: &PluginId, status: PluginStatus) {
        let envelope = SyncEnvelope::module_sync(
            self.tenant_id,
            kind,
            module,
            json!({"plugin": id, "status": status}),
        );
        if let Err(error) = self.bus.publish(envelope) {
            warn!(plugin = %id, error = ?error, "failed to publish lifecycle event");
        }
    }
}

fn validate_descriptor(descriptor: &PluginDescriptor) -> Result<(), RegistryError> {
    if descriptor.id.is_empty() {
        return Err(RegistryError::Validation("plugin id must not be empty".into()));
    }
    if descriptor.name.trim().is_empty() {
        return Err(RegistryError::Validation("plugin name must not be empty".into()));
    }
    if descriptor.version.trim().is_empty() {
        return Err(RegistryError::Validation("plugin version must not be empty".into()));
    }
    Ok(())
}

fn set_status(state: &mut OrchestratorState, id: &PluginId, status: PluginStatus) {
    if let Some(entry) = state.plugins.get_mut(id) {
        entry.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PluginCapabilities, PluginConfig, RetryPolicy, WebhookSubscription};
    use coreflow_adapters::{
        AccountingAdapter, CrmAdapter, CustomerRecord, RecordingConnector,
    };
    use coreflow_events::{EventChannel, InMemoryEventBus};
    use std::sync::Mutex;

    type TestBus = Arc<InMemoryEventBus<SyncEnvelope<Value>>>;

    fn orchestrator(tenant: TenantId) -> (Orchestrator<TestBus>, TestBus) {
        let bus: TestBus = Arc::new(InMemoryEventBus::new());
        (Orchestrator::new(tenant, bus.clone()), bus)
    }

    struct TestPlugin {
        id: &'static str,
        module: ModuleKind,
        enabled: bool,
        dependencies: Vec<PluginId>,
        webhooks: Vec<WebhookSubscription>,
        priority: i32,
        fail_initialize: bool,
        fail_activate: bool,
        calls: Mutex<Vec<&'static str>>,
        synced: Mutex<Vec<EntityPayload>>,
    }

    impl TestPlugin {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                module: ModuleKind::Crm,
                enabled: true,
                dependencies: Vec::new(),
                webhooks: Vec::new(),
                priority: 0,
                fail_initialize: false,
                fail_activate: false,
                calls: Mutex::new(Vec::new()),
                synced: Mutex::new(Vec::new()),
            }
        }

        fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        fn depends_on(mut self, id: &'static str) -> Self {
            self.dependencies.push(PluginId::new(id));
            self
        }

        fn subscribed_to(mut self, event: EventKind) -> Self {
            self.webhooks.push(WebhookSubscription {
                event,
                internal: true,
                retry: RetryPolicy::default(),
            });
            self
        }

        fn with_priority(mut self, priority: i32) -> Self {
            self.priority = priority;
            self
        }

        fn failing_initialize(mut self) -> Self {
            self.fail_initialize = true;
            self
        }

        fn failing_activate(mut self) -> Self {
            self.fail_activate = true;
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Plugin for TestPlugin {
        fn descriptor(&self) -> PluginDescriptor {
            PluginDescriptor {
                id: PluginId::new(self.id),
                name: format!("{} plugin", self.id),
                module: self.module,
                version: "1.0.0".into(),
                config: PluginConfig {
                    enabled: self.enabled,
                    priority: self.priority,
                    dependencies: self.dependencies.clone(),
                    permissions: Vec::new(),
                    endpoints: Vec::new(),
                    webhooks: self.webhooks.clone(),
                },
                capabilities: PluginCapabilities::default(),
            }
        }

        fn initialize(&self) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("initialize");
            if self.fail_initialize {
                return Err(PluginError::Initialize("refusing to start".into()));
            }
            Ok(())
        }

        fn activate(&self) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("activate");
            if self.fail_activate {
                return Err(PluginError::Activation("no license".into()));
            }
            Ok(())
        }

        fn deactivate(&self) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("deactivate");
            Ok(())
        }

        fn destroy(&self) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("destroy");
            Ok(())
        }

        fn sync_data(&self, payload: &EntityPayload) -> coreflow_core::DomainResult<()> {
            self.synced.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn customer_payload() -> EntityPayload {
        EntityPayload::Customer(CustomerRecord {
            id: EntityId::new(),
            name: "Acme".into(),
            email: None,
            phone: None,
            billing_address: None,
        })
    }

    #[test]
    fn register_activates_enabled_plugin_and_emits_event() {
        let tenant = TenantId::new();
        let (orch, bus) = orchestrator(tenant);
        let sub = bus.subscribe();

        let status = orch.register_plugin(Arc::new(TestPlugin::new("crm"))).unwrap();

        assert_eq!(status, PluginStatus::Active);
        assert_eq!(orch.plugin_status(&PluginId::new("crm")), Some(PluginStatus::Active));

        let event = sub.try_recv().unwrap();
        assert_eq!(event.kind(), EventKind::PluginRegistered);
        assert_eq!(event.channel(), EventChannel::ModuleSync);
        assert_eq!(event.tenant_id(), tenant);
        assert_eq!(event.payload()["plugin"], "crm");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (orch, _) = orchestrator(TenantId::new());
        orch.register_plugin(Arc::new(TestPlugin::new("crm"))).unwrap();

        let err = orch.register_plugin(Arc::new(TestPlugin::new("crm"))).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(id) if id.as_str() == "crm"));
        assert_eq!(orch.plugin_count(), 1);
    }

    #[test]
    fn unknown_dependency_fails_before_initialize_runs() {
        let (orch, _) = orchestrator(TenantId::new());
        let plugin = Arc::new(TestPlugin::new("crm").depends_on("nope"));

        let err = orch.register_plugin(plugin.clone()).unwrap_err();
        assert!(matches!(err, RegistryError::MissingDependency { .. }));
        assert_eq!(orch.plugin_count(), 0);
        assert!(plugin.calls().is_empty());
    }

    #[test]
    fn dependent_plugin_registers_once_its_dependency_exists() {
        let (orch, _) = orchestrator(TenantId::new());

        orch.register_plugin(Arc::new(TestPlugin::new("catalog"))).unwrap();
        orch.register_plugin(Arc::new(TestPlugin::new("pricing").depends_on("catalog")))
            .unwrap();
        assert_eq!(orch.plugin_status(&PluginId::new("catalog")), Some(PluginStatus::Active));
        assert_eq!(orch.plugin_status(&PluginId::new("pricing")), Some(PluginStatus::Active));
        assert_eq!(orch.plugin_count(), 2);

        let err = orch
            .register_plugin(Arc::new(TestPlugin::new("reporting").depends_on("ledger")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingDependency { .. }));
        assert_eq!(orch.plugin_count(), 2);
    }

    #[test]
    fn failed_initialize_leaves_no_registration_behind() {
        let (orch, _) = orchestrator(TenantId::new());
        let plugin = Arc::new(TestPlugin::new("crm").failing_initialize());

        let err = orch.register_plugin(plugin).unwrap_err();
        assert!(matches!(err, RegistryError::Plugin(PluginError::Initialize(_))));
        assert_eq!(orch.plugin_count(), 0);
        assert_eq!(orch.plugin_status(&PluginId::new("crm")), None);
    }

    #[test]
    fn failed_activation_keeps_the_plugin_registered_inactive() {
        let (orch, _) = orchestrator(TenantId::new());
        let err = orch
            .register_plugin(Arc::new(TestPlugin::new("crm").failing_activate()))
            .unwrap_err();

        assert!(matches!(err, RegistryError::Plugin(PluginError::Activation(_))));
        assert_eq!(orch.plugin_status(&PluginId::new("crm")), Some(PluginStatus::Inactive));
    }

    #[test]
    fn disabled_plugin_registers_inactive_and_activates_later() {
        let (orch, _) = orchestrator(TenantId::new());
        let plugin = Arc::new(TestPlugin::new("crm").disabled());
        let id = PluginId::new("crm");

        let status = orch.register_plugin(plugin.clone()).unwrap();
        assert_eq!(status, PluginStatus::Inactive);
        assert_eq!(plugin.calls(), ["initialize"]);

        orch.activate_plugin(&id).unwrap();
        assert_eq!(orch.plugin_status(&id), Some(PluginStatus::Active));
        assert_eq!(plugin.calls(), ["initialize", "activate"]);
    }

    #[test]
    fn activate_and_deactivate_are_idempotent() {
        let (orch, _) = orchestrator(TenantId::new());
        let plugin = Arc::new(TestPlugin::new("crm"));
        let id = PluginId::new("crm");
        orch.register_plugin(plugin.clone()).unwrap();

        // Registration already activated it once.
        orch.activate_plugin(&id).unwrap();
        orch.activate_plugin(&id).unwrap();
        assert_eq!(plugin.calls(), ["initialize", "activate"]);

        orch.deactivate_plugin(&id).unwrap();
        orch.deactivate_plugin(&id).unwrap();
        assert_eq!(plugin.calls(), ["initialize", "activate", "deactivate"]);
        assert_eq!(orch.plugin_status(&id), Some(PluginStatus::Inactive));
    }

    #[test]
    fn destroy_is_refused_while_another_plugin_depends_on_it() {
        let (orch, _) = orchestrator(TenantId::new());
        let base = Arc::new(TestPlugin::new("base"));
        orch.register_plugin(base.clone()).unwrap();
        orch.register_plugin(Arc::new(TestPlugin::new("addon").depends_on("base"))).unwrap();

        let err = orch.destroy_plugin(&PluginId::new("base")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DependedUpon { ref dependent, .. } if dependent.as_str() == "addon"
        ));
        assert_eq!(orch.plugin_count(), 2);

        orch.destroy_plugin(&PluginId::new("addon")).unwrap();
        orch.destroy_plugin(&PluginId::new("base")).unwrap();
        assert_eq!(orch.plugin_count(), 0);
        assert_eq!(base.calls(), ["initialize", "activate", "deactivate", "destroy"]);
    }

    #[test]
    fn destroying_an_unknown_plugin_reports_not_found() {
        let (orch, _) = orchestrator(TenantId::new());
        let err = orch.destroy_plugin(&PluginId::new("ghost")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn handler_table_tracks_webhook_subscriptions() {
        let (orch, _) = orchestrator(TenantId::new());
        orch.register_plugin(Arc::new(
            TestPlugin::new("crm").subscribed_to(EventKind::EntityChanged),
        ))
        .unwrap();

        assert_eq!(orch.handlers_for(EventKind::EntityChanged), [PluginId::new("crm")]);
        assert!(orch.handlers_for(EventKind::PredictionReady).is_empty());

        orch.destroy_plugin(&PluginId::new("crm")).unwrap();
        assert!(orch.handlers_for(EventKind::EntityChanged).is_empty());
    }

    #[test]
    fn sync_reports_delivered_failed_and_skipped_modules() {
        let tenant = TenantId::new();
        let (orch, _) = orchestrator(tenant);
        let connector = RecordingConnector::arc();
        orch.register_adapter(Arc::new(CrmAdapter::new(connector.clone())));
        orch.register_adapter(Arc::new(AccountingAdapter::new(connector.clone())));
        connector.fail_module(ModuleKind::Accounting);
        // Customer routes to crm, accounting and project management; the
        // last has no adapter here.

        let payload = customer_payload();
        let envelope = SyncEnvelope::entity_changed(tenant, payload.kind(), payload.entity_id(), payload);
        let report = orch.handle_entity_sync(&envelope).unwrap();

        assert_eq!(report.delivered, [ModuleKind::Crm]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].module, ModuleKind::Accounting);
        assert_eq!(report.skipped, [ModuleKind::ProjectManagement]);
        assert!(!report.is_clean());

        // The failing module never blocked the successful one.
        assert_eq!(connector.delivery_count(), 1);
        assert_eq!(connector.deliveries()[0].module, ModuleKind::Crm);
    }

    #[test]
    fn sync_notifies_only_active_subscribed_plugins() {
        let tenant = TenantId::new();
        let (orch, _) = orchestrator(tenant);
        let subscribed = Arc::new(TestPlugin::new("crm").subscribed_to(EventKind::EntityChanged));
        let bystander = Arc::new(TestPlugin::new("hr"));
        orch.register_plugin(subscribed.clone()).unwrap();
        orch.register_plugin(bystander.clone()).unwrap();

        let payload = customer_payload();
        let envelope = SyncEnvelope::entity_changed(tenant, payload.kind(), payload.entity_id(), payload);

        let report = orch.handle_entity_sync(&envelope).unwrap();
        assert_eq!(report.notified, [PluginId::new("crm")]);
        assert_eq!(subscribed.synced.lock().unwrap().len(), 1);
        assert!(bystander.synced.lock().unwrap().is_empty());

        orch.deactivate_plugin(&PluginId::new("crm")).unwrap();
        let report = orch.handle_entity_sync(&envelope).unwrap();
        assert!(report.notified.is_empty());
    }

    #[test]
    fn sync_rejects_envelopes_from_other_tenants() {
        let (orch, _) = orchestrator(TenantId::new());
        let payload = customer_payload();
        let envelope =
            SyncEnvelope::entity_changed(TenantId::new(), payload.kind(), payload.entity_id(), payload);

        assert!(matches!(
            orch.handle_entity_sync(&envelope),
            Err(RegistryError::TenantIsolation)
        ));
    }

    #[test]
    fn list_orders_by_priority_then_id() {
        let (orch, _) = orchestrator(TenantId::new());
        orch.register_plugin(Arc::new(TestPlugin::new("beta").with_priority(10))).unwrap();
        orch.register_plugin(Arc::new(TestPlugin::new("alpha").with_priority(10))).unwrap();
        orch.register_plugin(Arc::new(TestPlugin::new("omega").with_priority(90))).unwrap();

        let summaries = orch.list_plugins();
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["omega", "alpha", "beta"]);
        assert!(orch.list_plugins()[0].health.is_healthy());
    }

    #[test]
    fn lifecycle_events_all_carry_the_registry_tenant() {
        let tenant = TenantId::new();
        let (orch, bus) = orchestrator(tenant);
        let sub = bus.subscribe();
        let id = PluginId::new("crm");

        orch.register_plugin(Arc::new(TestPlugin::new("crm"))).unwrap();
        orch.deactivate_plugin(&id).unwrap();
        orch.activate_plugin(&id).unwrap();
        orch.destroy_plugin(&id).unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| sub.try_recv().ok())
            .inspect(|event| {
                assert_eq!(event.tenant_id(), tenant);
                assert_eq!(event.channel(), EventChannel::ModuleSync);
            })
            .map(|event| event.kind())
            .collect();
        assert_eq!(
            kinds,
            [
                EventKind::PluginRegistered,
                EventKind::PluginDeactivated,
                EventKind::PluginActivated,
                EventKind::PluginDestroyed,
            ]
        );
    }
}
