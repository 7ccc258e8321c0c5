use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use coreflow_adapters::{
    AccountingAdapter, CrmAdapter, CustomerRecord, EntityPayload, InventoryAdapter,
    ProjectManagementAdapter, RecordingConnector,
};
use coreflow_core::{EntityId, ModuleKind, PluginId, TenantId};
use coreflow_events::{InMemoryEventBus, SyncEnvelope};
use coreflow_orchestrator::{
    Orchestrator, Plugin, PluginCapabilities, PluginConfig, PluginDescriptor,
};

type BenchBus = Arc<InMemoryEventBus<SyncEnvelope<serde_json::Value>>>;

struct NoopPlugin {
    id: String,
}

impl Plugin for NoopPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: PluginId::from(self.id.clone()),
            name: self.id.clone(),
            module: ModuleKind::Crm,
            version: "1.0.0".into(),
            config: PluginConfig::default(),
            capabilities: PluginCapabilities::default(),
        }
    }
}

fn orchestrator_with_adapters(tenant: TenantId) -> Orchestrator<BenchBus> {
    let bus: BenchBus = Arc::new(InMemoryEventBus::new());
    let orchestrator = Orchestrator::new(tenant, bus);
    let connector = RecordingConnector::arc();
    orchestrator.register_adapter(Arc::new(CrmAdapter::new(connector.clone())));
    orchestrator.register_adapter(Arc::new(AccountingAdapter::new(connector.clone())));
    orchestrator.register_adapter(Arc::new(InventoryAdapter::new(connector.clone())));
    orchestrator.register_adapter(Arc::new(ProjectManagementAdapter::new(connector)));
    orchestrator
}

fn customer_envelope(tenant: TenantId) -> SyncEnvelope<EntityPayload> {
    let payload = EntityPayload::Customer(CustomerRecord {
        id: EntityId::new(),
        name: "Benchmark Customer".into(),
        email: Some("bench@example.test".into()),
        phone: None,
        billing_address: None,
    });
    SyncEnvelope::entity_changed(tenant, payload.kind(), payload.entity_id(), payload)
}

fn bench_plugin_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("plugin_registration");

    for count in [1usize, 10, 50] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let tenant = TenantId::new();
                let bus: BenchBus = Arc::new(InMemoryEventBus::new());
                let orchestrator = Orchestrator::new(tenant, bus);
                for i in 0..count {
                    orchestrator
                        .register_plugin(Arc::new(NoopPlugin { id: format!("plugin-{i}") }))
                        .unwrap();
                }
                black_box(orchestrator.plugin_count())
            });
        });
    }

    group.finish();
}

fn bench_entity_sync_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_sync");

    group.bench_function("customer_fan_out", |b| {
        let tenant = TenantId::new();
        let orchestrator = orchestrator_with_adapters(tenant);
        let envelope = customer_envelope(tenant);

        b.iter(|| black_box(orchestrator.handle_entity_sync(&envelope).unwrap()));
    });

    group.bench_function("customer_fan_out_no_adapters", |b| {
        let tenant = TenantId::new();
        let bus: BenchBus = Arc::new(InMemoryEventBus::new());
        let orchestrator = Orchestrator::new(tenant, bus);
        let envelope = customer_envelope(tenant);

        b.iter(|| black_box(orchestrator.handle_entity_sync(&envelope).unwrap()));
    });

    group.finish();
}

fn bench_plugin_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("plugin_listing");

    let tenant = TenantId::new();
    let bus: BenchBus = Arc::new(InMemoryEventBus::new());
    let orchestrator = Orchestrator::new(tenant, bus);
    for i in 0..50 {
        orchestrator
            .register_plugin(Arc::new(NoopPlugin { id: format!("plugin-{i}") }))
            .unwrap();
    }

    group.bench_function("list_50_plugins", |b| {
        b.iter(|| black_box(orchestrator.list_plugins()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plugin_registration,
    bench_entity_sync_fan_out,
    bench_plugin_listing
);
criterion_main!(benches);
