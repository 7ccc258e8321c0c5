//! The inventory plugin: local item state, movement bookkeeping and the
//! AI-backed inventory operations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use coreflow_adapters::EntityPayload;
use coreflow_core::{DomainError, DomainResult, EntityId, ModuleKind, PluginId, TenantId};
use coreflow_events::EventKind;
use coreflow_orchestrator::{
    ApiEndpoint, HttpMethod, Plugin, PluginCapabilities, PluginConfig, PluginDescriptor,
    RetryPolicy, WebhookSubscription,
};
use coreflow_tasks::{
    InsightSink, TaskKind, TaskOrchestrator, TaskPriority, TaskRequest, run_to_insight,
};

use crate::item::{CreateItem, InventoryItem};
use crate::movement::{RecordMovement, StockMovement};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("demand forecasting failed")]
    Forecast,
    #[error("stock optimization failed")]
    StockOptimization,
    #[error("supplier analysis failed")]
    SupplierAnalysis,
}

fn default_horizon() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    /// Days ahead to forecast.
    #[serde(default = "default_horizon")]
    pub horizon_days: u32,
    /// Restrict the forecast to these items; empty means all.
    #[serde(default)]
    pub item_ids: Vec<EntityId>,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self { horizon_days: 30, item_ids: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemandForecast {
    pub horizon_days: u32,
    pub items_considered: usize,
    /// Relative demand pressure across the considered items.
    pub expected_demand_index: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockPlan {
    pub items_reviewed: usize,
    /// Items at or below their reorder point right now.
    pub below_reorder_point: usize,
    pub optimization_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierAnalysisRequest {
    pub supplier_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierAssessment {
    pub supplier_name: String,
    pub risk_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Inventory module plugin.
pub struct InventoryPlugin {
    tenant_id: TenantId,
    tasks: Arc<dyn TaskOrchestrator>,
    insights: Arc<dyn InsightSink>,
    items: RwLock<HashMap<EntityId, InventoryItem>>,
    movements: RwLock<Vec<StockMovement>>,
}

impl InventoryPlugin {
    pub fn new(
        tenant_id: TenantId,
        tasks: Arc<dyn TaskOrchestrator>,
        insights: Arc<dyn InsightSink>,
    ) -> Self {
        Self {
            tenant_id,
            tasks,
            insights,
            items: RwLock::new(HashMap::new()),
            movements: RwLock::new(Vec::new()),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn create_item(&self, input: CreateItem) -> Result<InventoryItem, InventoryError> {
        let mut items = self.items.write().unwrap();
        if items.values().any(|item| item.sku == input.sku) {
            return Err(DomainError::conflict(format!("sku `{}` already exists", input.sku)).into());
        }
        let item = InventoryItem::create(self.tenant_id, input)?;
        items.insert(item.id, item.clone());
        Ok(item)
    }

    pub fn item(&self, id: EntityId) -> Result<InventoryItem, InventoryError> {
        self.items
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("inventory item {id}")).into())
    }

    /// All items, ordered by sku.
    pub fn list_items(&self) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self.items.read().unwrap().values().cloned().collect();
        items.sort_by(|a, b| a.sku.cmp(&b.sku));
        items
    }

    pub fn item_count(&self) -> usize {
        self.items.read().unwrap().len()
    }

    /// Record a movement and apply its delta to the item's stock.
    pub fn record_movement(
        &self,
        input: RecordMovement,
    ) -> Result<(StockMovement, InventoryItem), InventoryError> {
        let movement = StockMovement::record(input)?;

        let mut items = self.items.write().unwrap();
        let item = items
            .get_mut(&movement.item_id)
            .ok_or_else(|| DomainError::not_found(format!("inventory item {}", movement.item_id)))?;
        item.apply_delta(movement.signed_quantity())?;
        let snapshot = item.clone();
        drop(items);

        self.movements.write().unwrap().push(movement.clone());
        Ok((movement, snapshot))
    }

    pub fn movements_for(&self, item_id: EntityId) -> Vec<StockMovement> {
        self.movements
            .read()
            .unwrap()
            .iter()
            .filter(|movement| movement.item_id == item_id)
            .cloned()
            .collect()
    }

    /// Forecast demand over the requested horizon.
    pub fn generate_demand_forecast(
        &self,
        request: ForecastRequest,
    ) -> Result<DemandForecast, InventoryError> {
        if request.horizon_days == 0 {
            return Err(DomainError::validation("forecast horizon must be at least one day").into());
        }

        let items = self.snapshot(&request.item_ids);
        let payload = json!({
            "horizon_days": request.horizon_days,
            "items": items.iter().map(|item| json!({
                "id": item.id,
                "sku": item.sku,
                "current_stock": item.current_stock,
                "reorder_point": item.reorder_point,
            })).collect::<Vec<_>>(),
        });

        let task = TaskRequest::new(self.tenant_id, TaskKind::DemandForecast, payload)
            .with_priority(TaskPriority::High);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "demand forecast task failed");
            InventoryError::Forecast
        })?;
        self.insights.record(self.tenant_id, TaskKind::DemandForecast, insight.clone());

        Ok(DemandForecast {
            horizon_days: request.horizon_days,
            items_considered: items.len(),
            expected_demand_index: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    /// Review stock levels across all items and propose reorder adjustments.
    pub fn optimize_stock(&self) -> Result<StockPlan, InventoryError> {
        let items = self.snapshot(&[]);
        let below = items.iter().filter(|item| item.needs_reorder()).count();
        let payload = json!({
            "items": items.iter().map(|item| json!({
                "id": item.id,
                "sku": item.sku,
                "current_stock": item.current_stock,
                "reorder_point": item.reorder_point,
                "reorder_quantity": item.reorder_quantity,
                "unit_cost": item.unit_cost,
            })).collect::<Vec<_>>(),
        });

        let task = TaskRequest::new(self.tenant_id, TaskKind::StockOptimization, payload);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "stock optimization task failed");
            InventoryError::StockOptimization
        })?;
        self.insights.record(self.tenant_id, TaskKind::StockOptimization, insight.clone());

        Ok(StockPlan {
            items_reviewed: items.len(),
            below_reorder_point: below,
            optimization_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    /// Assess the supply risk of one named supplier.
    pub fn analyze_supplier(
        &self,
        request: SupplierAnalysisRequest,
    ) -> Result<SupplierAssessment, InventoryError> {
        if request.supplier_name.trim().is_empty() {
            return Err(DomainError::validation("supplier name must not be empty").into());
        }

        let payload = json!({
            "supplier_name": request.supplier_name,
            "tracked_items": self.item_count(),
        });
        let task = TaskRequest::new(self.tenant_id, TaskKind::SupplierAnalysis, payload);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "supplier analysis task failed");
            InventoryError::SupplierAnalysis
        })?;
        self.insights.record(self.tenant_id, TaskKind::SupplierAnalysis, insight.clone());

        Ok(SupplierAssessment {
            supplier_name: request.supplier_name,
            risk_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    fn snapshot(&self, only: &[EntityId]) -> Vec<InventoryItem> {
        let items = self.items.read().unwrap();
        if only.is_empty() {
            let mut all: Vec<InventoryItem> = items.values().cloned().collect();
            all.sort_by(|a, b| a.sku.cmp(&b.sku));
            all
        } else {
            only.iter().filter_map(|id| items.get(id).cloned()).collect()
        }
    }
}

impl Plugin for InventoryPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: PluginId::new("inventory"),
            name: "Inventory Management".into(),
            module: ModuleKind::Inventory,
            version: "1.0.0".into(),
            config: PluginConfig {
                enabled: true,
                priority: 80,
                dependencies: Vec::new(),
                permissions: vec!["inventory.read".into(), "inventory.write".into()],
                endpoints: vec![
                    ApiEndpoint {
                        path: "/inventory/items".into(),
                        method: HttpMethod::Post,
                        handler: "create_item".into(),
                        auth_required: true,
                        rate_limit: None,
                    },
                    ApiEndpoint {
                        path: "/inventory/forecast".into(),
                        method: HttpMethod::Post,
                        handler: "generate_demand_forecast".into(),
                        auth_required: true,
                        rate_limit: Some(30),
                    },
                ],
                webhooks: vec![
                    WebhookSubscription {
                        event: EventKind::EntityChanged,
                        internal: true,
                        retry: RetryPolicy::exponential(3, Duration::from_secs(1)),
                    },
                    WebhookSubscription {
                        event: EventKind::PredictionReady,
                        internal: true,
                        retry: RetryPolicy::linear(5, Duration::from_millis(500)),
                    },
                ],
            },
            capabilities: PluginCapabilities {
                ai_enabled: true,
                real_time_sync: true,
                cross_module: true,
                industry_specific: false,
                custom_fields: true,
            },
        }
    }

    fn validate_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Product(product) => {
                if product.sku.trim().is_empty() {
                    return Err(DomainError::validation("product sku must not be empty"));
                }
                if product.unit_price < 0 {
                    return Err(DomainError::validation("product price must not be negative"));
                }
                if product.stock_on_hand < 0 {
                    return Err(DomainError::validation("stock on hand must not be negative"));
                }
                Ok(())
            }
            EntityPayload::StockMovement(movement) => {
                if movement.quantity_delta == 0 {
                    return Err(DomainError::validation("movement delta must not be zero"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn transform_data(&self, payload: EntityPayload) -> DomainResult<EntityPayload> {
        // Warehouse convention: skus are uppercase.
        match payload {
            EntityPayload::Product(mut product) => {
                product.sku = product.sku.to_uppercase();
                Ok(EntityPayload::Product(product))
            }
            other => Ok(other),
        }
    }

    fn sync_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Product(product) => {
                let mut items = self.items.write().unwrap();
                if let Some(item) = items.values_mut().find(|item| item.sku == product.sku) {
                    item.name = product.name.clone();
                    item.description = product.description.clone();
                    item.unit_cost = product.unit_price;
                    item.current_stock = product.stock_on_hand;
                    item.updated_at = Utc::now();
                } else {
                    let now = Utc::now();
                    items.insert(
                        product.id,
                        InventoryItem {
                            id: product.id,
                            tenant_id: self.tenant_id,
                            sku: product.sku.clone(),
                            name: product.name.clone(),
                            description: product.description.clone(),
                            unit: Default::default(),
                            current_stock: product.stock_on_hand,
                            reorder_point: 0,
                            reorder_quantity: 0,
                            unit_cost: product.unit_price,
                            location: None,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                Ok(())
            }
            EntityPayload::StockMovement(movement) => {
                let mut items = self.items.write().unwrap();
                match items.get_mut(&movement.product_id) {
                    Some(item) => item.apply_delta(movement.quantity_delta),
                    // Movements for items we do not track are not ours to veto.
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementKind;
    use coreflow_adapters::{MovementRecord, ProductRecord};
    use coreflow_tasks::{InMemoryInsightSink, InProcessTaskOrchestrator, TaskInsight};
    use std::thread;

    /// Plugin wired to an in-process orchestrator plus a scripted engine
    /// thread that resolves the next `count` submissions.
    fn plugin_with_engine(
        count: usize,
        respond: impl Fn(TaskKind) -> Result<TaskInsight, String> + Send + 'static,
    ) -> (InventoryPlugin, Arc<InMemoryInsightSink>, thread::JoinHandle<()>) {
        let tasks = InProcessTaskOrchestrator::arc();
        let insights = Arc::new(InMemoryInsightSink::new());
        let plugin = InventoryPlugin::new(TenantId::new(), tasks.clone(), insights.clone());

        let submissions = tasks.watch_submissions();
        let engine = thread::spawn(move || {
            for _ in 0..count {
                let task = match submissions.recv() {
                    Ok(task) => task,
                    Err(_) => return,
                };
                match respond(task.kind.clone()) {
                    Ok(insight) => tasks.complete(task.id, insight).unwrap(),
                    Err(error) => tasks.fail(task.id, error).unwrap(),
                }
            }
        });

        (plugin, insights, engine)
    }

    fn stocked_item(plugin: &InventoryPlugin, sku: &str, stock: i64) -> InventoryItem {
        plugin
            .create_item(CreateItem {
                sku: sku.into(),
                name: format!("{sku} item"),
                current_stock: Some(stock),
                reorder_point: Some(5),
                ..CreateItem::default()
            })
            .unwrap()
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        stocked_item(&plugin, "SKU-1", 10);

        let err = plugin
            .create_item(CreateItem {
                sku: "SKU-1".into(),
                name: "Other".into(),
                ..CreateItem::default()
            })
            .unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Conflict(_))));
        engine.join().unwrap();
    }

    #[test]
    fn movement_updates_stock_and_history() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let item = stocked_item(&plugin, "SKU-1", 10);

        let (movement, updated) = plugin
            .record_movement(RecordMovement {
                item_id: item.id,
                kind: MovementKind::Issue,
                quantity: 4,
                reference: Some("SO-9".into()),
            })
            .unwrap();

        assert_eq!(updated.current_stock, 6);
        assert_eq!(movement.signed_quantity(), -4);
        assert_eq!(plugin.movements_for(item.id).len(), 1);
        engine.join().unwrap();
    }

    #[test]
    fn forecast_records_insight_and_returns_summary() {
        let (plugin, insights, engine) = plugin_with_engine(1, |kind| {
            assert_eq!(kind, TaskKind::DemandForecast);
            Ok(TaskInsight::new(0.72, 0.91).with_explanation("seasonal uptick"))
        });
        stocked_item(&plugin, "SKU-1", 10);
        stocked_item(&plugin, "SKU-2", 3);

        let forecast = plugin.generate_demand_forecast(ForecastRequest::default()).unwrap();
        engine.join().unwrap();

        assert_eq!(forecast.horizon_days, 30);
        assert_eq!(forecast.items_considered, 2);
        assert_eq!(forecast.expected_demand_index, 0.72);
        assert_eq!(forecast.explanation.as_deref(), Some("seasonal uptick"));

        let recorded = insights.for_tenant(plugin.tenant_id());
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, TaskKind::DemandForecast);
    }

    #[test]
    fn failed_forecast_reports_the_fixed_domain_message() {
        let (plugin, insights, engine) =
            plugin_with_engine(1, |_| Err("model unavailable".into()));

        let err = plugin.generate_demand_forecast(ForecastRequest::default()).unwrap_err();
        engine.join().unwrap();

        assert!(matches!(err, InventoryError::Forecast));
        assert_eq!(err.to_string(), "demand forecasting failed");
        assert!(insights.all().is_empty());
    }

    #[test]
    fn zero_horizon_is_rejected_before_submitting() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let err = plugin
            .generate_demand_forecast(ForecastRequest { horizon_days: 0, item_ids: Vec::new() })
            .unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Validation(_))));
        engine.join().unwrap();
    }

    #[test]
    fn stock_plan_counts_items_below_reorder_point() {
        let (plugin, _, engine) = plugin_with_engine(1, |kind| {
            assert_eq!(kind, TaskKind::StockOptimization);
            Ok(TaskInsight::new(0.4, 0.85))
        });
        stocked_item(&plugin, "SKU-1", 20);
        stocked_item(&plugin, "SKU-2", 2);

        let plan = plugin.optimize_stock().unwrap();
        engine.join().unwrap();

        assert_eq!(plan.items_reviewed, 2);
        assert_eq!(plan.below_reorder_point, 1);
        assert_eq!(plan.optimization_score, 0.4);
    }

    #[test]
    fn supplier_assessment_carries_the_risk_score() {
        let (plugin, _, engine) = plugin_with_engine(1, |kind| {
            assert_eq!(kind, TaskKind::SupplierAnalysis);
            Ok(TaskInsight::new(0.23, 0.88))
        });

        let assessment = plugin
            .analyze_supplier(SupplierAnalysisRequest { supplier_name: "Acme Logistics".into() })
            .unwrap();
        engine.join().unwrap();

        assert_eq!(assessment.supplier_name, "Acme Logistics");
        assert_eq!(assessment.risk_score, 0.23);
    }

    #[test]
    fn sync_upserts_products_by_sku() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let item = stocked_item(&plugin, "SKU-1", 10);

        let update = EntityPayload::Product(ProductRecord {
            id: EntityId::new(),
            sku: "SKU-1".into(),
            name: "Renamed".into(),
            description: Some("new".into()),
            unit_price: 5_00,
            stock_on_hand: 25,
        });
        plugin.sync_data(&update).unwrap();

        let updated = plugin.item(item.id).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.current_stock, 25);
        assert_eq!(plugin.item_count(), 1);

        let fresh = EntityPayload::Product(ProductRecord {
            id: EntityId::new(),
            sku: "SKU-NEW".into(),
            name: "Fresh".into(),
            description: None,
            unit_price: 1_00,
            stock_on_hand: 7,
        });
        plugin.sync_data(&fresh).unwrap();
        assert_eq!(plugin.item_count(), 2);
        engine.join().unwrap();
    }

    #[test]
    fn sync_applies_movement_deltas_to_known_items() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let item = stocked_item(&plugin, "SKU-1", 10);

        plugin
            .sync_data(&EntityPayload::StockMovement(MovementRecord {
                id: EntityId::new(),
                product_id: item.id,
                quantity_delta: -3,
                reference: None,
            }))
            .unwrap();
        assert_eq!(plugin.item(item.id).unwrap().current_stock, 7);

        // Unknown product: nothing to apply, nothing to reject.
        plugin
            .sync_data(&EntityPayload::StockMovement(MovementRecord {
                id: EntityId::new(),
                product_id: EntityId::new(),
                quantity_delta: -3,
                reference: None,
            }))
            .unwrap();
        engine.join().unwrap();
    }

    #[test]
    fn transform_uppercases_skus() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let payload = EntityPayload::Product(ProductRecord {
            id: EntityId::new(),
            sku: "sku-lower".into(),
            name: "x".into(),
            description: None,
            unit_price: 0,
            stock_on_hand: 0,
        });

        match plugin.transform_data(payload).unwrap() {
            EntityPayload::Product(product) => assert_eq!(product.sku, "SKU-LOWER"),
            other => panic!("unexpected payload {other:?}"),
        }
        engine.join().unwrap();
    }

    #[test]
    fn validate_rejects_malformed_products() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let bad = EntityPayload::Product(ProductRecord {
            id: EntityId::new(),
            sku: "".into(),
            name: "x".into(),
            description: None,
            unit_price: 0,
            stock_on_hand: 0,
        });
        assert!(plugin.validate_data(&bad).is_err());
        engine.join().unwrap();
    }

    #[test]
    fn descriptor_declares_the_inventory_contract() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let descriptor = plugin.descriptor();

        assert_eq!(descriptor.id.as_str(), "inventory");
        assert_eq!(descriptor.module, ModuleKind::Inventory);
        assert!(descriptor.config.enabled);
        assert!(descriptor.capabilities.ai_enabled);
        assert_eq!(descriptor.config.webhooks.len(), 2);
        engine.join().unwrap();
    }
}
