//! Inventory adapter. Warehouse documents are camelCase and carry quantity
//! and cost figures; orders arrive as pick lists.

use std::sync::Arc;

use serde_json::{Value, json};

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::{
    AdapterError, ModuleAdapter, cents_to_major, date_field, f64_field, i64_field, id_field,
    major_to_cents, opt_str_field, str_field, unsupported,
};
use crate::connector::ModuleConnector;
use crate::payload::{EntityPayload, MovementRecord, OrderRecord, ProductRecord};

pub struct InventoryAdapter {
    connector: Arc<dyn ModuleConnector>,
}

impl InventoryAdapter {
    pub fn new(connector: Arc<dyn ModuleConnector>) -> Self {
        Self { connector }
    }
}

impl ModuleAdapter for InventoryAdapter {
    fn module(&self) -> ModuleKind {
        ModuleKind::Inventory
    }

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError> {
        match entity {
            EntityKind::Product => Ok(EntityPayload::Product(ProductRecord {
                id: id_field(document, "id")?,
                sku: str_field(document, "sku")?,
                name: str_field(document, "name")?,
                description: opt_str_field(document, "notes"),
                unit_price: major_to_cents(f64_field(document, "unitCost")?),
                stock_on_hand: i64_field(document, "quantityOnHand")?,
            })),
            EntityKind::Order => Ok(EntityPayload::Order(OrderRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "pickList")?,
                customer_id: id_field(document, "shipTo")?,
                total: major_to_cents(f64_field(document, "declaredValue")?),
                placed_on: date_field(document, "orderedOn")?,
            })),
            EntityKind::StockMovement => Ok(EntityPayload::StockMovement(MovementRecord {
                id: id_field(document, "id")?,
                product_id: id_field(document, "productId")?,
                quantity_delta: i64_field(document, "quantityDelta")?,
                reference: opt_str_field(document, "reference"),
            })),
            other => Err(unsupported(self.module(), other)),
        }
    }

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError> {
        match payload {
            EntityPayload::Product(product) => Ok(json!({
                "id": product.id,
                "sku": product.sku,
                "name": product.name,
                "notes": product.description,
                "unitCost": cents_to_major(product.unit_price),
                "quantityOnHand": product.stock_on_hand,
            })),
            EntityPayload::Order(order) => Ok(json!({
                "id": order.id,
                "pickList": order.number,
                "shipTo": order.customer_id,
                "declaredValue": cents_to_major(order.total),
                "orderedOn": order.placed_on,
            })),
            EntityPayload::StockMovement(movement) => Ok(json!({
                "id": movement.id,
                "productId": movement.product_id,
                "quantityDelta": movement.quantity_delta,
                "reference": movement.reference,
            })),
            other => Err(unsupported(self.module(), other.kind())),
        }
    }

    fn load(&self, entity: EntityKind, document: Value) -> Result<(), AdapterError> {
        self.connector.deliver(self.module(), entity, document)
    }
}
