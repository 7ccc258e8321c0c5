//! Canonical entity payloads exchanged between modules.
//!
//! Sync traffic carries one of these instead of a free-form JSON blob, so a
//! malformed document is rejected at the boundary rather than deep inside an
//! adapter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use coreflow_core::{EntityId, EntityKind};

/// Tagged union over every entity kind that can travel on the sync channel.
///
/// The tag is the snake_case entity kind, so the wire form of a customer is
/// `{"entity": "customer", "id": ..., "name": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityPayload {
    Customer(CustomerRecord),
    Product(ProductRecord),
    Invoice(InvoiceRecord),
    Order(OrderRecord),
    Employee(EmployeeRecord),
    Timesheet(TimesheetRecord),
    Case(CaseRecord),
    Document(DocumentRecord),
    StockMovement(MovementRecord),
}

impl EntityPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Customer(_) => EntityKind::Customer,
            Self::Product(_) => EntityKind::Product,
            Self::Invoice(_) => EntityKind::Invoice,
            Self::Order(_) => EntityKind::Order,
            Self::Employee(_) => EntityKind::Employee,
            Self::Timesheet(_) => EntityKind::Timesheet,
            Self::Case(_) => EntityKind::Case,
            Self::Document(_) => EntityKind::Document,
            Self::StockMovement(_) => EntityKind::StockMovement,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Customer(r) => r.id,
            Self::Product(r) => r.id,
            Self::Invoice(r) => r.id,
            Self::Order(r) => r.id,
            Self::Employee(r) => r.id,
            Self::Timesheet(r) => r.id,
            Self::Case(r) => r.id,
            Self::Document(r) => r.id,
            Self::StockMovement(r) => r.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: EntityId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
}

/// Monetary amounts are carried in minor units (cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: EntityId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: i64,
    pub stock_on_hand: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: EntityId,
    pub number: String,
    pub customer_id: EntityId,
    pub total: i64,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: EntityId,
    pub number: String,
    pub customer_id: EntityId,
    pub total: i64,
    pub placed_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetRecord {
    pub id: EntityId,
    pub employee_id: EntityId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub hours: f64,
    pub billable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: EntityId,
    pub number: String,
    pub title: String,
    pub status: String,
    pub opened_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: EntityId,
    pub case_id: Option<EntityId>,
    pub title: String,
    pub kind: String,
    pub uploaded_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: EntityId,
    pub product_id: EntityId,
    pub quantity_delta: i64,
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_by_entity_kind() {
        let payload = EntityPayload::Customer(CustomerRecord {
            id: EntityId::new(),
            name: "Acme GmbH".into(),
            email: Some("billing@acme.example".into()),
            phone: None,
            billing_address: None,
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["entity"], "customer");
        assert_eq!(value["name"], "Acme GmbH");

        let back: EntityPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.kind(), EntityKind::Customer);
    }

    #[test]
    fn unknown_entity_tag_fails_to_parse() {
        let result: Result<EntityPayload, _> = serde_json::from_value(serde_json::json!({
            "entity": "starship",
            "id": EntityId::new(),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn entity_id_matches_the_embedded_record() {
        let id = EntityId::new();
        let payload = EntityPayload::StockMovement(MovementRecord {
            id,
            product_id: EntityId::new(),
            quantity_delta: -4,
            reference: Some("SO-1001".into()),
        });
        assert_eq!(payload.entity_id(), id);
        assert_eq!(payload.kind(), EntityKind::StockMovement);
    }
}
