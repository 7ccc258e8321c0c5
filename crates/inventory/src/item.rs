//! Inventory items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    #[default]
    Each,
    Kilogram,
    Liter,
    Meter,
    Box,
    Pallet,
}

/// A stocked item. Monetary fields are minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: UnitOfMeasure,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub reorder_quantity: i64,
    pub unit_cost: i64,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation input. Everything beyond sku and name is optional and falls back
/// to documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItem {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<UnitOfMeasure>,
    #[serde(default)]
    pub current_stock: Option<i64>,
    #[serde(default)]
    pub reorder_point: Option<i64>,
    #[serde(default)]
    pub reorder_quantity: Option<i64>,
    #[serde(default)]
    pub unit_cost: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl InventoryItem {
    /// Build a new item from creation input, filling defaults: `each` unit,
    /// zero stock, zero reorder levels, zero cost.
    pub fn create(tenant_id: TenantId, input: CreateItem) -> DomainResult<Self> {
        if input.sku.trim().is_empty() {
            return Err(DomainError::validation("item sku must not be empty"));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("item name must not be empty"));
        }
        for (field, value) in [
            ("current_stock", input.current_stock),
            ("reorder_point", input.reorder_point),
            ("reorder_quantity", input.reorder_quantity),
            ("unit_cost", input.unit_cost),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(DomainError::validation(format!("{field} must not be negative")));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: EntityId::new(),
            tenant_id,
            sku: input.sku,
            name: input.name,
            description: input.description,
            unit: input.unit.unwrap_or_default(),
            current_stock: input.current_stock.unwrap_or(0),
            reorder_point: input.reorder_point.unwrap_or(0),
            reorder_quantity: input.reorder_quantity.unwrap_or(0),
            unit_cost: input.unit_cost.unwrap_or(0),
            location: input.location,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a signed stock delta. Stock never goes negative.
    pub fn apply_delta(&mut self, delta: i64) -> DomainResult<()> {
        let next = self.current_stock + delta;
        if next < 0 {
            return Err(DomainError::invariant(format!(
                "stock for {} would drop to {next}",
                self.sku
            )));
        }
        self.current_stock = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.reorder_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> CreateItem {
        CreateItem {
            sku: "SKU-1".into(),
            name: "Thing".into(),
            ..CreateItem::default()
        }
    }

    #[test]
    fn minimal_input_yields_documented_defaults() {
        let item = InventoryItem::create(TenantId::new(), minimal()).unwrap();

        assert_eq!(item.unit, UnitOfMeasure::Each);
        assert_eq!(item.current_stock, 0);
        assert_eq!(item.reorder_point, 0);
        assert_eq!(item.reorder_quantity, 0);
        assert_eq!(item.unit_cost, 0);
        assert_eq!(item.description, None);
        assert_eq!(item.location, None);
    }

    #[test]
    fn blank_sku_is_rejected() {
        let err = InventoryItem::create(
            TenantId::new(),
            CreateItem { sku: "  ".into(), ..minimal() },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_initial_stock_is_rejected() {
        let err = InventoryItem::create(
            TenantId::new(),
            CreateItem { current_stock: Some(-5), ..minimal() },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn delta_cannot_push_stock_negative() {
        let mut item = InventoryItem::create(
            TenantId::new(),
            CreateItem { current_stock: Some(3), ..minimal() },
        )
        .unwrap();

        item.apply_delta(-3).unwrap();
        assert_eq!(item.current_stock, 0);

        let err = item.apply_delta(-1).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(item.current_stock, 0);
    }

    #[test]
    fn reorder_flag_trips_at_the_reorder_point() {
        let mut item = InventoryItem::create(
            TenantId::new(),
            CreateItem {
                current_stock: Some(10),
                reorder_point: Some(4),
                ..minimal()
            },
        )
        .unwrap();

        assert!(!item.needs_reorder());
        item.apply_delta(-6).unwrap();
        assert!(item.needs_reorder());
    }
}
