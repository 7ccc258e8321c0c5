//! Module and entity taxonomy.
//!
//! `ModuleKind` names the ERP modules plugins can target; `EntityKind` names
//! the business entities that flow through cross-module sync. Both are closed
//! enums so routing and payload handling can match exhaustively.

use serde::{Deserialize, Serialize};

/// Target module of a plugin or adapter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Inventory,
    Accounting,
    Crm,
    Hr,
    ProjectManagement,
    Legal,
}

impl ModuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Inventory => "inventory",
            ModuleKind::Accounting => "accounting",
            ModuleKind::Crm => "crm",
            ModuleKind::Hr => "hr",
            ModuleKind::ProjectManagement => "project_management",
            ModuleKind::Legal => "legal",
        }
    }
}

impl core::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of business entity carried by a sync event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Product,
    Invoice,
    Order,
    Employee,
    Timesheet,
    Case,
    Document,
    StockMovement,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Invoice => "invoice",
            EntityKind::Order => "order",
            EntityKind::Employee => "employee",
            EntityKind::Timesheet => "timesheet",
            EntityKind::Case => "case",
            EntityKind::Document => "document",
            EntityKind::StockMovement => "stock_movement",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
