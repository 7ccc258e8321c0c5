//! Inventory module plugin: item and stock-movement bookkeeping plus the
//! AI-backed forecasting and optimization operations.

pub mod item;
pub mod movement;
pub mod plugin;

pub use item::{CreateItem, InventoryItem, UnitOfMeasure};
pub use movement::{MovementKind, RecordMovement, StockMovement};
pub use plugin::{
    DemandForecast, ForecastRequest, InventoryError, InventoryPlugin, StockPlan,
    SupplierAnalysisRequest, SupplierAssessment,
};
