//! Module adapters: translate canonical entity payloads into the document
//! shape each business module expects, and push them across the connector
//! boundary.

pub mod accounting;
pub mod adapter;
pub mod connector;
pub mod crm;
pub mod hr;
pub mod inventory;
pub mod payload;
pub mod project_management;

pub use accounting::AccountingAdapter;
pub use adapter::{AdapterError, ModuleAdapter};
pub use connector::{Delivery, ModuleConnector, RecordingConnector};
pub use crm::CrmAdapter;
pub use hr::HrAdapter;
pub use inventory::InventoryAdapter;
pub use payload::{
    CaseRecord, CustomerRecord, DocumentRecord, EmployeeRecord, EntityPayload, InvoiceRecord,
    MovementRecord, OrderRecord, ProductRecord, TimesheetRecord,
};
pub use project_management::ProjectManagementAdapter;
