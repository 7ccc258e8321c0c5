//! `coreflow-events` — event distribution for cross-module sync.
//!
//! The production event bus is an external system; this crate owns the
//! contract (`EventBus`), the event shape (`SyncEnvelope`) and an in-memory
//! implementation used by tests and single-process deployments.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;
pub mod tenant;

pub use bus::{EventBus, Subscription};
pub use envelope::{EventChannel, EventKind, EventMetadata, SyncEnvelope};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use tenant::TenantScoped;
