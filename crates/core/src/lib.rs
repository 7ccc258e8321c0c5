//! `coreflow-core` — shared domain foundation.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the module/entity taxonomy, and the domain error model.

pub mod error;
pub mod id;
pub mod module;

pub use error::{DomainError, DomainResult};
pub use id::{EntityId, PluginId, TenantId};
pub use module::{EntityKind, ModuleKind};
