//! Transport boundary between adapters and the modules they feed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::AdapterError;

/// Delivers a rendered document to a module.
///
/// In production this would sit in front of an HTTP client or a message
/// queue; in-process deployments use [`RecordingConnector`].
pub trait ModuleConnector: Send + Sync {
    fn deliver(
        &self,
        module: ModuleKind,
        entity: EntityKind,
        document: Value,
    ) -> Result<(), AdapterError>;
}

/// One delivered document.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub module: ModuleKind,
    pub entity: EntityKind,
    pub document: Value,
}

/// Connector that records deliveries instead of sending them anywhere.
///
/// Failure injection via [`fail_module`](Self::fail_module) lets tests
/// exercise the partial-failure path of sync fan-out.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    deliveries: Mutex<Vec<Delivery>>,
    fail_modules: Mutex<HashSet<ModuleKind>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// All deliveries so far, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// Make every future delivery to `module` fail.
    pub fn fail_module(&self, module: ModuleKind) {
        self.fail_modules.lock().unwrap().insert(module);
    }

    /// Clear recorded deliveries and failure injections.
    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
        self.fail_modules.lock().unwrap().clear();
    }
}

impl ModuleConnector for RecordingConnector {
    fn deliver(
        &self,
        module: ModuleKind,
        entity: EntityKind,
        document: Value,
    ) -> Result<(), AdapterError> {
        if self.fail_modules.lock().unwrap().contains(&module) {
            return Err(AdapterError::Connector(format!("{module} endpoint unavailable")));
        }
        self.deliveries.lock().unwrap().push(Delivery { module, entity, document });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_deliveries_in_order() {
        let connector = RecordingConnector::new();
        connector
            .deliver(ModuleKind::Crm, EntityKind::Customer, serde_json::json!({"a": 1}))
            .unwrap();
        connector
            .deliver(ModuleKind::Inventory, EntityKind::Product, serde_json::json!({"b": 2}))
            .unwrap();

        let deliveries = connector.deliveries();
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].module, ModuleKind::Crm);
        assert_eq!(deliveries[1].entity, EntityKind::Product);
    }

    #[test]
    fn injected_failure_only_hits_the_chosen_module() {
        let connector = RecordingConnector::new();
        connector.fail_module(ModuleKind::Accounting);

        let err = connector
            .deliver(ModuleKind::Accounting, EntityKind::Invoice, serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Connector(_)));

        connector
            .deliver(ModuleKind::Crm, EntityKind::Invoice, serde_json::json!({}))
            .unwrap();
        assert_eq!(connector.delivery_count(), 1);
    }
}
