//! Static entity-to-module routing for cross-module sync.

use std::collections::HashMap;

use coreflow_core::{EntityKind, ModuleKind};

/// Which modules receive a changed entity of each kind.
///
/// The table is fixed at construction; sync fan-out only ever reads it.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<EntityKind, Vec<ModuleKind>>,
}

impl Default for RouteTable {
    fn default() -> Self {
        use EntityKind::*;
        use ModuleKind::*;

        let mut routes = HashMap::new();
        routes.insert(Customer, vec![Crm, Accounting, ProjectManagement]);
        routes.insert(Product, vec![Inventory, Accounting, Crm]);
        routes.insert(Invoice, vec![Accounting, Crm]);
        routes.insert(Order, vec![Inventory, Accounting, Crm]);
        routes.insert(Employee, vec![Hr, ProjectManagement]);
        routes.insert(Timesheet, vec![Hr, ProjectManagement, Accounting]);
        routes.insert(Case, vec![ProjectManagement]);
        routes.insert(Document, vec![ProjectManagement]);
        routes.insert(StockMovement, vec![Inventory, Accounting]);
        Self { routes }
    }
}

impl RouteTable {
    pub fn empty() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Replace the targets for one entity kind.
    pub fn with_route(mut self, entity: EntityKind, targets: Vec<ModuleKind>) -> Self {
        self.routes.insert(entity, targets);
        self
    }

    /// Modules a changed entity of this kind fans out to. Unrouted kinds
    /// yield an empty slice.
    pub fn targets(&self, entity: EntityKind) -> &[ModuleKind] {
        self.routes.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }
}
