//! HR adapter. People documents are camelCase and keep reporting fields the
//! other modules never see.

use std::sync::Arc;

use serde_json::{Value, json};

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::{
    AdapterError, ModuleAdapter, bool_field, date_field, f64_field, id_field, str_field,
    unsupported,
};
use crate::connector::ModuleConnector;
use crate::payload::{EmployeeRecord, EntityPayload, TimesheetRecord};

pub struct HrAdapter {
    connector: Arc<dyn ModuleConnector>,
}

impl HrAdapter {
    pub fn new(connector: Arc<dyn ModuleConnector>) -> Self {
        Self { connector }
    }
}

impl ModuleAdapter for HrAdapter {
    fn module(&self) -> ModuleKind {
        ModuleKind::Hr
    }

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError> {
        match entity {
            EntityKind::Employee => Ok(EntityPayload::Employee(EmployeeRecord {
                id: id_field(document, "id")?,
                name: str_field(document, "employeeName")?,
                email: str_field(document, "workEmail")?,
                department: str_field(document, "department")?,
                title: str_field(document, "jobTitle")?,
            })),
            EntityKind::Timesheet => Ok(EntityPayload::Timesheet(TimesheetRecord {
                id: id_field(document, "id")?,
                employee_id: id_field(document, "employeeId")?,
                period_start: date_field(document, "periodStart")?,
                period_end: date_field(document, "periodEnd")?,
                hours: f64_field(document, "totalHours")?,
                billable: bool_field(document, "isBillable")?,
            })),
            other => Err(unsupported(self.module(), other)),
        }
    }

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError> {
        match payload {
            EntityPayload::Employee(employee) => Ok(json!({
                "id": employee.id,
                "employeeName": employee.name,
                "workEmail": employee.email,
                "department": employee.department,
                "jobTitle": employee.title,
            })),
            EntityPayload::Timesheet(timesheet) => Ok(json!({
                "id": timesheet.id,
                "employeeId": timesheet.employee_id,
                "periodStart": timesheet.period_start,
                "periodEnd": timesheet.period_end,
                "totalHours": timesheet.hours,
                "isBillable": timesheet.billable,
            })),
            other => Err(unsupported(self.module(), other.kind())),
        }
    }

    fn load(&self, entity: EntityKind, document: Value) -> Result<(), AdapterError> {
        self.connector.deliver(self.module(), entity, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::RecordingConnector;
    use coreflow_core::EntityId;

    #[test]
    fn employee_round_trips_through_the_people_dialect() {
        let adapter = HrAdapter::new(RecordingConnector::arc());
        let payload = EntityPayload::Employee(EmployeeRecord {
            id: EntityId::new(),
            name: "Dana Feld".into(),
            email: "dana.feld@corp.example".into(),
            department: "Operations".into(),
            title: "Shift Lead".into(),
        });

        let document = adapter.transform(&payload).unwrap();
        assert_eq!(document["employeeName"], "Dana Feld");

        let back = adapter.extract(EntityKind::Employee, &document).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn products_are_not_people_material() {
        let adapter = HrAdapter::new(RecordingConnector::arc());
        let err = adapter
            .extract(EntityKind::Product, &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Unsupported { .. }));
    }
}
