//! Project-management adapter. The PM side models everything as workspace
//! items: clients, members, work logs, matters and files.

use std::sync::Arc;

use serde_json::{Value, json};

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::{
    AdapterError, ModuleAdapter, bool_field, date_field, f64_field, id_field, opt_str_field,
    str_field, unsupported,
};
use crate::connector::ModuleConnector;
use crate::payload::{
    CaseRecord, CustomerRecord, DocumentRecord, EmployeeRecord, EntityPayload, TimesheetRecord,
};

pub struct ProjectManagementAdapter {
    connector: Arc<dyn ModuleConnector>,
}

impl ProjectManagementAdapter {
    pub fn new(connector: Arc<dyn ModuleConnector>) -> Self {
        Self { connector }
    }
}

impl ModuleAdapter for ProjectManagementAdapter {
    fn module(&self) -> ModuleKind {
        ModuleKind::ProjectManagement
    }

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError> {
        match entity {
            EntityKind::Customer => Ok(EntityPayload::Customer(CustomerRecord {
                id: id_field(document, "id")?,
                name: str_field(document, "clientName")?,
                email: opt_str_field(document, "contactEmail"),
                phone: opt_str_field(document, "contactPhone"),
                billing_address: opt_str_field(document, "billingAddress"),
            })),
            EntityKind::Employee => Ok(EntityPayload::Employee(EmployeeRecord {
                id: id_field(document, "id")?,
                name: str_field(document, "memberName")?,
                email: str_field(document, "memberEmail")?,
                department: str_field(document, "team")?,
                title: str_field(document, "role")?,
            })),
            EntityKind::Timesheet => Ok(EntityPayload::Timesheet(TimesheetRecord {
                id: id_field(document, "id")?,
                employee_id: id_field(document, "memberId")?,
                period_start: date_field(document, "weekStart")?,
                period_end: date_field(document, "weekEnd")?,
                hours: f64_field(document, "loggedHours")?,
                billable: bool_field(document, "billable")?,
            })),
            EntityKind::Case => Ok(EntityPayload::Case(CaseRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "matterNumber")?,
                title: str_field(document, "title")?,
                status: str_field(document, "stage")?,
                opened_on: date_field(document, "openedOn")?,
            })),
            EntityKind::Document => Ok(EntityPayload::Document(DocumentRecord {
                id: id_field(document, "id")?,
                case_id: opt_str_field(document, "matterId")
                    .map(|raw| {
                        raw.parse().map_err(|_| {
                            AdapterError::InvalidPayload(
                                "field `matterId` is not a valid id".into(),
                            )
                        })
                    })
                    .transpose()?,
                title: str_field(document, "fileName")?,
                kind: str_field(document, "category")?,
                uploaded_on: date_field(document, "uploadedOn")?,
            })),
            other => Err(unsupported(self.module(), other)),
        }
    }

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError> {
        match payload {
            EntityPayload::Customer(customer) => Ok(json!({
                "itemType": "client",
                "id": customer.id,
                "clientName": customer.name,
                "contactEmail": customer.email,
                "contactPhone": customer.phone,
                "billingAddress": customer.billing_address,
            })),
            EntityPayload::Employee(employee) => Ok(json!({
                "itemType": "member",
                "id": employee.id,
                "memberName": employee.name,
                "memberEmail": employee.email,
                "team": employee.department,
                "role": employee.title,
            })),
            EntityPayload::Timesheet(timesheet) => Ok(json!({
                "itemType": "worklog",
                "id": timesheet.id,
                "memberId": timesheet.employee_id,
                "weekStart": timesheet.period_start,
                "weekEnd": timesheet.period_end,
                "loggedHours": timesheet.hours,
                "billable": timesheet.billable,
            })),
            EntityPayload::Case(case) => Ok(json!({
                "itemType": "matter",
                "id": case.id,
                "matterNumber": case.number,
                "title": case.title,
                "stage": case.status,
                "openedOn": case.opened_on,
            })),
            EntityPayload::Document(doc) => Ok(json!({
                "itemType": "file",
                "id": doc.id,
                "matterId": doc.case_id,
                "fileName": doc.title,
                "category": doc.kind,
                "uploadedOn": doc.uploaded_on,
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
    fn case_round_trips_as_a_matter() {
        let adapter = ProjectManagementAdapter::new(RecordingConnector::arc());
        let payload = EntityPayload::Case(CaseRecord {
            id: EntityId::new(),
            number: "M-2026-014".into(),
            title: "Supplier contract dispute".into(),
            status: "discovery".into(),
            opened_on: "2026-03-12".parse().unwrap(),
        });

        let document = adapter.transform(&payload).unwrap();
        assert_eq!(document["itemType"], "matter");

        let back = adapter.extract(EntityKind::Case, &document).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn document_without_a_matter_keeps_a_null_link() {
        let adapter = ProjectManagementAdapter::new(RecordingConnector::arc());
        let payload = EntityPayload::Document(DocumentRecord {
            id: EntityId::new(),
            case_id: None,
            title: "nda-draft.pdf".into(),
            kind: "contract".into(),
            uploaded_on: "2026-07-01".parse().unwrap(),
        });

        let document = adapter.transform(&payload).unwrap();
        assert_eq!(document["matterId"], Value::Null);

        let back = adapter.extract(EntityKind::Document, &document).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn stock_movements_are_not_workspace_material() {
        let adapter = ProjectManagementAdapter::new(RecordingConnector::arc());
        let err = adapter
            .extract(EntityKind::StockMovement, &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Unsupported { .. }));
    }
}
