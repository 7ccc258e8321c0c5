//! CRM adapter. The CRM side speaks camelCase contact/deal documents and
//! wants money in major units.

use std::sync::Arc;

use serde_json::{Value, json};

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::{
    AdapterError, ModuleAdapter, cents_to_major, id_field, major_to_cents, opt_str_field,
    str_field, unsupported,
};
use crate::adapter::{bool_field, date_field, f64_field};
use crate::connector::ModuleConnector;
use crate::payload::{CustomerRecord, EntityPayload, InvoiceRecord, OrderRecord, ProductRecord};

pub struct CrmAdapter {
    connector: Arc<dyn ModuleConnector>,
}

impl CrmAdapter {
    pub fn new(connector: Arc<dyn ModuleConnector>) -> Self {
        Self { connector }
    }
}

impl ModuleAdapter for CrmAdapter {
    fn module(&self) -> ModuleKind {
        ModuleKind::Crm
    }

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError> {
        match entity {
            EntityKind::Customer => Ok(EntityPayload::Customer(CustomerRecord {
                id: id_field(document, "id")?,
                name: str_field(document, "displayName")?,
                email: opt_str_field(document, "primaryEmail"),
                phone: opt_str_field(document, "phoneNumber"),
                billing_address: opt_str_field(document, "billingAddress"),
            })),
            EntityKind::Product => Ok(EntityPayload::Product(ProductRecord {
                id: id_field(document, "id")?,
                sku: str_field(document, "sku")?,
                name: str_field(document, "displayName")?,
                description: opt_str_field(document, "description"),
                unit_price: major_to_cents(f64_field(document, "listPrice")?),
                stock_on_hand: 0,
            })),
            EntityKind::Invoice => Ok(EntityPayload::Invoice(InvoiceRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "invoiceNumber")?,
                customer_id: id_field(document, "contactId")?,
                total: major_to_cents(f64_field(document, "amount")?),
                currency: str_field(document, "currency")?,
                due_date: opt_str_field(document, "dueDate")
                    .map(|raw| {
                        raw.parse().map_err(|_| {
                            AdapterError::InvalidPayload("field `dueDate` is not an ISO date".into())
                        })
                    })
                    .transpose()?,
                paid: bool_field(document, "isPaid")?,
            })),
            EntityKind::Order => Ok(EntityPayload::Order(OrderRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "orderNumber")?,
                customer_id: id_field(document, "contactId")?,
                total: major_to_cents(f64_field(document, "amount")?),
                placed_on: date_field(document, "placedOn")?,
            })),
            other => Err(unsupported(self.module(), other)),
        }
    }

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError> {
        match payload {
            EntityPayload::Customer(customer) => Ok(json!({
                "recordType": "contact",
                "id": customer.id,
                "displayName": customer.name,
                "primaryEmail": customer.email,
                "phoneNumber": customer.phone,
                "billingAddress": customer.billing_address,
            })),
            EntityPayload::Product(product) => Ok(json!({
                "recordType": "product",
                "id": product.id,
                "sku": product.sku,
                "displayName": product.name,
                "description": product.description,
                "listPrice": cents_to_major(product.unit_price),
            })),
            EntityPayload::Invoice(invoice) => Ok(json!({
                "recordType": "invoice",
                "id": invoice.id,
                "invoiceNumber": invoice.number,
                "contactId": invoice.customer_id,
                "amount": cents_to_major(invoice.total),
                "currency": invoice.currency,
                "dueDate": invoice.due_date,
                "isPaid": invoice.paid,
            })),
            EntityPayload::Order(order) => Ok(json!({
                "recordType": "deal",
                "id": order.id,
                "orderNumber": order.number,
                "contactId": order.customer_id,
                "amount": cents_to_major(order.total),
                "placedOn": order.placed_on,
            })),
            other => Err(unsupported(self.module(), other.kind())),
        }
    }

    fn load(&self, entity: EntityKind, document: Value) -> Result<(), AdapterError> {
        self.connector.deliver(self.module(), entity, document)
    }
}
