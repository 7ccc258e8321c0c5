//! Accounting adapter. The ledger side expects doctype-tagged documents in
//! snake_case with decimal money, close to what an ERPNext backend ingests.

use std::sync::Arc;

use serde_json::{Value, json};

use coreflow_core::{EntityKind, ModuleKind};

use crate::adapter::{
    AdapterError, ModuleAdapter, bool_field, cents_to_major, date_field, f64_field, i64_field,
    id_field, major_to_cents, opt_str_field, str_field, unsupported,
};
use crate::connector::ModuleConnector;
use crate::payload::{
    CustomerRecord, EntityPayload, InvoiceRecord, MovementRecord, OrderRecord, ProductRecord,
    TimesheetRecord,
};

pub struct AccountingAdapter {
    connector: Arc<dyn ModuleConnector>,
}

impl AccountingAdapter {
    pub fn new(connector: Arc<dyn ModuleConnector>) -> Self {
        Self { connector }
    }
}

impl ModuleAdapter for AccountingAdapter {
    fn module(&self) -> ModuleKind {
        ModuleKind::Accounting
    }

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError> {
        match entity {
            EntityKind::Customer => Ok(EntityPayload::Customer(CustomerRecord {
                id: id_field(document, "id")?,
                name: str_field(document, "customer_name")?,
                email: opt_str_field(document, "email_id"),
                phone: opt_str_field(document, "mobile_no"),
                billing_address: opt_str_field(document, "primary_address"),
            })),
            EntityKind::Product => Ok(EntityPayload::Product(ProductRecord {
                id: id_field(document, "id")?,
                sku: str_field(document, "item_code")?,
                name: str_field(document, "item_name")?,
                description: opt_str_field(document, "description"),
                unit_price: major_to_cents(f64_field(document, "standard_rate")?),
                stock_on_hand: i64_field(document, "actual_qty").unwrap_or(0),
            })),
            EntityKind::Invoice => Ok(EntityPayload::Invoice(InvoiceRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "invoice_no")?,
                customer_id: id_field(document, "customer")?,
                total: major_to_cents(f64_field(document, "grand_total")?),
                currency: str_field(document, "currency")?,
                due_date: opt_str_field(document, "due_date")
                    .map(|raw| {
                        raw.parse().map_err(|_| {
                            AdapterError::InvalidPayload(
                                "field `due_date` is not an ISO date".into(),
                            )
                        })
                    })
                    .transpose()?,
                paid: str_field(document, "status")? == "Paid",
            })),
            EntityKind::Order => Ok(EntityPayload::Order(OrderRecord {
                id: id_field(document, "id")?,
                number: str_field(document, "order_no")?,
                customer_id: id_field(document, "customer")?,
                total: major_to_cents(f64_field(document, "grand_total")?),
                placed_on: date_field(document, "transaction_date")?,
            })),
            EntityKind::Timesheet => Ok(EntityPayload::Timesheet(TimesheetRecord {
                id: id_field(document, "id")?,
                employee_id: id_field(document, "employee")?,
                period_start: date_field(document, "start_date")?,
                period_end: date_field(document, "end_date")?,
                hours: f64_field(document, "total_hours")?,
                billable: bool_field(document, "billable")?,
            })),
            EntityKind::StockMovement => Ok(EntityPayload::StockMovement(MovementRecord {
                id: id_field(document, "id")?,
                product_id: id_field(document, "item")?,
                quantity_delta: i64_field(document, "qty_change")?,
                reference: opt_str_field(document, "voucher_no"),
            })),
            other => Err(unsupported(self.module(), other)),
        }
    }

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError> {
        match payload {
            EntityPayload::Customer(customer) => Ok(json!({
                "doctype": "Customer",
                "id": customer.id,
                "customer_name": customer.name,
                "email_id": customer.email,
                "mobile_no": customer.phone,
                "primary_address": customer.billing_address,
            })),
            EntityPayload::Product(product) => Ok(json!({
                "doctype": "Item",
                "id": product.id,
                "item_code": product.sku,
                "item_name": product.name,
                "description": product.description,
                "standard_rate": cents_to_major(product.unit_price),
                "actual_qty": product.stock_on_hand,
            })),
            EntityPayload::Invoice(invoice) => Ok(json!({
                "doctype": "Sales Invoice",
                "id": invoice.id,
                "invoice_no": invoice.number,
                "customer": invoice.customer_id,
                "grand_total": cents_to_major(invoice.total),
                "currency": invoice.currency,
                "due_date": invoice.due_date,
                "status": if invoice.paid { "Paid" } else { "Unpaid" },
            })),
            EntityPayload::Order(order) => Ok(json!({
                "doctype": "Sales Order",
                "id": order.id,
                "order_no": order.number,
                "customer": order.customer_id,
                "grand_total": cents_to_major(order.total),
                "transaction_date": order.placed_on,
            })),
            EntityPayload::Timesheet(timesheet) => Ok(json!({
                "doctype": "Timesheet",
                "id": timesheet.id,
                "employee": timesheet.employee_id,
                "start_date": timesheet.period_start,
                "end_date": timesheet.period_end,
                "total_hours": timesheet.hours,
                "billable": timesheet.billable,
            })),
            EntityPayload::StockMovement(movement) => Ok(json!({
                "doctype": "Stock Ledger Entry",
                "id": movement.id,
                "item": movement.product_id,
                "qty_change": movement.quantity_delta,
                "voucher_no": movement.reference,
            })),
            other => Err(unsupported(self.module(), other.kind())),
        }
    }

    fn load(&self, entity: EntityKind, document: Value) -> Result<(), AdapterError> {
        self.connector.deliver(self.module(), entity, document)
    }
}
