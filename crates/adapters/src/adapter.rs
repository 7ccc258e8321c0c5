//! The extract/transform/load seam every module adapter implements.

use serde_json::Value;
use thiserror::Error;

use coreflow_core::{EntityKind, ModuleKind};

use crate::payload::EntityPayload;

#[derive(Debug, Error, PartialEq)]
pub enum AdapterError {
    #[error("{module} does not handle {entity} entities")]
    Unsupported { module: ModuleKind, entity: EntityKind },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("connector error: {0}")]
    Connector(String),
}

/// Translates canonical payloads to and from one module's document dialect.
///
/// `extract` parses a module-native document into the canonical form;
/// `transform` renders the canonical form into the module's dialect; `load`
/// hands a rendered document to the module. Each adapter supports a fixed
/// subset of entity kinds and answers [`AdapterError::Unsupported`] for the
/// rest.
pub trait ModuleAdapter: Send + Sync {
    fn module(&self) -> ModuleKind;

    fn extract(&self, entity: EntityKind, document: &Value) -> Result<EntityPayload, AdapterError>;

    fn transform(&self, payload: &EntityPayload) -> Result<Value, AdapterError>;

    fn load(&self, entity: EntityKind, document: Value) -> Result<(), AdapterError>;

    /// Transform then load, the path sync fan-out takes.
    fn sync(&self, payload: &EntityPayload) -> Result<(), AdapterError> {
        let document = self.transform(payload)?;
        self.load(payload.kind(), document)
    }
}

pub(crate) fn unsupported(module: ModuleKind, entity: EntityKind) -> AdapterError {
    AdapterError::Unsupported { module, entity }
}

// Field accessors shared by the adapters' extract paths. Every missing or
// mistyped field reports the offending key.

pub(crate) fn str_field(document: &Value, key: &str) -> Result<String, AdapterError> {
    document
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AdapterError::InvalidPayload(format!("missing string field `{key}`")))
}

pub(crate) fn opt_str_field(document: &Value, key: &str) -> Option<String> {
    document.get(key).and_then(Value::as_str).map(str::to_owned)
}

pub(crate) fn i64_field(document: &Value, key: &str) -> Result<i64, AdapterError> {
    document
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| AdapterError::InvalidPayload(format!("missing integer field `{key}`")))
}

pub(crate) fn f64_field(document: &Value, key: &str) -> Result<f64, AdapterError> {
    document
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| AdapterError::InvalidPayload(format!("missing numeric field `{key}`")))
}

pub(crate) fn bool_field(document: &Value, key: &str) -> Result<bool, AdapterError> {
    document
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| AdapterError::InvalidPayload(format!("missing boolean field `{key}`")))
}

pub(crate) fn date_field(document: &Value, key: &str) -> Result<chrono::NaiveDate, AdapterError> {
    str_field(document, key)?
        .parse()
        .map_err(|_| AdapterError::InvalidPayload(format!("field `{key}` is not an ISO date")))
}

pub(crate) fn id_field(document: &Value, key: &str) -> Result<coreflow_core::EntityId, AdapterError> {
    str_field(document, key)?
        .parse()
        .map_err(|_| AdapterError::InvalidPayload(format!("field `{key}` is not a valid id")))
}

/// Minor units to a major-unit float, for dialects that want decimal money.
pub(crate) fn cents_to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Major-unit float back to minor units, rounding half away from zero.
pub(crate) fn major_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
