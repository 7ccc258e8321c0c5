//! Employee records.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    OnLeave,
    Terminated,
}

/// An employee. `salary` is annual, in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub title: String,
    pub hired_on: NaiveDate,
    pub salary: i64,
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
    pub department: String,
    pub title: String,
    /// Defaults to today.
    #[serde(default)]
    pub hired_on: Option<NaiveDate>,
    /// Defaults to zero, meaning undisclosed.
    #[serde(default)]
    pub salary: Option<i64>,
}

impl Employee {
    pub fn create(tenant_id: TenantId, input: CreateEmployee) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("employee name must not be empty"));
        }
        if !input.email.contains('@') {
            return Err(DomainError::validation("employee email must contain `@`"));
        }
        if input.department.trim().is_empty() {
            return Err(DomainError::validation("employee department must not be empty"));
        }
        if input.salary.is_some_and(|salary| salary < 0) {
            return Err(DomainError::validation("salary must not be negative"));
        }

        Ok(Self {
            id: EntityId::new(),
            tenant_id,
            name: input.name,
            email: input.email,
            department: input.department,
            title: input.title,
            hired_on: input.hired_on.unwrap_or_else(|| Utc::now().date_naive()),
            salary: input.salary.unwrap_or(0),
            status: EmployeeStatus::Active,
        })
    }
}
