//! Timesheets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub employee_id: EntityId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub hours: f64,
    pub billable: bool,
    pub status: TimesheetStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimesheet {
    pub employee_id: EntityId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to zero hours.
    #[serde(default)]
    pub hours: Option<f64>,
    /// Defaults to non-billable.
    #[serde(default)]
    pub billable: Option<bool>,
}

impl Timesheet {
    pub fn create(tenant_id: TenantId, input: CreateTimesheet) -> DomainResult<Self> {
        if input.period_end < input.period_start {
            return Err(DomainError::validation("timesheet period must not end before it starts"));
        }
        let hours = input.hours.unwrap_or(0.0);
        if !hours.is_finite() || hours < 0.0 {
            return Err(DomainError::validation("timesheet hours must be a non-negative number"));
        }

        Ok(Self {
            id: EntityId::new(),
            tenant_id,
            employee_id: input.employee_id,
            period_start: input.period_start,
            period_end: input.period_end,
            hours,
            billable: input.billable.unwrap_or(false),
            status: TimesheetStatus::Draft,
        })
    }

    pub fn submit(&mut self) -> DomainResult<()> {
        if self.status != TimesheetStatus::Draft {
            return Err(DomainError::invariant("only draft timesheets can be submitted"));
        }
        self.status = TimesheetStatus::Submitted;
        Ok(())
    }

    pub fn approve(&mut self) -> DomainResult<()> {
        if self.status != TimesheetStatus::Submitted {
            return Err(DomainError::invariant("only submitted timesheets can be approved"));
        }
        self.status = TimesheetStatus::Approved;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> CreateTimesheet {
        CreateTimesheet {
            employee_id: EntityId::new(),
            period_start: "2026-08-03".parse().unwrap(),
            period_end: "2026-08-09".parse().unwrap(),
            hours: None,
            billable: None,
        }
    }

    #[test]
    fn minimal_input_yields_documented_defaults() {
        let sheet = Timesheet::create(TenantId::new(), minimal()).unwrap();
        assert_eq!(sheet.hours, 0.0);
        assert!(!sheet.billable);
        assert_eq!(sheet.status, TimesheetStatus::Draft);
    }

    #[test]
    fn inverted_period_is_rejected() {
        let err = Timesheet::create(
            TenantId::new(),
            CreateTimesheet {
                period_start: "2026-08-09".parse().unwrap(),
                period_end: "2026-08-03".parse().unwrap(),
                ..minimal()
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approval_requires_prior_submission() {
        let mut sheet = Timesheet::create(TenantId::new(), minimal()).unwrap();

        assert!(sheet.approve().is_err());
        sheet.submit().unwrap();
        assert!(sheet.submit().is_err());
        sheet.approve().unwrap();
        assert_eq!(sheet.status, TimesheetStatus::Approved);
    }
}
