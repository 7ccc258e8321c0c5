//! Legal cases and their deadlines.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Open,
    Discovery,
    Trial,
    Settled,
    Closed,
}

impl CaseStatus {
    /// Parse a foreign status label. Unknown labels yield `None` so callers
    /// can keep whatever they already have.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "discovery" => Some(Self::Discovery),
            "trial" => Some(Self::Trial),
            "settled" => Some(Self::Settled),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn is_concluded(&self) -> bool {
        matches!(self, Self::Settled | Self::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDeadline {
    pub id: EntityId,
    pub due_at: DateTime<Utc>,
    pub description: String,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalCase {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub number: String,
    pub title: String,
    pub status: CaseStatus,
    pub opened_on: NaiveDate,
    pub court: Option<String>,
    pub opposing_party: Option<String>,
    pub deadlines: Vec<CaseDeadline>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCase {
    pub number: String,
    pub title: String,
    /// Defaults to today.
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
    #[serde(default)]
    pub court: Option<String>,
    #[serde(default)]
    pub opposing_party: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddDeadline {
    pub due_at: DateTime<Utc>,
    pub description: String,
    /// Defaults to non-critical.
    #[serde(default)]
    pub critical: Option<bool>,
}

impl LegalCase {
    pub fn create(tenant_id: TenantId, input: CreateCase) -> DomainResult<Self> {
        if input.number.trim().is_empty() {
            return Err(DomainError::validation("case number must not be empty"));
        }
        if input.title.trim().is_empty() {
            return Err(DomainError::validation("case title must not be empty"));
        }

        Ok(Self {
            id: EntityId::new(),
            tenant_id,
            number: input.number,
            title: input.title,
            status: CaseStatus::Open,
            opened_on: input.opened_on.unwrap_or_else(|| Utc::now().date_naive()),
            court: input.court,
            opposing_party: input.opposing_party,
            deadlines: Vec::new(),
        })
    }

    /// Attach a deadline. Concluded cases take no new deadlines.
    pub fn add_deadline(&mut self, input: AddDeadline) -> DomainResult<CaseDeadline> {
        if self.status.is_concluded() {
            return Err(DomainError::invariant(format!(
                "case {} is concluded and takes no new deadlines",
                self.number
            )));
        }
        if input.description.trim().is_empty() {
            return Err(DomainError::validation("deadline description must not be empty"));
        }

        let deadline = CaseDeadline {
            id: EntityId::new(),
            due_at: input.due_at,
            description: input.description,
            critical: input.critical.unwrap_or(false),
        };
        self.deadlines.push(deadline.clone());
        Ok(deadline)
    }

    /// Critical deadlines still ahead of `now`.
    pub fn critical_pending(&self, now: DateTime<Utc>) -> usize {
        self.deadlines
            .iter()
            .filter(|deadline| deadline.critical && deadline.due_at > now)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_case() -> LegalCase {
        LegalCase::create(
            TenantId::new(),
            CreateCase {
                number: "2026-CV-001".into(),
                title: "Contract dispute".into(),
                opened_on: None,
                court: None,
                opposing_party: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn new_cases_open_today_with_no_deadlines() {
        let case = open_case();
        assert_eq!(case.status, CaseStatus::Open);
        assert_eq!(case.opened_on, Utc::now().date_naive());
        assert!(case.deadlines.is_empty());
    }

    #[test]
    fn deadlines_default_to_non_critical() {
        let mut case = open_case();
        let deadline = case
            .add_deadline(AddDeadline {
                due_at: Utc::now() + Duration::days(10),
                description: "File response".into(),
                critical: None,
            })
            .unwrap();
        assert!(!deadline.critical);
    }

    #[test]
    fn concluded_cases_take_no_new_deadlines() {
        let mut case = open_case();
        case.status = CaseStatus::Settled;

        let err = case
            .add_deadline(AddDeadline {
                due_at: Utc::now(),
                description: "x".into(),
                critical: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn critical_pending_ignores_past_and_non_critical_deadlines() {
        let now = Utc::now();
        let mut case = open_case();
        for (offset_days, critical) in [(-3, true), (2, false), (5, true), (9, true)] {
            case.add_deadline(AddDeadline {
                due_at: now + Duration::days(offset_days),
                description: "d".into(),
                critical: Some(critical),
            })
            .unwrap();
        }

        assert_eq!(case.critical_pending(now), 2);
    }

    #[test]
    fn foreign_status_labels_parse_case_insensitively() {
        assert_eq!(CaseStatus::from_label("Discovery"), Some(CaseStatus::Discovery));
        assert_eq!(CaseStatus::from_label("CLOSED"), Some(CaseStatus::Closed));
        assert_eq!(CaseStatus::from_label("in-motion"), None);
    }
}
