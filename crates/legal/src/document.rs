//! Legal documents.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Contract,
    Brief,
    Evidence,
    Correspondence,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Brief => "brief",
            Self::Evidence => "evidence",
            Self::Correspondence => "correspondence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDocument {
    pub id: EntityId,
    pub tenant_id: TenantId,
    /// The case this document belongs to, if any.
    pub case_id: Option<EntityId>,
    pub title: String,
    pub kind: DocumentKind,
    pub filed_on: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    #[serde(default)]
    pub case_id: Option<EntityId>,
    pub title: String,
    pub kind: DocumentKind,
    /// Defaults to today.
    #[serde(default)]
    pub filed_on: Option<NaiveDate>,
}

impl LegalDocument {
    pub fn create(tenant_id: TenantId, input: CreateDocument) -> DomainResult<Self> {
        if input.title.trim().is_empty() {
            return Err(DomainError::validation("document title must not be empty"));
        }

        Ok(Self {
            id: EntityId::new(),
            tenant_id,
            case_id: input.case_id,
            title: input.title,
            kind: input.kind,
            filed_on: input.filed_on.unwrap_or_else(|| Utc::now().date_naive()),
        })
    }
}
