//! Legal industry plugin: case and document tracking plus the AI-backed
//! practice operations.

pub mod case;
pub mod document;
pub mod plugin;

pub use case::{AddDeadline, CaseDeadline, CaseStatus, CreateCase, LegalCase};
pub use document::{CreateDocument, DocumentKind, LegalDocument};
pub use plugin::{
    CaseStrategy, DeadlineAssessment, DocumentAnalysis, LegalError, LegalPlugin,
};
