//! The legal plugin: case and document state plus the AI-backed practice
//! operations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use coreflow_adapters::EntityPayload;
use coreflow_core::{DomainError, DomainResult, EntityId, ModuleKind, PluginId, TenantId};
use coreflow_events::EventKind;
use coreflow_orchestrator::{
    ApiEndpoint, HttpMethod, Plugin, PluginCapabilities, PluginConfig, PluginDescriptor,
    RetryPolicy, WebhookSubscription,
};
use coreflow_tasks::{
    InsightSink, TaskContext, TaskKind, TaskOrchestrator, TaskRequest, run_to_insight,
};

use crate::case::{AddDeadline, CaseDeadline, CaseStatus, CreateCase, LegalCase};
use crate::document::{CreateDocument, LegalDocument};

#[derive(Debug, Error)]
pub enum LegalError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("document analysis failed")]
    DocumentAnalysis,
    #[error("case strategy generation failed")]
    CaseStrategy,
    #[error("deadline analysis failed")]
    DeadlineAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    pub document_id: EntityId,
    /// How much this document matters to its case, 0 to 1.
    pub relevance_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseStrategy {
    pub case_id: EntityId,
    /// Estimated viability of the recommended strategy, 0 to 1.
    pub viability_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadlineAssessment {
    pub case_id: EntityId,
    pub deadlines_reviewed: usize,
    /// Critical deadlines still ahead at assessment time.
    pub critical_pending: usize,
    pub urgency_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Legal industry plugin.
pub struct LegalPlugin {
    tenant_id: TenantId,
    tasks: Arc<dyn TaskOrchestrator>,
    insights: Arc<dyn InsightSink>,
    cases: RwLock<HashMap<EntityId, LegalCase>>,
    documents: RwLock<HashMap<EntityId, LegalDocument>>,
}

impl LegalPlugin {
    pub fn new(
        tenant_id: TenantId,
        tasks: Arc<dyn TaskOrchestrator>,
        insights: Arc<dyn InsightSink>,
    ) -> Self {
        Self {
            tenant_id,
            tasks,
            insights,
            cases: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn create_case(&self, input: CreateCase) -> Result<LegalCase, LegalError> {
        let mut cases = self.cases.write().unwrap();
        if cases.values().any(|case| case.number == input.number) {
            return Err(
                DomainError::conflict(format!("case number `{}` already exists", input.number))
                    .into(),
            );
        }
        let case = LegalCase::create(self.tenant_id, input)?;
        cases.insert(case.id, case.clone());
        Ok(case)
    }

    pub fn case(&self, id: EntityId) -> Result<LegalCase, LegalError> {
        self.cases
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("case {id}")).into())
    }

    /// All cases, newest first.
    pub fn list_cases(&self) -> Vec<LegalCase> {
        let mut cases: Vec<LegalCase> = self.cases.read().unwrap().values().cloned().collect();
        cases.sort_by(|a, b| b.opened_on.cmp(&a.opened_on).then_with(|| a.number.cmp(&b.number)));
        cases
    }

    pub fn case_count(&self) -> usize {
        self.cases.read().unwrap().len()
    }

    pub fn add_deadline(
        &self,
        case_id: EntityId,
        input: AddDeadline,
    ) -> Result<CaseDeadline, LegalError> {
        let mut cases = self.cases.write().unwrap();
        let case = cases
            .get_mut(&case_id)
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        Ok(case.add_deadline(input)?)
    }

    pub fn create_document(&self, input: CreateDocument) -> Result<LegalDocument, LegalError> {
        if let Some(case_id) = input.case_id {
            if !self.cases.read().unwrap().contains_key(&case_id) {
                return Err(DomainError::not_found(format!("case {case_id}")).into());
            }
        }
        let document = LegalDocument::create(self.tenant_id, input)?;
        self.documents.write().unwrap().insert(document.id, document.clone());
        Ok(document)
    }

    pub fn document(&self, id: EntityId) -> Result<LegalDocument, LegalError> {
        self.documents
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("document {id}")).into())
    }

    pub fn document_count(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Analyze one document for relevance and risk.
    pub fn analyze_document(&self, document_id: EntityId) -> Result<DocumentAnalysis, LegalError> {
        let document = self.document(document_id)?;

        let payload = json!({
            "document_id": document.id,
            "title": document.title,
            "kind": document.kind,
            "case_id": document.case_id,
        });
        let context = TaskContext {
            entity_kind: Some(coreflow_core::EntityKind::Document),
            entity_id: Some(document.id),
            business_rules: Vec::new(),
            industry_context: Some("legal".into()),
        };
        let task = TaskRequest::new(self.tenant_id, TaskKind::DocumentAnalysis, payload)
            .with_context(context);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "document analysis task failed");
            LegalError::DocumentAnalysis
        })?;
        self.insights.record(self.tenant_id, TaskKind::DocumentAnalysis, insight.clone());

        Ok(DocumentAnalysis {
            document_id,
            relevance_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    /// Draft a strategy for one case.
    pub fn generate_case_strategy(&self, case_id: EntityId) -> Result<CaseStrategy, LegalError> {
        let case = self.case(case_id)?;
        let attached = self.documents_for(case_id);

        let payload = json!({
            "case_id": case.id,
            "number": case.number,
            "status": case.status,
            "opposing_party": case.opposing_party,
            "documents": attached.iter().map(|doc| json!({
                "id": doc.id,
                "kind": doc.kind,
            })).collect::<Vec<_>>(),
        });
        let context = TaskContext {
            entity_kind: Some(coreflow_core::EntityKind::Case),
            entity_id: Some(case.id),
            business_rules: Vec::new(),
            industry_context: Some("legal".into()),
        };
        let task = TaskRequest::new(self.tenant_id, TaskKind::CaseStrategy, payload)
            .with_context(context);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "case strategy task failed");
            LegalError::CaseStrategy
        })?;
        self.insights.record(self.tenant_id, TaskKind::CaseStrategy, insight.clone());

        Ok(CaseStrategy {
            case_id,
            viability_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    /// Review one case's deadline pressure.
    pub fn analyze_deadlines(&self, case_id: EntityId) -> Result<DeadlineAssessment, LegalError> {
        let case = self.case(case_id)?;
        let now = Utc::now();
        let critical_pending = case.critical_pending(now);

        let payload = json!({
            "case_id": case.id,
            "deadlines": case.deadlines.iter().map(|deadline| json!({
                "due_at": deadline.due_at,
                "critical": deadline.critical,
            })).collect::<Vec<_>>(),
        });
        let task = TaskRequest::new(self.tenant_id, TaskKind::DeadlineAnalysis, payload);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "deadline analysis task failed");
            LegalError::DeadlineAnalysis
        })?;
        self.insights.record(self.tenant_id, TaskKind::DeadlineAnalysis, insight.clone());

        Ok(DeadlineAssessment {
            case_id,
            deadlines_reviewed: case.deadlines.len(),
            critical_pending,
            urgency_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: now,
        })
    }

    fn documents_for(&self, case_id: EntityId) -> Vec<LegalDocument> {
        self.documents
            .read()
            .unwrap()
            .values()
            .filter(|doc| doc.case_id == Some(case_id))
            .cloned()
            .collect()
    }
}

impl Plugin for LegalPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: PluginId::new("legal"),
            name: "Legal Practice".into(),
            module: ModuleKind::Legal,
            version: "1.0.0".into(),
            config: PluginConfig {
                enabled: true,
                priority: 40,
                dependencies: Vec::new(),
                permissions: vec!["legal.read".into(), "legal.write".into()],
                endpoints: vec![ApiEndpoint {
                    path: "/legal/cases".into(),
                    method: HttpMethod::Post,
                    handler: "create_case".into(),
                    auth_required: true,
                    rate_limit: None,
                }],
                webhooks: vec![WebhookSubscription {
                    event: EventKind::EntityChanged,
                    internal: true,
                    retry: RetryPolicy::exponential(3, Duration::from_secs(1)),
                }],
            },
            capabilities: PluginCapabilities {
                ai_enabled: true,
                real_time_sync: false,
                cross_module: true,
                industry_specific: true,
                custom_fields: true,
            },
        }
    }

    fn validate_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Case(case) => {
                if case.number.trim().is_empty() {
                    return Err(DomainError::validation("case number must not be empty"));
                }
                if case.title.trim().is_empty() {
                    return Err(DomainError::validation("case title must not be empty"));
                }
                Ok(())
            }
            EntityPayload::Document(doc) => {
                if doc.title.trim().is_empty() {
                    return Err(DomainError::validation("document title must not be empty"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn sync_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Case(record) => {
                let mut cases = self.cases.write().unwrap();
                match cases.get_mut(&record.id) {
                    Some(case) => {
                        case.number = record.number.clone();
                        case.title = record.title.clone();
                        if let Some(status) = CaseStatus::from_label(&record.status) {
                            case.status = status;
                        }
                        case.opened_on = record.opened_on;
                    }
                    None => {
                        cases.insert(
                            record.id,
                            LegalCase {
                                id: record.id,
                                tenant_id: self.tenant_id,
                                number: record.number.clone(),
                                title: record.title.clone(),
                                status: CaseStatus::from_label(&record.status)
                                    .unwrap_or_default(),
                                opened_on: record.opened_on,
                                court: None,
                                opposing_party: None,
                                deadlines: Vec::new(),
                            },
                        );
                    }
                }
                Ok(())
            }
            EntityPayload::Document(record) => {
                let kind = match record.kind.as_str() {
                    "contract" => crate::document::DocumentKind::Contract,
                    "brief" => crate::document::DocumentKind::Brief,
                    "evidence" => crate::document::DocumentKind::Evidence,
                    _ => crate::document::DocumentKind::Correspondence,
                };
                let mut documents = self.documents.write().unwrap();
                documents.insert(
                    record.id,
                    LegalDocument {
                        id: record.id,
                        tenant_id: self.tenant_id,
                        case_id: record.case_id,
                        title: record.title.clone(),
                        kind,
                        filed_on: record.uploaded_on,
                    },
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use chrono::Duration as ChronoDuration;
    use coreflow_adapters::CaseRecord;
    use coreflow_tasks::{InMemoryInsightSink, InProcessTaskOrchestrator, TaskInsight};
    use std::thread;

    fn plugin_with_engine(
        count: usize,
        respond: impl Fn(TaskKind) -> Result<TaskInsight, String> + Send + 'static,
    ) -> (LegalPlugin, Arc<InMemoryInsightSink>, thread::JoinHandle<()>) {
        let tasks = InProcessTaskOrchestrator::arc();
        let insights = Arc::new(InMemoryInsightSink::new());
        let plugin = LegalPlugin::new(TenantId::new(), tasks.clone(), insights.clone());

        let submissions = tasks.watch_submissions();
        let engine = thread::spawn(move || {
            for _ in 0..count {
                let task = match submissions.recv() {
                    Ok(task) => task,
                    Err(_) => return,
                };
                match respond(task.kind.clone()) {
                    Ok(insight) => tasks.complete(task.id, insight).unwrap(),
                    Err(error) => tasks.fail(task.id, error).unwrap(),
                }
            }
        });

        (plugin, insights, engine)
    }

    fn open_case(plugin: &LegalPlugin, number: &str) -> LegalCase {
        plugin
            .create_case(CreateCase {
                number: number.into(),
                title: format!("Case {number}"),
                opened_on: None,
                court: None,
                opposing_party: Some("Meridian Corp".into()),
            })
            .unwrap()
    }

    #[test]
    fn duplicate_case_number_is_rejected() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        open_case(&plugin, "2026-CV-001");

        let err = plugin
            .create_case(CreateCase {
                number: "2026-CV-001".into(),
                title: "Another".into(),
                opened_on: None,
                court: None,
                opposing_party: None,
            })
            .unwrap_err();
        assert!(matches!(err, LegalError::Domain(DomainError::Conflict(_))));
        engine.join().unwrap();
    }

    #[test]
    fn documents_must_reference_known_cases() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));

        let err = plugin
            .create_document(CreateDocument {
                case_id: Some(EntityId::new()),
                title: "Orphan brief".into(),
                kind: DocumentKind::Brief,
                filed_on: None,
            })
            .unwrap_err();
        assert!(matches!(err, LegalError::Domain(DomainError::NotFound(_))));
        engine.join().unwrap();
    }

    #[test]
    fn document_analysis_records_insight_and_returns_summary() {
        let (plugin, insights, engine) = plugin_with_engine(1, |kind| {
            assert_eq!(kind, TaskKind::DocumentAnalysis);
            Ok(TaskInsight::new(0.81, 0.93).with_explanation("central to claim"))
        });
        let case = open_case(&plugin, "2026-CV-001");
        let doc = plugin
            .create_document(CreateDocument {
                case_id: Some(case.id),
                title: "Supply agreement".into(),
                kind: DocumentKind::Contract,
                filed_on: None,
            })
            .unwrap();

        let analysis = plugin.analyze_document(doc.id).unwrap();
        engine.join().unwrap();

        assert_eq!(analysis.document_id, doc.id);
        assert_eq!(analysis.relevance_score, 0.81);
        assert_eq!(insights.all().len(), 1);
        assert_eq!(insights.all()[0].kind, TaskKind::DocumentAnalysis);
    }

    #[test]
    fn analyzing_a_missing_document_is_not_found() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let err = plugin.analyze_document(EntityId::new()).unwrap_err();
        assert!(matches!(err, LegalError::Domain(DomainError::NotFound(_))));
        engine.join().unwrap();
    }

    #[test]
    fn failed_strategy_reports_the_fixed_domain_message() {
        let (plugin, _, engine) = plugin_with_engine(1, |_| Err("engine offline".into()));
        let case = open_case(&plugin, "2026-CV-001");

        let err = plugin.generate_case_strategy(case.id).unwrap_err();
        engine.join().unwrap();

        assert!(matches!(err, LegalError::CaseStrategy));
        assert_eq!(err.to_string(), "case strategy generation failed");
    }

    #[test]
    fn deadline_assessment_counts_pending_critical_deadlines_locally() {
        let (plugin, _, engine) = plugin_with_engine(1, |kind| {
            assert_eq!(kind, TaskKind::DeadlineAnalysis);
            Ok(TaskInsight::new(0.55, 0.9))
        });
        let case = open_case(&plugin, "2026-CV-001");
        let now = Utc::now();
        for (offset, critical) in [(3, true), (6, false), (-2, true)] {
            plugin
                .add_deadline(
                    case.id,
                    AddDeadline {
                        due_at: now + ChronoDuration::days(offset),
                        description: "d".into(),
                        critical: Some(critical),
                    },
                )
                .unwrap();
        }

        let assessment = plugin.analyze_deadlines(case.id).unwrap();
        engine.join().unwrap();

        assert_eq!(assessment.deadlines_reviewed, 3);
        assert_eq!(assessment.critical_pending, 1);
        assert_eq!(assessment.urgency_score, 0.55);
    }

    #[test]
    fn sync_upserts_cases_and_maps_known_status_labels() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let record = CaseRecord {
            id: EntityId::new(),
            number: "2026-CV-900".into(),
            title: "Synced matter".into(),
            status: "Trial".into(),
            opened_on: "2026-01-15".parse().unwrap(),
        };

        plugin.sync_data(&EntityPayload::Case(record.clone())).unwrap();
        let case = plugin.case(record.id).unwrap();
        assert_eq!(case.status, CaseStatus::Trial);

        // Unknown foreign label keeps the current status.
        let mut weird = record.clone();
        weird.status = "in-motion".into();
        plugin.sync_data(&EntityPayload::Case(weird)).unwrap();
        assert_eq!(plugin.case(record.id).unwrap().status, CaseStatus::Trial);
        engine.join().unwrap();
    }

    #[test]
    fn descriptor_marks_the_plugin_industry_specific() {
        let (plugin, _, engine) = plugin_with_engine(0, |_| Err("unused".into()));
        let descriptor = plugin.descriptor();

        assert_eq!(descriptor.id.as_str(), "legal");
        assert_eq!(descriptor.module, ModuleKind::Legal);
        assert!(descriptor.capabilities.industry_specific);
        assert_eq!(descriptor.config.priority, 40);
        engine.join().unwrap();
    }
}
