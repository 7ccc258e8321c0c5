//! The HR plugin: workforce state plus attrition and talent operations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
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
use coreflow_tasks::{InsightSink, TaskKind, TaskOrchestrator, TaskRequest, run_to_insight};

use crate::employee::{CreateEmployee, Employee, EmployeeStatus};
use crate::timesheet::{CreateTimesheet, Timesheet};

#[derive(Debug, Error)]
pub enum HrError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("attrition risk analysis failed")]
    Attrition,
    #[error("talent optimization failed")]
    Talent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttritionRequest {
    /// Restrict the assessment to these employees; empty means everyone.
    #[serde(default)]
    pub employee_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttritionReport {
    pub employees_assessed: usize,
    /// Aggregate attrition risk, 0 (stable) to 1 (acute).
    pub risk_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TalentRequest {
    /// Restrict the plan to one department; `None` covers the whole company.
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TalentPlan {
    pub department: Option<String>,
    pub employees_considered: usize,
    pub alignment_score: f64,
    pub confidence: f64,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// HR module plugin.
pub struct HrPlugin {
    tenant_id: TenantId,
    tasks: Arc<dyn TaskOrchestrator>,
    insights: Arc<dyn InsightSink>,
    employees: RwLock<HashMap<EntityId, Employee>>,
    timesheets: RwLock<HashMap<EntityId, Timesheet>>,
}

impl HrPlugin {
    pub fn new(
        tenant_id: TenantId,
        tasks: Arc<dyn TaskOrchestrator>,
        insights: Arc<dyn InsightSink>,
    ) -> Self {
        Self {
            tenant_id,
            tasks,
            insights,
            employees: RwLock::new(HashMap::new()),
            timesheets: RwLock::new(HashMap::new()),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn create_employee(&self, input: CreateEmployee) -> Result<Employee, HrError> {
        let mut employees = self.employees.write().unwrap();
        if employees.values().any(|existing| existing.email == input.email) {
            return Err(
                DomainError::conflict(format!("employee email `{}` already exists", input.email))
                    .into(),
            );
        }
        let employee = Employee::create(self.tenant_id, input)?;
        employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    pub fn employee(&self, id: EntityId) -> Result<Employee, HrError> {
        self.employees
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("employee {id}")).into())
    }

    /// All employees, ordered by name.
    pub fn list_employees(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> =
            self.employees.read().unwrap().values().cloned().collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        employees
    }

    pub fn employee_count(&self) -> usize {
        self.employees.read().unwrap().len()
    }

    /// Create a timesheet for a known employee.
    pub fn create_timesheet(&self, input: CreateTimesheet) -> Result<Timesheet, HrError> {
        if !self.employees.read().unwrap().contains_key(&input.employee_id) {
            return Err(DomainError::not_found(format!("employee {}", input.employee_id)).into());
        }
        let sheet = Timesheet::create(self.tenant_id, input)?;
        self.timesheets.write().unwrap().insert(sheet.id, sheet.clone());
        Ok(sheet)
    }

    pub fn timesheet(&self, id: EntityId) -> Result<Timesheet, HrError> {
        self.timesheets
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("timesheet {id}")).into())
    }

    pub fn timesheet_count(&self) -> usize {
        self.timesheets.read().unwrap().len()
    }

    /// Estimate attrition risk across the selected workforce.
    pub fn analyze_attrition_risk(
        &self,
        request: AttritionRequest,
    ) -> Result<AttritionReport, HrError> {
        let selected = self.select_employees(&request.employee_ids);
        if selected.is_empty() {
            return Err(DomainError::validation("no employees to assess").into());
        }

        let payload = json!({
            "employees": selected.iter().map(|employee| json!({
                "id": employee.id,
                "department": employee.department,
                "title": employee.title,
                "hired_on": employee.hired_on,
                "status": employee.status,
            })).collect::<Vec<_>>(),
        });

        let task = TaskRequest::new(self.tenant_id, TaskKind::AttritionRisk, payload);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "attrition risk task failed");
            HrError::Attrition
        })?;
        self.insights.record(self.tenant_id, TaskKind::AttritionRisk, insight.clone());

        Ok(AttritionReport {
            employees_assessed: selected.len(),
            risk_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    /// Propose a staffing plan for one department or the whole company.
    pub fn optimize_talent(&self, request: TalentRequest) -> Result<TalentPlan, HrError> {
        let (payload, considered_count) = {
            let employees = self.employees.read().unwrap();
            let considered: Vec<&Employee> = employees
                .values()
                .filter(|employee| {
                    request
                        .department
                        .as_ref()
                        .is_none_or(|department| &employee.department == department)
                })
                .collect();
            if considered.is_empty() {
                return Err(DomainError::validation("no employees match the talent request").into());
            }

            let payload = json!({
                "department": request.department,
                "employees": considered.iter().map(|employee| json!({
                    "id": employee.id,
                    "department": employee.department,
                    "title": employee.title,
                    "status": employee.status,
                })).collect::<Vec<_>>(),
            });
            (payload, considered.len())
        };

        let task = TaskRequest::new(self.tenant_id, TaskKind::TalentOptimization, payload);
        let insight = run_to_insight(&self.tasks, task).map_err(|error| {
            warn!(tenant = %self.tenant_id, %error, "talent optimization task failed");
            HrError::Talent
        })?;
        self.insights.record(self.tenant_id, TaskKind::TalentOptimization, insight.clone());

        Ok(TalentPlan {
            department: request.department,
            employees_considered: considered_count,
            alignment_score: insight.score,
            confidence: insight.confidence,
            explanation: insight.explanation,
            generated_at: Utc::now(),
        })
    }

    fn select_employees(&self, only: &[EntityId]) -> Vec<Employee> {
        let employees = self.employees.read().unwrap();
        if only.is_empty() {
            employees.values().cloned().collect()
        } else {
            only.iter().filter_map(|id| employees.get(id).cloned()).collect()
        }
    }
}

impl Plugin for HrPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: PluginId::new("hr"),
            name: "Human Resources".into(),
            module: ModuleKind::Hr,
            version: "1.0.0".into(),
            config: PluginConfig {
                enabled: true,
                priority: 60,
                dependencies: Vec::new(),
                permissions: vec!["hr.read".into(), "hr.write".into()],
                endpoints: vec![
                    ApiEndpoint {
                        path: "/hr/employees".into(),
                        method: HttpMethod::Post,
                        handler: "create_employee".into(),
                        auth_required: true,
                        rate_limit: None,
                    },
                    ApiEndpoint {
                        path: "/hr/attrition".into(),
                        method: HttpMethod::Post,
                        handler: "analyze_attrition_risk".into(),
                        auth_required: true,
                        rate_limit: Some(10),
                    },
                ],
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
                industry_specific: false,
                custom_fields: true,
            },
        }
    }

    fn validate_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Employee(employee) => {
                if employee.name.trim().is_empty() {
                    return Err(DomainError::validation("employee name must not be empty"));
                }
                if !employee.email.contains('@') {
                    return Err(DomainError::validation("employee email must contain `@`"));
                }
                Ok(())
            }
            EntityPayload::Timesheet(sheet) => {
                if sheet.period_end < sheet.period_start {
                    return Err(DomainError::validation(
                        "timesheet period must not end before it starts",
                    ));
                }
                if !sheet.hours.is_finite() || sheet.hours < 0.0 {
                    return Err(DomainError::validation("timesheet hours must be non-negative"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn transform_data(&self, payload: EntityPayload) -> DomainResult<EntityPayload> {
        // Directory convention: emails are stored lowercase.
        match payload {
            EntityPayload::Employee(mut employee) => {
                employee.email = employee.email.to_lowercase();
                Ok(EntityPayload::Employee(employee))
            }
            other => Ok(other),
        }
    }

    fn sync_data(&self, payload: &EntityPayload) -> DomainResult<()> {
        match payload {
            EntityPayload::Employee(record) => {
                let mut employees = self.employees.write().unwrap();
                match employees.get_mut(&record.id) {
                    Some(employee) => {
                        employee.name = record.name.clone();
                        employee.email = record.email.clone();
                        employee.department = record.department.clone();
                        employee.title = record.title.clone();
                    }
                    None => {
                        employees.insert(
                            record.id,
                            Employee {
                                id: record.id,
                                tenant_id: self.tenant_id,
                                name: record.name.clone(),
                                email: record.email.clone(),
                                department: record.department.clone(),
                                title: record.title.clone(),
                                hired_on: Utc::now().date_naive(),
                                salary: 0,
                                status: EmployeeStatus::Active,
                            },
                        );
                    }
                }
                Ok(())
            }
            EntityPayload::Timesheet(record) => {
                let mut timesheets = self.timesheets.write().unwrap();
                match timesheets.get_mut(&record.id) {
                    Some(sheet) => {
                        sheet.period_start = record.period_start;
                        sheet.period_end = record.period_end;
                        sheet.hours = record.hours;
                        sheet.billable = record.billable;
                    }
                    None => {
                        timesheets.insert(
                            record.id,
                            Timesheet {
                                id: record.id,
                                tenant_id: self.tenant_id,
                                employee_id: record.employee_id,
                                period_start: record.period_start,
                                period_end: record.period_end,
                                hours: record.hours,
                                billable: record.billable,
                                status: Default::default(),
                            },
                        );
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
