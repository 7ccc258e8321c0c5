//! Persistence seam for insights produced by completed tasks.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use coreflow_core::TenantId;

use crate::types::{TaskInsight, TaskKind};

/// Where completed-task insights get recorded.
///
/// Plugins record through this trait so the storage side (and any
/// notification fan-out hanging off it) stays swappable.
pub trait InsightSink: Send + Sync {
    fn record(&self, tenant_id: TenantId, kind: TaskKind, insight: TaskInsight);
}

impl<S: InsightSink + ?Sized> InsightSink for Arc<S> {
    fn record(&self, tenant_id: TenantId, kind: TaskKind, insight: TaskInsight) {
        (**self).record(tenant_id, kind, insight);
    }
}

/// One recorded insight.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InsightRecord {
    pub tenant_id: TenantId,
    pub kind: TaskKind,
    pub insight: TaskInsight,
    pub recorded_at: DateTime<Utc>,
}

/// Vec-backed sink for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryInsightSink {
    inner: Mutex<Vec<InsightRecord>>,
}

impl InMemoryInsightSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in insertion order.
    pub fn all(&self) -> Vec<InsightRecord> {
        self.inner.lock().unwrap().clone()
    }

    /// Records belonging to one tenant, in insertion order.
    pub fn for_tenant(&self, tenant_id: TenantId) -> Vec<InsightRecord> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.tenant_id == tenant_id)
            .cloned()
            .collect()
    }
}

impl InsightSink for InMemoryInsightSink {
    fn record(&self, tenant_id: TenantId, kind: TaskKind, insight: TaskInsight) {
        self.inner.lock().unwrap().push(InsightRecord {
            tenant_id,
            kind,
            insight,
            recorded_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_returned_in_insertion_order() {
        let sink = InMemoryInsightSink::new();
        let tenant = TenantId::new();

        sink.record(tenant, TaskKind::DemandForecast, TaskInsight::new(0.1, 0.9));
        sink.record(tenant, TaskKind::StockOptimization, TaskInsight::new(0.2, 0.8));

        let all = sink.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, TaskKind::DemandForecast);
        assert_eq!(all[1].kind, TaskKind::StockOptimization);
    }

    #[test]
    fn for_tenant_filters_other_tenants_out() {
        let sink = InMemoryInsightSink::new();
        let tenant = TenantId::new();
        let other = TenantId::new();

        sink.record(tenant, TaskKind::AttritionRisk, TaskInsight::new(0.3, 0.7));
        sink.record(other, TaskKind::AttritionRisk, TaskInsight::new(0.4, 0.6));

        let mine = sink.for_tenant(tenant);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].tenant_id, tenant);
    }
}
