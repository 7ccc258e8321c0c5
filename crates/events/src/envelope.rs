//! Sync event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coreflow_core::{EntityId, EntityKind, ModuleKind, TenantId};

/// Named channel a sync event belongs to.
///
/// Channels group events by concern: module lifecycle announcements, entity
/// change fan-out and AI results. The channel is fully determined by the
/// event kind (see [`EventKind::channel`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventChannel {
    ModuleSync,
    EntitySync,
    AiResults,
}

impl core::fmt::Display for EventChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            EventChannel::ModuleSync => "module_sync",
            EventChannel::EntitySync => "entity_sync",
            EventChannel::AiResults => "ai_results",
        })
    }
}

/// Kind of sync event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PluginRegistered,
    PluginActivated,
    PluginDeactivated,
    PluginDestroyed,
    EntityChanged,
    PredictionReady,
}

impl EventKind {
    /// Channel this kind of event is published on.
    pub fn channel(&self) -> EventChannel {
        match self {
            EventKind::PluginRegistered
            | EventKind::PluginActivated
            | EventKind::PluginDeactivated
            | EventKind::PluginDestroyed => EventChannel::ModuleSync,
            EventKind::EntityChanged => EventChannel::EntitySync,
            EventKind::PredictionReady => EventChannel::AiResults,
        }
    }
}

/// Metadata attached to every sync event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Tenant the event belongs to. Multi-tenancy is enforced here.
    pub tenant_id: TenantId,

    /// Module the event originates from or concerns, when known.
    pub module: Option<ModuleKind>,

    /// Entity taxonomy fields, set for entity-sync events.
    pub entity_kind: Option<EntityKind>,
    pub entity_id: Option<EntityId>,
}

/// Envelope for a sync event.
///
/// `payload` is kept generic: the orchestrator routes typed entity payloads
/// while the wire-level bus carries serialized JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope<P> {
    event_id: Uuid,
    kind: EventKind,
    metadata: EventMetadata,
    occurred_at: DateTime<Utc>,
    payload: P,
}

impl<P> SyncEnvelope<P> {
    /// Module lifecycle announcement (`module_sync` channel).
    pub fn module_sync(tenant_id: TenantId, kind: EventKind, module: ModuleKind, payload: P) -> Self {
        debug_assert_eq!(kind.channel(), EventChannel::ModuleSync);
        Self {
            event_id: Uuid::now_v7(),
            kind,
            metadata: EventMetadata {
                tenant_id,
                module: Some(module),
                entity_kind: None,
                entity_id: None,
            },
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Entity change notification (`entity_sync` channel).
    pub fn entity_changed(
        tenant_id: TenantId,
        entity_kind: EntityKind,
        entity_id: EntityId,
        payload: P,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            kind: EventKind::EntityChanged,
            metadata: EventMetadata {
                tenant_id,
                module: None,
                entity_kind: Some(entity_kind),
                entity_id: Some(entity_id),
            },
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// AI result announcement (`ai_results` channel).
    pub fn prediction_ready(tenant_id: TenantId, payload: P) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            kind: EventKind::PredictionReady,
            metadata: EventMetadata {
                tenant_id,
                module: None,
                entity_kind: None,
                entity_id: None,
            },
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn channel(&self) -> EventChannel {
        self.kind.channel()
    }

    pub fn tenant_id(&self) -> TenantId {
        self.metadata.tenant_id
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Re-wrap the payload, keeping event identity and metadata.
    pub fn map_payload<Q>(self, f: impl FnOnce(P) -> Q) -> SyncEnvelope<Q> {
        SyncEnvelope {
            event_id: self.event_id,
            kind: self.kind,
            metadata: self.metadata,
            occurred_at: self.occurred_at,
            payload: f(self.payload),
        }
    }
}
