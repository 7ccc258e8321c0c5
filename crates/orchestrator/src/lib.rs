//! Plugin orchestration: descriptors, the plugin lifecycle contract, the
//! per-tenant registry and cross-module sync routing.

pub mod descriptor;
pub mod plugin;
pub mod registry;
pub mod routing;

pub use descriptor::{
    ApiEndpoint, BackoffStrategy, HttpMethod, PluginCapabilities, PluginConfig, PluginDescriptor,
    PluginHealth, PluginStatus, RetryPolicy, WebhookSubscription,
};
pub use plugin::{Plugin, PluginError};
pub use registry::{Orchestrator, PluginSummary, RegistryError, SyncFailure, SyncReport};
pub use routing::RouteTable;
