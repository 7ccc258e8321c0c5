//! Plugin descriptors: the static self-description every plugin hands to the
//! registry at registration time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use coreflow_core::{ModuleKind, PluginId};
use coreflow_events::EventKind;

/// Registry-side lifecycle state of a plugin.
///
/// `Loading` is only observable from another thread while registration is in
/// flight. `Error` is reserved for a future supervisor that quarantines
/// plugins instead of removing them; nothing transitions into it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    Inactive,
    Loading,
    Active,
    Error,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

impl core::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the registry needs to know about a plugin up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: PluginId,
    pub name: String,
    pub module: ModuleKind,
    pub version: String,
    pub config: PluginConfig,
    pub capabilities: PluginCapabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Whether the plugin should be activated right after registration.
    pub enabled: bool,
    /// Listing order; higher runs earlier in any ordered fan-out.
    pub priority: i32,
    /// Plugins that must already be registered.
    pub dependencies: Vec<PluginId>,
    pub permissions: Vec<String>,
    pub endpoints: Vec<ApiEndpoint>,
    pub webhooks: Vec<WebhookSubscription>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 0,
            dependencies: Vec::new(),
            permissions: Vec::new(),
            endpoints: Vec::new(),
            webhooks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP route a plugin contributes to the API surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub path: String,
    pub method: HttpMethod,
    /// Handler name inside the plugin, for diagnostics.
    pub handler: String,
    pub auth_required: bool,
    /// Requests per minute, if the route is throttled.
    pub rate_limit: Option<u32>,
}

/// A platform event the plugin wants delivered, with retry semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub event: EventKind,
    /// Internal hooks dispatch in-process; external ones leave the platform.
    pub internal: bool,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackoffStrategy {
    Linear,
    Exponential,
}

/// Declarative retry curve for webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_attempts: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            strategy: BackoffStrategy::Exponential,
        }
    }
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            strategy: BackoffStrategy::Linear,
            ..Default::default()
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            strategy: BackoffStrategy::Exponential,
            ..Default::default()
        }
    }

    /// Calculate delay for a given attempt number (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;

        let delay_ms = match self.strategy {
            BackoffStrategy::Exponential => {
                let exp = 2_f64.powi((attempt - 1) as i32);
                (base_ms * exp).min(max_ms)
            }
            BackoffStrategy::Linear => {
                let linear = base_ms * (attempt as f64);
                linear.min(max_ms)
            }
        };

        Duration::from_millis(delay_ms as u64)
    }

    /// Check if more retries are allowed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// What a plugin claims to be able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginCapabilities {
    pub ai_enabled: bool,
    pub real_time_sync: bool,
    pub cross_module: bool,
    pub industry_specific: bool,
    pub custom_fields: bool,
}

/// Self-reported health, surfaced through the observability routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum PluginHealth {
    Healthy,
    Degraded(String),
}

impl PluginHealth {
    pub fn degraded(detail: impl Into<String>) -> Self {
        Self::Degraded(detail.into())
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}
