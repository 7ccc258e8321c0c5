//! The lifecycle and data contract every plugin implements.

use thiserror::Error;

use coreflow_adapters::EntityPayload;
use coreflow_core::DomainResult;

use crate::descriptor::{PluginDescriptor, PluginHealth};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("initialization failed: {0}")]
    Initialize(String),
    #[error("activation failed: {0}")]
    Activation(String),
    #[error("deactivation failed: {0}")]
    Deactivation(String),
    #[error("teardown failed: {0}")]
    Teardown(String),
}

/// A business-module plugin.
///
/// Lifecycle hooks run while the registry holds its write lock, so they must
/// not call back into the registry. All hooks default to succeeding; a plugin
/// overrides only the ones it needs.
pub trait Plugin: Send + Sync {
    fn descriptor(&self) -> PluginDescriptor;

    /// Runs once during registration, before the plugin becomes visible.
    fn initialize(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs on every Inactive to Active transition.
    fn activate(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs on every Active to Inactive transition.
    fn deactivate(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs once right before the plugin is removed.
    fn destroy(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn health(&self) -> PluginHealth {
        PluginHealth::Healthy
    }

    /// Check an inbound payload before it is accepted for this plugin.
    fn validate_data(&self, _payload: &EntityPayload) -> DomainResult<()> {
        Ok(())
    }

    /// Reshape a payload on its way through this plugin.
    fn transform_data(&self, payload: EntityPayload) -> DomainResult<EntityPayload> {
        Ok(payload)
    }

    /// Apply a synced payload to the plugin's own state.
    fn sync_data(&self, _payload: &EntityPayload) -> DomainResult<()> {
        Ok(())
    }
}
