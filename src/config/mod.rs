//! Sandbox and plugin configuration
//!
//! - `SandboxConfig` - everything an interpreter factory needs for one sandbox
//! - `PluginConfig` - host-level TOML config that resolves to a `SandboxConfig`
//!   and, optionally, a `PermissionManager`

mod plugin;
mod sandbox;

pub use plugin::PluginConfig;
pub use sandbox::{ExecutionLimitOverrides, ExecutionLimits, SandboxConfig, DEFAULT_AUDIT_LOG_PATH};
