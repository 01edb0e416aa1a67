//! Host plugin configuration
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! tier = "overlay"
//! permission_tier = 2
//! root_path = "/srv/customer"
//! network_presets = ["github"]
//!
//! [execution_limits]
//! max_command_count = 500
//!
//! [[custom_commands]]
//! pattern = "make"
//! level = "allow_with_audit"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::sandbox::{
    default_audit_log, default_audit_log_path, default_fs_type, default_network_presets,
    ExecutionLimitOverrides, SandboxConfig,
};
use crate::core::{FsType, SandboxResult};
use crate::network::{get_preset, validate_https_url};
use crate::permissions::{CommandPermission, PermissionManager, Tier};

/// Top-level configuration a host loads once per deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Filesystem mode for sandboxes created from this config
    #[serde(default = "default_fs_type")]
    pub tier: FsType,

    /// Customer tier; when unset, no permission manager is installed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_tier: Option<Tier>,

    /// Extra command rules appended after the tier's built-in rules
    #[serde(default)]
    pub custom_commands: Vec<CommandPermission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,

    #[serde(default = "default_network_presets")]
    pub network_presets: Vec<String>,

    #[serde(default)]
    pub custom_network_urls: Vec<String>,

    /// Per-field overrides merged over the defaults for `tier`
    #[serde(default)]
    pub execution_limits: ExecutionLimitOverrides,

    #[serde(default = "default_audit_log")]
    pub audit_log: bool,

    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            tier: default_fs_type(),
            permission_tier: None,
            custom_commands: Vec::new(),
            root_path: None,
            network_presets: default_network_presets(),
            custom_network_urls: Vec::new(),
            execution_limits: ExecutionLimitOverrides::default(),
            audit_log: default_audit_log(),
            audit_log_path: default_audit_log_path(),
        }
    }
}

impl PluginConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> SandboxResult<Self> {
        let config: PluginConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> SandboxResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        tracing::info!(
            path = %path.display(),
            tier = %config.tier,
            "Loaded sandbox plugin config"
        );

        Ok(config)
    }

    /// Check fields that can be checked without a root directory
    ///
    /// A missing `root_path` for overlay/readwrite is only reported when the
    /// sandbox config is resolved, since hosts often supply it per customer.
    pub fn validate(&self) -> SandboxResult<()> {
        for name in &self.network_presets {
            get_preset(name)?;
        }
        for url in &self.custom_network_urls {
            validate_https_url(url)?;
        }
        for rule in &self.custom_commands {
            rule.validate()?;
        }
        self.execution_limits.resolve(self.tier).validate()
    }

    /// Resolve into a validated [`SandboxConfig`]
    pub fn to_sandbox_config(&self) -> SandboxResult<SandboxConfig> {
        let config = SandboxConfig {
            fs_type: self.tier,
            root_path: self.root_path.clone(),
            network_presets: self.network_presets.clone(),
            custom_network_urls: self.custom_network_urls.clone(),
            execution_limits: self.execution_limits,
            audit_log: self.audit_log,
            audit_log_path: self.audit_log_path.clone(),
            ..SandboxConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the permission manager for `permission_tier`, if one is set
    pub fn permission_manager(&self) -> SandboxResult<Option<PermissionManager>> {
        self.permission_tier
            .map(|tier| PermissionManager::new(tier, self.custom_commands.clone()))
            .transpose()
    }
}
