//! Sandbox configuration
//!
//! Configuration types for a single sandboxed interpreter

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::{FsType, SandboxError, SandboxResult};
use crate::network::{get_preset, validate_https_url};

/// Default audit log location, relative to the host's working directory
pub const DEFAULT_AUDIT_LOG_PATH: &str = "./logs/sandbox-audit.log";

/// Interpreter execution limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Maximum function/subshell nesting depth
    pub max_call_depth: u32,

    /// Maximum number of commands executed in one call
    pub max_command_count: u32,

    /// Maximum iterations of any single loop
    pub max_loop_iterations: u32,
}

impl ExecutionLimits {
    /// Default limits for a filesystem mode; more isolated modes get tighter budgets
    pub const fn for_fs_type(fs_type: FsType) -> Self {
        match fs_type {
            FsType::InMemory => Self {
                max_call_depth: 50,
                max_command_count: 1_000,
                max_loop_iterations: 1_000,
            },
            FsType::Overlay => Self {
                max_call_depth: 75,
                max_command_count: 5_000,
                max_loop_iterations: 5_000,
            },
            FsType::ReadWrite => Self {
                max_call_depth: 100,
                max_command_count: 10_000,
                max_loop_iterations: 10_000,
            },
        }
    }

    /// All limits must be positive
    pub fn validate(&self) -> SandboxResult<()> {
        let fields = [
            ("execution_limits.max_call_depth", self.max_call_depth),
            ("execution_limits.max_command_count", self.max_command_count),
            ("execution_limits.max_loop_iterations", self.max_loop_iterations),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(SandboxError::invalid_config(field, "must be greater than 0"));
            }
        }
        Ok(())
    }
}

/// Partial execution limits; unset fields fall back to a base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLimitOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_command_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_loop_iterations: Option<u32>,
}

impl ExecutionLimitOverrides {
    /// Fill every unset field from `base`
    pub fn merge_over(&self, base: &ExecutionLimits) -> ExecutionLimits {
        ExecutionLimits {
            max_call_depth: self.max_call_depth.unwrap_or(base.max_call_depth),
            max_command_count: self.max_command_count.unwrap_or(base.max_command_count),
            max_loop_iterations: self.max_loop_iterations.unwrap_or(base.max_loop_iterations),
        }
    }

    /// Fill every unset field from the defaults for `fs_type`
    pub fn resolve(&self, fs_type: FsType) -> ExecutionLimits {
        self.merge_over(&ExecutionLimits::for_fs_type(fs_type))
    }
}

impl From<ExecutionLimits> for ExecutionLimitOverrides {
    fn from(limits: ExecutionLimits) -> Self {
        Self {
            max_call_depth: Some(limits.max_call_depth),
            max_command_count: Some(limits.max_command_count),
            max_loop_iterations: Some(limits.max_loop_iterations),
        }
    }
}

/// Configuration for one sandboxed interpreter instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Filesystem isolation mode
    #[serde(default = "default_fs_type")]
    pub fs_type: FsType,

    /// Host directory backing overlay and read-write modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,

    /// Working directory inside the sandbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Environment visible to executed commands
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Network preset names; empty means the default for `fs_type`
    #[serde(default = "default_network_presets")]
    pub network_presets: Vec<String>,

    /// Extra HTTPS URL prefixes on top of the presets
    #[serde(default)]
    pub custom_network_urls: Vec<String>,

    /// Limit overrides; unset fields follow the defaults for `fs_type`
    #[serde(default)]
    pub execution_limits: ExecutionLimitOverrides,

    /// Whether audited executions are written to the audit log
    #[serde(default = "default_audit_log")]
    pub audit_log: bool,

    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: PathBuf,
}

pub(crate) fn default_fs_type() -> FsType {
    FsType::Overlay
}

pub(crate) fn default_network_presets() -> Vec<String> {
    vec!["standard".to_string()]
}

pub(crate) fn default_audit_log() -> bool {
    true
}

pub(crate) fn default_audit_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIT_LOG_PATH)
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            fs_type: default_fs_type(),
            root_path: None,
            cwd: None,
            env: HashMap::new(),
            network_presets: default_network_presets(),
            custom_network_urls: Vec::new(),
            execution_limits: ExecutionLimitOverrides::default(),
            audit_log: default_audit_log(),
            audit_log_path: default_audit_log_path(),
        }
    }
}

impl SandboxConfig {
    /// In-memory sandbox with no network
    pub fn in_memory() -> Self {
        Self {
            fs_type: FsType::InMemory,
            network_presets: vec!["none".to_string()],
            ..Self::default()
        }
    }

    /// Copy-on-write overlay over `root`
    pub fn overlay(root: impl Into<PathBuf>) -> Self {
        Self {
            fs_type: FsType::Overlay,
            root_path: Some(root.into()),
            ..Self::default()
        }
    }

    /// Direct read-write access scoped to `root`
    pub fn read_write(root: impl Into<PathBuf>) -> Self {
        Self {
            fs_type: FsType::ReadWrite,
            root_path: Some(root.into()),
            network_presets: vec!["full".to_string()],
            ..Self::default()
        }
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Replace the network presets
    pub fn with_network_presets<I, S>(mut self, presets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.network_presets = presets.into_iter().map(Into::into).collect();
        self
    }

    /// Pin every execution limit
    pub fn with_execution_limits(mut self, limits: ExecutionLimits) -> Self {
        self.execution_limits = limits.into();
        self
    }

    /// Effective limits: overrides filled from the defaults for `fs_type`
    pub fn resolved_limits(&self) -> ExecutionLimits {
        self.execution_limits.resolve(self.fs_type)
    }

    /// Check the config is usable by an interpreter factory
    pub fn validate(&self) -> SandboxResult<()> {
        if self.fs_type.requires_root() && self.root_path.is_none() {
            return Err(SandboxError::invalid_config(
                "root_path",
                format!("required for {} filesystem", self.fs_type),
            ));
        }

        for name in &self.network_presets {
            get_preset(name)?;
        }

        for url in &self.custom_network_urls {
            validate_https_url(url)?;
        }

        self.resolved_limits().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.fs_type, FsType::Overlay);
        assert_eq!(config.network_presets, vec!["standard"]);
        assert!(config.audit_log);
        assert_eq!(config.audit_log_path, PathBuf::from("./logs/sandbox-audit.log"));
        assert_eq!(config.execution_limits, ExecutionLimitOverrides::default());
        assert_eq!(
            config.resolved_limits(),
            ExecutionLimits::for_fs_type(FsType::Overlay)
        );
    }

    #[test]
    fn test_limits_follow_fs_type() {
        let limits = |c: SandboxConfig| {
            let l = c.resolved_limits();
            (l.max_call_depth, l.max_command_count, l.max_loop_iterations)
        };
        assert_eq!(limits(SandboxConfig::in_memory()), (50, 1_000, 1_000));
        assert_eq!(limits(SandboxConfig::overlay("/srv/c")), (75, 5_000, 5_000));
        assert_eq!(limits(SandboxConfig::read_write("/srv/c")), (100, 10_000, 10_000));

        // Switching the mode moves unset limits with it
        let mut config = SandboxConfig::in_memory();
        config.fs_type = FsType::ReadWrite;
        assert_eq!(limits(config), (100, 10_000, 10_000));
    }

    #[test]
    fn test_deserialize_empty_applies_defaults() {
        let config: SandboxConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SandboxConfig::default());
    }

    #[test]
    fn test_deserialize_partial_limits() {
        let config: SandboxConfig =
            serde_json::from_str(r#"{"fs_type":"inmemory","execution_limits":{"max_call_depth":5}}"#)
                .unwrap();
        assert_eq!(config.fs_type, FsType::InMemory);
        assert_eq!(config.resolved_limits().max_call_depth, 5);
        assert_eq!(config.resolved_limits().max_command_count, 1_000);
    }

    #[test]
    fn test_overlay_requires_root() {
        let err = SandboxConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("root_path"));
        assert!(SandboxConfig::overlay("/srv/workspace").validate().is_ok());
        assert!(SandboxConfig::in_memory().validate().is_ok());
    }

    #[test]
    fn test_rejects_http_custom_url() {
        let mut config = SandboxConfig::in_memory();
        config.custom_network_urls = vec!["http://example.com/".into()];
        assert!(matches!(config.validate(), Err(SandboxError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_unknown_preset() {
        let config = SandboxConfig::in_memory().with_network_presets(["intranet"]);
        assert!(matches!(
            config.validate(),
            Err(SandboxError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_limit() {
        let config = SandboxConfig::in_memory().with_execution_limits(ExecutionLimits {
            max_loop_iterations: 0,
            ..ExecutionLimits::for_fs_type(FsType::InMemory)
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_loop_iterations"));
    }

    #[test]
    fn test_overrides_merge() {
        let overrides = ExecutionLimitOverrides {
            max_command_count: Some(50),
            ..Default::default()
        };
        let merged = overrides.merge_over(&ExecutionLimits::for_fs_type(FsType::ReadWrite));
        assert_eq!(merged.max_command_count, 50);
        assert_eq!(merged.max_call_depth, 100);
        assert_eq!(merged.max_loop_iterations, 10_000);

        let merged = overrides.resolve(FsType::InMemory);
        assert_eq!(merged.max_command_count, 50);
        assert_eq!(merged.max_call_depth, 50);
    }
}
