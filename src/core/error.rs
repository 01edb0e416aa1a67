//! Sandbox error types
//!
//! Policy denials are not errors: they are returned as
//! [`PermissionCheckResult`](crate::permissions::PermissionCheckResult) values.
//! Everything here is either caller misuse (bad tier, bad rule, bad config)
//! or a failure of an external collaborator.

use thiserror::Error;

use super::fs_type::FsType;
use crate::permissions::Tier;

/// Errors that can occur in the sandbox policy layer
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Tier value outside the closed 1-4 range
    #[error("Invalid tier: {0} (expected 1-4)")]
    InvalidTier(u8),

    /// Malformed custom command rule
    #[error("Invalid command rule: {0}")]
    InvalidRule(String),

    /// Invalid configuration value
    #[error("Invalid config: {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// Network preset name not present in the preset registry
    #[error("Unknown network preset \"{name}\". Available presets: {available}")]
    UnknownPreset { name: String, available: String },

    /// Custom network URL that is malformed or not HTTPS
    #[error("Invalid URL prefix: {0}")]
    InvalidUrl(String),

    /// Skill id not registered
    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    /// A denial lifted into an error by the caller
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        tier: Tier,
        command: String,
        reason: String,
    },

    /// The interpreter factory could not build a sandbox
    #[error("Failed to create {fs_type} sandbox: {message}")]
    SandboxCreation { fs_type: FsType, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SandboxError {
    /// Create a config validation error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SandboxError::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SandboxError::InvalidTier(_) => "SANDBOX_TIER_INVALID",
            SandboxError::InvalidRule(_) => "SANDBOX_RULE_INVALID",
            SandboxError::InvalidConfig { .. } | SandboxError::Toml(_) => "SANDBOX_CONFIG_INVALID",
            SandboxError::UnknownPreset { .. } => "SANDBOX_PRESET_UNKNOWN",
            SandboxError::InvalidUrl(_) => "SANDBOX_URL_INVALID",
            SandboxError::SkillNotFound(_) => "SANDBOX_SKILL_NOT_FOUND",
            SandboxError::PermissionDenied { .. } => "SANDBOX_PERMISSION_DENIED",
            SandboxError::SandboxCreation { .. } => "SANDBOX_CREATION_FAILED",
            SandboxError::Io(_) => "SANDBOX_IO",
            SandboxError::Serialization(_) => "SANDBOX_SERIALIZATION",
        }
    }
}

/// Result type alias for sandbox operations
pub type SandboxResult<T> = Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SandboxError::InvalidTier(7);
        assert_eq!(err.to_string(), "Invalid tier: 7 (expected 1-4)");

        let err = SandboxError::invalid_config("root_path", "required for overlay");
        assert_eq!(err.to_string(), "Invalid config: root_path: required for overlay");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SandboxError::InvalidTier(0).code(), "SANDBOX_TIER_INVALID");
        assert_eq!(
            SandboxError::PermissionDenied {
                tier: Tier::One,
                command: "rm".into(),
                reason: "nope".into(),
            }
            .code(),
            "SANDBOX_PERMISSION_DENIED"
        );
        assert_eq!(
            SandboxError::invalid_config("tier", "bad").code(),
            "SANDBOX_CONFIG_INVALID"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SandboxError = io_err.into();
        assert!(matches!(err, SandboxError::Io(_)));
        assert_eq!(err.code(), "SANDBOX_IO");
    }
}
