//! Skill types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::{FsType, SandboxError, SandboxResult};

/// How far a skill is trusted; decides its default filesystem mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTrustLevel {
    /// Read-only operations
    Untrusted,
    /// Typical write operations
    Standard,
    /// Destructive operations
    Trusted,
    Admin,
}

impl SkillTrustLevel {
    /// Filesystem mode a skill at this trust level runs under
    pub fn fs_type(self) -> FsType {
        match self {
            SkillTrustLevel::Untrusted => FsType::InMemory,
            SkillTrustLevel::Standard => FsType::Overlay,
            SkillTrustLevel::Trusted | SkillTrustLevel::Admin => FsType::ReadWrite,
        }
    }
}

impl fmt::Display for SkillTrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillTrustLevel::Untrusted => "untrusted",
            SkillTrustLevel::Standard => "standard",
            SkillTrustLevel::Trusted => "trusted",
            SkillTrustLevel::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// A skill that can be executed inside the sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub trust_level: SkillTrustLevel,

    /// Overrides the trust level's filesystem mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<FsType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_network_presets: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SkillDefinition {
    /// Create a skill whose id and name are the same
    pub fn new(id: impl Into<String>, trust_level: SkillTrustLevel) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            trust_level,
            required_tier: None,
            required_network_presets: None,
            description: None,
        }
    }

    /// Set a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pin the filesystem mode
    pub fn with_required_tier(mut self, fs_type: FsType) -> Self {
        self.required_tier = Some(fs_type);
        self
    }

    /// Require network presets
    pub fn with_network_presets<I, S>(mut self, presets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_network_presets = Some(presets.into_iter().map(Into::into).collect());
        self
    }

    /// Set a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Id and name must be non-empty
    pub fn validate(&self) -> SandboxResult<()> {
        if self.id.trim().is_empty() {
            return Err(SandboxError::invalid_config("skill.id", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(SandboxError::invalid_config(
                "skill.name",
                format!("must not be empty (skill '{}')", self.id),
            ));
        }
        Ok(())
    }
}

/// Request to run a skill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillExecRequest {
    pub skill_id: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl SkillExecRequest {
    /// Create a request with no arguments
    pub fn new(skill_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            skill_id: skill_id.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Command and arguments joined with single spaces
    pub fn full_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Outcome of a skill execution, including denied ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u64,
    pub sandbox_tier: FsType,
    pub skill_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SkillExecResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_level_mapping() {
        assert_eq!(SkillTrustLevel::Untrusted.fs_type(), FsType::InMemory);
        assert_eq!(SkillTrustLevel::Standard.fs_type(), FsType::Overlay);
        assert_eq!(SkillTrustLevel::Trusted.fs_type(), FsType::ReadWrite);
        assert_eq!(SkillTrustLevel::Admin.fs_type(), FsType::ReadWrite);
    }

    #[test]
    fn test_full_command() {
        assert_eq!(SkillExecRequest::new("ls", "ls").full_command(), "ls");
        assert_eq!(
            SkillExecRequest::new("grep", "grep")
                .args(["-r", "TODO", "src"])
                .full_command(),
            "grep -r TODO src"
        );
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let skill = SkillDefinition::new("  ", SkillTrustLevel::Untrusted);
        assert!(skill.validate().is_err());

        let skill = SkillDefinition::new("cat", SkillTrustLevel::Untrusted).with_name("");
        assert!(skill.validate().is_err());
    }

    #[test]
    fn test_skill_deserialize() {
        let skill: SkillDefinition = serde_json::from_str(
            r#"{"id":"curl","name":"curl","trust_level":"standard","required_network_presets":["standard"]}"#,
        )
        .unwrap();
        assert_eq!(skill.trust_level, SkillTrustLevel::Standard);
        assert_eq!(skill.required_network_presets, Some(vec!["standard".to_string()]));
        assert_eq!(skill.required_tier, None);
    }
}
