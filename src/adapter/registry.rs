//! Skill registry
//!
//! Holds the skills that can be executed inside the sandbox and resolves
//! each one's filesystem mode from its trust level.

use std::collections::HashMap;

use super::types::{SkillDefinition, SkillTrustLevel};
use crate::core::{FsType, SandboxError, SandboxResult};

const READ_SKILLS: &[&str] = &["cat", "ls", "find", "grep"];
const WRITE_SKILLS: &[&str] = &["mkdir", "cp", "mv", "tee"];
const TRANSFORM_SKILLS: &[&str] = &["jq", "sed", "awk", "sort"];
const SYSTEM_INFO_SKILLS: &[&str] = &["env", "hostname", "date"];
const DESTRUCTIVE_SKILLS: &[&str] = &["rm", "chmod"];

/// Registry of executable skills, keyed by id
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: HashMap<String, SkillDefinition>,
    /// Registration order, for stable listing
    order: Vec<String>,
}

impl SkillRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with common Unix tools
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.insert_group(READ_SKILLS, SkillTrustLevel::Untrusted, "Read-only file operation");
        registry.insert_group(WRITE_SKILLS, SkillTrustLevel::Standard, "File write operation");
        registry.insert_group(TRANSFORM_SKILLS, SkillTrustLevel::Untrusted, "Data transform operation");

        registry.insert(
            SkillDefinition::new("curl", SkillTrustLevel::Standard)
                .with_network_presets(["standard"])
                .with_description("HTTP client for web requests"),
        );

        registry.insert_group(SYSTEM_INFO_SKILLS, SkillTrustLevel::Untrusted, "System info operation");
        registry.insert_group(DESTRUCTIVE_SKILLS, SkillTrustLevel::Trusted, "Destructive operation");

        registry
    }

    /// Register a skill, replacing any skill with the same id
    pub fn register(&mut self, skill: SkillDefinition) -> SandboxResult<()> {
        skill.validate()?;
        tracing::info!(
            skill = %skill.id,
            trust_level = %skill.trust_level,
            "Registering skill"
        );
        self.insert(skill);
        Ok(())
    }

    fn insert_group(&mut self, commands: &[&str], trust_level: SkillTrustLevel, label: &str) {
        for cmd in commands {
            self.insert(
                SkillDefinition::new(*cmd, trust_level)
                    .with_description(format!("{}: {}", label, cmd)),
            );
        }
    }

    fn insert(&mut self, skill: SkillDefinition) {
        if !self.skills.contains_key(&skill.id) {
            self.order.push(skill.id.clone());
        }
        self.skills.insert(skill.id.clone(), skill);
    }

    /// Get a skill by id
    pub fn get(&self, skill_id: &str) -> SandboxResult<&SkillDefinition> {
        self.skills
            .get(skill_id)
            .ok_or_else(|| SandboxError::SkillNotFound(skill_id.to_string()))
    }

    /// All skills, in registration order
    pub fn all(&self) -> Vec<&SkillDefinition> {
        self.order
            .iter()
            .filter_map(|id| self.skills.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Filesystem mode for a skill: its `required_tier` if set, otherwise the
    /// mode for its trust level
    pub fn tier_for_skill(&self, skill_id: &str) -> SandboxResult<FsType> {
        let skill = self.get(skill_id)?;
        Ok(skill
            .required_tier
            .unwrap_or_else(|| skill.trust_level.fs_type()))
    }
}
