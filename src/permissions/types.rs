//! Permission value types
//!
//! - `Tier` - customer trust level (1-4)
//! - `PermissionLevel` - deny / allow / allow_with_audit
//! - `CommandPermission` - a rule for a single command name
//! - `PermissionCheckResult` - verdict returned by every guard

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{SandboxError, SandboxResult};

/// Customer trust tier
///
/// Totally ordered; every capability granted at a tier is also granted
/// at every higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    /// Read-only tools, in-memory filesystem, no network
    One = 1,
    /// File mutation, overlay filesystem, standard network presets
    Two = 2,
    /// Developer tooling, direct read-write filesystem, extended presets
    Three = 3,
    /// Near-unrestricted (containers, OS packages), any network preset
    Four = 4,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::One, Tier::Two, Tier::Three, Tier::Four];

    /// Numeric level (1-4)
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tier {
    type Error = SandboxError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            4 => Ok(Tier::Four),
            other => Err(SandboxError::InvalidTier(other)),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.level()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Permission level attached to a command rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Blocked entirely
    Deny,
    /// Permitted without extra logging
    Allow,
    /// Permitted, but the caller must record an audit entry
    AllowWithAudit,
}

impl PermissionLevel {
    pub fn is_deny(self) -> bool {
        self == PermissionLevel::Deny
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Deny => write!(f, "deny"),
            PermissionLevel::Allow => write!(f, "allow"),
            PermissionLevel::AllowWithAudit => write!(f, "allow_with_audit"),
        }
    }
}

/// Permission rule for a single command name
///
/// `pattern` is compared for exact equality with the segment's command
/// name; it is not a glob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPermission {
    /// Command name this rule applies to (e.g. "cat", "rm", "curl")
    pub pattern: String,
    /// Whether the command is allowed, denied, or allowed with audit
    pub level: PermissionLevel,
    /// Why this rule exists; used as the denial reason for deny rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CommandPermission {
    /// Create a validated rule
    pub fn new(pattern: impl Into<String>, level: PermissionLevel) -> SandboxResult<Self> {
        let rule = Self {
            pattern: pattern.into(),
            level,
            description: None,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Create a validated `allow` rule
    pub fn allow(pattern: impl Into<String>) -> SandboxResult<Self> {
        Self::new(pattern, PermissionLevel::Allow)
    }

    /// Create a validated `allow_with_audit` rule
    pub fn audited(pattern: impl Into<String>) -> SandboxResult<Self> {
        Self::new(pattern, PermissionLevel::AllowWithAudit)
    }

    /// Create a validated `deny` rule
    pub fn deny(pattern: impl Into<String>) -> SandboxResult<Self> {
        Self::new(pattern, PermissionLevel::Deny)
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Built-in table entry; the tables are known-good so no validation
    pub(crate) fn builtin(pattern: &str, level: PermissionLevel, description: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            level,
            description: Some(description.to_string()),
        }
    }

    /// Reject rules that could never match a segment's command name
    ///
    /// The segmenter yields whitespace-free tokens that never contain a
    /// control operator, so such patterns are almost certainly a mistake.
    pub fn validate(&self) -> SandboxResult<()> {
        if self.pattern.is_empty() {
            return Err(SandboxError::InvalidRule("pattern must not be empty".into()));
        }
        if self.pattern.chars().any(char::is_whitespace) {
            return Err(SandboxError::InvalidRule(format!(
                "pattern '{}' must be a single command name",
                self.pattern
            )));
        }
        if self.pattern.contains(['|', '&', ';']) {
            return Err(SandboxError::InvalidRule(format!(
                "pattern '{}' contains a shell control operator",
                self.pattern
            )));
        }
        Ok(())
    }
}

/// Result of a permission check, returned by all guards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheckResult {
    /// Whether the request is permitted
    pub allowed: bool,
    /// Human-readable reason; names the offending command/capability on deny
    pub reason: String,
    /// Tier the check was evaluated at
    pub tier: Tier,
    /// Permitted, but the caller must record an audit entry
    pub audit_required: bool,
}

impl PermissionCheckResult {
    /// Plain allow
    pub fn allow(tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            tier,
            audit_required: false,
        }
    }

    /// Denial
    pub fn deny(tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            tier,
            audit_required: false,
        }
    }

    /// Set the audit flag
    pub fn with_audit(mut self, audit_required: bool) -> Self {
        self.audit_required = audit_required;
        self
    }

    /// Lift a denial into [`SandboxError::PermissionDenied`] for hosts that
    /// prefer `?` propagation
    pub fn into_result(self, command: impl Into<String>) -> SandboxResult<Self> {
        if self.allowed {
            Ok(self)
        } else {
            Err(SandboxError::PermissionDenied {
                tier: self.tier,
                command: command.into(),
                reason: self.reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_try_from() {
        assert_eq!(Tier::try_from(1).unwrap(), Tier::One);
        assert_eq!(Tier::try_from(4).unwrap(), Tier::Four);
        assert!(matches!(Tier::try_from(0), Err(SandboxError::InvalidTier(0))));
        assert!(matches!(Tier::try_from(5), Err(SandboxError::InvalidTier(5))));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::One < Tier::Two);
        assert!(Tier::Three < Tier::Four);
        assert_eq!(Tier::ALL.iter().max(), Some(&Tier::Four));
    }

    #[test]
    fn test_tier_serde() {
        assert_eq!(serde_json::to_string(&Tier::Three).unwrap(), "3");
        let tier: Tier = serde_json::from_str("2").unwrap();
        assert_eq!(tier, Tier::Two);
        assert!(serde_json::from_str::<Tier>("9").is_err());
    }

    #[test]
    fn test_permission_level_serde() {
        assert_eq!(
            serde_json::to_string(&PermissionLevel::AllowWithAudit).unwrap(),
            "\"allow_with_audit\""
        );
        let level: PermissionLevel = serde_json::from_str("\"deny\"").unwrap();
        assert!(level.is_deny());
    }

    #[test]
    fn test_rule_validation() {
        assert!(CommandPermission::allow("my-tool").is_ok());
        assert!(matches!(
            CommandPermission::allow(""),
            Err(SandboxError::InvalidRule(_))
        ));
        assert!(CommandPermission::allow("git status").is_err());
        assert!(CommandPermission::deny("a|b").is_err());
    }

    #[test]
    fn test_rule_deserialize_without_description() {
        let rule: CommandPermission =
            serde_json::from_str(r#"{"pattern": "make", "level": "allow"}"#).unwrap();
        assert_eq!(rule.pattern, "make");
        assert_eq!(rule.level, PermissionLevel::Allow);
        assert!(rule.description.is_none());
    }

    #[test]
    fn test_into_result() {
        let ok = PermissionCheckResult::allow(Tier::Two, "fine");
        assert!(ok.into_result("ls").is_ok());

        let denied = PermissionCheckResult::deny(Tier::One, "Command 'rm' is not permitted for tier 1");
        match denied.into_result("rm -rf /tmp") {
            Err(SandboxError::PermissionDenied { tier, command, reason }) => {
                assert_eq!(tier, Tier::One);
                assert_eq!(command, "rm -rf /tmp");
                assert!(reason.contains("'rm'"));
            }
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
    }
}
