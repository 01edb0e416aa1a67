//! Permission manager implementation
//!
//! Composes the command allowlist, filesystem guard and network guard into a
//! single verdict for one customer session:
//! - `PermissionManager`: owned, single-writer (`set_tier` takes `&mut self`)
//! - `SharedPermissionManager`: `Arc<RwLock<>>` handle for managers shared
//!   across tasks; tier changes are serialized against in-flight checks

use std::sync::{Arc, PoisonError, RwLock};

use super::allowlist::{command_allowlist, match_command};
use super::fs_guard::{allowed_fs_types, check_fs_access};
use super::network_guard::{check_network_access, network_access, NetworkAccess};
use super::segmenter::parse_command_segments;
use super::types::{CommandPermission, PermissionCheckResult, PermissionLevel, Tier};
use crate::core::{FsType, SandboxResult};

/// Default concurrent executions per session
pub const DEFAULT_MAX_CONCURRENT: usize = 5;
/// Default per-execution time budget in milliseconds
pub const DEFAULT_MAX_EXEC_TIME_MS: u64 = 30_000;

/// Full permission set for a single tier, for display and host wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPermissions {
    pub tier: Tier,
    pub commands: Vec<CommandPermission>,
    pub filesystem: Vec<FsType>,
    pub network: NetworkAccess,
    pub max_concurrent: usize,
    pub max_exec_time_ms: u64,
}

impl TierPermissions {
    /// Materialize the built-in permission set for a tier
    pub fn for_tier(tier: Tier) -> Self {
        Self {
            tier,
            commands: command_allowlist(tier),
            filesystem: allowed_fs_types(tier).to_vec(),
            network: network_access(tier),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_exec_time_ms: DEFAULT_MAX_EXEC_TIME_MS,
        }
    }
}

/// Per-session permission manager
///
/// Holds the current tier, the caller-supplied custom rules and the
/// materialized allowlist (tier rules followed by custom rules). Custom rules
/// are appended after the universal denies, so they can never re-enable a
/// universally denied command.
///
/// ```rust,ignore
/// let mut pm = PermissionManager::for_tier(Tier::Two);
/// let result = pm.check_command("curl https://api.github.com/zen");
/// assert!(result.allowed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionManager {
    tier: Tier,
    custom_commands: Vec<CommandPermission>,
    allowlist: Vec<CommandPermission>,
}

impl PermissionManager {
    /// Create a manager with custom rules
    ///
    /// Fails if any custom rule is malformed.
    pub fn new(tier: Tier, custom_commands: Vec<CommandPermission>) -> SandboxResult<Self> {
        for rule in &custom_commands {
            rule.validate()?;
        }

        if !custom_commands.is_empty() {
            tracing::info!(
                %tier,
                count = custom_commands.len(),
                "Creating permission manager with custom rules"
            );
        }

        Ok(Self {
            tier,
            allowlist: build_allowlist(tier, &custom_commands),
            custom_commands,
        })
    }

    /// Create a manager with only the built-in rules
    pub fn for_tier(tier: Tier) -> Self {
        Self {
            tier,
            custom_commands: Vec::new(),
            allowlist: command_allowlist(tier),
        }
    }

    /// Check a command line against the allowlist
    ///
    /// Every segment must resolve to an allow rule. The first unmatched or
    /// denied segment fails the whole line. Any audited segment makes the
    /// whole line audited.
    pub fn check_command(&self, command_line: &str) -> PermissionCheckResult {
        let segments = parse_command_segments(command_line);

        if segments.is_empty() {
            return PermissionCheckResult::allow(self.tier, "Empty command");
        }

        let mut audit_required = false;

        for cmd in &segments {
            let Some(rule) = match_command(cmd, &self.allowlist) else {
                tracing::debug!(tier = %self.tier, command = %cmd, "no matching rule");
                return PermissionCheckResult::deny(
                    self.tier,
                    format!("Command '{}' is not permitted for tier {}", cmd, self.tier),
                );
            };

            match rule.level {
                PermissionLevel::Deny => {
                    tracing::debug!(tier = %self.tier, command = %cmd, "explicit deny rule");
                    let reason = rule
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Command '{}' is denied", cmd));
                    return PermissionCheckResult::deny(self.tier, reason);
                }
                PermissionLevel::AllowWithAudit => audit_required = true,
                PermissionLevel::Allow => {}
            }
        }

        PermissionCheckResult::allow(
            self.tier,
            format!("All commands permitted for tier {}", self.tier),
        )
        .with_audit(audit_required)
    }

    /// Check filesystem access for the current tier
    pub fn check_filesystem(&self, fs_type: FsType) -> PermissionCheckResult {
        check_fs_access(self.tier, fs_type)
    }

    /// Check network preset access for the current tier
    pub fn check_network<S: AsRef<str>>(&self, presets: &[S]) -> PermissionCheckResult {
        check_network_access(self.tier, presets)
    }

    /// Combined check: command, then filesystem, then network
    ///
    /// Returns the first denial unchanged. On success the audit flag is the
    /// command check's flag.
    pub fn check_all<S: AsRef<str>>(
        &self,
        command_line: &str,
        fs_type: FsType,
        network_presets: &[S],
    ) -> PermissionCheckResult {
        let cmd_check = self.check_command(command_line);
        if !cmd_check.allowed {
            return cmd_check;
        }

        let fs_check = self.check_filesystem(fs_type);
        if !fs_check.allowed {
            return fs_check;
        }

        let net_check = self.check_network(network_presets);
        if !net_check.allowed {
            return net_check;
        }

        PermissionCheckResult::allow(
            self.tier,
            format!("All checks passed for tier {}", self.tier),
        )
        .with_audit(cmd_check.audit_required)
    }

    /// Change the tier (e.g. customer upgrade)
    ///
    /// Rebuilds the allowlist from the tier rules plus the original custom
    /// rules. Takes effect for subsequent checks only.
    pub fn set_tier(&mut self, tier: Tier) {
        if tier != self.tier {
            tracing::info!(from = %self.tier, to = %tier, "Changing permission tier");
        }
        self.tier = tier;
        self.allowlist = build_allowlist(tier, &self.custom_commands);
    }

    /// A copy of this manager at another tier, leaving `self` untouched
    pub fn with_tier(&self, tier: Tier) -> Self {
        Self {
            tier,
            custom_commands: self.custom_commands.clone(),
            allowlist: build_allowlist(tier, &self.custom_commands),
        }
    }

    /// Get the current tier
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Get the custom rules supplied at construction
    pub fn custom_commands(&self) -> &[CommandPermission] {
        &self.custom_commands
    }

    /// Get the materialized rule list
    pub fn allowlist(&self) -> &[CommandPermission] {
        &self.allowlist
    }
}

fn build_allowlist(tier: Tier, custom: &[CommandPermission]) -> Vec<CommandPermission> {
    let mut rules = command_allowlist(tier);
    rules.extend_from_slice(custom);
    rules
}

/// Permission manager shared across tasks
///
/// Checks take a read lock and `set_tier` takes the write lock, so a check
/// never observes a half-rebuilt allowlist.
#[derive(Debug, Clone)]
pub struct SharedPermissionManager {
    inner: Arc<RwLock<PermissionManager>>,
}

impl SharedPermissionManager {
    pub fn new(manager: PermissionManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// Run a read-only operation against the current snapshot
    pub fn read<R>(&self, f: impl FnOnce(&PermissionManager) -> R) -> R {
        // Checks are pure, so a poisoned lock still holds a consistent manager.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    pub fn check_all<S: AsRef<str>>(
        &self,
        command_line: &str,
        fs_type: FsType,
        network_presets: &[S],
    ) -> PermissionCheckResult {
        self.read(|pm| pm.check_all(command_line, fs_type, network_presets))
    }

    pub fn check_command(&self, command_line: &str) -> PermissionCheckResult {
        self.read(|pm| pm.check_command(command_line))
    }

    pub fn set_tier(&self, tier: Tier) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.set_tier(tier);
    }

    pub fn tier(&self) -> Tier {
        self.read(PermissionManager::tier)
    }

    /// Clone out the current manager state
    pub fn snapshot(&self) -> PermissionManager {
        self.read(PermissionManager::clone)
    }
}

impl From<PermissionManager> for SharedPermissionManager {
    fn from(manager: PermissionManager) -> Self {
        Self::new(manager)
    }
}
