//! Per-tier command rule tables
//!
//! Tiers are cumulative: the list for tier N is the universal deny set,
//! followed by the incremental rules of every tier up to and including N.

use super::types::{CommandPermission, PermissionLevel, Tier};

use PermissionLevel::{Allow, AllowWithAudit, Deny};

/// Commands denied at every tier, regardless of custom rules
const UNIVERSAL_DENY: &[(&str, &str)] = &[
    ("sudo", "Privilege escalation blocked"),
    ("su", "User switching blocked"),
    ("mount", "Filesystem mounting blocked"),
    ("umount", "Filesystem unmounting blocked"),
    ("mkfs", "Filesystem creation blocked"),
    ("dd", "Raw disk access blocked"),
    ("shutdown", "System shutdown blocked"),
    ("reboot", "System reboot blocked"),
    ("systemctl", "Service management blocked"),
    ("launchctl", "macOS service management blocked"),
];

/// Read-only, side-effect-free commands
const TIER_1_ALLOW: &[&str] = &[
    "echo", "cat", "head", "tail", "grep", "find", "ls", "wc", "sort", "uniq", "date", "env",
    "pwd", "whoami", "true", "false", "test", "printf",
];

/// File mutation, data transforms and limited network tools
const TIER_2_ALLOW: &[&str] = &[
    "mkdir", "cp", "mv", "tee", "sed", "awk", "jq", "curl", "wget", "tar", "gzip", "gunzip",
    "touch", "basename", "dirname", "xargs", "tr", "cut", "paste", "diff",
];

/// Developer tooling; destructive operations are audited
const TIER_3_RULES: &[(&str, PermissionLevel, &str)] = &[
    ("rm", AllowWithAudit, "Tier 3: destructive (audited)"),
    ("chmod", AllowWithAudit, "Tier 3: permission change (audited)"),
    ("npm", Allow, "Tier 3: package manager"),
    ("npx", Allow, "Tier 3: package runner"),
    ("node", Allow, "Tier 3: Node.js runtime"),
    ("python3", Allow, "Tier 3: Python runtime"),
    ("python", Allow, "Tier 3: Python runtime"),
    ("pip", Allow, "Tier 3: Python packages"),
    ("git", AllowWithAudit, "Tier 3: version control (audited)"),
];

/// Container, OS package and ownership operations, all audited
const TIER_4_RULES: &[(&str, PermissionLevel, &str)] = &[
    ("docker", AllowWithAudit, "Tier 4: container runtime (audited)"),
    ("brew", AllowWithAudit, "Tier 4: package manager (audited)"),
    ("chown", AllowWithAudit, "Tier 4: ownership change (audited)"),
];

/// The universal deny rules
pub fn universal_deny() -> Vec<CommandPermission> {
    UNIVERSAL_DENY
        .iter()
        .map(|(cmd, desc)| CommandPermission::builtin(cmd, Deny, desc))
        .collect()
}

/// Rules introduced at exactly `tier` (not including lower tiers)
pub fn tier_rules(tier: Tier) -> Vec<CommandPermission> {
    match tier {
        Tier::One => TIER_1_ALLOW
            .iter()
            .map(|cmd| CommandPermission::builtin(cmd, Allow, "Tier 1: read-only operation"))
            .collect(),
        Tier::Two => TIER_2_ALLOW
            .iter()
            .map(|cmd| CommandPermission::builtin(cmd, Allow, "Tier 2: standard operation"))
            .collect(),
        Tier::Three => from_table(TIER_3_RULES),
        Tier::Four => from_table(TIER_4_RULES),
    }
}

fn from_table(table: &[(&str, PermissionLevel, &str)]) -> Vec<CommandPermission> {
    table
        .iter()
        .map(|(cmd, level, desc)| CommandPermission::builtin(cmd, *level, desc))
        .collect()
}

/// Build the cumulative command allowlist for a tier
///
/// Universal denies always come first.
pub fn command_allowlist(tier: Tier) -> Vec<CommandPermission> {
    let mut rules = universal_deny();
    for level in Tier::ALL.into_iter().filter(|t| *t <= tier) {
        rules.extend(tier_rules(level));
    }
    rules
}

/// Match a command name against a rule list
///
/// Priority: deny > first allow/audit rule in scan order > no match.
/// `None` is an implicit deny at the call site.
pub fn match_command<'a>(
    command_name: &str,
    allowlist: &'a [CommandPermission],
) -> Option<&'a CommandPermission> {
    allowlist
        .iter()
        .find(|p| p.level.is_deny() && p.pattern == command_name)
        .or_else(|| {
            allowlist
                .iter()
                .find(|p| !p.level.is_deny() && p.pattern == command_name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed_names(tier: Tier) -> Vec<String> {
        command_allowlist(tier)
            .into_iter()
            .filter(|p| !p.level.is_deny())
            .map(|p| p.pattern)
            .collect()
    }

    #[test]
    fn test_tier_1_read_only() {
        let names = allowed_names(Tier::One);
        for cmd in ["echo", "cat", "grep", "ls"] {
            assert!(names.iter().any(|n| n == cmd), "missing {}", cmd);
        }
        for cmd in ["mkdir", "curl", "rm"] {
            assert!(!names.iter().any(|n| n == cmd), "unexpected {}", cmd);
        }
    }

    #[test]
    fn test_tier_2_inherits_tier_1() {
        let names = allowed_names(Tier::Two);
        for cmd in ["echo", "mkdir", "curl", "jq"] {
            assert!(names.iter().any(|n| n == cmd), "missing {}", cmd);
        }
    }

    #[test]
    fn test_tier_3_audited_rules() {
        let list = command_allowlist(Tier::Three);
        let level = |name: &str| list.iter().find(|p| p.pattern == name).map(|p| p.level);
        assert_eq!(level("rm"), Some(AllowWithAudit));
        assert_eq!(level("chmod"), Some(AllowWithAudit));
        assert_eq!(level("git"), Some(AllowWithAudit));
        assert_eq!(level("npm"), Some(Allow));
        assert_eq!(level("docker"), None);
    }

    #[test]
    fn test_tier_4_audited_rules() {
        let list = command_allowlist(Tier::Four);
        for cmd in ["docker", "brew", "chown"] {
            let rule = list.iter().find(|p| p.pattern == cmd).unwrap();
            assert_eq!(rule.level, AllowWithAudit);
        }
    }

    #[test]
    fn test_denies_come_first() {
        for tier in Tier::ALL {
            let list = command_allowlist(tier);
            let deny_count = UNIVERSAL_DENY.len();
            assert!(list[..deny_count].iter().all(|p| p.level.is_deny()));
            assert!(list[deny_count..].iter().all(|p| !p.level.is_deny()));
        }
    }

    #[test]
    fn test_cumulative_superset() {
        for pair in Tier::ALL.windows(2) {
            let lower = command_allowlist(pair[0]);
            let higher = command_allowlist(pair[1]);
            assert!(lower.iter().all(|rule| higher.contains(rule)));
            assert!(higher.len() > lower.len());
        }
    }

    #[test]
    fn test_match_allowed() {
        let list = command_allowlist(Tier::One);
        assert_eq!(match_command("echo", &list).map(|p| p.level), Some(Allow));
    }

    #[test]
    fn test_match_deny_has_priority() {
        let mut list = vec![CommandPermission::builtin("sudo", Allow, "custom allow")];
        list.extend(command_allowlist(Tier::Four));
        let rule = match_command("sudo", &list).unwrap();
        assert_eq!(rule.level, Deny);
        assert_eq!(rule.description.as_deref(), Some("Privilege escalation blocked"));
    }

    #[test]
    fn test_match_first_allow_wins() {
        let list = vec![
            CommandPermission::builtin("tool", AllowWithAudit, "first"),
            CommandPermission::builtin("tool", Allow, "second"),
        ];
        assert_eq!(
            match_command("tool", &list).and_then(|p| p.description.as_deref()),
            Some("first")
        );
    }

    #[test]
    fn test_match_unknown() {
        let list = command_allowlist(Tier::One);
        assert!(match_command("nonexistent_command", &list).is_none());
    }
}
