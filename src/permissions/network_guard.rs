//! Network guard: which network presets each tier may request
//!
//! - Tier 1: no presets (only the empty / "none" request passes)
//! - Tier 2: standard
//! - Tier 3: standard + extended
//! - Tier 4: unrestricted, including custom preset names

use super::types::{PermissionCheckResult, Tier};

/// Sentinel preset meaning "no network"
pub const NO_NETWORK_PRESET: &str = "none";

/// Network presets a tier may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAccess {
    /// An explicit finite set of preset names
    Presets(&'static [&'static str]),
    /// Any preset name, known or not
    Unrestricted,
}

impl NetworkAccess {
    pub fn permits(&self, preset: &str) -> bool {
        match self {
            NetworkAccess::Presets(names) => names.contains(&preset),
            NetworkAccess::Unrestricted => true,
        }
    }
}

/// Network access granted to a tier
pub fn network_access(tier: Tier) -> NetworkAccess {
    match tier {
        Tier::One => NetworkAccess::Presets(&[]),
        Tier::Two => NetworkAccess::Presets(&["none", "standard"]),
        Tier::Three => NetworkAccess::Presets(&["none", "standard", "extended"]),
        Tier::Four => NetworkAccess::Unrestricted,
    }
}

/// Check whether a tier is allowed to use the requested network presets
///
/// An empty request, or exactly `["none"]`, is always allowed. A denial
/// names each disallowed preset once, in the order first requested, so a
/// repeated name does not repeat in the reason.
pub fn check_network_access<S: AsRef<str>>(tier: Tier, requested: &[S]) -> PermissionCheckResult {
    let requested: Vec<&str> = requested.iter().map(AsRef::as_ref).collect();

    if requested.is_empty() || requested == [NO_NETWORK_PRESET] {
        return PermissionCheckResult::allow(tier, "No network access requested");
    }

    let allowed = match network_access(tier) {
        NetworkAccess::Unrestricted => {
            tracing::debug!(%tier, presets = ?requested, "unrestricted network tier");
            return PermissionCheckResult::allow(
                tier,
                format!("Tier {} has unrestricted network access", tier),
            );
        }
        NetworkAccess::Presets(names) => names,
    };

    let mut denied: Vec<&str> = Vec::new();
    for preset in requested.iter().copied() {
        if !allowed.contains(&preset) && !denied.contains(&preset) {
            denied.push(preset);
        }
    }

    if denied.is_empty() {
        tracing::debug!(%tier, presets = ?requested, "network presets permitted");
        return PermissionCheckResult::allow(
            tier,
            format!(
                "Tier {} permits requested network presets: {}",
                tier,
                requested.join(", ")
            ),
        );
    }

    tracing::debug!(%tier, denied = ?denied, "network presets denied");
    let allowed_list = if allowed.is_empty() {
        "(none)".to_string()
    } else {
        allowed.join(", ")
    };
    PermissionCheckResult::deny(
        tier,
        format!(
            "Tier {} does not permit network presets: {}. Allowed: {}",
            tier,
            denied.join(", "),
            allowed_list
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: [&str; 0] = [];

    #[test]
    fn test_tier_1_only_none() {
        assert!(check_network_access(Tier::One, &EMPTY).allowed);
        assert!(check_network_access(Tier::One, &["none"]).allowed);
        assert!(!check_network_access(Tier::One, &["standard"]).allowed);
    }

    #[test]
    fn test_tier_2_standard_only() {
        assert!(check_network_access(Tier::Two, &["standard"]).allowed);
        assert!(check_network_access(Tier::Two, &["none", "standard"]).allowed);
        assert!(!check_network_access(Tier::Two, &["extended"]).allowed);
    }

    #[test]
    fn test_tier_3_standard_and_extended() {
        assert!(check_network_access(Tier::Three, &["standard"]).allowed);
        assert!(check_network_access(Tier::Three, &["extended"]).allowed);
        assert!(check_network_access(Tier::Three, &["standard", "extended"]).allowed);
        assert!(!check_network_access(Tier::Three, &["custom"]).allowed);
    }

    #[test]
    fn test_tier_4_unrestricted() {
        for preset in ["standard", "extended", "custom", "anything-unregistered"] {
            assert!(check_network_access(Tier::Four, &[preset]).allowed);
        }
    }

    #[test]
    fn test_denial_names_exact_presets() {
        let result = check_network_access(Tier::Two, &["standard", "extended", "extended", "full"]);
        assert!(!result.allowed);
        assert_eq!(
            result.reason,
            "Tier 2 does not permit network presets: extended, full. Allowed: none, standard"
        );
    }

    #[test]
    fn test_tier_1_denial_reason() {
        let result = check_network_access(Tier::One, &["standard"]);
        assert!(result.reason.contains("standard"));
        assert!(result.reason.ends_with("Allowed: (none)"));
    }

    #[test]
    fn test_accepts_owned_strings() {
        let presets = vec!["standard".to_string()];
        assert!(check_network_access(Tier::Two, &presets).allowed);
    }

    #[test]
    fn test_monotonic() {
        for pair in Tier::ALL.windows(2) {
            let (lower, higher) = (network_access(pair[0]), network_access(pair[1]));
            if let NetworkAccess::Presets(names) = lower {
                assert!(names.iter().all(|p| higher.permits(p)));
            }
        }
    }
}
