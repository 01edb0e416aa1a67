//! Filesystem guard: which isolation modes each tier may use

use super::types::{PermissionCheckResult, Tier};
use crate::core::FsType;

/// Filesystem types a tier may use (inclusive of lower tiers)
pub fn allowed_fs_types(tier: Tier) -> &'static [FsType] {
    match tier {
        Tier::One => &[FsType::InMemory],
        Tier::Two => &[FsType::InMemory, FsType::Overlay],
        Tier::Three | Tier::Four => &[FsType::InMemory, FsType::Overlay, FsType::ReadWrite],
    }
}

/// Check whether a tier is allowed to use a filesystem type
pub fn check_fs_access(tier: Tier, requested: FsType) -> PermissionCheckResult {
    let allowed = allowed_fs_types(tier);

    if allowed.contains(&requested) {
        tracing::debug!(%tier, fs = %requested, "filesystem access permitted");
        return PermissionCheckResult::allow(
            tier,
            format!("Tier {} permits {} filesystem", tier, requested),
        );
    }

    let names: Vec<&str> = allowed.iter().map(FsType::as_str).collect();
    tracing::debug!(%tier, fs = %requested, "filesystem access denied");
    PermissionCheckResult::deny(
        tier,
        format!(
            "Tier {} does not permit {} filesystem. Allowed: {}",
            tier,
            requested,
            names.join(", ")
        ),
    )
}
