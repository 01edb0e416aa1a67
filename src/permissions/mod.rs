//! Tier-based permission system
//!
//! Decides, for a customer tier (1-4), whether a compound command line, a
//! filesystem isolation mode and a set of network presets are allowed.
//!
//! ## Pieces
//!
//! - `parse_command_segments`: splits a command line into base command names
//! - `command_allowlist` / `match_command`: cumulative per-tier rule tables
//! - `check_fs_access`: tier → filesystem mode membership
//! - `check_network_access`: tier → network preset membership
//! - `PermissionManager`: stateful façade combining all three
//!
//! Every check returns a [`PermissionCheckResult`]. A denial is a value,
//! never an error.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tiered_sandbox::permissions::{PermissionManager, Tier};
//! use tiered_sandbox::core::FsType;
//!
//! let pm = PermissionManager::for_tier(Tier::Two);
//! let verdict = pm.check_all("cat data.json | jq .name", FsType::Overlay, &["standard"]);
//! if !verdict.allowed {
//!     eprintln!("{}", verdict.reason);
//! }
//! ```

mod allowlist;
mod fs_guard;
mod manager;
mod network_guard;
mod segmenter;
mod types;

pub use allowlist::{command_allowlist, match_command, tier_rules, universal_deny};
pub use fs_guard::{allowed_fs_types, check_fs_access};
pub use manager::{
    PermissionManager, SharedPermissionManager, TierPermissions, DEFAULT_MAX_CONCURRENT,
    DEFAULT_MAX_EXEC_TIME_MS,
};
pub use network_guard::{check_network_access, network_access, NetworkAccess, NO_NETWORK_PRESET};
pub use segmenter::parse_command_segments;
pub use types::{CommandPermission, PermissionCheckResult, PermissionLevel, Tier};
