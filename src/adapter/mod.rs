//! Skill execution adapter
//!
//! Skills are named shell tools (cat, curl, rm, ...) with a trust level. The
//! adapter maps a skill request to a filesystem mode and network presets,
//! asks the permission manager for a verdict, and only then dispatches the
//! command to a sandboxed interpreter.
//!
//! ```rust,ignore
//! let adapter = SkillAdapter::new(base_config, SkillRegistry::with_defaults(), factory)
//!     .with_permission_manager(PermissionManager::for_tier(Tier::One));
//!
//! let result = adapter.execute(&SkillExecRequest::new("rm", "rm").arg("notes.txt")).await?;
//! assert_eq!(result.exit_code, 126);
//! ```

mod registry;
mod result_handler;
mod skill_adapter;
mod types;

pub use registry::SkillRegistry;
pub use result_handler::{
    detect_error_pattern, handle_result, sanitize, MAX_OUTPUT_LENGTH,
    PERMISSION_DENIED_EXIT_CODE, TRUNCATION_MARKER,
};
pub use skill_adapter::SkillAdapter;
pub use types::{SkillDefinition, SkillExecRequest, SkillExecResult, SkillTrustLevel};
