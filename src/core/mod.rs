//! Core types shared across the sandbox policy layer
//!
//! - `FsType` - Filesystem isolation modes an interpreter can run under
//! - `SandboxError` - Error types

pub mod error;
pub mod fs_type;

pub use error::{SandboxError, SandboxResult};
pub use fs_type::FsType;
