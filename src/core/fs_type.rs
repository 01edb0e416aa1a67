//! Filesystem isolation modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::SandboxError;

/// Filesystem isolation mode a sandbox can run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsType {
    /// Pure in-memory filesystem, no disk access
    InMemory,
    /// Copy-on-write overlay: reads from disk, writes stay in memory
    Overlay,
    /// Direct read-write access scoped to a root directory
    ReadWrite,
}

impl FsType {
    pub const ALL: [FsType; 3] = [FsType::InMemory, FsType::Overlay, FsType::ReadWrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            FsType::InMemory => "inmemory",
            FsType::Overlay => "overlay",
            FsType::ReadWrite => "readwrite",
        }
    }

    /// Whether this mode needs a real directory to mount
    pub fn requires_root(&self) -> bool {
        !matches!(self, FsType::InMemory)
    }

    /// Human-readable description of the isolation mode
    pub fn description(&self) -> &'static str {
        match self {
            FsType::InMemory => "Pure in-memory filesystem, no disk access",
            FsType::Overlay => "Copy-on-write overlay, reads from disk and writes stay in memory",
            FsType::ReadWrite => "Direct read-write, scoped to root directory",
        }
    }

    /// Operations the mode supports, for display
    pub fn allowed_operations(&self) -> &'static [&'static str] {
        match self {
            FsType::InMemory => &["read", "write-memory", "execute"],
            FsType::Overlay => &["read", "read-disk", "write-memory", "execute"],
            FsType::ReadWrite => &["read", "read-disk", "write-disk", "execute"],
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FsType {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FsType::ALL
            .into_iter()
            .find(|fs| fs.as_str() == s)
            .ok_or_else(|| {
                SandboxError::invalid_config(
                    "fs_type",
                    format!("unknown filesystem type '{}', expected inmemory, overlay or readwrite", s),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for fs in FsType::ALL {
            assert_eq!(fs.as_str().parse::<FsType>().unwrap(), fs);
        }
        assert!("tmpfs".parse::<FsType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&FsType::ReadWrite).unwrap(), "\"readwrite\"");
        let fs: FsType = serde_json::from_str("\"inmemory\"").unwrap();
        assert_eq!(fs, FsType::InMemory);
    }

    #[test]
    fn test_requires_root() {
        assert!(!FsType::InMemory.requires_root());
        assert!(FsType::Overlay.requires_root());
        assert!(FsType::ReadWrite.requires_root());
    }
}
