//! Audit log for sandboxed executions
//!
//! The most recent entries are kept in memory and, when a sink path is
//! configured, every entry is appended to a JSONL file (one serialized
//! [`AuditEntry`] per line).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::SandboxConfig;
use crate::core::{FsType, SandboxResult};
use crate::permissions::Tier;

/// Skill id used for entries not tied to a skill execution
pub const SYSTEM_SKILL_ID: &str = "_system";

/// One recorded execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub skill_id: String,
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
    /// Filesystem mode the command ran under
    pub tier: FsType,
    /// Customer tier, when a permission manager was installed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_tier: Option<Tier>,
}

impl AuditEntry {
    pub fn new(
        skill_id: impl Into<String>,
        command: impl Into<String>,
        exit_code: i32,
        duration_ms: u64,
        tier: FsType,
        permission_tier: Option<Tier>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            skill_id: skill_id.into(),
            command: command.into(),
            exit_code,
            duration_ms,
            tier,
            permission_tier,
        }
    }

    /// Entry for a host-level event such as a config change
    pub fn system(event: impl Into<String>, tier: FsType) -> Self {
        Self::new(SYSTEM_SKILL_ID, event, 0, 0, tier, None)
    }
}

/// In-memory entries kept by default; older entries are dropped first
pub const DEFAULT_AUDIT_CAPACITY: usize = 1_000;

/// Bounded in-memory audit log with an optional JSONL file sink
#[derive(Debug)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
    sink: Option<PathBuf>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: DEFAULT_AUDIT_CAPACITY,
            sink: None,
        }
    }
}

impl AuditLog {
    /// Memory-only log
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Log that also appends to `path`
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: Some(path.into()),
            ..Self::default()
        }
    }

    /// File-backed when `audit_log` is enabled in the config, memory-only otherwise
    pub fn for_config(config: &SandboxConfig) -> Self {
        Self {
            sink: Self::sink_for(config),
            ..Self::default()
        }
    }

    /// Keep at most `capacity` entries in memory; 0 keeps none
    ///
    /// The file sink, if any, still receives every entry.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self.trim();
        self
    }

    /// Point the sink at whatever `config` asks for, keeping in-memory entries
    pub fn retarget(&mut self, config: &SandboxConfig) {
        self.sink = Self::sink_for(config);
    }

    fn sink_for(config: &SandboxConfig) -> Option<PathBuf> {
        config.audit_log.then(|| config.audit_log_path.clone())
    }

    pub fn sink(&self) -> Option<&Path> {
        self.sink.as_deref()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an entry
    ///
    /// The entry is kept in memory even if writing the sink fails.
    pub fn record(&mut self, entry: AuditEntry) -> SandboxResult<()> {
        tracing::debug!(
            skill = %entry.skill_id,
            command = %entry.command,
            exit_code = entry.exit_code,
            "Audit entry recorded"
        );

        let line = serde_json::to_string(&entry)?;
        self.entries.push_back(entry);
        self.trim();

        if let Some(path) = &self.sink {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", line)?;
        }

        Ok(())
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// In-memory entries, oldest first
    pub fn entries(&self) -> &VecDeque<AuditEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop in-memory entries; the file sink is left untouched
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
