//! Turns raw interpreter output into a [`SkillExecResult`]

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use super::types::{SkillExecRequest, SkillExecResult};
use crate::core::FsType;
use crate::interpreter::ExecOutput;

/// Maximum stdout/stderr length in characters (1 MiB)
pub const MAX_OUTPUT_LENGTH: usize = 1_048_576;

/// Appended to output cut at [`MAX_OUTPUT_LENGTH`]
pub const TRUNCATION_MARKER: &str = "[output truncated]";

/// Exit code reported when a command is found but not permitted
pub const PERMISSION_DENIED_EXIT_CODE: i32 = 126;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-9;]*[A-Za-z]").expect("ANSI escape pattern is valid")
});

static ERROR_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)command not found", "Command not available in sandbox"),
        (r"(?i)permission denied", "Insufficient permissions for this operation"),
        (r"(?i)no such file", "File or directory not found"),
    ]
    .into_iter()
    .map(|(pattern, message)| {
        (
            Regex::new(pattern).expect("error pattern is valid"),
            message,
        )
    })
    .collect()
});

/// Strip ANSI CSI escapes and cap the length
pub fn sanitize(raw: &str) -> String {
    let stripped = ANSI_ESCAPE.replace_all(raw, "");

    match stripped.char_indices().nth(MAX_OUTPUT_LENGTH) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&stripped[..cut]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => stripped.into_owned(),
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Build the structured result for a completed execution
pub fn handle_result(
    raw: ExecOutput,
    request: &SkillExecRequest,
    started: Instant,
    fs_type: FsType,
) -> SkillExecResult {
    SkillExecResult {
        stdout: sanitize(&raw.stdout),
        stderr: sanitize(&raw.stderr),
        exit_code: raw.exit_code,
        duration_ms: millis(started.elapsed()),
        sandbox_tier: fs_type,
        skill_id: request.skill_id.clone(),
        timestamp: Utc::now(),
    }
}

/// Result for a request the permission check rejected
pub fn permission_denied(request: &SkillExecRequest, fs_type: FsType, reason: &str) -> SkillExecResult {
    SkillExecResult {
        stdout: String::new(),
        stderr: format!("Permission denied: {}", reason),
        exit_code: PERMISSION_DENIED_EXIT_CODE,
        duration_ms: 0,
        sandbox_tier: fs_type,
        skill_id: request.skill_id.clone(),
        timestamp: Utc::now(),
    }
}

/// Result for an interpreter that failed rather than exiting non-zero
pub fn execution_failed(
    request: &SkillExecRequest,
    started: Instant,
    fs_type: FsType,
    error: &anyhow::Error,
) -> SkillExecResult {
    SkillExecResult {
        stdout: String::new(),
        stderr: sanitize(&format!("Execution failed: {:#}", error)),
        exit_code: 1,
        duration_ms: millis(started.elapsed()),
        sandbox_tier: fs_type,
        skill_id: request.skill_id.clone(),
        timestamp: Utc::now(),
    }
}

/// Map well-known stderr text to a friendlier message
pub fn detect_error_pattern(result: &SkillExecResult) -> Option<&'static str> {
    ERROR_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&result.stderr))
        .map(|(_, message)| *message)
}
