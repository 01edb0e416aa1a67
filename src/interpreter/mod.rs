//! Interpreter boundary
//!
//! The policy layer never runs commands itself. A host plugs in an
//! [`InterpreterFactory`] that builds isolated shell interpreters for a
//! [`SandboxConfig`], and the adapter drives them through [`Interpreter`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SandboxConfig;
use crate::network::NetworkConfig;

/// Raw output of one interpreter call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    /// Successful output with only stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Failed output with only stderr
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

/// Per-call options layered over the interpreter's own config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    pub env: HashMap<String, String>,
    pub cwd: Option<String>,
}

/// An isolated shell interpreter
///
/// Implementations own their filesystem view and network allowlist; the
/// command line is passed through unmodified. A non-zero exit code is a
/// normal `Ok` result. `Err` is reserved for the interpreter itself failing.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Run a command line
    async fn exec(&self, command: &str, options: &ExecOptions) -> Result<ExecOutput>;
}

/// Builds interpreters for a validated sandbox config
pub trait InterpreterFactory: Send + Sync {
    /// Create an interpreter; `network` is `None` when networking is disabled
    fn create(
        &self,
        config: &SandboxConfig,
        network: Option<&NetworkConfig>,
    ) -> Result<Arc<dyn Interpreter>>;
}
