//! Skill adapter
//!
//! Bridges the skill registry, the permission manager and the interpreter
//! factory. For each request it resolves the skill's filesystem mode and
//! network presets, gates the command line through the permission manager,
//! then runs it on a cached interpreter.
//!
//! The permission check covers the presets the skill itself asks for. Network
//! access that comes from the base config is the host's choice and is not
//! gated per customer tier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use super::registry::SkillRegistry;
use super::result_handler::{execution_failed, handle_result, permission_denied};
use super::types::{SkillExecRequest, SkillExecResult};
use crate::audit::{AuditEntry, AuditLog};
use crate::config::SandboxConfig;
use crate::core::{FsType, SandboxError, SandboxResult};
use crate::interpreter::{ExecOptions, Interpreter, InterpreterFactory};
use crate::network::{build_network_config, resolve_network_presets};
use crate::permissions::{PermissionManager, SharedPermissionManager};

/// Runs skill requests inside appropriately configured sandboxes
pub struct SkillAdapter {
    base_config: SandboxConfig,
    registry: SkillRegistry,
    factory: Arc<dyn InterpreterFactory>,
    permission_manager: Option<SharedPermissionManager>,
    /// Interpreters keyed by `"<fs>:<json presets>"`
    cache: Mutex<HashMap<String, Arc<dyn Interpreter>>>,
    audit_log: Mutex<AuditLog>,
}

impl SkillAdapter {
    /// Create an adapter with no permission manager
    ///
    /// The audit log writes to `audit_log_path` when the base config enables
    /// `audit_log`.
    pub fn new(
        base_config: SandboxConfig,
        registry: SkillRegistry,
        factory: Arc<dyn InterpreterFactory>,
    ) -> Self {
        Self {
            registry,
            factory,
            permission_manager: None,
            cache: Mutex::new(HashMap::new()),
            audit_log: Mutex::new(AuditLog::for_config(&base_config)),
            base_config,
        }
    }

    /// Gate every execution through a permission manager
    pub fn with_permission_manager(mut self, manager: impl Into<SharedPermissionManager>) -> Self {
        self.permission_manager = Some(manager.into());
        self
    }

    /// Use a specific audit log until the next [`reconfigure`](Self::reconfigure)
    pub fn with_audit_log(mut self, audit_log: AuditLog) -> Self {
        self.audit_log = Mutex::new(audit_log);
        self
    }

    /// Set or remove the permission manager at runtime
    pub fn set_permission_manager(&mut self, manager: Option<PermissionManager>) {
        match &manager {
            Some(pm) => tracing::info!(tier = %pm.tier(), "Permission manager installed"),
            None => tracing::info!("Permission manager removed"),
        }
        self.permission_manager = manager.map(SharedPermissionManager::new);
    }

    /// Handle to the installed permission manager, for tier changes while
    /// requests are in flight
    pub fn permission_manager(&self) -> Option<&SharedPermissionManager> {
        self.permission_manager.as_ref()
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SkillRegistry {
        &mut self.registry
    }

    pub fn base_config(&self) -> &SandboxConfig {
        &self.base_config
    }

    /// Replace the base config
    ///
    /// Cached interpreters were built from the old config, so they are
    /// dropped. The audit sink follows the new config and the change is
    /// recorded there.
    pub fn reconfigure(&mut self, config: SandboxConfig) {
        self.cache.get_mut().clear();
        let audit_log = self.audit_log.get_mut();
        audit_log.retarget(&config);
        let entry = AuditEntry::system("config_change", config.fs_type);
        if let Err(e) = audit_log.record(entry) {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
        tracing::info!(fs_type = %config.fs_type, "Sandbox config replaced");
        self.base_config = config;
    }

    /// Execute a skill request
    ///
    /// Audited allows are always recorded. With `audit_log` enabled in the
    /// base config, every dispatched execution is recorded as well.
    ///
    /// A permission denial is returned as a result with exit code 126, and the
    /// interpreter is never invoked. An interpreter failure is returned as a
    /// result with exit code 1. `Err` is reserved for configuration problems:
    /// unknown skill, invalid merged config, or a factory that cannot build
    /// the sandbox.
    pub async fn execute(&self, request: &SkillExecRequest) -> SandboxResult<SkillExecResult> {
        let skill = self.registry.get(&request.skill_id)?;
        let fs_type = self.registry.tier_for_skill(&request.skill_id)?;
        let skill_presets = skill.required_network_presets.as_deref().unwrap_or(&[]);
        let command = request.full_command();

        let verdict = match &self.permission_manager {
            Some(pm) => {
                let verdict = pm.check_all(&command, fs_type, skill_presets);
                if !verdict.allowed {
                    tracing::warn!(
                        skill = %request.skill_id,
                        tier = %verdict.tier,
                        reason = %verdict.reason,
                        "Skill execution denied"
                    );
                    return Ok(permission_denied(request, fs_type, &verdict.reason));
                }
                Some(verdict)
            }
            None => None,
        };

        let config = self.merged_config(fs_type, skill_presets);
        config.validate()?;
        let interpreter = self.interpreter_for(&config, skill_presets).await?;

        let options = ExecOptions {
            env: request.env.clone(),
            cwd: request.working_dir.clone(),
        };

        tracing::debug!(skill = %request.skill_id, %fs_type, command = %command, "Executing skill");

        let started = Instant::now();
        let result = match interpreter.exec(&command, &options).await {
            Ok(raw) => handle_result(raw, request, started, fs_type),
            Err(e) => {
                tracing::error!(skill = %request.skill_id, error = %e, "Interpreter failed");
                execution_failed(request, started, fs_type, &e)
            }
        };

        tracing::debug!(
            skill = %request.skill_id,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            "Skill completed"
        );

        let audit_required = verdict.as_ref().is_some_and(|v| v.audit_required);
        if audit_required || self.base_config.audit_log {
            let entry = AuditEntry::new(
                &request.skill_id,
                &command,
                result.exit_code,
                result.duration_ms,
                fs_type,
                verdict.map(|v| v.tier),
            );
            if let Err(e) = self.audit_log.lock().await.record(entry) {
                tracing::warn!(error = %e, "Failed to write audit entry");
            }
        }

        Ok(result)
    }

    /// Base config with the skill's filesystem mode and, if it names any,
    /// its network presets
    fn merged_config(&self, fs_type: FsType, skill_presets: &[String]) -> SandboxConfig {
        let mut config = self.base_config.clone();
        config.fs_type = fs_type;
        if !skill_presets.is_empty() {
            config.network_presets = skill_presets.to_vec();
        }
        config
    }

    /// Interpreters are keyed on the skill's own presets; the base config is
    /// fixed until `reconfigure`, which empties the cache
    async fn interpreter_for(
        &self,
        config: &SandboxConfig,
        skill_presets: &[String],
    ) -> SandboxResult<Arc<dyn Interpreter>> {
        let key = format!("{}:{}", config.fs_type, serde_json::to_string(skill_presets)?);

        let mut cache = self.cache.lock().await;
        if let Some(interpreter) = cache.get(&key) {
            return Ok(Arc::clone(interpreter));
        }

        let presets = resolve_network_presets(config);
        let network = build_network_config(&presets, &config.custom_network_urls)?;
        let interpreter = self
            .factory
            .create(config, network.as_ref())
            .map_err(|e| SandboxError::SandboxCreation {
                fs_type: config.fs_type,
                message: format!("{:#}", e),
            })?;

        tracing::info!(key = %key, "Created sandbox interpreter");
        cache.insert(key, Arc::clone(&interpreter));
        Ok(interpreter)
    }

    /// Number of cached interpreters
    pub async fn cached_interpreters(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Snapshot of the audit entries recorded so far
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit_log.lock().await.entries().iter().cloned().collect()
    }

    /// Drop all cached interpreters
    pub async fn dispose(&self) {
        let mut cache = self.cache.lock().await;
        tracing::debug!(count = cache.len(), "Disposing sandbox interpreters");
        cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ExecOutput;
    use crate::network::NetworkConfig;
    use crate::permissions::Tier;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Interpreter for Echo {
        async fn exec(&self, command: &str, _options: &ExecOptions) -> anyhow::Result<ExecOutput> {
            Ok(ExecOutput::success(command))
        }
    }

    struct EchoFactory;

    impl InterpreterFactory for EchoFactory {
        fn create(
            &self,
            _config: &SandboxConfig,
            _network: Option<&NetworkConfig>,
        ) -> anyhow::Result<Arc<dyn Interpreter>> {
            Ok(Arc::new(Echo))
        }
    }

    fn quiet(mut config: SandboxConfig) -> SandboxConfig {
        config.audit_log = false;
        config
    }

    fn adapter() -> SkillAdapter {
        let base = quiet(SandboxConfig::read_write("/srv/customer").with_network_presets(["none"]));
        SkillAdapter::new(base, SkillRegistry::with_defaults(), Arc::new(EchoFactory))
    }

    #[test]
    fn test_merged_config_prefers_skill_presets() {
        let adapter = adapter();
        let config = adapter.merged_config(FsType::Overlay, &["standard".to_string()]);
        assert_eq!(config.fs_type, FsType::Overlay);
        assert_eq!(config.network_presets, vec!["standard"]);

        let config = adapter.merged_config(FsType::InMemory, &[]);
        assert_eq!(config.network_presets, vec!["none"]);
    }

    #[tokio::test]
    async fn test_execute_without_manager() {
        let adapter = adapter();
        let result = adapter
            .execute(&SkillExecRequest::new("ls", "ls").arg("-la"))
            .await
            .unwrap();
        assert_eq!(result.stdout, "ls -la");
        assert_eq!(result.sandbox_tier, FsType::InMemory);
        assert!(adapter.audit_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_reconfigure_clears_cache_and_audits() {
        let mut adapter = adapter().with_permission_manager(PermissionManager::for_tier(Tier::Three));
        adapter
            .execute(&SkillExecRequest::new("cat", "cat"))
            .await
            .unwrap();
        assert_eq!(adapter.cached_interpreters().await, 1);

        adapter.reconfigure(quiet(SandboxConfig::in_memory()));
        assert_eq!(adapter.cached_interpreters().await, 0);

        let entries = adapter.audit_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].skill_id, crate::audit::SYSTEM_SKILL_ID);
        assert_eq!(entries[0].command, "config_change");
    }

    #[tokio::test]
    async fn test_audit_sink_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");

        let mut base = SandboxConfig::in_memory();
        base.audit_log_path = first.clone();
        let mut adapter =
            SkillAdapter::new(base, SkillRegistry::with_defaults(), Arc::new(EchoFactory));

        // Not an audited command, but audit_log records every execution
        adapter.execute(&SkillExecRequest::new("ls", "ls")).await.unwrap();
        let written = std::fs::read_to_string(&first).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("\"ls\""));

        let mut next = SandboxConfig::in_memory();
        next.audit_log_path = second.clone();
        adapter.reconfigure(next);
        adapter.execute(&SkillExecRequest::new("date", "date")).await.unwrap();

        assert_eq!(std::fs::read_to_string(&first).unwrap().lines().count(), 1);
        let written = std::fs::read_to_string(&second).unwrap();
        let commands: Vec<String> = written
            .lines()
            .map(|line| serde_json::from_str::<AuditEntry>(line).unwrap().command)
            .collect();
        assert_eq!(commands, vec!["config_change", "date"]);
        assert_eq!(adapter.audit_entries().await.len(), 3);
    }
}
