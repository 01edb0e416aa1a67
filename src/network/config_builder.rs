//! Merge presets and custom URLs into an interpreter network config

use serde::{Deserialize, Serialize};
use url::Url;

use super::presets::{default_presets_for, get_preset, HttpMethod};
use crate::config::SandboxConfig;
use crate::core::{SandboxError, SandboxResult};

/// Network allowlist handed to the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub allowed_url_prefixes: Vec<String>,
    pub allowed_methods: Vec<HttpMethod>,
}

/// Reject URL prefixes that do not parse or are not HTTPS
pub fn validate_https_url(url: &str) -> SandboxResult<()> {
    let parsed =
        Url::parse(url).map_err(|e| SandboxError::InvalidUrl(format!("\"{}\" ({})", url, e)))?;

    if parsed.scheme() != "https" {
        return Err(SandboxError::InvalidUrl(format!(
            "\"{}\" must use HTTPS (got {}:)",
            url,
            parsed.scheme()
        )));
    }

    Ok(())
}

/// Merge presets and custom URLs into a single [`NetworkConfig`]
///
/// URL prefixes and methods are deduplicated, keeping first-seen order.
/// Returns `None` when nothing is configured, meaning the network stays
/// disabled.
pub fn build_network_config<S: AsRef<str>>(
    preset_names: &[S],
    custom_urls: &[S],
) -> SandboxResult<Option<NetworkConfig>> {
    let mut urls: Vec<String> = Vec::new();
    let mut methods: Vec<HttpMethod> = Vec::new();

    for name in preset_names {
        let preset = get_preset(name.as_ref())?;
        for url in preset.allowed_url_prefixes {
            if !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
        for method in preset.allowed_methods {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }
    }

    for url in custom_urls {
        let url = url.as_ref();
        validate_https_url(url)?;
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    if urls.is_empty() && methods.is_empty() {
        tracing::debug!("No network presets configured, network disabled");
        return Ok(None);
    }

    tracing::debug!(
        prefixes = urls.len(),
        methods = methods.len(),
        "Built network config"
    );

    Ok(Some(NetworkConfig {
        allowed_url_prefixes: urls,
        allowed_methods: methods,
    }))
}

/// Presets a config should run with: its explicit list, or the default for
/// its filesystem mode when the list is empty
pub fn resolve_network_presets(config: &SandboxConfig) -> Vec<String> {
    if config.network_presets.is_empty() {
        default_presets_for(config.fs_type)
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        config.network_presets.clone()
    }
}

/// Build the network config for a sandbox config
pub fn network_config_for(config: &SandboxConfig) -> SandboxResult<Option<NetworkConfig>> {
    build_network_config(&resolve_network_presets(config), &config.custom_network_urls)
}
