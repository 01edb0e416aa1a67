//! Built-in network allowlist presets

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{FsType, SandboxError, SandboxResult};

/// HTTP methods an interpreter's network layer can be allowed to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// A named set of URL prefixes and HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub allowed_url_prefixes: &'static [&'static str],
    pub allowed_methods: &'static [HttpMethod],
}

use HttpMethod::*;

const READ_ONLY: &[HttpMethod] = &[Get, Head];
const READ_POST: &[HttpMethod] = &[Get, Head, Post];

pub const PRESETS: &[NetworkPreset] = &[
    NetworkPreset {
        name: "none",
        description: "No network access (Tier 1 default)",
        allowed_url_prefixes: &[],
        allowed_methods: &[],
    },
    NetworkPreset {
        name: "github",
        description: "GitHub API (read-only)",
        allowed_url_prefixes: &["https://api.github.com/"],
        allowed_methods: READ_ONLY,
    },
    NetworkPreset {
        name: "anthropic",
        description: "Anthropic API",
        allowed_url_prefixes: &["https://api.anthropic.com/"],
        allowed_methods: READ_POST,
    },
    NetworkPreset {
        name: "openai",
        description: "OpenAI API",
        allowed_url_prefixes: &["https://api.openai.com/"],
        allowed_methods: READ_POST,
    },
    NetworkPreset {
        name: "vercel",
        description: "Vercel API (read-only)",
        allowed_url_prefixes: &["https://api.vercel.com/"],
        allowed_methods: READ_ONLY,
    },
    NetworkPreset {
        name: "stripe",
        description: "Stripe API",
        allowed_url_prefixes: &["https://api.stripe.com/"],
        allowed_methods: READ_POST,
    },
    NetworkPreset {
        name: "standard",
        description: "GitHub + Anthropic + OpenAI (Tier 2 default)",
        allowed_url_prefixes: &[
            "https://api.github.com/",
            "https://api.anthropic.com/",
            "https://api.openai.com/",
        ],
        allowed_methods: READ_POST,
    },
    NetworkPreset {
        name: "full",
        description: "All presets merged (Tier 3/4 default)",
        allowed_url_prefixes: &[
            "https://api.github.com/",
            "https://api.anthropic.com/",
            "https://api.openai.com/",
            "https://api.vercel.com/",
            "https://api.stripe.com/",
        ],
        allowed_methods: &[Get, Head, Post, Put, Delete, Patch, Options],
    },
];

/// Look up a preset by name
pub fn get_preset(name: &str) -> SandboxResult<&'static NetworkPreset> {
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| SandboxError::UnknownPreset {
            name: name.to_string(),
            available: preset_names().join(", "),
        })
}

/// Names of all built-in presets, in registry order
pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}

/// Default presets for a filesystem mode when a config names none
pub fn default_presets_for(fs_type: FsType) -> &'static [&'static str] {
    match fs_type {
        FsType::InMemory => &["none"],
        FsType::Overlay => &["standard"],
        FsType::ReadWrite => &["full"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_preset() {
        let preset = get_preset("github").unwrap();
        assert_eq!(preset.allowed_url_prefixes, &["https://api.github.com/"]);
        assert_eq!(preset.allowed_methods, &[Get, Head]);
    }

    #[test]
    fn test_unknown_preset_lists_available() {
        let err = get_preset("intranet").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"intranet\""));
        assert!(msg.contains("none, github, anthropic"));
        assert_eq!(err.code(), "SANDBOX_PRESET_UNKNOWN");
    }

    #[test]
    fn test_none_is_empty() {
        let preset = get_preset("none").unwrap();
        assert!(preset.allowed_url_prefixes.is_empty());
        assert!(preset.allowed_methods.is_empty());
    }

    #[test]
    fn test_all_prefixes_are_https() {
        for preset in PRESETS {
            for url in preset.allowed_url_prefixes {
                assert!(url.starts_with("https://"), "{} in {}", url, preset.name);
            }
        }
    }

    #[test]
    fn test_method_serde() {
        assert_eq!(serde_json::to_string(&Options).unwrap(), "\"OPTIONS\"");
        assert_eq!(Patch.to_string(), "PATCH");
    }
}
