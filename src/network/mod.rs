//! Network allowlist presets
//!
//! Named presets map to URL prefixes and HTTP methods. A sandbox config picks
//! presets by name (plus optional custom HTTPS prefixes), and
//! `build_network_config` merges them into the allowlist handed to the
//! interpreter. Which presets a tier may request at all is decided by
//! [`crate::permissions::check_network_access`].

mod config_builder;
mod presets;

pub use config_builder::{
    build_network_config, network_config_for, resolve_network_presets, validate_https_url,
    NetworkConfig,
};
pub use presets::{default_presets_for, get_preset, preset_names, HttpMethod, NetworkPreset, PRESETS};
