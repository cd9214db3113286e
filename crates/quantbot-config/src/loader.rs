// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./quantbot.toml` > `~/.config/quantbot/quantbot.toml`
//! > `/etc/quantbot/quantbot.toml` with environment variable overrides via
//! `QUANTBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use tracing::debug;

use crate::model::QuantbotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quantbot/quantbot.toml` (system-wide)
/// 3. `~/.config/quantbot/quantbot.toml` (user XDG config)
/// 4. `./quantbot.toml` (local directory)
/// 5. `QUANTBOT_*` environment variables
pub fn load_config() -> Result<QuantbotConfig, figment::Error> {
    let config: QuantbotConfig = Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(Toml::file("/etc/quantbot/quantbot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quantbot/quantbot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quantbot.toml"))
        .merge(env_provider())
        .extract()?;

    debug!(
        mode = %config.agent.mode,
        vault_path = %config.vault.path,
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<QuantbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuantbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `QUANTBOT_VAULT_LOCK_TIMEOUT_MS` must map
/// to `vault.lock_timeout_ms`, not `vault.lock.timeout.ms`.
fn env_provider() -> Env {
    // QUANTBOT_MASTER_KEY and QUANTBOT_NEW_MASTER_KEY carry key material for
    // the vault prompt layer; they are not config keys and must never be
    // deserialized (deny_unknown_fields would otherwise reject them).
    Env::prefixed("QUANTBOT_")
        .ignore(&["master_key", "new_master_key"])
        .map(|key| {
            // `key` is the lowercased env var name with prefix stripped.
            // Example: QUANTBOT_VAULT_PATH -> "vault_path"
            let key_str = key.as_str();
            let mapped = key_str
                .replacen("agent_", "agent.", 1)
                .replacen("vault_", "vault.", 1);
            mapped.into()
        })
}
