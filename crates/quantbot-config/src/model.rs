// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Quantbot trading process.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Quantbot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuantbotConfig {
    /// Process identity and run-mode settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Credential vault settings.
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Process identity and run-mode configuration.
///
/// The vault is mode-agnostic: `mode` is consumed by the trading engine
/// only and the vault is invoked identically in every mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Run mode: `backtest`, `paper`, or `live`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            mode: default_mode(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "quantbot".to_string()
}

fn default_mode() -> String {
    "backtest".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The run modes the trading process accepts.
pub const VALID_MODES: &[&str] = &["backtest", "paper", "live"];

/// Credential vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path to the encrypted vault file.
    #[serde(default = "default_vault_path")]
    pub path: String,

    /// Bounded wait for the vault file lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Secret names that must be present for startup to succeed.
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
            required: Vec::new(),
        }
    }
}

fn default_vault_path() -> String {
    "secrets/keys.enc".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    5000
}
