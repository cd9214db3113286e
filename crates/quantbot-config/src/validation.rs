// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a non-empty vault path, a positive lock timeout,
//! and a recognized run mode.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{QuantbotConfig, VALID_MODES};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &QuantbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate run mode is one of the known values
    if !VALID_MODES.contains(&config.agent.mode.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.mode must be one of {}, got `{}`",
                VALID_MODES.join(", "),
                config.agent.mode
            ),
        });
    }

    // Validate vault path is not empty
    if config.vault.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.path must not be empty".to_string(),
        });
    }

    // Validate lock timeout is positive (a zero wait would make every
    // contended startup fail immediately)
    if config.vault.lock_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.lock_timeout_ms must be greater than 0".to_string(),
        });
    }

    // Validate required secret names are non-empty and unique
    let mut seen_names = HashSet::new();
    for (i, name) in config.vault.required.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("vault.required[{i}] must not be empty"),
            });
        }
        if !seen_names.insert(name) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate secret name `{name}` in vault.required"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = QuantbotConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_mode() {
        let mut config = QuantbotConfig::default();
        config.agent.mode = "turbo".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| {
            matches!(e, ConfigError::Validation { message } if message.contains("agent.mode"))
        }));
    }

    #[test]
    fn rejects_empty_vault_path() {
        let mut config = QuantbotConfig::default();
        config.vault.path = "  ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| {
            matches!(e, ConfigError::Validation { message } if message.contains("vault.path"))
        }));
    }

    #[test]
    fn rejects_zero_lock_timeout() {
        let mut config = QuantbotConfig::default();
        config.vault.lock_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| {
            matches!(e, ConfigError::Validation { message } if message.contains("lock_timeout_ms"))
        }));
    }

    #[test]
    fn rejects_duplicate_required_names() {
        let mut config = QuantbotConfig::default();
        config.vault.required = vec![
            "ALPACA_API_KEY".to_string(),
            "ALPACA_API_KEY".to_string(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| {
            matches!(e, ConfigError::Validation { message } if message.contains("duplicate"))
        }));
    }

    #[test]
    fn valid_toml_deserializes_and_validates() {
        let toml_str = r#"
            [agent]
            mode = "paper"

            [vault]
            path = "secrets/keys.enc"
            required = ["ALPACA_API_KEY", "ALPACA_SECRET_KEY"]
        "#;
        let config: QuantbotConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_key_is_rejected_at_deserialization() {
        let toml_str = r#"
            [vault]
            paht = "secrets/keys.enc"
        "#;
        let result = toml::from_str::<QuantbotConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn collects_all_errors_without_failing_fast() {
        let mut config = QuantbotConfig::default();
        config.agent.mode = "turbo".to_string();
        config.vault.path = String::new();
        config.vault.lock_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
