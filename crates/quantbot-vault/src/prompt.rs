// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-secret acquisition via QUANTBOT_MASTER_KEY or a TTY prompt.
//!
//! The process entry point calls these once at startup and passes the result
//! down explicitly; the master secret is never stashed in a global, which
//! bounds its lifetime to the operations that need it.

use quantbot_core::QuantbotError;
use secrecy::SecretString;

/// The environment variable conventionally carrying the master secret.
pub const MASTER_KEY_ENV_VAR: &str = "QUANTBOT_MASTER_KEY";

/// The environment variable carrying the replacement secret for `rotate`.
pub const NEW_MASTER_KEY_ENV_VAR: &str = "QUANTBOT_NEW_MASTER_KEY";

/// Get the master secret from the environment or an interactive TTY prompt.
///
/// Priority:
/// 1. `QUANTBOT_MASTER_KEY` environment variable (for headless/systemd runs)
/// 2. Interactive TTY prompt via `rpassword` (for human operators)
///
/// Returns an error if neither source is available.
pub fn get_master_secret() -> Result<SecretString, QuantbotError> {
    // Check env var first.
    if let Ok(key) = std::env::var(MASTER_KEY_ENV_VAR)
        && !key.is_empty()
    {
        return Ok(SecretString::from(key));
    }

    // Try interactive prompt.
    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Master key: ");
        let secret = rpassword::read_password()
            .map_err(|e| QuantbotError::Internal(format!("failed to read master key: {e}")))?;
        if secret.is_empty() {
            return Err(QuantbotError::KeyDerivation(
                "empty master key not allowed".to_string(),
            ));
        }
        return Ok(SecretString::from(secret));
    }

    Err(QuantbotError::Config(
        "no master key provided. Set QUANTBOT_MASTER_KEY or run interactively.".to_string(),
    ))
}

/// Get a new master secret with a confirmation prompt (vault creation and
/// rotation).
///
/// Prompts twice and verifies the values match. Falls back to
/// `QUANTBOT_NEW_MASTER_KEY` when not running on a terminal.
pub fn get_new_master_secret() -> Result<SecretString, QuantbotError> {
    // Env var does not need confirmation.
    if let Ok(key) = std::env::var(NEW_MASTER_KEY_ENV_VAR)
        && !key.is_empty()
    {
        return Ok(SecretString::from(key));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("New master key: ");
        let first = rpassword::read_password()
            .map_err(|e| QuantbotError::Internal(format!("failed to read master key: {e}")))?;
        eprint!("Confirm new master key: ");
        let second = rpassword::read_password()
            .map_err(|e| QuantbotError::Internal(format!("failed to read master key: {e}")))?;

        if first != second {
            return Err(QuantbotError::Config(
                "master keys do not match".to_string(),
            ));
        }
        if first.is_empty() {
            return Err(QuantbotError::KeyDerivation(
                "empty master key not allowed".to_string(),
            ));
        }
        return Ok(SecretString::from(first));
    }

    Err(QuantbotError::Config(
        "no master key provided. Set QUANTBOT_NEW_MASTER_KEY or run interactively.".to_string(),
    ))
}
