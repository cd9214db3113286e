// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup credential loading: decrypt the vault, parse the payload, and
//! hand a [`SecretSet`] to the trading process.
//!
//! The payload format is newline-separated `KEY=VALUE`, one secret per line.
//! Values may not contain newlines and `=` is not escaped -- the first `=`
//! on a line separates name from value (a documented v1 limitation). Blank
//! lines and `#` comments are ignored.
//!
//! Secrets are exposed strictly as an in-memory mapping; the loader never
//! writes them back to disk, never logs them, and never sets process
//! environment variables. Diagnostics mention secret *names* only.

use quantbot_core::{QuantbotError, SecretSet};
use secrecy::SecretString;
use tracing::debug;

use crate::store::VaultStore;

/// Parse a decrypted vault payload into a [`SecretSet`].
///
/// Values are preserved byte-for-byte after the first `=`, whitespace
/// included; only the name side of a line is trimmed. Error messages report
/// line numbers, never line contents.
pub fn parse_payload(plaintext: &[u8]) -> Result<SecretSet, QuantbotError> {
    let text = std::str::from_utf8(plaintext).map_err(|_| {
        QuantbotError::InvalidFormat("vault payload is not valid UTF-8".to_string())
    })?;

    let mut secrets = SecretSet::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let Some((name, value)) = line.split_once('=') else {
            return Err(QuantbotError::InvalidFormat(format!(
                "payload line {} is not KEY=VALUE",
                idx + 1
            )));
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(QuantbotError::InvalidFormat(format!(
                "payload line {} has an empty secret name",
                idx + 1
            )));
        }

        secrets.insert(name, SecretString::from(value.to_string()));
    }

    Ok(secrets)
}

/// Validate a secret name before it is written into the payload.
///
/// A name must survive a write-then-parse round trip unchanged: no `=` or
/// newlines (line structure), no surrounding whitespace (the parser trims
/// the name side), and no leading `#` (the parser would skip the whole line
/// as a comment and the secret would silently vanish on reload).
pub fn validate_secret_name(name: &str) -> Result<(), QuantbotError> {
    if name.is_empty() || name != name.trim() {
        return Err(QuantbotError::InvalidFormat(
            "secret names must be non-empty with no surrounding whitespace".to_string(),
        ));
    }
    if name.contains(['=', '\n', '\r']) {
        return Err(QuantbotError::InvalidFormat(
            "secret names may not contain '=' or newlines".to_string(),
        ));
    }
    if name.starts_with('#') {
        return Err(QuantbotError::InvalidFormat(
            "secret names may not start with '#'".to_string(),
        ));
    }
    Ok(())
}

/// Decrypt the vault and return its secrets, enforcing the required-key list.
///
/// The master secret is obtained by the process entry point (see
/// [`crate::prompt`]) and passed in explicitly; it is never read from a
/// global. Fails with [`QuantbotError::MissingRequiredSecret`] naming the
/// first absent key.
pub fn load_credentials(
    store: &VaultStore,
    master_secret: &SecretString,
    required: &[&str],
) -> Result<SecretSet, QuantbotError> {
    let plaintext = store.load(master_secret)?;
    let secrets = parse_payload(&plaintext)?;

    for &name in required {
        if !secrets.contains(name) {
            return Err(QuantbotError::MissingRequiredSecret {
                name: name.to_string(),
            });
        }
    }

    debug!(count = secrets.len(), "credentials loaded from vault");
    Ok(secrets)
}

/// Mask a secret value for display: `PKTE...3fQx` format.
///
/// Shows the 4 leading and 4 trailing characters with `...` in between.
/// Short values (< 10 chars) are fully masked as `****`. Operates on
/// characters, not bytes, so multi-byte values cannot split a char.
pub fn mask_secret(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value.chars().skip(char_count - 4).collect();
    format!("{prefix}...{suffix}")
}
