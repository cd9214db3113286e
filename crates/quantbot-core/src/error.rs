// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Quantbot trading process.
//!
//! Every failure path is a typed variant; error messages may carry paths and
//! secret *names* but never secret values or key material. The vault layer
//! performs no automatic recovery -- in particular it never falls back to an
//! unencrypted read. Only [`QuantbotError::LockTimeout`] is a sensible
//! candidate for caller-driven retry.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The primary error type used across the Quantbot workspace.
#[derive(Debug, Error)]
pub enum QuantbotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid key-derivation parameters or an internal Argon2id failure.
    /// Fatal at startup; retrying with the same inputs cannot succeed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Authentication tag verification failed. Wrong master key and corrupted
    /// file are deliberately not distinguished so that the error gives no
    /// help to credential-guessing attacks.
    #[error("vault could not be opened: wrong master key or corrupted file")]
    VaultCorruptedOrWrongKey,

    /// The vault file does not exist. Recoverable by initializing a vault.
    #[error("vault not found at {path}; run `quantbot init` to create one")]
    VaultNotFound { path: PathBuf },

    /// Refused to initialize over an existing vault without an explicit
    /// overwrite request.
    #[error("vault already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// The decrypted payload parsed, but a required secret is absent. Only
    /// the missing *name* is reported.
    #[error("required secret `{name}` is missing from the vault")]
    MissingRequiredSecret { name: String },

    /// Could not acquire the vault file lock within the bounded wait. The
    /// caller may retry after a backoff.
    #[error("could not acquire vault lock within {timeout:?}")]
    LockTimeout { timeout: Duration },

    /// The vault file is structurally malformed (bad magic, truncated header,
    /// unsupported version, trailing bytes).
    #[error("invalid vault file format: {0}")]
    InvalidFormat(String),

    /// Generic filesystem errors (disk full, permission denied). Propagated
    /// with path context, never with payload content.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuantbotError {
    /// Build an [`QuantbotError::Io`] carrying the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
