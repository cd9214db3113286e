// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault file lifecycle: initialize, load, rotate, and update.
//!
//! All mutation goes through the atomic temp-file-then-rename protocol: the
//! new envelope is written to a temporary file in the vault's directory,
//! flushed, self-verified by an immediate round-trip decrypt, and only then
//! renamed into place. A crash at any point leaves the previous vault file
//! intact -- the rename is the only observable state transition.
//!
//! Every operation, reads included, holds the advisory lock from
//! [`crate::lock`] for its duration, so two concurrent rotations serialize
//! (or the loser times out cleanly) across processes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quantbot_core::QuantbotError;
use secrecy::SecretString;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto;
use crate::envelope::{self, ENVELOPE_VERSION, Envelope};
use crate::kdf;
use crate::lock::VaultLock;

/// Default bounded wait for the vault file lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to one on-disk vault file.
///
/// Holds no key material: every operation derives its own working key from
/// the caller-supplied master secret and discards it on return.
#[derive(Debug, Clone)]
pub struct VaultStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl VaultStore {
    /// Create a handle for the vault at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override the bounded lock wait.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The vault file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a new vault sealing `plaintext` under `master_secret`.
    ///
    /// Refuses to overwrite an existing vault unless `overwrite` is set.
    pub fn initialize(
        &self,
        master_secret: &SecretString,
        plaintext: &[u8],
        overwrite: bool,
    ) -> Result<(), QuantbotError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| QuantbotError::io(parent, e))?;
        }

        let _lock = VaultLock::acquire(&self.path, self.lock_timeout)?;

        if self.path.exists() && !overwrite {
            return Err(QuantbotError::AlreadyExists {
                path: self.path.clone(),
            });
        }

        let env = seal_payload(master_secret, plaintext)?;
        self.write_atomic(&env, master_secret)?;

        info!(path = %self.path.display(), "vault initialized");
        Ok(())
    }

    /// Read, parse, and decrypt the vault, returning the raw payload.
    ///
    /// The working key is re-derived from the salt stored in the envelope.
    /// A missing file is [`QuantbotError::VaultNotFound`]; a failed tag
    /// verification is [`QuantbotError::VaultCorruptedOrWrongKey`] with the
    /// two causes deliberately indistinguishable.
    pub fn load(&self, master_secret: &SecretString) -> Result<Zeroizing<Vec<u8>>, QuantbotError> {
        let _lock = VaultLock::acquire(&self.path, self.lock_timeout)?;
        self.load_locked(master_secret)
    }

    /// Re-encrypt the vault contents under a new master secret.
    ///
    /// Loads with the old secret, seals under a fresh salt/nonce/key derived
    /// from the new secret, and replaces the file atomically. On any failure
    /// the original vault file is left untouched and still opens with the
    /// old secret.
    pub fn rotate(
        &self,
        old_master_secret: &SecretString,
        new_master_secret: &SecretString,
    ) -> Result<(), QuantbotError> {
        let _lock = VaultLock::acquire(&self.path, self.lock_timeout)?;

        let plaintext = self.load_locked(old_master_secret)?;
        let env = seal_payload(new_master_secret, &plaintext)?;
        self.write_atomic(&env, new_master_secret)?;

        info!(path = %self.path.display(), "vault master key rotated");
        Ok(())
    }

    /// Replace the vault contents, keeping the same master secret.
    ///
    /// The current payload is decrypted first, which both verifies the
    /// supplied secret and guarantees the file exists. Same atomicity
    /// discipline as [`VaultStore::rotate`].
    pub fn update(
        &self,
        master_secret: &SecretString,
        new_plaintext: &[u8],
    ) -> Result<(), QuantbotError> {
        let _lock = VaultLock::acquire(&self.path, self.lock_timeout)?;

        let _current = self.load_locked(master_secret)?;
        let env = seal_payload(master_secret, new_plaintext)?;
        self.write_atomic(&env, master_secret)?;

        debug!(path = %self.path.display(), "vault contents updated");
        Ok(())
    }

    /// Read-modify-write the vault contents under a single lock acquisition.
    ///
    /// `f` receives the current payload and returns the replacement. Unlike
    /// a caller-side `load` followed by `update`, the lock is held across
    /// the whole sequence, so two concurrent modifications cannot lose an
    /// edit.
    pub fn modify<F>(&self, master_secret: &SecretString, f: F) -> Result<(), QuantbotError>
    where
        F: FnOnce(Zeroizing<Vec<u8>>) -> Result<Zeroizing<Vec<u8>>, QuantbotError>,
    {
        let _lock = VaultLock::acquire(&self.path, self.lock_timeout)?;

        let plaintext = self.load_locked(master_secret)?;
        let new_plaintext = f(plaintext)?;
        let env = seal_payload(master_secret, &new_plaintext)?;
        self.write_atomic(&env, master_secret)?;

        debug!(path = %self.path.display(), "vault contents updated");
        Ok(())
    }

    /// Decrypt the vault file. Caller must hold the lock.
    fn load_locked(
        &self,
        master_secret: &SecretString,
    ) -> Result<Zeroizing<Vec<u8>>, QuantbotError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                QuantbotError::VaultNotFound {
                    path: self.path.clone(),
                }
            } else {
                QuantbotError::io(&self.path, e)
            }
        })?;

        let env = Envelope::from_bytes(&bytes)?;
        open_envelope(&env, master_secret)
    }

    /// Write an envelope via temp file + rename, self-verifying before the
    /// rename so a bad write can never replace a good vault.
    fn write_atomic(
        &self,
        env: &Envelope,
        master_secret: &SecretString,
    ) -> Result<(), QuantbotError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".vault-")
            .tempfile_in(dir)
            .map_err(|e| QuantbotError::io(dir, e))?;

        tmp.write_all(&env.to_bytes())
            .map_err(|e| QuantbotError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| QuantbotError::io(tmp.path(), e))?;

        // Round-trip self-check: re-read and decrypt what was just written.
        let written = std::fs::read(tmp.path()).map_err(|e| QuantbotError::io(tmp.path(), e))?;
        let reparsed = Envelope::from_bytes(&written)?;
        open_envelope(&reparsed, master_secret)?;

        tmp.persist(&self.path)
            .map_err(|e| QuantbotError::io(&self.path, e.error))?;

        Ok(())
    }
}

/// Derive a fresh key and seal `plaintext` into a new envelope.
fn seal_payload(
    master_secret: &SecretString,
    plaintext: &[u8],
) -> Result<Envelope, QuantbotError> {
    let salt = kdf::generate_salt()?;
    let key = kdf::derive(master_secret, &salt, ENVELOPE_VERSION)?;
    let aad = envelope::aad_for(ENVELOPE_VERSION, &salt);
    let (nonce, sealed) = crypto::seal(&key, plaintext, &aad)?;
    Envelope::from_sealed(ENVELOPE_VERSION, salt, nonce, sealed)
}

/// Re-derive the key from the envelope's salt and version, then open.
fn open_envelope(
    env: &Envelope,
    master_secret: &SecretString,
) -> Result<Zeroizing<Vec<u8>>, QuantbotError> {
    let key = kdf::derive(master_secret, &env.salt, env.version)?;
    crypto::open(&key, &env.nonce, &env.sealed_bytes(), &env.aad())
}
