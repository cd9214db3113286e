// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory cross-process locking for the vault file.
//!
//! A sibling `<vault>.lock` file is created with `O_EXCL` semantics
//! (`create_new`), so exactly one process holds the lock at a time.
//! Acquisition spin-waits with a bounded timeout and fails with
//! [`QuantbotError::LockTimeout`] rather than hanging: a stale lock left by
//! a crashed process must never deadlock startup forever.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use quantbot_core::QuantbotError;
use tracing::{debug, warn};

/// Interval between acquisition attempts while waiting.
const SPIN_INTERVAL: Duration = Duration::from_millis(10);

/// An exclusive advisory lock on a vault path, released on drop.
#[derive(Debug)]
pub struct VaultLock {
    lock_path: PathBuf,
}

impl VaultLock {
    /// Acquire the lock for `vault_path`, waiting at most `timeout`.
    pub fn acquire(vault_path: &Path, timeout: Duration) -> Result<Self, QuantbotError> {
        let lock_path = lock_path_for(vault_path);
        let start = Instant::now();

        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(mut file) => {
                    // The holder's PID helps an operator diagnose a stale lock.
                    let _ = write!(file, "{}", std::process::id());
                    debug!(path = %lock_path.display(), "vault lock acquired");
                    return Ok(Self { lock_path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if start.elapsed() >= timeout {
                        warn!(
                            path = %lock_path.display(),
                            "vault lock held by another process; giving up"
                        );
                        return Err(QuantbotError::LockTimeout { timeout });
                    }
                    std::thread::sleep(SPIN_INTERVAL);
                }
                Err(e) => return Err(QuantbotError::io(&lock_path, e)),
            }
        }
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            warn!(path = %self.lock_path.display(), error = %e, "failed to remove lock file");
        }
    }
}

/// The lock file that guards a vault path: `keys.enc` -> `keys.enc.lock`.
fn lock_path_for(vault_path: &Path) -> PathBuf {
    let mut name = vault_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    vault_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let vault_path = dir.path().join("keys.enc");

        let lock = VaultLock::acquire(&vault_path, Duration::from_millis(100)).unwrap();
        assert!(dir.path().join("keys.enc.lock").exists());

        drop(lock);
        assert!(!dir.path().join("keys.enc.lock").exists());
    }

    #[test]
    fn second_acquire_times_out_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let vault_path = dir.path().join("keys.enc");

        let _held = VaultLock::acquire(&vault_path, Duration::from_millis(100)).unwrap();
        let result = VaultLock::acquire(&vault_path, Duration::from_millis(50));

        assert!(matches!(result, Err(QuantbotError::LockTimeout { .. })));
    }

    #[test]
    fn acquire_succeeds_after_release() {
        let dir = tempfile::tempdir().unwrap();
        let vault_path = dir.path().join("keys.enc");

        let first = VaultLock::acquire(&vault_path, Duration::from_millis(100)).unwrap();
        drop(first);

        let second = VaultLock::acquire(&vault_path, Duration::from_millis(100));
        assert!(second.is_ok());
    }

    #[test]
    fn waiter_gets_lock_once_holder_releases() {
        let dir = tempfile::tempdir().unwrap();
        let vault_path = dir.path().join("keys.enc");

        let held = VaultLock::acquire(&vault_path, Duration::from_millis(100)).unwrap();

        let path_clone = vault_path.clone();
        let waiter = std::thread::spawn(move || {
            VaultLock::acquire(&path_clone, Duration::from_secs(2))
        });

        std::thread::sleep(Duration::from_millis(50));
        drop(held);

        let result = waiter.join().unwrap();
        assert!(result.is_ok(), "waiter should acquire after release");
    }
}
