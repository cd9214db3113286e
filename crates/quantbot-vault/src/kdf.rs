// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the master secret.
//!
//! Derives a 32-byte working key using Argon2id (Algorithm::Argon2id,
//! Version::V0x13). The envelope format version selects the cost parameters
//! via a fixed table, so a future version can strengthen them without
//! breaking existing vaults: decrypt-time derivation always uses the
//! parameters the envelope was written with.

use quantbot_core::QuantbotError;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Length of the stored Argon2id salt in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters for one envelope format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

impl KdfParams {
    /// Look up the cost parameters for an envelope format version.
    ///
    /// Version 1 uses the OWASP-recommended 19 MiB / 2 iterations / 1 lane
    /// profile. New versions may only be appended, never changed in place.
    pub fn for_version(version: u8) -> Result<Self, QuantbotError> {
        match version {
            1 => Ok(Self {
                memory_cost: 19456,
                iterations: 2,
                parallelism: 1,
            }),
            v => Err(QuantbotError::KeyDerivation(format!(
                "unsupported envelope version {v}"
            ))),
        }
    }
}

/// Derive a 32-byte working key from the master secret using Argon2id.
///
/// Deterministic: the same (master secret, salt, version) triple always
/// produces the same key, which is required for decrypt-time key recovery.
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
///
/// The unit does not enforce master-secret strength beyond non-emptiness;
/// callers are expected to supply a high-entropy secret (256 bits or more,
/// e.g. from `generate-key`). A weak passphrase remains brute-forceable even
/// through a memory-hard KDF.
pub fn derive(
    master_secret: &SecretString,
    salt: &[u8; SALT_LEN],
    version: u8,
) -> Result<Zeroizing<[u8; 32]>, QuantbotError> {
    if master_secret.expose_secret().is_empty() {
        return Err(QuantbotError::KeyDerivation(
            "master secret must not be empty".to_string(),
        ));
    }

    let p = KdfParams::for_version(version)?;
    let params = argon2::Params::new(p.memory_cost, p.iterations, p.parallelism, Some(32))
        .map_err(|e| QuantbotError::KeyDerivation(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(master_secret.expose_secret().as_bytes(), salt, output.as_mut())
        .map_err(|e| QuantbotError::KeyDerivation(format!("Argon2id derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 16-byte salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], QuantbotError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| QuantbotError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = [1u8; SALT_LEN];

        let key1 = derive(&master("test master secret"), &salt, 1).unwrap();
        let key2 = derive(&master("test master secret"), &salt, 1).unwrap();

        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_master_produces_different_key() {
        let salt = [2u8; SALT_LEN];

        let key1 = derive(&master("secret one"), &salt, 1).unwrap();
        let key2 = derive(&master("secret two"), &salt, 1).unwrap();

        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salt_produces_different_key() {
        let key1 = derive(&master("same secret"), &[1u8; SALT_LEN], 1).unwrap();
        let key2 = derive(&master("same secret"), &[2u8; SALT_LEN], 1).unwrap();

        assert_ne!(*key1, *key2);
    }

    #[test]
    fn empty_master_secret_is_rejected() {
        let result = derive(&master(""), &[0u8; SALT_LEN], 1);
        assert!(matches!(result, Err(QuantbotError::KeyDerivation(_))));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let result = derive(&master("secret"), &[0u8; SALT_LEN], 2);
        assert!(matches!(result, Err(QuantbotError::KeyDerivation(_))));

        assert!(KdfParams::for_version(0).is_err());
        assert!(KdfParams::for_version(255).is_err());
    }

    #[test]
    fn version_one_params_are_pinned() {
        // Changing these silently would orphan every existing vault.
        let p = KdfParams::for_version(1).unwrap();
        assert_eq!(p.memory_cost, 19456);
        assert_eq!(p.iterations, 2);
        assert_eq!(p.parallelism, 1);
    }

    #[test]
    fn generate_salt_produces_random_values() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();

        assert_ne!(salt1, salt2);
    }

    #[test]
    fn derived_key_is_32_bytes() {
        let key = derive(&master("test"), &[0u8; SALT_LEN], 1).unwrap();
        assert_eq!(key.len(), 32);
    }
}
