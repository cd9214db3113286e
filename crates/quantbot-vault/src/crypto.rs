// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the
//! system CSPRNG; callers can never supply a nonce for encryption. Nonce
//! reuse would be catastrophic for GCM security.
//!
//! The associated data binds the non-encrypted envelope header into the
//! authentication tag, so header tampering (for example a format-version
//! downgrade) fails verification even though the header is not ciphertext.

use quantbot_core::QuantbotError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext with AES-256-GCM under a fresh random 96-bit nonce.
///
/// Returns `(nonce, ciphertext_with_tag)`: the 16-byte authentication tag is
/// appended to the ciphertext. The caller must persist both to decrypt later.
pub fn seal(
    key: &Zeroizing<[u8; 32]>,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), QuantbotError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_ref())
        .map_err(|_| QuantbotError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    // Generate random 96-bit nonce.
    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| QuantbotError::Internal("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: plaintext buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| QuantbotError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((nonce_bytes, in_out))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the 16-byte authentication tag appended by
/// [`seal`], and `aad` must byte-match the value passed at seal time. Any
/// verification failure -- wrong key, tampered ciphertext, tampered header --
/// collapses into the single opaque
/// [`QuantbotError::VaultCorruptedOrWrongKey`]; no partial plaintext is ever
/// returned.
pub fn open(
    key: &Zeroizing<[u8; 32]>,
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, QuantbotError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_ref())
        .map_err(|_| QuantbotError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = less_safe
        .open_in_place(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| QuantbotError::VaultCorruptedOrWrongKey)?
        .len();

    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Generate a random 32-byte master key.
///
/// Used by the `generate-key` setup step; the result is the caller's to
/// persist outside the vault (environment variable, key-management system).
pub fn generate_master_key() -> Result<Zeroizing<[u8; 32]>, QuantbotError> {
    let rng = SystemRandom::new();
    let mut key = Zeroizing::new([0u8; 32]);
    rng.fill(key.as_mut())
        .map_err(|_| QuantbotError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}
