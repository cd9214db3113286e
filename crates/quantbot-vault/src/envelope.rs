// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The versioned binary envelope persisted on disk.
//!
//! Format version 1, all multi-byte integers big-endian:
//!
//! ```text
//! magic (4, "QBVT") | version (1) | salt (16) | nonce (12)
//! | ciphertext length (4, u32 BE) | ciphertext | tag (16)
//! ```
//!
//! The magic, version, and salt are additionally bound into the GCM tag as
//! associated data (see [`Envelope::aad`]); the nonce is covered by GCM
//! itself. Successful decryption therefore implies every field is exactly
//! as written.

use quantbot_core::QuantbotError;

use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::kdf::SALT_LEN;

/// File magic marker.
pub const MAGIC: [u8; 4] = *b"QBVT";

/// The envelope format version this build writes.
pub const ENVELOPE_VERSION: u8 = 1;

/// Fixed header size: magic + version + salt + nonce + ciphertext length.
const HEADER_LEN: usize = 4 + 1 + SALT_LEN + NONCE_LEN + 4;

/// One persisted encrypted record. A vault file corresponds 1:1 with one
/// envelope; it is replaced atomically on rotation and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u8,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Assemble an envelope from the output of a seal operation.
    ///
    /// `sealed` is ciphertext with the 16-byte tag appended, as produced by
    /// [`crate::crypto::seal`].
    pub fn from_sealed(
        version: u8,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        sealed: Vec<u8>,
    ) -> Result<Self, QuantbotError> {
        if sealed.len() < TAG_LEN {
            return Err(QuantbotError::Internal(
                "sealed output shorter than the authentication tag".to_string(),
            ));
        }
        let mut ciphertext = sealed;
        let tag_start = ciphertext.len() - TAG_LEN;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&ciphertext[tag_start..]);
        ciphertext.truncate(tag_start);

        Ok(Self {
            version,
            salt,
            nonce,
            ciphertext,
            tag,
        })
    }

    /// Rejoin ciphertext and tag for an open operation.
    pub fn sealed_bytes(&self) -> Vec<u8> {
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);
        sealed
    }

    /// The associated data authenticated alongside the ciphertext: magic,
    /// version, and salt. Exactly these bytes must be fed to both seal and
    /// open.
    pub fn aad(&self) -> Vec<u8> {
        aad_for(self.version, &self.salt)
    }

    /// Serialize to the on-disk byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len() + TAG_LEN);
        buf.extend_from_slice(&MAGIC);
        buf.push(self.version);
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(self.ciphertext.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);
        buf
    }

    /// Parse the on-disk byte layout, with strict structural checks.
    ///
    /// Structural problems (bad magic, truncation, trailing bytes) are
    /// [`QuantbotError::InvalidFormat`]; they are detectable without any key
    /// because none of these fields are secret. Whether the *content* is
    /// authentic is only known after tag verification in the open path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QuantbotError> {
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(QuantbotError::InvalidFormat(format!(
                "file too short: {} bytes",
                bytes.len()
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(QuantbotError::InvalidFormat(
                "bad magic marker; not a quantbot vault file".to_string(),
            ));
        }

        let version = bytes[4];
        let mut offset = 5;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[offset..offset + SALT_LEN]);
        offset += SALT_LEN;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[offset..offset + NONCE_LEN]);
        offset += NONCE_LEN;

        let mut ct_len_bytes = [0u8; 4];
        ct_len_bytes.copy_from_slice(&bytes[offset..offset + 4]);
        let ct_len = u32::from_be_bytes(ct_len_bytes) as usize;
        offset += 4;

        let expected_total = HEADER_LEN + ct_len + TAG_LEN;
        if bytes.len() != expected_total {
            return Err(QuantbotError::InvalidFormat(format!(
                "length mismatch: header declares {expected_total} bytes, file has {}",
                bytes.len()
            )));
        }

        let ciphertext = bytes[offset..offset + ct_len].to_vec();
        offset += ct_len;

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[offset..offset + TAG_LEN]);

        Ok(Self {
            version,
            salt,
            nonce,
            ciphertext,
            tag,
        })
    }
}

/// Build the associated data for a header before the envelope exists.
pub fn aad_for(version: u8, salt: &[u8; SALT_LEN]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(4 + 1 + SALT_LEN);
    aad.extend_from_slice(&MAGIC);
    aad.push(version);
    aad.extend_from_slice(salt);
    aad
}
