// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encrypted credential vault for the Quantbot trading process.
//!
//! Protects broker API credentials behind a single master secret: the
//! working key is derived per operation via Argon2id from a salt stored in
//! the vault file, the payload is sealed with AES-256-GCM (header bound as
//! associated data), and all writes go through an atomic
//! temp-file-then-rename protocol under an advisory file lock.
//!
//! The vault is synchronous and used briefly at startup and during explicit
//! rotation; it defines no concurrency primitives of its own.

pub mod crypto;
pub mod envelope;
pub mod kdf;
pub mod loader;
pub mod lock;
pub mod prompt;
pub mod store;

pub use envelope::{ENVELOPE_VERSION, Envelope};
pub use loader::{load_credentials, mask_secret, parse_payload, validate_secret_name};
pub use prompt::{get_master_secret, get_new_master_secret};
pub use store::VaultStore;
