// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Every command resolves the vault location and lock timeout from the
//! loaded configuration and obtains master secrets through the prompt
//! layer. Secret values never travel through argv and are never logged;
//! only secret names appear in output and traces.

use std::io::IsTerminal;
use std::time::Duration;

use quantbot_config::QuantbotConfig;
use quantbot_core::QuantbotError;
use quantbot_vault::{
    VaultStore, get_master_secret, get_new_master_secret, load_credentials, mask_secret,
    parse_payload, validate_secret_name,
};
use secrecy::ExposeSecret;
use tracing::info;

fn store_from(config: &QuantbotConfig) -> VaultStore {
    VaultStore::new(&config.vault.path)
        .with_lock_timeout(Duration::from_millis(config.vault.lock_timeout_ms))
}

/// Read a secret value from a hidden prompt, or from stdin when piped.
fn read_secret_value(name: &str) -> Result<String, QuantbotError> {
    if std::io::stdin().is_terminal() {
        eprint!("Value for {name}: ");
        rpassword::read_password()
            .map_err(|e| QuantbotError::Internal(format!("failed to read value: {e}")))
    } else {
        let mut line = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut line)
            .map_err(|e| QuantbotError::Internal(format!("failed to read value: {e}")))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// `quantbot generate-key`: print a fresh 256-bit master key as hex.
pub fn generate_key() -> Result<(), QuantbotError> {
    let key = quantbot_vault::crypto::generate_master_key()?;
    println!("{}", hex::encode(key.as_slice()));
    eprintln!("Store this key in a password manager. It cannot be recovered.");
    Ok(())
}

/// `quantbot init [--force]`: create a new vault with an empty payload.
pub fn init(config: &QuantbotConfig, force: bool) -> Result<(), QuantbotError> {
    let store = store_from(config);
    let master = get_new_master_secret()?;

    store.initialize(&master, b"", force)?;
    info!(path = %store.path().display(), "vault initialized");
    println!("Initialized empty vault at {}", store.path().display());
    Ok(())
}

/// `quantbot set <NAME>`: add or replace one secret.
pub fn set(config: &QuantbotConfig, name: &str) -> Result<(), QuantbotError> {
    validate_secret_name(name)?;

    let store = store_from(config);
    let master = get_master_secret()?;
    let value = read_secret_value(name)?;

    store.modify(&master, |plaintext| {
        let mut secrets = parse_payload(&plaintext)?;
        secrets.insert(name, value.into());
        Ok(secrets.to_payload())
    })?;

    info!(name, "secret stored");
    println!("Stored {name}");
    Ok(())
}

/// `quantbot unset <NAME>`: remove one secret.
pub fn unset(config: &QuantbotConfig, name: &str) -> Result<(), QuantbotError> {
    let store = store_from(config);
    let master = get_master_secret()?;

    store.modify(&master, |plaintext| {
        let mut secrets = parse_payload(&plaintext)?;
        if secrets.remove(name).is_none() {
            return Err(QuantbotError::MissingRequiredSecret {
                name: name.to_string(),
            });
        }
        Ok(secrets.to_payload())
    })?;

    info!(name, "secret removed");
    println!("Removed {name}");
    Ok(())
}

/// `quantbot list`: secret names with masked value previews.
pub fn list(config: &QuantbotConfig) -> Result<(), QuantbotError> {
    let store = store_from(config);
    let master = get_master_secret()?;

    let secrets = load_credentials(&store, &master, &[])?;
    if secrets.is_empty() {
        println!("(vault is empty)");
        return Ok(());
    }
    for name in secrets.names() {
        let masked = secrets
            .get(name)
            .map(|v| mask_secret(v.expose_secret()))
            .unwrap_or_else(|| "****".to_string());
        println!("{name}  {masked}");
    }
    Ok(())
}

/// `quantbot show <NAME> [--reveal]`: one secret, masked by default.
pub fn show(config: &QuantbotConfig, name: &str, reveal: bool) -> Result<(), QuantbotError> {
    let store = store_from(config);
    let master = get_master_secret()?;

    let secrets = load_credentials(&store, &master, &[])?;
    let Some(value) = secrets.get(name) else {
        return Err(QuantbotError::MissingRequiredSecret {
            name: name.to_string(),
        });
    };

    if reveal {
        println!("{}", value.expose_secret());
    } else {
        println!("{}", mask_secret(value.expose_secret()));
    }
    Ok(())
}

/// `quantbot rotate`: re-encrypt under a new master key.
pub fn rotate(config: &QuantbotConfig) -> Result<(), QuantbotError> {
    let store = store_from(config);
    let old_master = get_master_secret()?;
    let new_master = get_new_master_secret()?;

    store.rotate(&old_master, &new_master)?;
    info!(path = %store.path().display(), "master key rotated");
    println!("Vault re-encrypted under the new master key");
    Ok(())
}
