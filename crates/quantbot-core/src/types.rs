// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Quantbot workspace.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// The decrypted mapping of named credentials consumed by the trading process.
///
/// Values are [`SecretString`] so they are zeroized on drop and excluded from
/// `Debug` output. The set lives in memory only; it is never serialized to
/// disk in plaintext and never exported to the process environment.
#[derive(Default)]
pub struct SecretSet {
    entries: BTreeMap<String, SecretString>,
}

impl SecretSet {
    /// Create an empty secret set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: SecretString) -> Option<SecretString> {
        self.entries.insert(name.into(), value)
    }

    /// Remove a secret by name.
    pub fn remove(&mut self, name: &str) -> Option<SecretString> {
        self.entries.remove(name)
    }

    /// Look up a secret by name.
    pub fn get(&self, name: &str) -> Option<&SecretString> {
        self.entries.get(name)
    }

    /// Whether a secret with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over secret names in sorted order. Names are not sensitive
    /// and may appear in diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of secrets in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to the `KEY=VALUE` line payload for re-encryption.
    ///
    /// The buffer is [`Zeroizing`] so the plaintext is wiped once the caller
    /// has sealed it. This is the only way a `SecretSet` leaves memory, and
    /// it must only ever feed an encrypt path.
    pub fn to_payload(&self) -> Zeroizing<Vec<u8>> {
        let mut buf = Zeroizing::new(Vec::new());
        for (name, value) in &self.entries {
            buf.extend_from_slice(name.as_bytes());
            buf.push(b'=');
            buf.extend_from_slice(value.expose_secret().as_bytes());
            buf.push(b'\n');
        }
        buf
    }
}

impl std::fmt::Debug for SecretSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSet")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut set = SecretSet::new();
        assert!(set.is_empty());

        set.insert("ALPACA_API_KEY", SecretString::from("abc".to_string()));
        assert_eq!(set.len(), 1);
        assert!(set.contains("ALPACA_API_KEY"));
        assert_eq!(
            set.get("ALPACA_API_KEY").unwrap().expose_secret(),
            "abc"
        );

        let removed = set.remove("ALPACA_API_KEY");
        assert!(removed.is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let mut set = SecretSet::new();
        set.insert("B_KEY", SecretString::from("2".to_string()));
        set.insert("A_KEY", SecretString::from("1".to_string()));

        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["A_KEY", "B_KEY"]);
    }

    #[test]
    fn to_payload_round_trips_as_lines() {
        let mut set = SecretSet::new();
        set.insert("ALPACA_API_KEY", SecretString::from("abc".to_string()));
        set.insert("ALPACA_SECRET_KEY", SecretString::from("def".to_string()));

        let payload = set.to_payload();
        let text = std::str::from_utf8(&payload).unwrap();
        assert_eq!(text, "ALPACA_API_KEY=abc\nALPACA_SECRET_KEY=def\n");
    }

    #[test]
    fn debug_redacts_values() {
        let mut set = SecretSet::new();
        set.insert("API_KEY", SecretString::from("super-secret".to_string()));

        let debug = format!("{set:?}");
        assert!(debug.contains("API_KEY"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn insert_overwrites_and_returns_previous() {
        let mut set = SecretSet::new();
        set.insert("KEY", SecretString::from("old".to_string()));
        let previous = set.insert("KEY", SecretString::from("new".to_string()));

        assert_eq!(previous.unwrap().expose_secret(), "old");
        assert_eq!(set.get("KEY").unwrap().expose_secret(), "new");
    }
}
