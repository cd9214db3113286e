// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quantbot trading process.
//!
//! This crate provides the error taxonomy and common types shared by the
//! vault, configuration, and CLI crates. It performs no I/O of its own.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QuantbotError;
pub use types::SecretSet;
