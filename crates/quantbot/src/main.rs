// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quantbot - encrypted credential vault CLI for the trading process.
//!
//! This is the thin command layer over the vault core: key generation,
//! vault initialization, secret edits, and master-key rotation.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Quantbot - encrypted credential vault for the trading process.
#[derive(Parser, Debug)]
#[command(name = "quantbot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a random 256-bit master key and print it as hex.
    GenerateKey,
    /// Create a new empty vault protected by a master key.
    Init {
        /// Overwrite an existing vault file.
        #[arg(long)]
        force: bool,
    },
    /// Add or replace a secret (value read from a hidden prompt, never argv).
    Set {
        /// Secret name, e.g. ALPACA_API_KEY.
        name: String,
    },
    /// Remove a secret from the vault.
    Unset {
        /// Secret name to remove.
        name: String,
    },
    /// List secret names with masked value previews.
    List,
    /// Show one secret (masked unless --reveal is given).
    Show {
        /// Secret name to show.
        name: String,
        /// Print the value in cleartext. Off by default.
        #[arg(long)]
        reveal: bool,
    },
    /// Re-encrypt the vault under a new master key.
    Rotate,
}

fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match quantbot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            quantbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::GenerateKey) => commands::generate_key(),
        Some(Commands::Init { force }) => commands::init(&config, force),
        Some(Commands::Set { name }) => commands::set(&config, &name),
        Some(Commands::Unset { name }) => commands::unset(&config, &name),
        Some(Commands::List) => commands::list(&config),
        Some(Commands::Show { name, reveal }) => commands::show(&config, &name, reveal),
        Some(Commands::Rotate) => commands::rotate(&config),
        None => {
            println!("quantbot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("quantbot: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Empty TOML exercises the same defaults the binary starts from,
        // without touching the host filesystem or environment.
        let config = quantbot_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "quantbot");
        assert_eq!(config.vault.path, "secrets/keys.enc");
    }
}
