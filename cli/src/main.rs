// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Keyward CLI
//!
//! Entry point for the `keyward` binary. Parses CLI arguments, initializes
//! logging, runs one subcommand and prints its JSON result on stdout.
//!
//! Building commands:
//!
//! - `keygen`  — generate an Ed25519 keypair
//! - `setup`   — recovery-keys setup (kind 51)
//! - `migrate` / `revoke` — key migration or revocation (kind 50)
//! - `attest`  — public or private attestation (kind 30050 / 30051)
//!
//! Guardian and checking commands: `cosign`, `attach`, `verify-cosig`,
//! `open`, `validate`, `quorum`, `version`.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use cli::{Commands, KeywardCli};

fn main() -> Result<()> {
    let cli = KeywardCli::parse();
    logging::init_logging(&cli.log, cli.log_format);

    let output = match cli.command {
        Commands::Keygen => commands::keygen(),
        Commands::Setup(args) => commands::setup(args),
        Commands::Migrate(args) => commands::migrate(args),
        Commands::Revoke(args) => commands::revoke(args),
        Commands::Cosign(args) => commands::cosign(args),
        Commands::Attach(args) => commands::attach(args),
        Commands::VerifyCosig(args) => commands::verify_cosig(args),
        Commands::Attest(args) => commands::attest(args),
        Commands::Open(args) => commands::open(args),
        Commands::Validate(args) => commands::validate(args),
        Commands::Quorum(args) => commands::quorum(args),
        Commands::Version => {
            print_version();
            return Ok(());
        }
    }?;

    print_json(&output)
}

/// Events go out compact so they can be piped straight into the next
/// command; everything else is pretty-printed.
fn print_json(value: &Value) -> Result<()> {
    let is_event = value.get("kind").is_some() && value.get("tags").is_some();
    let text = if is_event {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("failed to render output")?;
    println!("{}", text);
    Ok(())
}

fn print_version() {
    println!("keyward   {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", keyward_protocol::config::PROTOCOL_VERSION);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
