//! # autus-sync
//!
//! CLI tool for testing Autus device sync.
//!
//! ## Commands
//!
//! - `identity`: Print this device's id
//! - `packet`: Create or verify a sync packet
//! - `qr`: Pairing tokens (QR sync)
//! - `lan`: Local address and sync requests
//! - `merge`: Merge two datasets (local wins)
//!
//! ## Example
//!
//! ```bash
//! # Device A: make a token for its data
//! autus-sync qr create '{"note": "abc"}'
//!
//! # Device B: check it and acknowledge with its own data
//! autus-sync qr accept 'autus://sync?p=...' @my-data.json
//! ```
//!
//! JSON arguments are inline JSON, or `@path` to read a file. Results go to
//! stdout as JSON; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod input;

use commands::{identity, lan, merge, packet, qr};

/// CLI tool for testing Autus device sync.
#[derive(Parser, Debug)]
#[command(name = "autus-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an autus.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print this device's id
    Identity,

    /// Create or verify sync packets
    #[command(subcommand)]
    Packet(PacketCommand),

    /// Pairing tokens (QR sync)
    #[command(subcommand)]
    Qr(QrCommand),

    /// Local network sync
    #[command(subcommand)]
    Lan(LanCommand),

    /// Merge two datasets, keeping local values on conflict
    Merge {
        /// Local data (JSON object or @path)
        local: String,
        /// Remote data (JSON object or @path)
        remote: String,
    },
}

#[derive(Subcommand, Debug)]
enum PacketCommand {
    /// Wrap data in a hashed packet
    Create {
        /// Data (JSON object or @path)
        data: String,
    },
    /// Check a packet's hash (exit code 1 if it does not match)
    Verify {
        /// Packet (JSON or @path)
        packet: String,
    },
}

#[derive(Subcommand, Debug)]
enum QrCommand {
    /// Print a pairing token for data
    Create {
        /// Data (JSON object or @path)
        data: String,
        /// Seconds until the token expires (default from config)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Print the pairing payload for data
    Payload {
        /// Data (JSON object or @path)
        data: String,
        /// Seconds until the token expires (default from config)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Decode a scanned token
    Parse {
        /// Token string
        token: String,
    },
    /// Acknowledge a scanned token with local data
    Accept {
        /// Token string
        token: String,
        /// Local data (JSON object or @path)
        data: String,
    },
}

#[derive(Subcommand, Debug)]
enum LanCommand {
    /// Print the local network address
    Ip,
    /// Print a sync request for data
    Request {
        /// Data (JSON object or @path)
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load(cli.config.as_deref())?;
    let services = config::services(&config)?;

    let output = match cli.command {
        Commands::Identity => identity::run(&services),
        Commands::Packet(PacketCommand::Create { data }) => {
            packet::create(&services, &input::read_object(&data)?)?
        }
        Commands::Packet(PacketCommand::Verify { packet }) => {
            packet::verify(&services, &input::read_value(&packet)?)
        }
        Commands::Qr(QrCommand::Create { data, ttl }) => {
            qr::create(&services, input::read_object(&data)?, ttl)
        }
        Commands::Qr(QrCommand::Payload { data, ttl }) => {
            qr::payload(&services, input::read_object(&data)?, ttl)?
        }
        Commands::Qr(QrCommand::Parse { token }) => qr::parse(&services, &token)?,
        Commands::Qr(QrCommand::Accept { token, data }) => {
            qr::accept(&services, &token, &input::read_object(&data)?)?
        }
        Commands::Lan(LanCommand::Ip) => lan::ip(&services).await,
        Commands::Lan(LanCommand::Request { data }) => {
            lan::request(&services, input::read_object(&data)?)?
        }
        Commands::Merge { local, remote } => merge::run(
            &services,
            &input::read_object(&local)?,
            &input::read_object(&remote)?,
        )?,
    };

    println!("{}", output.text);
    if !output.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
