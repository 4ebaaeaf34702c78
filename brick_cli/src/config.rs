use clap::{Args, Parser, Subcommand, ValueEnum};
use libbrick::address::Address;
use libbrick::amount::Amount;
use libbrick::cryptography::EcdsaSignature;
use std::path::PathBuf;

/// Brick payment channels.
///
/// Identity management, off-chain signing and a local simulation of the Brick channel protocol.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Path to the configuration file. The default is `$HOME/.brick/config.yml`.
    #[arg(long = "config-file", short = 'c', env = "BRICK_CONFIG")]
    pub config_file: Option<PathBuf>,
    /// Identity name to sign with. If omitted, the first identity in the configuration file is used.
    #[arg(long = "id")]
    pub id_name: Option<String>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Add, list or delete local signing identities.
    #[command(subcommand, name = "id")]
    Id(IdCommand),
    /// Sign a channel state or an announcement with a local identity.
    #[command(subcommand, name = "sign")]
    Sign(MessageCommand),
    /// Check a signature over a channel state or an announcement.
    #[command(name = "verify")]
    Verify(VerifyCommand),
    /// Print a fresh random secret key and its address. Nothing is saved.
    #[command(name = "keygen")]
    Keygen,
    /// Run a complete channel lifecycle on an in-memory ledger.
    #[command(name = "demo", alias = "simulate")]
    Demo(DemoCommand),
}

#[derive(Debug, Subcommand)]
pub enum IdCommand {
    /// Create a new signing identity with a random key.
    #[command(name = "new", alias = "create")]
    Create {
        /// The name of the new identity. If omitted, the identity's address is used.
        name: Option<String>,
    },
    /// List all identities.
    #[command(name = "list", alias = "ls")]
    List,
    /// Delete an identity.
    #[command(name = "delete", alias = "del", alias = "rm")]
    Delete {
        /// The name of the identity to delete.
        name: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum MessageCommand {
    /// A full balance update: both values and the sequence number.
    State(StateArgs),
    /// A sequence announcement, as submitted to the watchtowers.
    Announcement(AnnouncementArgs),
}

#[derive(Debug, Clone, Args)]
pub struct StateArgs {
    /// The channel id.
    #[arg(long)]
    pub channel: Address,
    /// Alice's balance, in wei or with an `eth` suffix.
    #[arg(long)]
    pub alice_value: Amount,
    /// Bob's balance, in wei or with an `eth` suffix.
    #[arg(long)]
    pub bob_value: Amount,
    /// The update's sequence number.
    #[arg(long)]
    pub seq: u16,
}

#[derive(Debug, Clone, Args)]
pub struct AnnouncementArgs {
    /// The channel id.
    #[arg(long)]
    pub channel: Address,
    /// The sequence number being announced.
    #[arg(long)]
    pub seq: u16,
}

#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// The address the signature should recover to.
    #[arg(long)]
    pub signer: Address,
    /// The 65-byte `r ‖ s ‖ v` signature, hex encoded, as printed by `brick sign`.
    #[arg(long)]
    pub signature: EcdsaSignature,
    #[command(subcommand)]
    pub message: MessageCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CloseMode {
    /// Alice proposes, Bob accepts.
    Optimistic,
    /// The watchtowers attest the latest update and Bob closes with Alice's signed state.
    Pessimistic,
}

#[derive(Debug, Clone, Args)]
pub struct DemoCommand {
    /// The number of watchtowers in the committee.
    #[arg(long, short = 'n', default_value_t = 13)]
    pub watchtowers: usize,
    /// The channel fee. Alice and Bob each pay half.
    #[arg(long, default_value = "20")]
    pub fee: Amount,
    /// The collateral every watchtower escrows.
    #[arg(long, default_value = "5")]
    pub collateral: Amount,
    /// Alice's deposit.
    #[arg(long, default_value = "15")]
    pub alice_deposit: Amount,
    /// Bob's deposit.
    #[arg(long, default_value = "22")]
    pub bob_deposit: Amount,
    /// Alice's value in the final balance.
    #[arg(long, default_value = "4")]
    pub alice_final: Amount,
    /// How the channel is closed.
    #[arg(long, value_enum, default_value_t = CloseMode::Optimistic)]
    pub mode: CloseMode,
}

pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub id_name: Option<String>,
}

impl Config {
    pub fn to_parts(self) -> (GlobalOptions, CliCommand) {
        let global = GlobalOptions { config_file: self.config_file, id_name: self.id_name };
        (global, self.command)
    }
}
