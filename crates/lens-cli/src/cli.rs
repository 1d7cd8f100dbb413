//! Command-line arguments.

use clap::{Parser, Subcommand};
use lens_core::Address;

/// Batch reader for lending-market instruments.
#[derive(Parser, Debug)]
#[command(name = "lens", version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (can also be set via LENS_CONFIG env var)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Dump Prometheus metrics to stderr on exit
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read market metadata for each instrument
    Markets {
        /// Instrument address (repeatable). Overrides the configured list.
        #[arg(long = "instrument")]
        instruments: Vec<Address>,
    },
    /// Read one account's position in each instrument
    Positions {
        /// Account to read. Overrides the configured account.
        #[arg(long)]
        account: Option<Address>,
        /// Instrument address (repeatable). Overrides the configured list.
        #[arg(long = "instrument")]
        instruments: Vec<Address>,
    },
}

impl Args {
    /// Config path: CLI arg > LENS_CONFIG env var > default.
    #[must_use]
    pub fn config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var("LENS_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string())
    }
}
