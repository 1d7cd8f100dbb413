//! Command-line front end for the lending-market lens.
//!
//! - `cli`: clap arguments and subcommands
//! - `config`: TOML configuration
//! - `app`: registry/instrument resolution and batch runs

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::Application;
pub use cli::{Args, Command};
pub use config::LensConfig;
pub use error::{AppError, AppResult};
