//! CLI interface for Relay
//!
//! Defines the commands and global flags using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Relay: a chat router in front of local and hosted LLMs with dual-tier memory
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Show backend reachability
    Status,

    /// Show where a message would be routed, without calling anything
    Route {
        /// The message to route
        message: String,

        /// Explicit provider directive (claude, grok, gemini, local)
        #[arg(short, long)]
        provider: Option<String>,
    },
}
