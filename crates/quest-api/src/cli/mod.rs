//! CLI command definitions for the `quest` binary.
//!
//! `quest serve` runs the HTTP API; `quest control` is the operator
//! dashboard for the external article scheduler.

pub mod control;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Quest relocation and placement assistant.
#[derive(Parser)]
#[command(name = "quest", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on (defaults to PORT or 8000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to QUEST_HOST or 0.0.0.0).
        #[arg(long)]
        host: Option<String>,
    },

    /// Operate the article scheduler.
    Control {
        #[command(subcommand)]
        action: control::ControlAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
