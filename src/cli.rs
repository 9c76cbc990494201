//! Command-line interface definitions for lem.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use crate::config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for lem.
#[derive(Parser, Debug)]
#[command(
    name = "lem",
    version = crate::VERSION,
    about = "Local env manager for monorepos",
    long_about = "Split one central env file per stage into per-directory .env files"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example lem.toml to the current directory
    Init {
        /// Overwrite an existing lem.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Check the configuration
    Validate,

    /// Show the selected stage
    #[command(alias = "stage")]
    Current,

    /// Select the stage used by list, run and watch
    Switch {
        /// Stage name from the [stage] table
        stage: String,
    },

    /// Show which entries each group receives
    List {
        /// Stage to list instead of the selected one
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Distribute the central env to every group
    Run {
        /// Stage to distribute instead of the selected one
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Distribute, then redistribute whenever the central env changes
    Watch {
        /// Stage to distribute instead of the selected one
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}
