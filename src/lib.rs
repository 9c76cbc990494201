#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # lem - Local Env Manager for monorepos
//!
//! lem keeps one central env file per stage and splits it into `.env` files
//! for the directories of a monorepo, driven by a `lem.toml` document.
//!
//! ## Features
//!
//! - **Prefix partitioning**: `API_*` keys go to the `api` group's directory
//! - **Prefix rewriting**: `LEGACY_X` can be delivered to a group as `API_X`
//! - **Plain keys**: shared keys copied verbatim into any group that lists them
//! - **Empty-value checks**: refuse to distribute `""`, `''` or blank values
//! - **direnv support**: generated `.envrc` files load peer groups' `.env`
//! - **Stages**: switch between `default`, `dev`, `prod`, ... per configuration
//! - **Watch mode**: redistribute whenever the central env changes
//! - **Containment**: every path must stay inside the project root (the
//!   nearest ancestor holding `.git`)
//!
//! ## Architecture
//!
//! - [`config`]: document model, validation and the operations built on it
//! - [`envfile`]: `key=value` codec
//! - [`partition`]: selecting a group's entries from the central env
//! - [`state`]: persisted stage selection
//! - [`direnv`]: `.envrc` generation
//! - [`watch`]: change notification with cancellation
//! - [`output`]: user-facing status lines and tables
//! - [`commands`]: CLI command implementations
//!
//! ## Example Usage
//!
//! ```no_run
//! use lem::{Config, LoadOptions};
//!
//! # fn main() -> lem::Result<()> {
//! let mut config = Config::load_with("lem.toml", LoadOptions::new().size_hint(64))?;
//! config.validate()?;
//! config.switch("dev")?;
//! let central = config.run(None)?;
//! println!("distributed {}", central.display());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations for the `lem` binary.
pub mod commands;

/// Configuration model, validation and operations.
pub mod config;

/// `.envrc` generation.
pub mod direnv;

/// `key=value` env file codec.
pub mod envfile;

/// Error types.
pub mod error;

/// tracing subscriber setup.
pub mod logging;

/// Output formatting for status lines and tables.
pub mod output;

/// Group partitioning of a central env.
pub mod partition;

/// Persisted stage selection.
pub mod state;

/// Utility functions and helpers.
pub mod utils;

/// Watching the central env for changes.
pub mod watch;

pub use config::{Config, ConfigFile, Group, LoadOptions};
pub use error::{Error, Result};
pub use output::Output;
pub use partition::{Entry, EntryKind};
pub use state::StageStore;
pub use watch::CancelToken;

/// Current version of the lem binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the env file written into each group directory.
pub const ENV_FILE: &str = ".env";
