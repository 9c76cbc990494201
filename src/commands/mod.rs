pub mod current;
pub mod init;
pub mod list;
pub mod run;
pub mod switch;
pub mod validate;
pub mod watch;

use crate::config::{Config, LoadOptions};
use crate::output::Output;
use anyhow::Result;
use std::path::PathBuf;

/// Settings shared by every command, taken from the global flags.
#[derive(Debug, Clone)]
pub struct LemContext {
    /// Path of the configuration file
    pub config_path: PathBuf,

    /// Whether colors were disabled with `--no-color`
    pub no_color: bool,

    /// Explicit state file, for tests; `$LEM_STATE_PATH` or the per-user
    /// default otherwise
    pub state_path: Option<PathBuf>,
}

impl LemContext {
    /// Creates a context for `config_path`.
    pub fn new(config_path: impl Into<PathBuf>, no_color: bool) -> Self {
        Self {
            config_path: config_path.into(),
            no_color,
            state_path: None,
        }
    }

    /// Standard output, honouring `--no-color`.
    #[must_use]
    pub fn output(&self) -> Output {
        let mut output = Output::stdout();
        if self.no_color {
            output.set_colorize(false);
        }
        output
    }

    /// Loads the configuration with status lines going to [`Self::output`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn load(&self) -> Result<Config> {
        self.load_with(self.output())
    }

    /// Loads the configuration with status lines going to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn load_with(&self, output: Output) -> Result<Config> {
        let mut options = LoadOptions::new().output(output);
        if let Some(path) = &self.state_path {
            options = options.state_path(path);
        }
        Ok(Config::load_with(&self.config_path, options)?)
    }
}
