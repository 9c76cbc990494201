//! Configuration model.
//!
//! A `lem.toml` document declares the stages (one central env file each) and
//! the groups that the central env is split into:
//!
//! ```toml
//! [stage]
//! default = "./.env"
//! prod = "./.env.prod"
//!
//! [group.api]
//! prefix = "API"
//! dir = "./services/api"
//! replace = ["LEGACY"]
//! plain = ["DATABASE_URL"]
//! check = true
//! direnv = ["api", "web"]
//! ```
//!
//! Relative paths resolve against the directory holding the document, and
//! every resolved path must stay inside the project root.

pub mod operations;
pub mod validator;

use crate::envfile::DEFAULT_SIZE_HINT;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::state::StageStore;
use crate::utils::paths::{self, Resolved};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "lem.toml";

/// The decoded `lem.toml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Stage name -> central env file path
    #[serde(default)]
    pub stage: BTreeMap<String, PathBuf>,

    /// Group id -> group settings
    #[serde(default)]
    pub group: BTreeMap<String, Group>,
}

/// One distribution target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Prefix of the keys this group owns, without the trailing `_`
    #[serde(default)]
    pub prefix: String,

    /// Directory receiving the group's `.env`
    #[serde(default)]
    pub dir: PathBuf,

    /// Other prefixes whose keys are delivered under this group's prefix
    #[serde(default)]
    pub replace: Vec<String>,

    /// Keys delivered verbatim
    #[serde(default)]
    pub plain: Vec<String>,

    /// Reject empty values when distributing
    #[serde(default)]
    pub check: bool,

    /// Groups whose `.env` the generated `.envrc` loads
    #[serde(default)]
    pub direnv: Vec<String>,
}

/// Options applied when loading a configuration.
#[derive(Default)]
pub struct LoadOptions {
    /// Capacity hint for the central env mapping; 0 means the default
    size_hint: usize,
    /// Where status lines go; stdout when unset
    output: Option<Output>,
    /// Where the stage selection is persisted; the per-user default when unset
    store: Option<StageStore>,
    /// Overrides the output's color detection
    colorize: Option<bool>,
}

impl LoadOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity hint used when reading central env files.
    #[must_use]
    pub fn size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// Sends status lines to `output`.
    #[must_use]
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Sends uncolored status lines to `writer`.
    #[must_use]
    pub fn writer(self, writer: impl Write + Send + 'static) -> Self {
        self.output(Output::plain(writer))
    }

    /// Forces colored status lines on or off.
    #[must_use]
    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = Some(colorize);
        self
    }

    /// Persists the stage selection in `path` instead of the default location.
    #[must_use]
    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = Some(StageStore::at(path));
        self
    }
}

/// A loaded configuration bound to its location on disk.
#[derive(Debug)]
pub struct Config {
    /// Decoded document
    file: ConfigFile,
    /// Absolute path of the document; identifies the configuration
    path: PathBuf,
    /// Directory holding the document
    dir: PathBuf,
    /// Containment boundary for every resolved path
    root: PathBuf,
    /// Capacity hint for central env reads
    size_hint: usize,
    /// Status line sink
    output: Output,
    /// Explicit state store, if any
    store: Option<StageStore>,
}

impl Config {
    /// Loads a configuration with default options.
    ///
    /// # Errors
    ///
    /// See [`Config::load_with`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, LoadOptions::default())
    }

    /// Loads and decodes the configuration at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Stat`] if the path cannot be inspected
    /// - [`Error::NotAFile`] if the path is a directory
    /// - [`Error::Decode`] if the document is malformed
    pub fn load_with(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = paths::make_absolute(path.as_ref())?;
        let metadata = std::fs::metadata(&path).map_err(|source| Error::Stat {
            path: path.clone(),
            source,
        })?;
        if metadata.is_dir() {
            return Err(Error::NotAFile(path));
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("failed to read config file {}", path.display()), e))?;
        let file = Self::parse(&path, &content)?;

        let dir = path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let root = paths::locate_root(&dir);

        debug!(
            config = %path.display(),
            root = %root.display(),
            stages = file.stage.len(),
            groups = file.group.len(),
            "Loaded configuration"
        );

        let mut output = options.output.unwrap_or_default();
        if let Some(colorize) = options.colorize {
            output.set_colorize(colorize);
        }

        Ok(Self {
            file,
            path,
            dir,
            root,
            size_hint: if options.size_hint == 0 {
                DEFAULT_SIZE_HINT
            } else {
                options.size_hint
            },
            output,
            store: options.store,
        })
    }

    /// Decodes document text.
    fn parse(path: &Path, content: &str) -> Result<ConfigFile> {
        toml::from_str(content).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Absolute path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the configuration file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Project root used as the containment boundary.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declared stages.
    #[must_use]
    pub const fn stages(&self) -> &BTreeMap<String, PathBuf> {
        &self.file.stage
    }

    /// Declared groups.
    #[must_use]
    pub const fn groups(&self) -> &BTreeMap<String, Group> {
        &self.file.group
    }

    /// Capacity hint for central env reads.
    #[must_use]
    pub const fn size_hint(&self) -> usize {
        self.size_hint
    }

    /// Status line sink.
    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// The stage selection store for this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no store was given and the default location
    /// cannot be determined
    pub fn store(&self) -> Result<StageStore> {
        match &self.store {
            Some(store) => Ok(store.clone()),
            None => StageStore::default_location(),
        }
    }

    /// Resolves a path from the document against the configuration
    /// directory, confined to the project root.
    ///
    /// # Errors
    ///
    /// See [`paths::resolve`]
    pub fn resolve(&self, candidate: &Path) -> Result<Resolved> {
        paths::resolve(&self.dir, &self.root, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_full_group() -> anyhow::Result<()> {
        let file = Config::parse(
            Path::new("lem.toml"),
            r#"
[stage]
default = "./.env"

[group.api]
prefix = "API"
dir = "./api"
replace = ["LEGACY"]
plain = ["BAR"]
check = true
direnv = ["api"]
"#,
        )?;
        let api = &file.group["api"];
        assert_eq!(file.stage["default"], PathBuf::from("./.env"));
        assert_eq!(api.prefix, "API");
        assert_eq!(api.dir, PathBuf::from("./api"));
        assert_eq!(api.replace, vec!["LEGACY"]);
        assert_eq!(api.plain, vec!["BAR"]);
        assert!(api.check);
        assert_eq!(api.direnv, vec!["api"]);
        Ok(())
    }

    #[test]
    fn test_decode_defaults() -> anyhow::Result<()> {
        let file = Config::parse(Path::new("lem.toml"), "[group.web]\nprefix = \"WEB\"\n")?;
        assert!(file.stage.is_empty());
        let web = &file.group["web"];
        assert!(web.dir.as_os_str().is_empty());
        assert!(!web.check);
        assert!(web.replace.is_empty() && web.plain.is_empty() && web.direnv.is_empty());
        Ok(())
    }

    #[test]
    fn test_decode_error() {
        let err = Config::parse(Path::new("lem.toml"), "[stage\n").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_load_sets_paths_and_defaults() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join(".git"))?;
        let sub = temp_dir.path().join("config");
        fs::create_dir_all(&sub)?;
        let path = sub.join("lem.toml");
        fs::write(&path, "[stage]\ndefault = \"../.env\"\n")?;

        let config = Config::load_with(&path, LoadOptions::new().writer(std::io::sink()))?;
        assert_eq!(config.path(), paths::clean(&path));
        assert_eq!(config.dir(), paths::clean(&sub));
        assert_eq!(config.root(), paths::clean(temp_dir.path()));
        assert_eq!(config.size_hint(), DEFAULT_SIZE_HINT);
        Ok(())
    }

    #[test]
    fn test_load_size_hint_option() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("lem.toml");
        fs::write(&path, "")?;

        let config = Config::load_with(&path, LoadOptions::new().size_hint(1).writer(std::io::sink()))?;
        assert_eq!(config.size_hint(), 1);
        let config = Config::load_with(&path, LoadOptions::new().size_hint(0).writer(std::io::sink()))?;
        assert_eq!(config.size_hint(), DEFAULT_SIZE_HINT);
        Ok(())
    }

    #[test]
    fn test_load_rejects_directory_and_missing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let err = Config::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotAFile(_)));

        let err = Config::load(temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Stat { .. }));
        Ok(())
    }

    #[test]
    fn test_load_colorize_option() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("lem.toml");
        fs::write(&path, "")?;

        let mut config = Config::load_with(
            &path,
            LoadOptions::new().writer(std::io::sink()).colorize(true),
        )?;
        assert!(config.output_mut().is_colored());
        Ok(())
    }
}
