//! Persisted stage selection.
//!
//! One JSON document maps each configuration file's absolute path to the
//! stage last chosen with `lem switch`:
//!
//! ```json
//! {
//!   "/work/repo/lem.toml": {
//!     "stage": "prod"
//!   }
//! }
//! ```
//!
//! The document is rewritten in full on every store. There is no
//! cross-process locking; concurrent switches are last-writer-wins.

use crate::error::{Error, Result};
use crate::utils::paths::ensure_parent_dirs;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that overrides the state file location.
pub const STATE_PATH_ENV: &str = "LEM_STATE_PATH";

/// Default state file location relative to the home directory.
pub const DEFAULT_STATE_PATH: &str = ".config/lem/state";

/// Key of the stage name inside a configuration's entry.
const STAGE_FIELD: &str = "stage";

/// On-disk layout: config path -> { field -> value }.
type StateDocument = BTreeMap<String, BTreeMap<String, String>>;

/// Handle to the state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStore {
    /// Path to the state file
    path: PathBuf,
}

impl StageStore {
    /// Uses an explicit state file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `$LEM_STATE_PATH` if set, otherwise `~/.config/lem/state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] if no override is set and the
    /// home directory cannot be determined
    pub fn default_location() -> Result<Self> {
        if let Some(path) = std::env::var_os(STATE_PATH_ENV)
            && !path.is_empty()
        {
            return Ok(Self::at(path));
        }
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::at(home.join(DEFAULT_STATE_PATH)))
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document. A missing file is an error; an empty one
    /// is an empty document.
    fn read_document(&self) -> Result<StateDocument> {
        let data = std::fs::read(&self.path).map_err(|source| Error::StoreUnreadable {
            path: self.path.clone(),
            source,
        })?;
        if data.is_empty() {
            return Ok(StateDocument::new());
        }
        serde_json::from_slice(&data).map_err(|source| Error::StoreCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Loads the stage recorded for `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::StoreUnreadable`] if the state file cannot be read
    /// - [`Error::StoreCorrupt`] if it is not a state document
    /// - [`Error::NoEntryForConfig`] if `config` has no entry
    /// - [`Error::NoStageField`] if the entry has no stage
    pub fn load(&self, config: &Path) -> Result<String> {
        let document = self.read_document()?;
        let key = config.to_string_lossy();
        let entry = document
            .get(key.as_ref())
            .ok_or_else(|| Error::NoEntryForConfig {
                config: config.to_path_buf(),
            })?;
        let stage = entry
            .get(STAGE_FIELD)
            .ok_or_else(|| Error::NoStageField {
                config: config.to_path_buf(),
            })?;
        debug!(config = %config.display(), stage = %stage, "Loaded stage selection");
        Ok(stage.clone())
    }

    /// Records `stage` as the selection for `config`, keeping other
    /// configurations' entries.
    ///
    /// # Errors
    ///
    /// - [`Error::StoreCorrupt`] if an existing state file cannot be parsed
    /// - [`Error::StoreUnreadable`] if an existing state file cannot be read
    /// - [`Error::StoreUnwritable`] if the new document cannot be written
    pub fn store(&self, config: &Path, stage: &str) -> Result<()> {
        let unwritable = |source| Error::StoreUnwritable {
            path: self.path.clone(),
            source,
        };

        ensure_parent_dirs(&self.path).map_err(unwritable)?;

        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(Error::StoreUnreadable { source, .. }) if source.kind() == ErrorKind::NotFound => {
                StateDocument::new()
            }
            Err(e) => return Err(e),
        };

        let mut entry = BTreeMap::new();
        entry.insert(STAGE_FIELD.to_string(), stage.to_string());
        document.insert(config.to_string_lossy().into_owned(), entry);

        let json = serde_json::to_vec_pretty(&document).map_err(|source| Error::StoreCorrupt {
            path: self.path.clone(),
            source,
        })?;

        // Write next to the target and rename so readers never see a torn file.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(unwritable)?;
        tmp.write_all(&json).map_err(unwritable)?;
        tmp.flush().map_err(unwritable)?;
        tmp.persist(&self.path)
            .map_err(|e| unwritable(e.error))?;

        debug!(config = %config.display(), stage, path = %self.path.display(), "Stored stage selection");
        Ok(())
    }
}
