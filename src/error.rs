//! Error types for lem operations.
//!
//! Variants are grouped the way failures surface to a user: loading the
//! configuration, validating it, distributing env files, watching, and the
//! persisted stage selection.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with the lem [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during lem operations.
#[derive(Error, Debug)]
pub enum Error {
    // -- configuration loading ------------------------------------------------
    /// The configuration path could not be inspected.
    #[error("failed to stat {path:?}")]
    Stat {
        /// Path that was inspected
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration path denotes a directory.
    #[error("{0:?} is a directory, expected a configuration file")]
    NotAFile(PathBuf),

    /// The configuration document is not valid TOML for the expected layout.
    #[error("failed to decode config file {path:?}")]
    Decode {
        /// Configuration file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// The home directory needed for the default state location is unknown.
    #[error("could not find home directory")]
    HomeDirUnavailable,

    /// Generic I/O failure with a short description of what was attempted.
    #[error("{context}")]
    Io {
        /// What was being done
        context: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    // -- validation -------------------------------------------------------------
    /// `[stage]` is missing or empty.
    #[error("stage table is empty in {config:?}")]
    StageTableEmpty {
        /// Configuration file path
        config: PathBuf,
    },

    /// `[group]` is missing or empty.
    #[error("group table is empty in {config:?}")]
    GroupTableEmpty {
        /// Configuration file path
        config: PathBuf,
    },

    /// A stage name is not declared in `[stage]`.
    #[error("stage {stage:?} is not set in {config:?}")]
    UnknownStage {
        /// Requested stage
        stage: String,
        /// Configuration file path
        config: PathBuf,
    },

    /// A stage path resolves to a directory instead of an env file.
    #[error("stage {stage:?}: {path:?} is a directory")]
    StageIsDirectory {
        /// Stage name
        stage: String,
        /// Resolved path
        path: PathBuf,
    },

    /// A stage path failed to resolve.
    #[error("stage {stage:?}: invalid path")]
    StagePath {
        /// Stage name
        stage: String,
        /// Resolution failure
        #[source]
        source: Box<Error>,
    },

    /// A required group field is empty or absent.
    #[error("group.{group}: `{field}` is not set in {config:?}")]
    GroupFieldMissing {
        /// Group id
        group: String,
        /// Missing field name
        field: &'static str,
        /// Configuration file path
        config: PathBuf,
    },

    /// A group's `dir` does not resolve to a directory inside the project root.
    #[error("group.{group}: invalid dir")]
    GroupDirInvalid {
        /// Group id
        group: String,
        /// Resolution failure
        #[source]
        source: Box<Error>,
    },

    /// One of the list fields contains an empty string.
    #[error("group.{group}: `{field}` contains an empty string")]
    GroupListContainsEmpty {
        /// Group id
        group: String,
        /// List field name
        field: &'static str,
    },

    /// `direnv` names a group id that is not declared.
    #[error("group.{group}: `direnv` references unknown group {reference:?}")]
    UnknownGroupReference {
        /// Group id
        group: String,
        /// Offending reference
        reference: String,
    },

    /// A path lies outside the project root.
    #[error("{path:?} is outside of the project root {root:?}")]
    PathEscapesRoot {
        /// Cleaned absolute path
        path: PathBuf,
        /// Project root
        root: PathBuf,
    },

    /// A path does not exist or cannot be inspected.
    #[error("{path:?} not found")]
    PathNotFound {
        /// Cleaned absolute path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A path exists but is not a directory.
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    // -- distribution -----------------------------------------------------------
    /// The central env file could not be read.
    #[error("failed to read env file {path:?}")]
    EnvUnreadable {
        /// Env file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A group with `check = true` produced an empty value.
    #[error("group.{group}: empty value for {key}")]
    EmptyValueDetected {
        /// Group id
        group: String,
        /// Offending key
        key: String,
    },

    /// Writing a distributed file failed.
    #[error("failed to write {path:?}")]
    WriteFailed {
        /// Target path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Generating a group's `.envrc` failed.
    #[error("failed to create .envrc for group.{group}")]
    Envrc {
        /// Group id
        group: String,
        /// Failure while resolving peers or writing the file
        #[source]
        source: Box<Error>,
    },

    // -- watch ------------------------------------------------------------------
    /// The filesystem notification subsystem failed.
    #[error("watcher failed: {context}")]
    Watch {
        /// What the watcher was doing
        context: String,
        /// Notification backend error
        #[source]
        source: notify::Error,
    },

    // -- stage state store ------------------------------------------------------
    /// The state file could not be read.
    #[error("failed to read state file {path:?}")]
    StoreUnreadable {
        /// State file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The state file is not a valid state document.
    #[error("state file {path:?} is corrupt")]
    StoreCorrupt {
        /// State file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// The state file could not be written.
    #[error("failed to write state file {path:?}")]
    StoreUnwritable {
        /// State file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The state file has no entry for this configuration.
    #[error("no stage stored for config {config:?}")]
    NoEntryForConfig {
        /// Configuration file path
        config: PathBuf,
    },

    /// The entry for this configuration has no `stage` field.
    #[error("no stage value for config {config:?}")]
    NoStageField {
        /// Configuration file path
        config: PathBuf,
    },

    /// No stage has ever been selected (no state file yet).
    #[error("no stage selected for {config:?}, run `lem switch <stage>` first")]
    NoStageSelected {
        /// Configuration file path
        config: PathBuf,
    },
}

impl Error {
    /// Wraps an I/O error with a description of the attempted action.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the innermost lem error, looking through the stage/group
    /// wrappers that only attach context.
    #[must_use]
    pub fn innermost(&self) -> &Self {
        match self {
            Self::StagePath { source, .. }
            | Self::GroupDirInvalid { source, .. }
            | Self::Envrc { source, .. } => source.innermost(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innermost_unwraps_context() {
        let err = Error::GroupDirInvalid {
            group: "api".into(),
            source: Box::new(Error::NotADirectory(PathBuf::from("/repo/file"))),
        };
        assert!(matches!(err.innermost(), Error::NotADirectory(_)));
    }

    #[test]
    fn test_messages_carry_context() {
        let err = Error::EmptyValueDetected {
            group: "api".into(),
            key: "API_TOKEN".into(),
        };
        assert_eq!(err.to_string(), "group.api: empty value for API_TOKEN");

        let err = Error::GroupListContainsEmpty {
            group: "web".into(),
            field: "plain",
        };
        assert_eq!(err.to_string(), "group.web: `plain` contains an empty string");
    }
}
