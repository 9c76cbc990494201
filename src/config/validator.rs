//! Structural checks on a loaded configuration.
//!
//! The `validate_*` methods are shared by every operation: `run` and `list`
//! check exactly the stage and groups they touch, `validate` checks them
//! all. [`ConfigValidator`] additionally reports keys the document contains
//! but lem does not understand, which serde would otherwise ignore silently.

use super::{Config, Group};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

impl Config {
    /// Fails when `[stage]` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StageTableEmpty`]
    pub fn validate_stage_table(&self) -> Result<()> {
        if self.stages().is_empty() {
            return Err(Error::StageTableEmpty {
                config: self.path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Fails when `[group]` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupTableEmpty`]
    pub fn validate_group_table(&self) -> Result<()> {
        if self.groups().is_empty() {
            return Err(Error::GroupTableEmpty {
                config: self.path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Checks that `stage` is declared and points at an existing file inside
    /// the project root. Returns the file's absolute path.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStage`] if the stage is not declared
    /// - [`Error::StagePath`] if the path escapes the root or does not exist
    /// - [`Error::StageIsDirectory`] if the path is a directory
    pub fn validate_stage(&self, stage: &str) -> Result<PathBuf> {
        let candidate = self
            .stages()
            .get(stage)
            .ok_or_else(|| Error::UnknownStage {
                stage: stage.to_string(),
                config: self.path().to_path_buf(),
            })?;

        let resolved = self.resolve(candidate).map_err(|e| Error::StagePath {
            stage: stage.to_string(),
            source: Box::new(e),
        })?;
        if resolved.is_dir {
            return Err(Error::StageIsDirectory {
                stage: stage.to_string(),
                path: resolved.path,
            });
        }
        Ok(resolved.path)
    }

    /// Checks one group's fields and returns its absolute directory.
    ///
    /// # Errors
    ///
    /// - [`Error::GroupFieldMissing`] if `prefix` or `dir` is empty
    /// - [`Error::GroupDirInvalid`] if `dir` is not an existing directory inside the root
    /// - [`Error::GroupListContainsEmpty`] if `replace`, `plain` or `direnv` has an empty entry
    /// - [`Error::UnknownGroupReference`] if `direnv` names an undeclared group
    pub fn validate_group(&self, id: &str, group: &Group) -> Result<PathBuf> {
        let missing = |field| Error::GroupFieldMissing {
            group: id.to_string(),
            field,
            config: self.path().to_path_buf(),
        };
        if group.prefix.is_empty() {
            return Err(missing("prefix"));
        }
        if group.dir.as_os_str().is_empty() {
            return Err(missing("dir"));
        }

        let dir = self.group_dir(id, &group.dir)?;

        for (field, list) in [
            ("replace", &group.replace),
            ("plain", &group.plain),
            ("direnv", &group.direnv),
        ] {
            if list.iter().any(String::is_empty) {
                return Err(Error::GroupListContainsEmpty {
                    group: id.to_string(),
                    field,
                });
            }
        }

        if let Some(reference) = group
            .direnv
            .iter()
            .find(|peer| !self.groups().contains_key(peer.as_str()))
        {
            return Err(Error::UnknownGroupReference {
                group: id.to_string(),
                reference: reference.clone(),
            });
        }

        Ok(dir)
    }

    /// Resolves a group directory, which must exist and be a directory.
    pub(crate) fn group_dir(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let invalid = |source| Error::GroupDirInvalid {
            group: id.to_string(),
            source: Box::new(source),
        };
        let resolved = self.resolve(dir).map_err(invalid)?;
        if !resolved.is_dir {
            return Err(invalid(Error::NotADirectory(resolved.path)));
        }
        Ok(resolved.path)
    }
}

/// Reports document keys that lem does not recognise.
pub struct ConfigValidator {
    /// Keys allowed at the top level
    known_tables: HashSet<&'static str>,
    /// Keys allowed inside each `[group.<id>]` table
    known_group_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with the known configuration keys
    #[must_use]
    pub fn new() -> Self {
        Self {
            known_tables: ["stage", "group"].into_iter().collect(),
            known_group_fields: ["prefix", "dir", "replace", "plain", "check", "direnv"]
                .into_iter()
                .collect(),
        }
    }

    /// Returns dotted paths of unknown keys in document text, sorted.
    /// Text that does not parse yields no warnings; decoding reports it.
    #[must_use]
    pub fn unknown_fields(&self, content: &str) -> Vec<String> {
        let Ok(table) = toml::from_str::<toml::Table>(content) else {
            return Vec::new();
        };

        let mut unknown = Vec::new();
        for (key, value) in &table {
            if !self.known_tables.contains(key.as_str()) {
                unknown.push(key.clone());
                continue;
            }
            if key == "group"
                && let toml::Value::Table(groups) = value
            {
                for (id, group) in groups {
                    self.check_group(id, group, &mut unknown);
                }
            }
        }
        unknown.sort();
        unknown
    }

    /// Collects unknown fields of one `[group.<id>]` table.
    fn check_group(&self, id: &str, group: &toml::Value, unknown: &mut Vec<String>) {
        if let toml::Value::Table(fields) = group {
            for key in fields.keys() {
                if !self.known_group_fields.contains(key.as_str()) {
                    unknown.push(format!("group.{id}.{key}"));
                }
            }
        }
    }

    /// Reads the configuration file and reports unknown keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub fn validate_config_file(&self, config_path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            Error::io(
                format!("failed to read config file {}", config_path.display()),
                e,
            )
        })?;
        Ok(self.unknown_fields(&content))
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields() {
        let content = r#"
extra = 1

[stage]
default = ".env"

[group.api]
prefix = "API"
dir = "api"
prefx = "typo"
"#;
        let unknown = ConfigValidator::new().unknown_fields(content);
        assert_eq!(unknown, vec!["extra", "group.api.prefx"]);
    }

    #[test]
    fn test_known_fields_only() {
        let content = "[stage]\na = \"x\"\n[group.g]\nprefix = \"G\"\ndir = \"g\"\ncheck = true\n";
        assert!(ConfigValidator::new().unknown_fields(content).is_empty());
    }

    #[test]
    fn test_unparsable_content_yields_nothing() {
        assert!(ConfigValidator::new().unknown_fields("[[[").is_empty());
    }
}
