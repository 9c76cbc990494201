//! Operations on a loaded configuration: validate, current, switch, list,
//! run and watch.

use super::validator::ConfigValidator;
use super::{Config, Group};
use crate::direnv;
use crate::envfile;
use crate::error::{Error, Result};
use crate::partition::{self, Entry};
use crate::watch::{CancelToken, ChangeWatcher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl Config {
    /// Checks the whole document: both tables, every stage and every group.
    /// Unknown keys are reported as warnings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found
    pub fn validate(&mut self) -> Result<()> {
        self.validate_stage_table()?;
        self.validate_group_table()?;
        for stage in self.stages().keys() {
            self.validate_stage(stage)?;
        }
        for (id, group) in self.groups() {
            self.validate_group(id, group)?;
        }

        let unknown = ConfigValidator::new().validate_config_file(&self.path)?;
        for key in &unknown {
            warn!(key = %key, "Unknown configuration key");
            self.output.warning(&format!("warning: unknown key `{key}`"));
        }

        self.output.success("all checks passed!");
        Ok(())
    }

    /// Resolves the stage to operate on: `explicit` when given, otherwise
    /// the selection persisted for this configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::StageTableEmpty`] if no stages are declared
    /// - [`Error::UnknownStage`] if `explicit` is not declared
    /// - [`Error::NoStageSelected`] if nothing was persisted
    /// - any other state store error
    pub fn active_stage(&self, explicit: Option<&str>) -> Result<String> {
        self.validate_stage_table()?;
        if let Some(stage) = explicit {
            if !self.stages().contains_key(stage) {
                return Err(Error::UnknownStage {
                    stage: stage.to_string(),
                    config: self.path.clone(),
                });
            }
            return Ok(stage.to_string());
        }

        match self.store()?.load(&self.path) {
            Ok(stage) => Ok(stage),
            Err(Error::StoreUnreadable { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(Error::NoStageSelected {
                    config: self.path.clone(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Reports the persisted stage after checking it still resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if no stage is selected or the selected stage is no
    /// longer valid
    pub fn current(&mut self) -> Result<String> {
        let stage = self.active_stage(None)?;
        self.validate_stage(&stage)?;
        self.output.notice(&format!("current: {stage}"));
        Ok(stage)
    }

    /// Persists `stage` as the selection for this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage is invalid or cannot be stored
    pub fn switch(&mut self, stage: &str) -> Result<()> {
        self.validate_stage_table()?;
        self.validate_stage(stage)?;
        self.store()?.store(&self.path, stage)?;
        info!(stage, config = %self.path.display(), "Switched stage");
        self.output.notice(&format!("switched: {stage}"));
        Ok(())
    }

    /// Lists what every group would receive from the stage's central env,
    /// sorted by group, kind and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage cannot be resolved or its env read
    pub fn list(&self, stage: Option<&str>) -> Result<Vec<Entry>> {
        let stage = self.active_stage(stage)?;
        let path = self.validate_stage(&stage)?;
        self.validate_group_table()?;
        let source = envfile::read(&path, self.size_hint)?;

        let mut entries: Vec<Entry> = self
            .groups()
            .iter()
            .flat_map(|(id, group)| partition::entries(id, group, &source))
            .collect();
        // Field order makes this (group, kind, name) with value as tiebreak.
        entries.sort();
        Ok(entries)
    }

    /// Distributes the stage's central env to every group.
    ///
    /// Groups are written one at a time. When a group fails, the ones
    /// already written stay in place.
    ///
    /// # Errors
    ///
    /// Returns the first stage, group, read, check or write error
    pub fn run(&mut self, stage: Option<&str>) -> Result<PathBuf> {
        let stage = self.active_stage(stage)?;
        self.run_stage(&stage)
    }

    /// [`Config::run`] for an already resolved stage name.
    fn run_stage(&mut self, stage: &str) -> Result<PathBuf> {
        let path = self.validate_stage(stage)?;
        self.validate_group_table()?;
        let source = envfile::read(&path, self.size_hint)?;
        self.output
            .transfer("staged", stage, &path.display().to_string());

        let mut distributed = Vec::with_capacity(self.groups().len());
        let result = self.distribute(&source, &mut distributed);

        distributed.sort();
        let lines: Vec<String> = distributed
            .iter()
            .map(|(id, target)| {
                self.output.format_transfer(
                    "distributed",
                    &format!("group.{id}"),
                    &target.display().to_string(),
                )
            })
            .collect();
        for line in &lines {
            self.output.line(line);
        }

        result.map(|()| path)
    }

    /// Writes each group's `.env` (and `.envrc`), recording the targets
    /// written so far.
    fn distribute(
        &self,
        source: &envfile::EnvMap,
        distributed: &mut Vec<(String, PathBuf)>,
    ) -> Result<()> {
        for (id, group) in self.groups() {
            let dir = self.validate_group(id, group)?;
            let env = partition::partition(group, source);
            debug!(group = %id, entries = env.len(), "Partitioned central env");

            if group.check
                && let Some(key) = partition::first_empty_key(&env)
            {
                return Err(Error::EmptyValueDetected {
                    group: id.clone(),
                    key: key.to_string(),
                });
            }

            if !group.direnv.is_empty() {
                self.write_envrc(id, group, &dir).map_err(|e| Error::Envrc {
                    group: id.clone(),
                    source: Box::new(e),
                })?;
            }

            let target = dir.join(crate::ENV_FILE);
            envfile::write(&target, &env)?;
            distributed.push((id.clone(), target));
        }
        Ok(())
    }

    /// Generates the `.envrc` for one group from its `direnv` peers.
    fn write_envrc(&self, id: &str, group: &Group, dir: &Path) -> Result<PathBuf> {
        let mut peers = Vec::with_capacity(group.direnv.len());
        for peer in &group.direnv {
            let peer_group = self
                .groups()
                .get(peer)
                .ok_or_else(|| Error::UnknownGroupReference {
                    group: id.to_string(),
                    reference: peer.clone(),
                })?;
            peers.push(self.group_dir(peer, &peer_group.dir)?);
        }
        direnv::write(dir, &direnv::render(dir, &peers))
    }

    /// Runs once, then reruns whenever the central env is created or
    /// written, until `cancel` fires or a rerun fails.
    ///
    /// The stage is resolved once, so a `switch` from another shell does
    /// not redirect an active watch.
    ///
    /// # Errors
    ///
    /// Returns the initial run error, a watcher error, or the first rerun
    /// error
    pub fn watch(&mut self, stage: Option<&str>, cancel: &CancelToken) -> Result<PathBuf> {
        let stage = self.active_stage(stage)?;
        let path = self.run_stage(&stage)?;

        let watcher = ChangeWatcher::new(&path)?;
        info!(path = %watcher.target().display(), "Watching central env");
        while watcher.wait_for_change(cancel)? {
            self.output.notice("rerun...");
            self.run_stage(&stage)?;
        }
        Ok(path)
    }
}
