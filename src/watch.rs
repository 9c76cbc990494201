//! Watching a central env file for changes.
//!
//! The notification backend runs on its own thread and forwards raw events
//! over a channel. The caller's thread blocks in
//! [`ChangeWatcher::wait_for_change`], which filters the events down to
//! creates and writes of the one watched file and wakes up periodically to
//! honour a [`CancelToken`].

use crate::error::{Error, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, trace};

/// How often a blocked watcher checks for cancellation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cooperative cancellation flag shared between threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reports whether an event kind should trigger a rerun: file creation,
/// data writes, and a rename onto the file (editors that save atomically).
#[must_use]
pub const fn is_rerun_trigger(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Any
                    | ModifyKind::Data(_)
                    | ModifyKind::Name(RenameMode::To | RenameMode::Both)
            )
    )
}

/// Subscription to changes of a single file.
pub struct ChangeWatcher {
    /// Keeps the backend alive; dropping it ends the event stream
    _watcher: RecommendedWatcher,
    /// Events forwarded by the backend thread
    events: Receiver<notify::Result<Event>>,
    /// The watched file as configured
    target: PathBuf,
    /// The watched file with symlinks resolved, as some backends report it
    canonical: Option<PathBuf>,
}

impl ChangeWatcher {
    /// Watches the directory containing `target`, non-recursively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if the backend cannot be created or the
    /// directory cannot be subscribed to
    pub fn new(target: &Path) -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone once the watch loop returns.
            let _ = tx.send(res);
        })
        .map_err(|source| Error::Watch {
            context: "failed to create watcher".into(),
            source,
        })?;

        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| Error::Watch {
                context: format!("failed to watch {}", dir.display()),
                source,
            })?;
        debug!(dir = %dir.display(), target = %target.display(), "Watching directory");

        Ok(Self {
            _watcher: watcher,
            events,
            target: target.to_path_buf(),
            canonical: target.canonicalize().ok(),
        })
    }

    /// The watched file.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Whether `event` is a qualifying change of the watched file.
    fn is_target_change(&self, event: &Event) -> bool {
        is_rerun_trigger(&event.kind)
            && event
                .paths
                .iter()
                .any(|p| *p == self.target || self.canonical.as_deref() == Some(p.as_path()))
    }

    /// Blocks until the watched file is created or written.
    ///
    /// Returns `Ok(true)` for a change, `Ok(false)` once `cancel` fires or
    /// the backend shuts down. Each qualifying event yields exactly one
    /// `true`; bursts are not coalesced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if the backend reports an error
    pub fn wait_for_change(&self, cancel: &CancelToken) -> Result<bool> {
        loop {
            if cancel.is_cancelled() {
                debug!("Watch cancelled");
                return Ok(false);
            }
            match self.events.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if self.is_target_change(&event) {
                        debug!(kind = ?event.kind, "Central env changed");
                        return Ok(true);
                    }
                    trace!(kind = ?event.kind, paths = ?event.paths, "Ignoring event");
                }
                Ok(Err(source)) => {
                    return Err(Error::Watch {
                        context: "event stream failed".into(),
                        source,
                    });
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn test_rerun_triggers() {
        assert!(is_rerun_trigger(&EventKind::Create(CreateKind::File)));
        assert!(is_rerun_trigger(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(is_rerun_trigger(&EventKind::Modify(ModifyKind::Name(
            RenameMode::To
        ))));
        assert!(!is_rerun_trigger(&EventKind::Modify(ModifyKind::Name(
            RenameMode::From
        ))));
        assert!(!is_rerun_trigger(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Permissions
        ))));
        assert!(!is_rerun_trigger(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_rerun_trigger(&EventKind::Access(AccessKind::Any)));
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_wait_returns_on_cancel() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join(".env");
        fs::write(&target, "A=1\n")?;

        let watcher = ChangeWatcher::new(&target)?;
        let token = CancelToken::new();
        token.cancel();

        let start = Instant::now();
        assert!(!watcher.wait_for_change(&token)?);
        assert!(start.elapsed() < Duration::from_secs(2));
        Ok(())
    }

    #[test]
    fn test_event_filter_matches_only_target() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join(".env");
        fs::write(&target, "A=1\n")?;
        let watcher = ChangeWatcher::new(&target)?;

        let write = |path: PathBuf| {
            Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any))).add_path(path)
        };
        assert!(watcher.is_target_change(&write(target.clone())));
        assert!(!watcher.is_target_change(&write(temp_dir.path().join("other"))));
        Ok(())
    }
}
