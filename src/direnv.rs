//! `.envrc` generation for direnv.
//!
//! A group that lists peers in `direnv` gets an `.envrc` that watches and
//! loads each peer's `.env` by a path relative to the group directory:
//!
//! ```text
//! watch_file ../web/.env
//! dotenv_if_exists ../web/.env
//! ```
//!
//! The file is rewritten on every run so it tracks the configuration.

use crate::error::{Error, Result};
use crate::utils::paths;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the generated loader.
pub const ENVRC_FILE: &str = ".envrc";

/// Appends the two directives for one peer directory.
pub fn push_directives(out: &mut String, relative_dir: &Path) {
    let env = relative_dir.join(crate::ENV_FILE);
    out.push_str(&format!("watch_file {}\n", env.display()));
    out.push_str(&format!("dotenv_if_exists {}\n", env.display()));
}

/// Renders an `.envrc` for `group_dir` loading each of `peer_dirs`.
/// All paths must be absolute and clean.
#[must_use]
pub fn render(group_dir: &Path, peer_dirs: &[PathBuf]) -> String {
    let mut out = String::with_capacity(peer_dirs.len() * 64);
    for peer in peer_dirs {
        let relative = paths::relative_to(peer, group_dir).unwrap_or_else(|| peer.clone());
        push_directives(&mut out, &relative);
    }
    out
}

/// Writes `content` to `<group_dir>/.envrc`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] if the file cannot be written
pub fn write(group_dir: &Path, content: &str) -> Result<PathBuf> {
    let dest = group_dir.join(ENVRC_FILE);
    std::fs::write(&dest, content).map_err(|source| Error::WriteFailed {
        path: dest.clone(),
        source,
    })?;
    debug!(path = %dest.display(), "Wrote .envrc");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_render_relative_paths() {
        let group_dir = Path::new("/repo/services/api");
        let peers = vec![
            PathBuf::from("/repo/services/api"),
            PathBuf::from("/repo/web"),
        ];
        assert_eq!(
            render(group_dir, &peers),
            "watch_file ./.env\n\
             dotenv_if_exists ./.env\n\
             watch_file ../../web/.env\n\
             dotenv_if_exists ../../web/.env\n"
        );
    }

    #[test]
    fn test_render_no_peers() {
        assert_eq!(render(Path::new("/repo"), &[]), "");
    }

    #[test]
    fn test_write_overwrites() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(ENVRC_FILE), "stale\n")?;

        let dest = write(temp_dir.path(), "fresh\n")?;
        assert_eq!(fs::read_to_string(dest)?, "fresh\n");
        Ok(())
    }
}
