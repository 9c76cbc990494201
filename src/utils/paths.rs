use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Name of the version-control marker directory that identifies a project root.
pub const VCS_MARKER: &str = ".git";

/// A path that has been resolved against the configuration directory and
/// checked to lie inside the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Cleaned absolute path
    pub path: PathBuf,
    /// Whether the path denotes a directory
    pub is_dir: bool,
}

/// Lexically cleans a path: drops `.` segments and folds `name/..` pairs.
///
/// `..` directly under the filesystem root is dropped, matching how the
/// kernel treats `/..`. Leading `..` segments of a relative path are kept.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Makes a path absolute against the current directory and cleans it.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        let current_dir = std::env::current_dir()
            .map_err(|e| Error::io("failed to get current directory", e))?;
        Ok(clean(&current_dir.join(path)))
    }
}

/// Computes `target` relative to `base`. Both must be absolute and clean.
///
/// Returns `None` when the two paths share no root (e.g. different drives).
#[must_use]
pub fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();

    if target.first() != base.first() {
        return None;
    }

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Reports whether `path` lies outside `root`. Both must be absolute and clean.
#[must_use]
pub fn escapes_root(path: &Path, root: &Path) -> bool {
    match relative_to(path, root) {
        Some(rel) => matches!(rel.components().next(), Some(Component::ParentDir)),
        None => true,
    }
}

/// Resolves `candidate` against `base` and checks it stays within `root`.
///
/// Relative candidates are joined to `base`; absolute ones are used as is.
/// The containment check runs before the filesystem is touched, so a path
/// outside the root is rejected whether or not it exists.
///
/// # Errors
///
/// - [`Error::PathEscapesRoot`] if the cleaned path lies outside `root`
/// - [`Error::PathNotFound`] if nothing exists at the path
pub fn resolve(base: &Path, root: &Path, candidate: &Path) -> Result<Resolved> {
    let path = if candidate.is_absolute() {
        clean(candidate)
    } else {
        clean(&base.join(candidate))
    };

    if escapes_root(&path, root) {
        debug!(path = %path.display(), root = %root.display(), "Path escapes project root");
        return Err(Error::PathEscapesRoot {
            path,
            root: root.to_path_buf(),
        });
    }

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(source) => return Err(Error::PathNotFound { path, source }),
    };

    trace!(path = %path.display(), is_dir = metadata.is_dir(), "Resolved path");
    Ok(Resolved {
        is_dir: metadata.is_dir(),
        path,
    })
}

/// Walks upward from `start` to the nearest directory that contains a
/// [`VCS_MARKER`] directory.
///
/// Falls back to `start` itself when the filesystem root is reached without
/// finding one.
#[must_use]
pub fn locate_root(start: &Path) -> PathBuf {
    locate_root_with_marker(start, VCS_MARKER)
}

/// Same as [`locate_root`] with a custom marker directory name.
#[must_use]
pub fn locate_root_with_marker(start: &Path, marker: &str) -> PathBuf {
    let start = clean(start);
    let mut current = start.as_path();
    loop {
        if current.join(marker).is_dir() {
            debug!(root = %current.display(), "Found project root");
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }
    debug!(start = %start.display(), "No {marker} found, using start directory as root");
    start
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("a/../../b", "../b")]
    #[case("./", ".")]
    fn test_clean(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("/repo/api", "/repo/web", "../api")]
    #[case("/repo/api/v1", "/repo", "api/v1")]
    #[case("/repo", "/repo", ".")]
    #[case("/other", "/repo/web", "../../other")]
    fn test_relative_to(#[case] target: &str, #[case] base: &str, #[case] expected: &str) {
        let rel = relative_to(Path::new(target), Path::new(base)).unwrap();
        assert_eq!(rel, PathBuf::from(expected));
    }

    #[test]
    fn test_escapes_root_is_component_based() {
        let root = Path::new("/repo");
        assert!(escapes_root(Path::new("/outside"), root));
        assert!(!escapes_root(Path::new("/repo/..hidden"), root));
        assert!(!escapes_root(Path::new("/repo"), root));
    }

    #[test]
    fn test_resolve_file_and_dir() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("api"))?;
        fs::write(root.join(".env"), "A=1\n")?;

        let dir = resolve(root, root, Path::new("api"))?;
        assert!(dir.is_dir);
        assert_eq!(dir.path, root.join("api"));

        let file = resolve(root, root, Path::new("./.env"))?;
        assert!(!file.is_dir);
        Ok(())
    }

    #[test]
    fn test_resolve_rejects_outside_even_if_missing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("repo");
        fs::create_dir_all(&root)?;

        let err = resolve(&root, &root, Path::new("../outside")).unwrap_err();
        assert!(matches!(err, Error::PathEscapesRoot { .. }));

        // The sibling exists now; still rejected.
        fs::create_dir_all(temp_dir.path().join("outside"))?;
        let err = resolve(&root, &root, Path::new("../outside")).unwrap_err();
        assert!(matches!(err, Error::PathEscapesRoot { .. }));
        Ok(())
    }

    #[test]
    fn test_resolve_missing_path() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let err = resolve(temp_dir.path(), temp_dir.path(), Path::new("nope")).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
        Ok(())
    }

    #[test]
    fn test_locate_root_finds_marker() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git"))?;
        let nested = root.join("services/api/src");
        fs::create_dir_all(&nested)?;

        assert_eq!(locate_root(&nested), clean(root));
        assert_eq!(locate_root(root), clean(root));
        Ok(())
    }

    #[test]
    fn test_locate_root_without_marker_returns_start() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let start = temp_dir.path().join("a/b");
        fs::create_dir_all(&start)?;

        let found = locate_root_with_marker(&start, ".lem-test-marker-that-does-not-exist");
        assert_eq!(found, clean(&start));
        Ok(())
    }

    #[test]
    fn test_ensure_parent_dirs() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let nested_file = temp_dir.path().join("a/b/c/file.txt");

        ensure_parent_dirs(&nested_file)?;
        assert!(nested_file.parent().unwrap().exists());
        Ok(())
    }
}
