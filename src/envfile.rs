//! Reading and writing flat `key=value` env files.
//!
//! The reader is deliberately forgiving: blank lines, `#` comments and lines
//! without `=` are skipped. No quoting or escaping is interpreted; values are
//! taken verbatim after trimming. The writer always emits keys in ascending
//! order so distributed files diff cleanly.

use crate::error::{Error, Result};
use crate::utils::paths::ensure_parent_dirs;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Default capacity used when reading a central env file.
pub const DEFAULT_SIZE_HINT: usize = 32;

/// An env mapping. Iteration order is not meaningful.
pub type EnvMap = HashMap<String, String>;

/// Parses env file content into a mapping. Later duplicates win.
#[must_use]
pub fn parse(content: &str, size_hint: usize) -> EnvMap {
    let mut env = EnvMap::with_capacity(size_hint);
    for line in content.lines() {
        if let Some((key, value)) = parse_line(line) {
            env.insert(key.to_string(), value.to_string());
        }
    }
    env
}

/// Parses a single line, returning `None` for blanks, comments and lines
/// without `=`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Reads an env file into a mapping.
///
/// Lines that are not valid UTF-8 are kept, with invalid bytes replaced by
/// U+FFFD.
///
/// # Errors
///
/// Returns [`Error::EnvUnreadable`] if the file cannot be opened or read
pub fn read(path: &Path, size_hint: usize) -> Result<EnvMap> {
    let file = File::open(path).map_err(|source| Error::EnvUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut env = EnvMap::with_capacity(size_hint);
    for (number, bytes) in BufReader::new(file).split(b'\n').enumerate() {
        let bytes = bytes.map_err(|source| Error::EnvUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let line = String::from_utf8_lossy(&bytes);
        if matches!(line, Cow::Owned(_)) {
            warn!(path = %path.display(), line = number + 1, "Replaced invalid UTF-8 in env file");
        }
        if let Some((key, value)) = parse_line(&line) {
            env.insert(key.to_string(), value.to_string());
        }
    }

    debug!(path = %path.display(), entries = env.len(), "Read env file");
    Ok(env)
}

/// Renders a mapping as env file content, sorted by key.
#[must_use]
pub fn render(env: &EnvMap) -> String {
    let mut keys: Vec<&String> = env.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        out.push_str(key);
        out.push('=');
        out.push_str(&env[key]);
        out.push('\n');
    }
    out
}

/// Writes a mapping to `path`, creating parent directories as needed and
/// truncating any existing file.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] on any I/O failure
pub fn write(path: &Path, env: &EnvMap) -> Result<()> {
    let wrap = |source| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent_dirs(path).map_err(wrap)?;
    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(render(env).as_bytes()).map_err(wrap)?;
    writer.flush().map_err(wrap)?;

    debug!(path = %path.display(), entries = env.len(), "Wrote env file");
    Ok(())
}
