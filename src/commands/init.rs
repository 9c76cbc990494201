use crate::config::DEFAULT_CONFIG_FILE;
use crate::output::Output;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Example configuration written by `lem init`.
pub const TEMPLATE: &str = include_str!("../../templates/lem.toml");

/// Write the example configuration to `./lem.toml`
///
/// # Errors
///
/// Returns an error if:
/// - The current directory cannot be determined
/// - `lem.toml` already exists and `force` is not set
/// - The file cannot be written
pub fn execute(force: bool, output: &mut Output) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    execute_in(&cwd, force, output)?;
    Ok(())
}

/// Write the example configuration into `dir`, returning the file path
///
/// # Errors
///
/// See [`execute`]
pub fn execute_in(dir: &Path, force: bool, output: &mut Output) -> Result<PathBuf> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }

    std::fs::write(&path, TEMPLATE)
        .with_context(|| format!("Failed to initialize: {}", path.display()))?;

    output.notice(&format!("created: {DEFAULT_CONFIG_FILE}"));
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_template_decodes() -> Result<()> {
        let file: ConfigFile = toml::from_str(TEMPLATE)?;
        assert!(file.stage.contains_key("default"));
        assert!(file.group.contains_key("api"));
        Ok(())
    }

    #[test]
    fn test_refuses_overwrite_without_force() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut output = Output::sink();
        execute_in(temp_dir.path(), false, &mut output)?;
        assert!(execute_in(temp_dir.path(), false, &mut output).is_err());

        std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILE), "edited")?;
        let path = execute_in(temp_dir.path(), true, &mut output)?;
        assert_eq!(std::fs::read_to_string(path)?, TEMPLATE);
        Ok(())
    }
}
