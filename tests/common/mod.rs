#![allow(dead_code)]

use anyhow::Result;
use lem::output::SharedBuffer;
use lem::{Config, LoadOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two groups over one central env, the layout used by most tests.
pub const BASIC_CONFIG: &str = r#"
[stage]
default = "./.env"
prod = "./.env.prod"

[group.api]
prefix = "API"
dir = "./services/api"
replace = ["LEGACY"]
plain = ["BAR"]

[group.web]
prefix = "WEB"
dir = "./apps/web"
"#;

/// Central env matching [`BASIC_CONFIG`].
pub const BASIC_ENV: &str = "API_1=111\nBAR=bar\nLEGACY_X=x\nWEB_URL=http://localhost\nOTHER=o\n";

/// Throw-away monorepo fixture
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub output: SharedBuffer,
}

impl TestRepo {
    /// Create a repo with a `.git` marker and the [`BASIC_CONFIG`] layout
    pub fn new() -> Result<Self> {
        Self::with_config(BASIC_CONFIG, BASIC_ENV)
    }

    /// Create a repo with `config` as `lem.toml` and `env` as `./.env`
    pub fn with_config(config: &str, env: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git"))?;
        fs::create_dir_all(root.join("services/api"))?;
        fs::create_dir_all(root.join("apps/web"))?;
        fs::write(root.join(".env"), env)?;

        let config_path = root.join("lem.toml");
        fs::write(&config_path, config)?;

        Ok(Self {
            state_path: root.join("state/lem"),
            config_path,
            temp_dir,
            output: SharedBuffer::new(),
        })
    }

    /// Get the repository root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to a path relative to the root
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Read a file relative to the root
    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path().join(relative))?)
    }

    /// Replace `lem.toml`
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Load the configuration with captured output and an isolated state file
    pub fn load(&self) -> Result<Config> {
        Ok(Config::load_with(
            &self.config_path,
            LoadOptions::new()
                .writer(self.output.clone())
                .state_path(&self.state_path),
        )?)
    }

    /// Everything written to the captured output so far
    pub fn output(&self) -> String {
        self.output.contents()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new().expect("Failed to create test repository")
    }
}
