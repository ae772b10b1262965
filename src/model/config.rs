use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REVSET: &str =
    "root() | remote_bookmarks() | ancestors(immutable_heads().., 24)";
pub const CONFIG_FILE_NAME: &str = "jjdag.json";

fn default_version() -> u32 {
    1
}

fn default_revset() -> String {
    DEFAULT_REVSET.to_string()
}

fn default_refresh_interval_ms() -> u64 {
    3000
}

fn default_jj_binary() -> String {
    "jj".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Revset passed to `jj log`; the backend-side visibility filter.
    #[serde(default = "default_revset")]
    pub revset: String,

    /// Idle auto-refresh period. Zero disables auto-refresh.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default)]
    pub ignore_immutable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    #[serde(default = "default_jj_binary")]
    pub jj_binary: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            revset: default_revset(),
            refresh_interval_ms: default_refresh_interval_ms(),
            ignore_immutable: false,
            log_file: None,
            jj_binary: default_jj_binary(),
        }
    }
}

impl ViewerConfig {
    /// `<repo>/.jj/jjdag.json`
    pub fn default_path(repo_root: &Path) -> PathBuf {
        repo_root.join(".jj").join(CONFIG_FILE_NAME)
    }

    /// Config path for the workspace containing `start`: the nearest
    /// directory at or above it holding `.jj`, the same rule jj uses to find
    /// the workspace root. Falls back to `start` itself.
    pub fn discover(start: &Path) -> PathBuf {
        let start = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        start
            .ancestors()
            .find(|dir| dir.join(".jj").is_dir())
            .map_or_else(|| Self::default_path(&start), Self::default_path)
    }

    /// Reads a config file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: ViewerConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        if cfg.version != 1 {
            anyhow::bail!(
                "unsupported config version {} in {}",
                cfg.version,
                path.display()
            );
        }
        Ok(cfg)
    }
}

#[cfg(test)]
#[path = "../tests/model/config_tests.rs"]
mod tests;
