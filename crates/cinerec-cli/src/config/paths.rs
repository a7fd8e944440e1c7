//! Profile locations: where the config file and the store live.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the config file inside a profile.
const CONFIG_FILE: &str = "config.toml";

/// Per-user directory name under `~/.config` and `~/.local/share`.
const APP_DIR: &str = "cinerec";

/// Resolved locations of one cinerec profile.
///
/// `--dir` keeps the config file and the store side by side so a test or a
/// second account gets a fully isolated profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    /// TOML config file.
    pub config_file: PathBuf,
    /// Directory holding the session store.
    pub store_dir: PathBuf,
}

impl ProfilePaths {
    /// Resolves the profile from `--dir` or, without it, from `HOME`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is `None` and `HOME` is not set.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::from_parts(dir, home.as_deref())
    }

    fn from_parts(dir: Option<&Path>, home: Option<&Path>) -> Result<Self> {
        if let Some(d) = dir {
            return Ok(Self {
                config_file: d.join(CONFIG_FILE),
                store_dir: d.to_path_buf(),
            });
        }

        let home = home.context("HOME environment variable is not set")?;
        Ok(Self {
            config_file: home.join(".config").join(APP_DIR).join(CONFIG_FILE),
            store_dir: home.join(".local").join("share").join(APP_DIR),
        })
    }
}
