//! Where the utilities read from and write to.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched for input files.
    pub working_dir: PathBuf,
    /// Destination of resampled files.
    pub output_dir: PathBuf,
    /// Destination of converted raw files.
    pub downloads_dir: PathBuf,
}

impl Config {
    /// Builds the configuration from the current directory and `$HOME`.
    pub fn from_env() -> Result<Self> {
        let working_dir = std::env::current_dir()?;
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;

        Ok(Config {
            working_dir,
            downloads_dir: home.join("Downloads"),
            output_dir: home,
        })
    }
}
