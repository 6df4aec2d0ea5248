use modbot_core::config::Config;
use thiserror::Error;

use std::{fs, io, path::Path};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Loads the [`Config`] from the toml file at `path`.
pub fn from_file<P>(path: P) -> Result<Config, Error>
where
    P: AsRef<Path>,
{
    let buf = fs::read_to_string(path)?;
    from_str(&buf)
}

pub fn from_str(buf: &str) -> Result<Config, Error> {
    Ok(toml::from_str(buf)?)
}
