//! Config file discovery and layering for the server and the daemon.
//!
//! Flags and their env vars are parsed by clap; whatever they leave unset is
//! taken from a TOML file, and the merged result is validated once before
//! either binary starts doing work.

use std::{env, fmt, fs, path::PathBuf};

use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// A binary's settings as read from flags or from its config file.
pub trait ServiceConfig: DeserializeOwned + Default {
    /// Env var that may name the config file
    const PATH_ENV: &'static str;
    /// File name searched for in the working, user and system config dirs
    const FILE_NAME: &'static str;

    /// Path given with `--config`
    fn explicit_path(&self) -> Option<&str>;

    /// Values already set on `self` win over the ones from `file`.
    fn layer_over(self, file: Self) -> Self;

    /// Rejects settings the binary cannot run with.
    fn validate(&self) -> anyhow::Result<()>;
}

/// Where the config file came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    WorkingDir(PathBuf),
    User(PathBuf),
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Flag(p)
            | ConfigSource::Env(p)
            | ConfigSource::WorkingDir(p)
            | ConfigSource::User(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Picks the config file to read.
///
/// A path named by the flag or by `env_var` is used even when it does not
/// exist, so a typo fails at read time instead of silently falling back.
/// Otherwise the first existing `file_name` in `.`, `$XDG_CONFIG_HOME/delivery-fee`
/// (or `~/.config/delivery-fee`) and `/etc/delivery-fee` wins.
pub fn locate_config(flag: Option<&str>, env_var: &str, file_name: &str) -> ConfigSource {
    if let Some(path) = flag {
        return ConfigSource::Flag(PathBuf::from(path));
    }
    if let Some(path) = env::var_os(env_var).filter(|path| !path.is_empty()) {
        return ConfigSource::Env(PathBuf::from(path));
    }

    let user_dir = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    let candidates = [
        Some(ConfigSource::WorkingDir(PathBuf::from(file_name))),
        user_dir.map(|dir| ConfigSource::User(dir.join(APP_NAME).join(file_name))),
        Some(ConfigSource::System(
            PathBuf::from("/etc").join(APP_NAME).join(file_name),
        )),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|source| source.path().is_some_and(|path| path.is_file()))
        .unwrap_or(ConfigSource::Defaults)
}

/// Parses the file behind `source`, or returns `T::default()` without one.
pub fn read_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))
}

/// Layers the config file under the parsed flags and validates the result.
pub fn resolve_config<T: ServiceConfig>(flags: T) -> anyhow::Result<(T, ConfigSource)> {
    let source = locate_config(flags.explicit_path(), T::PATH_ENV, T::FILE_NAME);
    let file_config: T = read_config(&source)?;
    let config = flags.layer_over(file_config);
    config
        .validate()
        .with_context(|| format!("invalid configuration (file: {})", source))?;
    Ok((config, source))
}
