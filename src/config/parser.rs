use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use baks::config::load_config;
///
/// let config = load_config(Path::new("baks.toml")).unwrap();
/// println!("Deadline: {}ms", config.fetch.timeout_ms);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration at `path`, or the defaults when no path is given
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

/// Returns the database path to use, creating its parent directory if needed
///
/// An explicit `override_path` (the `--db` flag) wins over the configured
/// path, which wins over `<platform config dir>/baks/baks.db`.
pub fn resolve_database_path(
    config: &Config,
    override_path: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let path = match override_path.or(config.storage.database_path.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => default_database_path()?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    Ok(path)
}

fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", "baks").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.config_dir().join("baks.db"))
}
