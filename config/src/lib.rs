//! Load configuration from XDG `config.toml` and project `.env`, then apply it to the
//! process environment with priority: **existing env > .env > XDG**.
//!
//! `config.toml` lives at `$XDG_CONFIG_HOME/<app>/config.toml` and carries an `[env]`
//! table of plain string values:
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//! RAGROUTE_ROUTER = "agent"
//! ```

mod dotenv_file;
mod xdg_toml;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

pub use xdg_toml::default_config_home;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// Merges `.env` over `<config_home>/<app_name>/config.toml` without touching the
/// environment. `.env` wins over XDG for keys present in both.
pub fn collect_env(
    app_name: &str,
    dotenv_dir: Option<&Path>,
    config_home: Option<&Path>,
) -> Result<BTreeMap<String, String>, LoadError> {
    let mut merged = xdg_toml::load_env_map(app_name, config_home)?;
    merged.extend(dotenv_file::load_env_map(dotenv_dir)?);
    Ok(merged)
}

/// Sets each key that is not already in the process environment; returns the keys set.
pub fn apply_missing(values: &BTreeMap<String, String>) -> Vec<String> {
    let mut applied = Vec::new();
    for (key, value) in values {
        if std::env::var_os(key).is_some() {
            continue;
        }
        std::env::set_var(key, value);
        applied.push(key.clone());
    }
    applied
}

/// Loads XDG `config.toml` and the project `.env`, then sets only the variables that
/// are **not** already set.
///
/// * `app_name`: e.g. `"ragroute"`, used for `~/.config/<app_name>/config.toml`.
/// * `override_dir`: if `Some`, look for `.env` there instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let config_home = default_config_home();
    let merged = collect_env(app_name, override_dir, config_home.as_deref())?;
    apply_missing(&merged);
    Ok(())
}
