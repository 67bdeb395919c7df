//! Read a project `.env` into a key-value map without touching the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `.env` in `override_dir` if given, else in the current directory.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Parses `.env` with the `dotenv` crate (quotes, comments, `export` prefix).
/// A missing file yields an empty map; a malformed line is an error.
pub fn load_env_map(override_dir: Option<&Path>) -> Result<BTreeMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(BTreeMap::new());
    };
    let iter = dotenv::from_path_iter(&path)?;
    let mut out = BTreeMap::new();
    for item in iter {
        let (key, value) = item?;
        out.insert(key, value);
    }
    Ok(out)
}
