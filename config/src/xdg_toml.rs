//! Load `[env]` table from `<config_home>/<app>/config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `$XDG_CONFIG_HOME` (or `~/.config`) on Linux; the platform config dir elsewhere.
pub fn default_config_home() -> Option<PathBuf> {
    dirs::config_dir()
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: BTreeMap<String, String>,
}

/// Returns env key-value pairs from the `[env]` section. A missing file or section
/// yields an empty map.
pub fn load_env_map(
    app_name: &str,
    config_home: Option<&Path>,
) -> Result<BTreeMap<String, String>, LoadError> {
    let Some(home) = config_home else {
        return Ok(BTreeMap::new());
    };
    let path = home.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(home: &Path, app: &str, body: &str) {
        let app_dir = home.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map("ragroute", Some(dir.path())).unwrap().is_empty());
        assert!(load_env_map("ragroute", None).unwrap().is_empty());
    }

    #[test]
    fn load_env_map_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "ragroute",
            "[env]\nRAGROUTE_MODEL = \"gpt-4o-mini\"\nRAGROUTE_TOP_K = \"6\"\n",
        );
        let map = load_env_map("ragroute", Some(dir.path())).unwrap();
        assert_eq!(map.get("RAGROUTE_MODEL").map(String::as_str), Some("gpt-4o-mini"));
        assert_eq!(map.get("RAGROUTE_TOP_K").map(String::as_str), Some("6"));
    }

    #[test]
    fn config_without_env_section_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "ragroute", "[other]\nkey = \"ignored\"\n");
        assert!(load_env_map("ragroute", Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "ragroute", "not valid toml [[[\n");
        let result = load_env_map("ragroute", Some(dir.path()));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
