use crate::error::{IoContext, PagecraftError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pagecraft.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub source_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extension: String,
    pub feed_template: String,
    pub feed_file: String,
    pub minify: bool,
    pub extra: HashMap<String, Value>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("."),
            extension: "md".to_string(),
            feed_template: "rss.xml".to_string(),
            feed_file: "feed.xml".to_string(),
            minify: false,
            extra: HashMap::new(),
        }
    }
}

impl BuildConfig {
    /// Reads a TOML config file. Relative directories in it are taken relative
    /// to the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).io_context("reading config", path)?;
        let mut config: BuildConfig =
            toml::from_str(&content).map_err(|error| PagecraftError::TomlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        let base = path.parent().unwrap_or(Path::new(""));
        config.source_dir = base.join(&config.source_dir);
        config.template_dir = base.join(&config.template_dir);
        config.output_dir = base.join(&config.output_dir);

        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn feed_path(&self) -> PathBuf {
        self.output_dir.join(&self.feed_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_conventional_layout() {
        let config = BuildConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.feed_template, "rss.xml");
        assert_eq!(config.feed_path(), PathBuf::from("./feed.xml"));
    }

    #[test]
    fn test_load_resolves_relative_to_config_dir() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            r#"
source_dir = "content"
output_dir = "public"
minify = true

[extra]
site_title = "Notes"
"#,
        )
        .unwrap();

        let config = BuildConfig::load(&config_path).unwrap();
        assert_eq!(config.source_dir, dir.path().join("content"));
        assert_eq!(config.template_dir, dir.path().join("templates"));
        assert_eq!(config.output_dir, dir.path().join("public"));
        assert!(config.minify);
        assert_eq!(config.extra["site_title"], Value::from("Notes"));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "source_dir = [").unwrap();

        let result = BuildConfig::load(&config_path);
        assert!(matches!(result, Err(PagecraftError::TomlParse { .. })));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, BuildConfig::default());
    }
}
