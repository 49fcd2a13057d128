use std::path::{Path, PathBuf};

/// Storage key the connection catalog is written under.
pub const DEFAULT_CATALOG_KEY: &str = "connections";

const APP_DIR: &str = "termdeck";

/// Where and under which key the engine persists its catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    data_dir: PathBuf,
    catalog_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_key: String::from(DEFAULT_CATALOG_KEY),
        }
    }
}

impl EngineConfig {
    /// Use `data_dir` instead of the per-user default.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog_key(&self) -> &str {
        &self.catalog_key
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return Path::new(&home).join(".config").join(APP_DIR);
    }

    std::env::temp_dir().join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{DEFAULT_CATALOG_KEY, EngineConfig};

    #[test]
    fn given_default_config_when_reading_then_uses_fixed_key_and_app_dir() {
        let config = EngineConfig::default();

        assert_eq!(config.catalog_key(), DEFAULT_CATALOG_KEY);
        assert!(config.data_dir().ends_with("termdeck"));
    }

    #[test]
    fn given_data_dir_override_when_building_then_it_replaces_default() {
        let config = EngineConfig::default().with_data_dir("/srv/termdeck");

        assert_eq!(config.data_dir(), Path::new("/srv/termdeck"));
        assert_eq!(config.catalog_key(), DEFAULT_CATALOG_KEY);
    }
}
