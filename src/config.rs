use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = r#"# Path to the SQLite database file
database = "~/.local/share/fyyur/fyyur.db"

# Port for `fyyur serve` (overridden by --port / FYYUR_HTTP_PORT)
# port = 5000
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    database: String,
    #[serde(default)]
    port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or(Self {
            database: "fyyur.db".to_string(),
            port: None,
        })
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents).context(format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("fyyur").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when it
    /// does not exist yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory found"))?;

        if !config_path.exists() {
            log::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    /// Write the default config file unless one already exists
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory found"))?;

        if config_path.exists() {
            log::info!("Config already exists at {}", config_path.display());
            return Ok(config_path);
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .context(format!("Failed to write config file: {}", config_path.display()))?;

        Ok(config_path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    /// Get expanded database path
    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::default();
        assert!(config.database_path().ends_with("fyyur/fyyur.db"));
        assert_eq!(config.port(), None);
    }

    #[test]
    fn test_parse_with_port() {
        let config = Config::parse("database = \"/tmp/fyyur.db\"\nport = 8080\n").unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/fyyur.db"));
        assert_eq!(config.port(), Some(8080));
    }

    #[test]
    fn test_parse_rejects_missing_database() {
        assert!(Config::parse("port = 8080\n").is_err());
    }
}
