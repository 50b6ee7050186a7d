use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Server settings read from an optional YAML file.
///
/// ```yaml
/// port: 8080
/// database: /var/lib/treeminder/treeminder.db
/// cors_origin: https://maps.example.com
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub database: String,
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database: "treeminder.db".to_string(),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid server configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Command line values win over anything read from the file.
    pub fn with_overrides(
        mut self,
        port: Option<u16>,
        database: Option<String>,
        cors_origin: Option<String>,
    ) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(database) = database {
            self.database = database;
        }
        if cors_origin.is_some() {
            self.cors_origin = cors_origin;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_yaml("port: 8080\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, "treeminder.db");
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ServerConfig::from_yaml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_yaml("port: 8080\ncors_origin: http://localhost:5173\n")
            .unwrap()
            .with_overrides(None, Some("other.db".to_string()), None);

        assert_eq!(config.port, 8080);
        assert_eq!(config.database, "other.db");
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database: maps.db").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.database, "maps.db");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(ServerConfig::from_yaml("port: [not a number").is_err());
    }
}
