use crate::vrp::PageSize;
use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Default number of records requested from the history service per query
pub const DEFAULT_QUERY_BATCH_SIZE: u32 = 1000;

pub struct RpkilogConfig {
    /// History API endpoint; queries are not possible without it
    pub api_url: Option<String>,

    /// Number of history entries shown per page (default: 20)
    pub page_size: PageSize,

    /// Number of records requested per query (default: 1000)
    pub paginate_size: u32,
}

const EMPTY_CONFIG: &str = r#"### rpkilog configuration file

### VRP history API endpoint
# api_url = "https://history.example.net/vrp"

### number of history entries shown per page
# page_size = 20

### number of records requested from the history API per query
# paginate_size = 1000
"#;

impl Default for RpkilogConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            page_size: PageSize::default(),
            paginate_size: DEFAULT_QUERY_BATCH_SIZE,
        }
    }
}

impl RpkilogConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<RpkilogConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                // By default use $HOME/.rpkilog/rpkilog.toml as the configuration file path
                let rpkilog_dir = Self::config_dir()?;
                std::fs::create_dir_all(rpkilog_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create rpkilog directory: {}", e))?;
                let p = format!("{}/rpkilog.toml", rpkilog_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of RPKILOG)
        // E.g., `RPKILOG_PAGE_SIZE=50 ./rpkilog history ...` would show 50 entries per page
        builder = builder.add_source(config::Environment::with_prefix("RPKILOG"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    /// Build from already-loaded key/value settings
    ///
    /// Invalid numbers fall back to their defaults with a warning.
    pub fn from_map(config: &HashMap<String, String>) -> RpkilogConfig {
        let api_url = config
            .get("api_url")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let page_size = config
            .get("page_size")
            .map(|s| PageSize::parse_or_default(s))
            .unwrap_or_default();

        let paginate_size = match config.get("paginate_size") {
            Some(s) => match s.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(
                        "paginate_size should be a positive integer, but is {:?}. Replacing with default ({}).",
                        s, DEFAULT_QUERY_BATCH_SIZE
                    );
                    DEFAULT_QUERY_BATCH_SIZE
                }
            },
            None => DEFAULT_QUERY_BATCH_SIZE,
        };

        RpkilogConfig {
            api_url,
            page_size,
            paginate_size,
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = [
            format!(
                "API URL:            {}",
                self.api_url.as_deref().unwrap_or("(not set)")
            ),
            format!("Page Size:          {}", self.page_size),
            format!("Paginate Size:      {}", self.paginate_size),
            format!("Config File:        {}", Self::config_file_path()),
        ];
        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.rpkilog/rpkilog.toml", home_dir)
    }

    fn config_dir() -> Result<String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();
        Ok(format!("{}/.rpkilog", home_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RpkilogConfig::default();
        assert!(config.api_url.is_none());
        assert_eq!(config.page_size.get(), 20);
        assert_eq!(config.paginate_size, 1000);
    }

    #[test]
    fn test_from_map_with_invalid_values() {
        let mut map = HashMap::new();
        map.insert("api_url".to_string(), "  ".to_string());
        map.insert("page_size".to_string(), "abc".to_string());
        map.insert("paginate_size".to_string(), "-1".to_string());
        let config = RpkilogConfig::from_map(&map);
        assert!(config.api_url.is_none());
        assert_eq!(config.page_size.get(), 20);
        assert_eq!(config.paginate_size, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rpkilog.toml");
        std::fs::write(
            &path,
            "api_url = \"http://localhost:8080/vrp\"\npage_size = 50\npaginate_size = 200\n",
        )
        .unwrap();

        let config = RpkilogConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8080/vrp"));
        assert_eq!(config.page_size.get(), 50);
        assert_eq!(config.paginate_size, 200);
    }

    #[test]
    fn test_missing_file_is_created_with_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.toml");
        let config = RpkilogConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.page_size.get(), 20);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("### rpkilog configuration file"));
    }

    #[test]
    fn test_summary() {
        let summary = RpkilogConfig::default().summary();
        assert!(summary.contains("(not set)"));
        assert!(summary.contains("Page Size:          20"));
    }
}
