//! Configuration parser for multiple formats

use crate::{ConfigError, ConfigValidator, DashboardConfig, Result};
use std::fs;
use std::path::Path;

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse and validate configuration from a file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<DashboardConfig> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)?;
        let format = Self::detect_format(path)?;

        Self::parse_string(&content, format)
    }

    /// Parse and validate configuration from a string
    pub fn parse_string(content: &str, format: ConfigFormat) -> Result<DashboardConfig> {
        let config = match format {
            ConfigFormat::Yaml => Self::parse_yaml(content)?,
            ConfigFormat::Json => Self::parse_json(content)?,
            ConfigFormat::Toml => Self::parse_toml(content)?,
        };

        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    fn parse_yaml(content: &str) -> Result<DashboardConfig> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("YAML parse error: {}", e)))
    }

    fn parse_json(content: &str) -> Result<DashboardConfig> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(content: &str) -> Result<DashboardConfig> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))
    }

    /// Detect configuration format from file extension
    pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ConfigError::Parse("Cannot determine config format from file extension".to_string())
        })?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::Parse(format!(
                "Unsupported config format: {}",
                ext
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_host_config() {
        let json = r#"{
            "dataUrl": "metrics_ajaxprocessor.jsp",
            "views": {
                "jvm": { "name": "JVM", "charts": ["memory", "cpu"], "titles": ["Memory", "CPU"], "visible": true },
                "os": { "name": "OS", "charts": ["fileDescriptor"], "titles": ["File Descriptors"], "visible": false }
            },
            "layout": { "chartHeight": 250 },
            "toggleStorage": "session",
            "cookie": { "path": "/carbon", "maxAgeSecs": 86400 }
        }"#;
        let config = ConfigParser::parse_string(json, ConfigFormat::Json).unwrap();

        assert_eq!(config.endpoint(), Some("metrics_ajaxprocessor.jsp"));
        assert_eq!(config.views.keys().collect::<Vec<_>>(), ["jvm", "os"]);
        assert_eq!(config.layout.chart_height, 250);
        assert_eq!(config.layout.chrome_padding, 150);
        assert_eq!(config.toggle_storage, crate::ToggleStorage::Session);
        assert_eq!(config.cookie.path.as_deref(), Some("/carbon"));
        assert_eq!(config.cookie.max_age_secs, Some(86400));
    }

    #[test]
    fn test_parse_yaml_and_toml() {
        let yaml = r#"
dataUrl: /metrics/data
views:
  cpu:
    name: CPU
    charts: [cpu]
    titles: [CPU Load]
"#;
        let config = ConfigParser::parse_string(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.views.get("cpu").unwrap().titles, ["CPU Load"]);

        let toml = r#"
dataUrl = "/metrics/data"

[views.load]
name = "Load"
charts = ["loadAverage"]
titles = ["System Load Average"]
visible = false
"#;
        let config = ConfigParser::parse_string(toml, ConfigFormat::Toml).unwrap();
        assert!(!config.views.get("load").unwrap().visible);
    }

    #[test]
    fn test_missing_views_fall_back_to_presets() {
        let config = ConfigParser::parse_string(r#"{"dataUrl": "data.jsp"}"#, ConfigFormat::Json).unwrap();
        assert_eq!(config.views, crate::presets::default_views());
        assert_eq!(config.toggle_storage, crate::ToggleStorage::Cookie);
        assert_eq!(config.cookie, crate::CookieOptions::default());
    }

    #[test]
    fn test_misaligned_titles_fail_validation() {
        let json = r#"{ "views": { "jvm": { "name": "JVM", "charts": ["memory", "cpu"], "titles": ["Memory"] } } }"#;
        let err = ConfigParser::parse_string(json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ConfigParser::detect_format(Path::new("views.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigParser::detect_format(Path::new("views.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigParser::detect_format(Path::new("views.ini")).is_err());
        assert!(ConfigParser::detect_format(Path::new("views")).is_err());
    }
}
