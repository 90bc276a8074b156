//! Configuration validation utilities

use crate::{ChartLayout, ConfigError, CookieOptions, DashboardConfig, Result, ViewRegistry};
use std::collections::HashSet;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &DashboardConfig) -> Result<()> {
        Self::validate_views(&config.views)?;
        Self::validate_layout(&config.layout)?;
        Self::validate_cookie(&config.cookie)?;

        if let Some(endpoint) = config.endpoint() {
            Self::validate_endpoint(endpoint)?;
        }

        Ok(())
    }

    /// Validate view definitions
    fn validate_views(views: &ViewRegistry) -> Result<()> {
        let mut seen_charts = HashSet::new();

        for view in views.iter() {
            if view.key.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "View '{}' has an empty key",
                    view.name
                )));
            }

            if view.charts.len() != view.titles.len() {
                return Err(ConfigError::Validation(format!(
                    "View '{}' lists {} charts but {} titles",
                    view.key,
                    view.charts.len(),
                    view.titles.len()
                )));
            }

            for chart in &view.charts {
                if chart.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "View '{}' contains an empty chart id",
                        view.key
                    )));
                }

                // Charts shared between views are tolerated; the first one wins
                if !seen_charts.insert(chart.as_str()) {
                    log::warn!(
                        "Chart '{}' appears in more than one view (again in '{}')",
                        chart,
                        view.key
                    );
                }
            }
        }

        Ok(())
    }

    /// Validate chart geometry
    fn validate_layout(layout: &ChartLayout) -> Result<()> {
        if layout.chart_height == 0 || layout.chart_height > 4096 {
            return Err(ConfigError::Validation(format!(
                "Invalid chart height: {}. Must be between 1 and 4096",
                layout.chart_height
            )));
        }

        if layout.marker_size > 50 {
            return Err(ConfigError::Validation(format!(
                "Invalid marker size: {}. Must be at most 50",
                layout.marker_size
            )));
        }

        Ok(())
    }

    fn validate_cookie(cookie: &CookieOptions) -> Result<()> {
        if let Some(path) = &cookie.path {
            if !path.starts_with('/') || path.contains(';') {
                return Err(ConfigError::Validation(format!(
                    "Invalid cookie path '{}'. Must start with '/' and not contain ';'",
                    path
                )));
            }
        }
        Ok(())
    }

    /// Absolute endpoints must be valid URLs; relative ones are resolved by the page
    fn validate_endpoint(endpoint: &str) -> Result<()> {
        match url::Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => Err(ConfigError::Validation(format!(
                "Unsupported data URL scheme: {}",
                url.scheme()
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
            Err(e) => Err(ConfigError::Validation(format!(
                "Invalid data URL '{}': {}",
                endpoint, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;

    fn view(key: &str, charts: &[&str]) -> View {
        View {
            key: key.to_string(),
            name: key.to_uppercase(),
            charts: charts.iter().map(|c| c.to_string()).collect(),
            titles: charts.iter().map(|c| format!("{c} title")).collect(),
            visible: true,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&DashboardConfig::default()).is_ok());
    }

    #[test]
    fn test_shared_charts_are_only_warned() {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = DashboardConfig {
            views: ViewRegistry::new(vec![view("a", &["cpu"]), view("b", &["cpu", "memory"])]).unwrap(),
            ..Default::default()
        };
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_layout_bounds() {
        let mut config = DashboardConfig::default();
        config.layout.chart_height = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        config.layout.chart_height = 300;
        config.layout.marker_size = 80;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_endpoint_forms() {
        let mut config = DashboardConfig::default();

        config.data_url = Some("metrics_ajaxprocessor.jsp".to_string());
        assert!(ConfigValidator::validate(&config).is_ok());

        config.data_url = Some("https://carbon.local:9443/metrics/data".to_string());
        assert!(ConfigValidator::validate(&config).is_ok());

        config.data_url = Some("ftp://carbon.local/data".to_string());
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_cookie_path() {
        let mut config = DashboardConfig::default();

        config.cookie.path = Some("/carbon/metrics".to_string());
        assert!(ConfigValidator::validate(&config).is_ok());

        config.cookie.path = Some("carbon".to_string());
        assert!(ConfigValidator::validate(&config).is_err());

        config.cookie.path = Some("/a; domain=evil".to_string());
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
