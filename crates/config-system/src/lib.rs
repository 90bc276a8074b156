//! Configuration system for the metrics view
//! Describes the views offered on the page, the data endpoint and the chart layout

use metrics_view_shared::{ChartType, InterpolationMode, MetricsViewError, RenderConfig};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;

pub mod parser;
pub mod presets;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser};
pub use validation::ConfigValidator;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for MetricsViewError {
    fn from(err: ConfigError) -> Self {
        MetricsViewError::InvalidConfig {
            message: err.to_string(),
            field: None,
        }
    }
}

/// A named, user-toggleable group of charts
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub key: String,
    pub name: String,
    pub charts: Vec<String>,
    /// Display titles, index aligned with `charts`
    pub titles: Vec<String>,
    /// Selected when nothing was stored for this view
    pub visible: bool,
}

/// Body of a view as written in the host configuration, keyed by view key
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ViewBody {
    name: String,
    #[serde(default)]
    charts: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default = "default_true")]
    visible: bool,
}

fn default_true() -> bool {
    true
}

/// Ordered collection of views. Iteration follows the order the host
/// configuration lists them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRegistry {
    views: Vec<View>,
}

impl ViewRegistry {
    /// Build a registry, rejecting duplicate view keys
    pub fn new(views: Vec<View>) -> Result<Self> {
        let mut seen = HashSet::new();
        for view in &views {
            if !seen.insert(view.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate view key: {}",
                    view.key
                )));
            }
        }
        Ok(Self { views })
    }

    pub fn iter(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    pub fn get(&self, key: &str) -> Option<&View> {
        self.views.iter().find(|v| v.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(|v| v.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Serialize for ViewRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.views.len()))?;
        for view in &self.views {
            let body = ViewBody {
                name: view.name.clone(),
                charts: view.charts.clone(),
                titles: view.titles.clone(),
                visible: view.visible,
            };
            map.serialize_entry(&view.key, &body)?;
        }
        map.end()
    }
}

struct ViewRegistryVisitor;

impl<'de> Visitor<'de> for ViewRegistryVisitor {
    type Value = ViewRegistry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of view key to view")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ViewRegistry, A::Error> {
        let mut views = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, body)) = access.next_entry::<String, ViewBody>()? {
            views.push(View {
                key,
                name: body.name,
                charts: body.charts,
                titles: body.titles,
                visible: body.visible,
            });
        }
        ViewRegistry::new(views).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ViewRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ViewRegistryVisitor)
    }
}

/// Fixed geometry and styling of every chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartLayout {
    pub chart_height: u32,
    /// Horizontal space taken by the holder's chrome, subtracted from its width
    pub chrome_padding: u32,
    pub padding: u32,
    pub marker_size: u32,
    pub point_visible: bool,
    pub chart_type: ChartType,
    pub interpolation_mode: InterpolationMode,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            chart_height: 300,
            chrome_padding: 150,
            padding: 520,
            marker_size: 2,
            point_visible: true,
            chart_type: ChartType::Line,
            interpolation_mode: InterpolationMode::Linear,
        }
    }
}

impl ChartLayout {
    /// Build the renderer configuration for a holder of the given width
    pub fn render_config(&self, holder_width: u32, y_axis: BTreeSet<usize>) -> RenderConfig {
        RenderConfig {
            x_axis: 0,
            y_axis,
            padding: self.padding,
            width: holder_width.saturating_sub(self.chrome_padding),
            height: self.chart_height,
            chart_type: self.chart_type,
            point_visible: self.point_visible,
            marker_size: self.marker_size,
            interpolation_mode: self.interpolation_mode,
        }
    }
}

/// Where the browser keeps checkbox states
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleStorage {
    #[default]
    Cookie,
    Local,
    Session,
}

/// Attributes of the toggle cookies. Unset means a session cookie on the
/// page's own path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub max_age_secs: Option<u64>,
}

/// Everything the hosting page tells the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default = "presets::default_views")]
    pub views: ViewRegistry,
    #[serde(default)]
    pub layout: ChartLayout,
    #[serde(default)]
    pub toggle_storage: ToggleStorage,
    #[serde(default)]
    pub cookie: CookieOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_url: None,
            views: presets::default_views(),
            layout: ChartLayout::default(),
            toggle_storage: ToggleStorage::default(),
            cookie: CookieOptions::default(),
        }
    }
}

impl DashboardConfig {
    /// The data endpoint, if one is configured
    pub fn endpoint(&self) -> Option<&str> {
        self.data_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
