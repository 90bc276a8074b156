//! Shared types for the metrics view
//!
//! This crate contains the types passed between the data, dashboard and
//! wasm-bridge crates: the fetched data table, the declarative render
//! configuration handed to the plotting library, commands, and errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

pub mod errors;
pub mod events;

pub use errors::{ErrorResponse, MetricsViewError, MetricsViewResult, RangeBound};
pub use events::{CommandOutcome, DashboardCommand};

/// Time range for custom queries, in epoch milliseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// A single cell of a data table. Column 0 usually carries a timestamp,
/// series columns carry numbers, but the endpoint may send strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

pub type Row = Vec<CellValue>;

/// Metadata block of the endpoint's JSON body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PayloadMetadata {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Wire shape of the metrics endpoint: `{ metadata: { names }, data }`.
/// The plotting library consumes the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsPayload {
    #[serde(default)]
    pub metadata: PayloadMetadata,
    #[serde(default)]
    pub data: Option<Vec<Row>>,
}

/// Data returned for a single chart. Immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    column_names: Vec<String>,
    rows: Vec<Row>,
}

impl DataTable {
    /// Build a table, checking every row has one cell per column
    pub fn new(column_names: Vec<String>, rows: Vec<Row>) -> MetricsViewResult<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != column_names.len())
        {
            return Err(MetricsViewError::DataParse {
                message: format!(
                    "row {index} has {} cells but {} columns are named",
                    row.len(),
                    column_names.len()
                ),
            });
        }

        Ok(Self { column_names, rows })
    }

    /// An empty table that keeps the column names
    pub fn empty(column_names: Vec<String>) -> Self {
        Self {
            column_names,
            rows: Vec::new(),
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.column_names.get(index).map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of the plottable series (every column after the x axis)
    pub fn series_columns(&self) -> Range<usize> {
        1..self.column_names.len().max(1)
    }

    /// Convert back to the wire shape for the plotting library
    pub fn to_payload(&self) -> MetricsPayload {
        MetricsPayload {
            metadata: PayloadMetadata {
                names: self.column_names.clone(),
            },
            data: Some(self.rows.clone()),
        }
    }
}

impl TryFrom<MetricsPayload> for DataTable {
    type Error = MetricsViewError;

    fn try_from(payload: MetricsPayload) -> MetricsViewResult<Self> {
        match payload.data {
            Some(rows) if !rows.is_empty() => DataTable::new(payload.metadata.names, rows),
            _ => Ok(DataTable::empty(payload.metadata.names)),
        }
    }
}

/// Chart types supported by the renderer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Bar,
    Scatter,
}

/// How the renderer joins consecutive points
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    Basis,
    Cardinal,
    Monotone,
}

/// Declarative configuration consumed by the plotting library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub x_axis: usize,
    pub y_axis: BTreeSet<usize>,
    pub padding: u32,
    pub width: u32,
    pub height: u32,
    pub chart_type: ChartType,
    pub point_visible: bool,
    pub marker_size: u32,
    pub interpolation_mode: InterpolationMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            x_axis: 0,
            y_axis: BTreeSet::from([1]),
            padding: 520,
            width: 0,
            height: 300,
            chart_type: ChartType::Line,
            point_visible: true,
            marker_size: 2,
            interpolation_mode: InterpolationMode::Linear,
        }
    }
}
