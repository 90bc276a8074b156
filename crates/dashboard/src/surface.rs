//! Seams to the page: the DOM surface and the plotting library

use metrics_view_shared::{DataTable, MetricsViewResult, RenderConfig, Row};

/// Element ids belonging to one chart holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartMount {
    pub chart_id: String,
    /// Element the renderer draws into
    pub plot_id: String,
    /// Element holding the series checkboxes
    pub toggle_id: String,
    /// Element shown when there is nothing to plot
    pub no_data_id: String,
}

impl ChartMount {
    pub fn for_chart(chart_id: &str) -> Self {
        Self {
            chart_id: chart_id.to_string(),
            plot_id: format!("igviz{chart_id}"),
            toggle_id: format!("toggle{chart_id}"),
            no_data_id: format!("msgNoData{chart_id}"),
        }
    }

    /// CSS selector of the plot element, as the renderer expects it
    pub fn plot_selector(&self) -> String {
        format!("#{}", self.plot_id)
    }
}

/// One chart holder to build under `#chartHolder`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartHolder {
    pub chart_id: String,
    pub title: String,
}

/// A view checkbox with its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewToggle {
    pub view_key: String,
    pub toggle_key: String,
    pub label: String,
    pub checked: bool,
}

/// A series checkbox inside a chart holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesToggle {
    pub column: usize,
    pub toggle_key: String,
    pub label: String,
    pub checked: bool,
}

/// The parts of the page the dashboard writes to.
///
/// Every method is a plain DOM write; none of them may call back into the
/// dashboard.
pub trait DashboardSurface {
    /// Replace the contents of `#viewsSelection`
    fn render_view_toggles(&self, toggles: &[ViewToggle]);

    /// Empty `#chartHolder` and add one holder per chart, in order
    fn rebuild_chart_holders(&self, holders: &[ChartHolder]);

    fn render_series_toggles(&self, chart_id: &str, toggles: &[SeriesToggle]);

    fn show_no_data(&self, chart_id: &str);

    /// Highlight an input of the filter form by element id
    fn mark_field_invalid(&self, field_id: &str);

    /// Remove every highlight set by [`DashboardSurface::mark_field_invalid`]
    fn clear_invalid_fields(&self);

    /// Current width of `#chartHolder` in pixels
    fn holder_width(&self) -> u32;

    /// Show or hide the custom range pickers
    fn set_custom_range_visible(&self, visible: bool);
}

/// A chart set up by the renderer
pub trait RenderHandle {
    fn plot(&mut self, rows: &[Row]) -> MetricsViewResult<()>;

    /// Recompute the layout for the current size of the mount element
    fn resize(&mut self) -> MetricsViewResult<()>;
}

/// The plotting library
pub trait ChartRenderer {
    fn set_up(
        &self,
        mount: &ChartMount,
        config: &RenderConfig,
        data: &DataTable,
    ) -> MetricsViewResult<Box<dyn RenderHandle>>;
}
