//! Commands sent from the page's event handlers to the dashboard

/// A user or window event, already decoded from the DOM
#[derive(Clone, Debug, PartialEq)]
pub enum DashboardCommand {
    /// Rebuild every chart holder and fetch all active charts
    PlotAll,
    /// Window resized
    ResizeAll,
    /// A filter form field (`source`, `from`, ...) changed
    FilterChanged { field: String, value: String },
    /// One of the custom range pickers changed, epoch milliseconds
    CustomRangeChanged { from: Option<i64>, to: Option<i64> },
    /// A view checkbox was clicked
    ToggleView { key: String, checked: bool },
    /// A series checkbox inside a chart was clicked
    ToggleSeries {
        chart_id: String,
        column: usize,
        checked: bool,
    },
}

/// What the caller has to do after a command was handled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State updated, nothing left to do
    Applied,
    /// The command would leave nothing selected; the triggering
    /// checkbox must be reverted
    Rejected,
    /// Chart holders must be rebuilt and all charts fetched again
    Replot,
}
