//! Dashboard core for the metrics view
//!
//! Decides which charts are shown from the selected views, keeps one
//! session per plotted chart and turns page events into state changes.
//! The page itself is reached only through the traits in [`surface`].

pub mod dashboard;
pub mod selection;
pub mod session;
pub mod surface;

pub use dashboard::Dashboard;
pub use selection::SelectionState;
pub use session::{ChartSession, ChartSessionManager, PlotOutcome};
pub use surface::{
    ChartHolder, ChartMount, ChartRenderer, DashboardSurface, RenderHandle, SeriesToggle,
    ViewToggle,
};
