//! Per-chart rendering state
//!
//! A session exists for every chart that was plotted successfully since the
//! chart holders were last rebuilt. It keeps the data and configuration the
//! chart was drawn with so series toggles and resizes never refetch.
//!
//! Fetches run concurrently on one thread. Each batch started by
//! [`ChartSessionManager::plot_all`] gets a new generation; a fetch that
//! completes after its generation was superseded is dropped without touching
//! the page.

use crate::selection::SelectionState;
use crate::surface::{ChartMount, ChartRenderer, DashboardSurface, RenderHandle, SeriesToggle};
use futures::future::join_all;
use metrics_view_config::ChartLayout;
use metrics_view_data::{DataFetcher, FilterForm, FROM_FIELD};
use metrics_view_shared::{CommandOutcome, DataTable, MetricsViewError, MetricsViewResult, RenderConfig};
use metrics_view_storage::{series_toggle_key, ToggleStore};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

/// Cached state of one plotted chart
pub struct ChartSession {
    pub chart_id: String,
    pub config: RenderConfig,
    pub data: Rc<DataTable>,
    handle: Box<dyn RenderHandle>,
}

impl ChartSession {
    pub fn series_selection(&self) -> &BTreeSet<usize> {
        &self.config.y_axis
    }
}

impl std::fmt::Debug for ChartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSession")
            .field("chart_id", &self.chart_id)
            .field("config", &self.config)
            .field("rows", &self.data.row_count())
            .finish()
    }
}

/// Result of plotting one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutcome {
    Plotted { series: BTreeSet<usize> },
    /// "No data" is shown in the holder
    NoData,
    /// The filter form is invalid; the offending fields are highlighted
    Invalid,
    /// The batch was superseded while fetching; nothing was written
    Stale,
}

#[derive(Default)]
struct SessionTable {
    generation: u64,
    active: HashSet<String>,
    sessions: HashMap<String, ChartSession>,
}

/// Owns every chart session and drives fetching and rendering
pub struct ChartSessionManager {
    table: RefCell<SessionTable>,
    fetcher: Option<DataFetcher>,
    renderer: Rc<dyn ChartRenderer>,
    surface: Rc<dyn DashboardSurface>,
    store: Rc<dyn ToggleStore>,
    layout: ChartLayout,
}

impl ChartSessionManager {
    pub fn new(
        fetcher: Option<DataFetcher>,
        renderer: Rc<dyn ChartRenderer>,
        surface: Rc<dyn DashboardSurface>,
        store: Rc<dyn ToggleStore>,
        layout: ChartLayout,
    ) -> Self {
        Self {
            table: RefCell::new(SessionTable::default()),
            fetcher,
            renderer,
            surface,
            store,
            layout,
        }
    }

    /// Rebuild every chart holder and plot all active charts
    pub async fn plot_all(
        &self,
        selection: &SelectionState,
        form: &FilterForm,
    ) -> Vec<(String, PlotOutcome)> {
        let holders = selection.holders();
        let generation = {
            let mut table = self.table.borrow_mut();
            table.generation += 1;
            table.sessions.clear();
            table.active = holders.iter().map(|h| h.chart_id.clone()).collect();
            table.generation
        };
        log::debug!(
            "Plotting {} charts (generation {generation})",
            holders.len()
        );

        self.surface.clear_invalid_fields();
        self.surface.rebuild_chart_holders(&holders);

        let plots = holders
            .iter()
            .map(|holder| self.plot_in_generation(&holder.chart_id, form, generation));
        let outcomes = join_all(plots).await;

        holders
            .into_iter()
            .map(|holder| holder.chart_id)
            .zip(outcomes)
            .collect()
    }

    /// Fetch and plot a single active chart
    pub async fn plot_one(&self, chart_id: &str, form: &FilterForm) -> PlotOutcome {
        let generation = self.generation();
        self.plot_in_generation(chart_id, form, generation).await
    }

    async fn plot_in_generation(
        &self,
        chart_id: &str,
        form: &FilterForm,
        generation: u64,
    ) -> PlotOutcome {
        let Some(fetcher) = &self.fetcher else {
            log::debug!("No data endpoint configured, nothing to fetch for {chart_id}");
            self.surface.show_no_data(chart_id);
            return PlotOutcome::NoData;
        };

        let query = match fetcher.build_query(form, chart_id) {
            Ok(query) => query,
            Err(e) => {
                self.highlight(&e);
                log::debug!("Not fetching {chart_id}: {e}");
                return PlotOutcome::Invalid;
            }
        };

        let fetched = fetcher.fetch(&query).await;

        if !self.is_current(chart_id, generation) {
            log::warn!("Discarding stale result for {chart_id} (generation {generation})");
            return PlotOutcome::Stale;
        }

        let table = match fetched {
            Ok(table) if !table.is_empty() => table,
            Ok(_) => {
                log::debug!("No rows for {chart_id}");
                self.surface.show_no_data(chart_id);
                return PlotOutcome::NoData;
            }
            Err(e) => {
                log::warn!("Fetching {chart_id} failed: {e}");
                self.surface.show_no_data(chart_id);
                return PlotOutcome::NoData;
            }
        };

        let (series, toggles) = self.initial_series(chart_id, &table);
        let config = self
            .layout
            .render_config(self.surface.holder_width(), series.clone());

        match self.render(chart_id, config, Rc::new(table)) {
            Ok(session) => {
                self.table
                    .borrow_mut()
                    .sessions
                    .insert(chart_id.to_string(), session);
                if !toggles.is_empty() {
                    self.surface.render_series_toggles(chart_id, &toggles);
                }
                log::debug!("Plotted {chart_id} with series {series:?}");
                PlotOutcome::Plotted { series }
            }
            Err(e) => {
                log::error!("Rendering {chart_id} failed: {e}");
                self.surface.show_no_data(chart_id);
                PlotOutcome::NoData
            }
        }
    }

    fn is_current(&self, chart_id: &str, generation: u64) -> bool {
        let table = self.table.borrow();
        table.generation == generation && table.active.contains(chart_id)
    }

    fn highlight(&self, error: &MetricsViewError) {
        match error {
            MetricsViewError::MissingRangeBound { missing } => {
                for bound in missing {
                    self.surface.mark_field_invalid(bound.field_id());
                }
            }
            MetricsViewError::InvalidFromPreset { .. } => {
                self.surface.mark_field_invalid(FROM_FIELD);
            }
            _ => {}
        }
    }

    /// Series toggles are offered when the table has more than one series;
    /// a single series is always plotted. The toggles are only put on the
    /// page once the chart is drawn.
    fn initial_series(
        &self,
        chart_id: &str,
        table: &DataTable,
    ) -> (BTreeSet<usize>, Vec<SeriesToggle>) {
        if table.column_count() <= 2 {
            return (BTreeSet::from([1]), Vec::new());
        }

        let toggles: Vec<SeriesToggle> = table
            .series_columns()
            .map(|column| {
                let toggle_key = series_toggle_key(chart_id, column);
                let checked = self.store.get(&toggle_key).unwrap_or(true);
                SeriesToggle {
                    column,
                    label: table.column_name(column).unwrap_or_default().to_string(),
                    toggle_key,
                    checked,
                }
            })
            .collect();

        let selection = toggles
            .iter()
            .filter(|t| t.checked)
            .map(|t| t.column)
            .collect();
        (selection, toggles)
    }

    fn render(
        &self,
        chart_id: &str,
        config: RenderConfig,
        data: Rc<DataTable>,
    ) -> MetricsViewResult<ChartSession> {
        let mount = ChartMount::for_chart(chart_id);
        let mut handle = self.renderer.set_up(&mount, &config, &data)?;
        handle.plot(data.rows())?;
        Ok(ChartSession {
            chart_id: chart_id.to_string(),
            config,
            data,
            handle,
        })
    }

    /// Redraw a chart with another series selection from its cached data.
    ///
    /// An empty selection is rejected and the chart keeps its configuration.
    /// `changed` is the `(column, checked)` toggle that caused the redraw.
    pub fn redraw(
        &self,
        chart_id: &str,
        selection: BTreeSet<usize>,
        changed: Option<(usize, bool)>,
    ) -> MetricsViewResult<CommandOutcome> {
        if selection.is_empty() {
            log::debug!("Refusing to hide the last series of {chart_id}");
            return Ok(CommandOutcome::Rejected);
        }

        let (mut config, data) = {
            let table = self.table.borrow();
            let session = table
                .sessions
                .get(chart_id)
                .ok_or_else(|| MetricsViewError::SessionNotFound {
                    chart: chart_id.to_string(),
                })?;
            (session.config.clone(), Rc::clone(&session.data))
        };

        if let Some(column) = selection
            .iter()
            .find(|c| !data.series_columns().contains(*c))
        {
            log::warn!("{chart_id} has no series column {column}");
            return Ok(CommandOutcome::Rejected);
        }

        config.y_axis = selection;
        let session = self.render(chart_id, config, data)?;

        // Only a toggle that was drawn is remembered
        if let Some((column, checked)) = changed {
            self.store.set(&series_toggle_key(chart_id, column), checked);
        }
        self.table
            .borrow_mut()
            .sessions
            .insert(chart_id.to_string(), session);
        Ok(CommandOutcome::Applied)
    }

    /// Flip one series of a plotted chart
    pub fn toggle_series(
        &self,
        chart_id: &str,
        column: usize,
        checked: bool,
    ) -> MetricsViewResult<CommandOutcome> {
        let mut selection = self
            .series_selection(chart_id)
            .ok_or_else(|| MetricsViewError::SessionNotFound {
                chart: chart_id.to_string(),
            })?;
        if checked {
            selection.insert(column);
        } else {
            selection.remove(&column);
        }
        self.redraw(chart_id, selection, Some((column, checked)))
    }

    /// Recompute the layout of every plotted chart
    pub fn resize_all(&self) {
        let mut table = self.table.borrow_mut();
        for session in table.sessions.values_mut() {
            if let Err(e) = session.handle.resize() {
                log::error!("Resizing {} failed: {e}", session.chart_id);
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.table.borrow().generation
    }

    pub fn has_session(&self, chart_id: &str) -> bool {
        self.table.borrow().sessions.contains_key(chart_id)
    }

    pub fn session_count(&self) -> usize {
        self.table.borrow().sessions.len()
    }

    pub fn session_config(&self, chart_id: &str) -> Option<RenderConfig> {
        self.table
            .borrow()
            .sessions
            .get(chart_id)
            .map(|s| s.config.clone())
    }

    pub fn session_data(&self, chart_id: &str) -> Option<Rc<DataTable>> {
        self.table
            .borrow()
            .sessions
            .get(chart_id)
            .map(|s| Rc::clone(&s.data))
    }

    pub fn series_selection(&self, chart_id: &str) -> Option<BTreeSet<usize>> {
        self.table
            .borrow()
            .sessions
            .get(chart_id)
            .map(|s| s.series_selection().clone())
    }
}
