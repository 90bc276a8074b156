//! Mock page, renderer and data source for dashboard tests

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use metrics_view_config::{DashboardConfig, View, ViewRegistry};
use metrics_view_dashboard::{
    ChartHolder, ChartMount, ChartRenderer, Dashboard, DashboardSurface, RenderHandle,
    SeriesToggle, ViewToggle,
};
use metrics_view_data::{DataFetcher, FilterForm, MetricsSource, QueryParams};
use metrics_view_shared::{CellValue, DataTable, MetricsViewError, MetricsViewResult, RenderConfig, Row};
use metrics_view_storage::MemoryToggleStore;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub fn table(names: &[&str], rows: usize) -> DataTable {
    let rows: Vec<Row> = (0..rows)
        .map(|r| {
            (0..names.len())
                .map(|c| CellValue::Number((r * 10 + c) as f64))
                .collect()
        })
        .collect();
    DataTable::new(names.iter().map(|n| n.to_string()).collect(), rows).unwrap()
}

/// Answers queries by their `type` parameter
#[derive(Default)]
pub struct MockSource {
    responses: RefCell<HashMap<String, MetricsViewResult<DataTable>>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    queries: RefCell<Vec<QueryParams>>,
}

impl MockSource {
    pub fn respond(&self, chart_id: &str, result: MetricsViewResult<DataTable>) {
        self.responses
            .borrow_mut()
            .insert(chart_id.to_string(), result);
    }

    /// Hold the next fetch of `chart_id` until `gate` fires
    pub fn gate(&self, chart_id: &str, gate: oneshot::Receiver<()>) {
        self.gates.borrow_mut().insert(chart_id.to_string(), gate);
    }

    pub fn queries(&self) -> Vec<QueryParams> {
        self.queries.borrow().clone()
    }

    pub fn fetched_charts(&self) -> Vec<String> {
        self.queries
            .borrow()
            .iter()
            .filter_map(|q| q.iter().find(|(k, _)| k == "type").map(|(_, v)| v.clone()))
            .collect()
    }
}

impl MetricsSource for MockSource {
    fn fetch<'a>(
        &'a self,
        query: &'a [(String, String)],
    ) -> LocalBoxFuture<'a, MetricsViewResult<DataTable>> {
        async move {
            self.queries.borrow_mut().push(query.to_vec());
            let chart = query
                .iter()
                .find(|(k, _)| k == "type")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();

            let gate = self.gates.borrow_mut().remove(&chart);
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            self.responses
                .borrow()
                .get(&chart)
                .cloned()
                .unwrap_or_else(|| Ok(DataTable::empty(vec!["t".to_string()])))
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct HandleStats {
    pub plotted_rows: HashMap<String, usize>,
    pub resizes: HashMap<String, usize>,
}

pub struct MockHandle {
    chart_id: String,
    stats: Rc<RefCell<HandleStats>>,
}

impl RenderHandle for MockHandle {
    fn plot(&mut self, rows: &[Row]) -> MetricsViewResult<()> {
        self.stats
            .borrow_mut()
            .plotted_rows
            .insert(self.chart_id.clone(), rows.len());
        Ok(())
    }

    fn resize(&mut self) -> MetricsViewResult<()> {
        *self
            .stats
            .borrow_mut()
            .resizes
            .entry(self.chart_id.clone())
            .or_default() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRenderer {
    setups: RefCell<Vec<(ChartMount, RenderConfig)>>,
    failing: RefCell<HashSet<String>>,
    pub stats: Rc<RefCell<HandleStats>>,
}

impl MockRenderer {
    pub fn fail_for(&self, chart_id: &str) {
        self.failing.borrow_mut().insert(chart_id.to_string());
    }

    pub fn setups(&self) -> Vec<(ChartMount, RenderConfig)> {
        self.setups.borrow().clone()
    }

    pub fn set_up_charts(&self) -> Vec<String> {
        self.setups
            .borrow()
            .iter()
            .map(|(mount, _)| mount.chart_id.clone())
            .collect()
    }

    pub fn resizes(&self, chart_id: &str) -> usize {
        self.stats
            .borrow()
            .resizes
            .get(chart_id)
            .copied()
            .unwrap_or_default()
    }
}

impl ChartRenderer for MockRenderer {
    fn set_up(
        &self,
        mount: &ChartMount,
        config: &RenderConfig,
        _data: &DataTable,
    ) -> MetricsViewResult<Box<dyn RenderHandle>> {
        if self.failing.borrow().contains(&mount.chart_id) {
            return Err(MetricsViewError::Renderer {
                message: format!("cannot draw into {}", mount.plot_selector()),
            });
        }
        self.setups.borrow_mut().push((mount.clone(), config.clone()));
        Ok(Box::new(MockHandle {
            chart_id: mount.chart_id.clone(),
            stats: Rc::clone(&self.stats),
        }))
    }
}

/// Records every write to the page
pub struct MockSurface {
    pub width: Cell<u32>,
    pub view_toggles: RefCell<Vec<ViewToggle>>,
    pub holders: RefCell<Vec<ChartHolder>>,
    pub rebuilds: Cell<usize>,
    pub series_toggles: RefCell<HashMap<String, Vec<SeriesToggle>>>,
    pub no_data: RefCell<Vec<String>>,
    pub invalid_fields: RefCell<Vec<String>>,
    pub custom_range_visible: Cell<Option<bool>>,
}

impl MockSurface {
    pub fn new(width: u32) -> Self {
        Self {
            width: Cell::new(width),
            view_toggles: RefCell::default(),
            holders: RefCell::default(),
            rebuilds: Cell::new(0),
            series_toggles: RefCell::default(),
            no_data: RefCell::default(),
            invalid_fields: RefCell::default(),
            custom_range_visible: Cell::new(None),
        }
    }

    pub fn holder_ids(&self) -> Vec<String> {
        self.holders
            .borrow()
            .iter()
            .map(|h| h.chart_id.clone())
            .collect()
    }
}

impl DashboardSurface for MockSurface {
    fn render_view_toggles(&self, toggles: &[ViewToggle]) {
        *self.view_toggles.borrow_mut() = toggles.to_vec();
    }

    fn rebuild_chart_holders(&self, holders: &[ChartHolder]) {
        *self.holders.borrow_mut() = holders.to_vec();
        self.series_toggles.borrow_mut().clear();
        self.no_data.borrow_mut().clear();
        self.rebuilds.set(self.rebuilds.get() + 1);
    }

    fn render_series_toggles(&self, chart_id: &str, toggles: &[SeriesToggle]) {
        self.series_toggles
            .borrow_mut()
            .insert(chart_id.to_string(), toggles.to_vec());
    }

    fn show_no_data(&self, chart_id: &str) {
        self.no_data.borrow_mut().push(chart_id.to_string());
    }

    fn mark_field_invalid(&self, field_id: &str) {
        let mut fields = self.invalid_fields.borrow_mut();
        if !fields.iter().any(|f| f == field_id) {
            fields.push(field_id.to_string());
        }
    }

    fn clear_invalid_fields(&self) {
        self.invalid_fields.borrow_mut().clear();
    }

    fn holder_width(&self) -> u32 {
        self.width.get()
    }

    fn set_custom_range_visible(&self, visible: bool) {
        self.custom_range_visible.set(Some(visible));
    }
}

fn view(key: &str, name: &str, charts: &[(&str, &str)], visible: bool) -> View {
    View {
        key: key.to_string(),
        name: name.to_string(),
        charts: charts.iter().map(|(c, _)| c.to_string()).collect(),
        titles: charts.iter().map(|(_, t)| t.to_string()).collect(),
        visible,
    }
}

pub fn config() -> DashboardConfig {
    DashboardConfig {
        data_url: Some("http://localhost:9763/metrics/data".to_string()),
        views: ViewRegistry::new(vec![
            view(
                "jvm",
                "JVM",
                &[("memory", "Memory"), ("cpu", "CPU Load")],
                true,
            ),
            view(
                "os",
                "Operating System",
                &[("fileDescriptor", "File Descriptor Count")],
                false,
            ),
        ])
        .unwrap(),
        ..DashboardConfig::default()
    }
}

pub struct Harness {
    pub dashboard: Dashboard,
    pub source: Rc<MockSource>,
    pub renderer: Rc<MockRenderer>,
    pub surface: Rc<MockSurface>,
    pub store: Rc<MemoryToggleStore>,
}

impl Harness {
    pub fn new(form: FilterForm) -> Self {
        Self::with_store(form, MemoryToggleStore::new())
    }

    pub fn with_store(form: FilterForm, store: MemoryToggleStore) -> Self {
        Self::build(config(), form, store, true)
    }

    pub fn build(
        config: DashboardConfig,
        form: FilterForm,
        store: MemoryToggleStore,
        with_endpoint: bool,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let source = Rc::new(MockSource::default());
        let renderer = Rc::new(MockRenderer::default());
        let surface = Rc::new(MockSurface::new(1000));
        let store = Rc::new(store);

        let fetcher = with_endpoint
            .then(|| DataFetcher::from_shared(Rc::clone(&source) as Rc<dyn MetricsSource>));
        let dashboard = Dashboard::new(
            config,
            form,
            fetcher,
            Rc::clone(&renderer) as Rc<dyn ChartRenderer>,
            Rc::clone(&surface) as Rc<dyn DashboardSurface>,
            Rc::clone(&store) as Rc<dyn metrics_view_storage::ToggleStore>,
        );

        Self {
            dashboard,
            source,
            renderer,
            surface,
            store,
        }
    }
}

pub fn preset_form() -> FilterForm {
    FilterForm::new([("source", "carbon-1"), ("from", "-1h")])
}
