//! WASM Bridge crate for the metrics view
//! Connects the dashboard core to the browser: DOM, cookies, fetch and the
//! JavaScript plotting library

use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub mod dom_surface;
pub mod instance_manager;
pub mod js_renderer;
pub mod wiring;

use dom_surface::DomSurface;
use instance_manager::InstanceManager;
use js_renderer::JsRenderer;
use metrics_view_config::{ConfigFormat, ConfigParser, ToggleStorage};
use metrics_view_dashboard::Dashboard;
use metrics_view_data::{resolve_endpoint, DataFetcher, HttpMetricsSource};
use metrics_view_shared::{CommandOutcome, DashboardCommand, MetricsViewError};
use metrics_view_storage::{CookieToggleStore, ToggleStore, WebStorageToggleStore};
use uuid::Uuid;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Metrics view WASM bridge initialized");
}

/// A dashboard bound to the current page
#[wasm_bindgen]
pub struct MetricsView {
    instance_id: Uuid,
}

#[wasm_bindgen]
impl MetricsView {
    /// `config` is the host configuration as JSON; `set_up` is the plotting
    /// library's `setUp(selector, config, table)`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: &str, set_up: js_sys::Function) -> Result<MetricsView, JsValue> {
        let config =
            ConfigParser::parse_string(config, ConfigFormat::Json).map_err(MetricsViewError::from)?;

        let fetcher = match config.endpoint() {
            Some(data_url) => {
                let endpoint = resolve_endpoint(data_url, wiring::page_location().as_deref())?;
                log::info!("Fetching metrics from {endpoint}");
                Some(DataFetcher::new(HttpMetricsSource::new(endpoint)))
            }
            None => {
                log::warn!("No data URL configured, charts will show no data");
                None
            }
        };

        let store: Rc<dyn ToggleStore> = match config.toggle_storage {
            ToggleStorage::Cookie => {
                let mut cookies = CookieToggleStore::new();
                if let Some(path) = &config.cookie.path {
                    cookies = cookies.with_path(path.as_str());
                }
                if let Some(secs) = config.cookie.max_age_secs {
                    cookies = cookies.with_max_age(secs);
                }
                Rc::new(cookies)
            }
            ToggleStorage::Local => Rc::new(WebStorageToggleStore::local()),
            ToggleStorage::Session => Rc::new(WebStorageToggleStore::session()),
        };

        let surface = DomSurface::new()?;
        let form = surface.read_filter_form()?;
        let dashboard = Dashboard::new(
            config,
            form,
            fetcher,
            Rc::new(JsRenderer::new(set_up)),
            Rc::new(surface),
            store,
        );

        Ok(MetricsView {
            instance_id: InstanceManager::create_instance(dashboard),
        })
    }

    fn dashboard(&self) -> Result<Rc<Dashboard>, JsValue> {
        InstanceManager::dashboard(&self.instance_id)
            .ok_or_else(|| JsValue::from_str("Dashboard instance not found"))
    }

    fn run(&self, command: DashboardCommand) -> Result<CommandOutcome, JsValue> {
        wiring::run_command(self.instance_id, command)
            .ok_or_else(|| JsValue::from_str("Dashboard instance not found"))
    }

    /// Restore the view selection, attach the page's listeners and plot
    #[wasm_bindgen]
    pub fn init(&self) -> Result<(), JsValue> {
        let dashboard = self.dashboard()?;
        let outcome = dashboard.init();

        let listeners = wiring::attach(self.instance_id)?;
        InstanceManager::set_listeners(&self.instance_id, listeners);

        if outcome == CommandOutcome::Replot {
            wasm_bindgen_futures::spawn_local(async move {
                dashboard.plot_charts().await;
            });
        }
        Ok(())
    }

    /// Rebuild every chart; the promise settles once all charts are done
    #[wasm_bindgen]
    pub fn plot_charts(&self) -> Result<js_sys::Promise, JsValue> {
        let dashboard = self.dashboard()?;
        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let outcomes = dashboard.plot_charts().await;
            Ok(JsValue::from(outcomes.len() as u32))
        }))
    }

    #[wasm_bindgen]
    pub fn resize_charts(&self) -> Result<(), JsValue> {
        self.run(DashboardCommand::ResizeAll).map(|_| ())
    }

    /// Returns false when the toggle was refused and the checkbox must revert
    #[wasm_bindgen]
    pub fn toggle_view(&self, key: &str, checked: bool) -> Result<bool, JsValue> {
        let outcome = self.run(DashboardCommand::ToggleView {
            key: key.to_string(),
            checked,
        })?;
        Ok(outcome != CommandOutcome::Rejected)
    }

    /// Returns false when the toggle was refused and the checkbox must revert
    #[wasm_bindgen]
    pub fn toggle_series(&self, chart_id: &str, column: u32, checked: bool) -> Result<bool, JsValue> {
        let outcome = self.run(DashboardCommand::ToggleSeries {
            chart_id: chart_id.to_string(),
            column: column as usize,
            checked,
        })?;
        Ok(outcome != CommandOutcome::Rejected)
    }

    #[wasm_bindgen]
    pub fn set_filter(&self, field: &str, value: &str) -> Result<(), JsValue> {
        self.run(DashboardCommand::FilterChanged {
            field: field.to_string(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    /// Custom range bounds in epoch milliseconds
    #[wasm_bindgen]
    pub fn set_custom_range(&self, from: Option<f64>, to: Option<f64>) -> Result<(), JsValue> {
        self.run(DashboardCommand::CustomRangeChanged {
            from: from.filter(|v| v.is_finite()).map(|v| v as i64),
            to: to.filter(|v| v.is_finite()).map(|v| v as i64),
        })
        .map(|_| ())
    }

    /// Detach all listeners and drop the dashboard
    #[wasm_bindgen]
    pub fn destroy(&self) {
        if InstanceManager::remove_instance(&self.instance_id).is_some() {
            log::info!("Dashboard {} destroyed", self.instance_id);
        }
    }
}
