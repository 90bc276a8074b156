//! Renderer backed by a JavaScript plotting library
//!
//! The library is reached through a single `setUp(selector, config, table)`
//! function returning a chart object with `plot(rows)` and `resize()`.

use js_sys::{Array, Function, Reflect};
use metrics_view_dashboard::{ChartMount, ChartRenderer, RenderHandle};
use metrics_view_shared::{DataTable, MetricsViewError, MetricsViewResult, RenderConfig, Row};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn to_js<T: Serialize + ?Sized>(value: &T) -> MetricsViewResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| MetricsViewError::JsInterop {
            message: e.to_string(),
        })
}

pub struct JsRenderer {
    set_up: Function,
}

impl JsRenderer {
    pub fn new(set_up: Function) -> Self {
        Self { set_up }
    }
}

impl ChartRenderer for JsRenderer {
    fn set_up(
        &self,
        mount: &ChartMount,
        config: &RenderConfig,
        data: &DataTable,
    ) -> MetricsViewResult<Box<dyn RenderHandle>> {
        let selector = JsValue::from_str(&mount.plot_selector());
        let chart = self
            .set_up
            .call3(&JsValue::NULL, &selector, &to_js(config)?, &to_js(&data.to_payload())?)
            .map_err(|e| MetricsViewError::Renderer {
                message: format!("setUp failed for {}: {e:?}", mount.chart_id),
            })?;

        if chart.is_null() || chart.is_undefined() {
            return Err(MetricsViewError::Renderer {
                message: format!("setUp returned no chart for {}", mount.chart_id),
            });
        }

        Ok(Box::new(JsChartHandle {
            chart_id: mount.chart_id.clone(),
            chart,
        }))
    }
}

/// A chart object returned by `setUp`
pub struct JsChartHandle {
    chart_id: String,
    chart: JsValue,
}

impl JsChartHandle {
    fn call(&self, method: &str, args: &Array) -> MetricsViewResult<()> {
        let function = Reflect::get(&self.chart, &JsValue::from_str(method))?
            .dyn_into::<Function>()
            .map_err(|_| MetricsViewError::Renderer {
                message: format!("Chart {} has no {method}()", self.chart_id),
            })?;

        function
            .apply(&self.chart, args)
            .map_err(|e| MetricsViewError::Renderer {
                message: format!("{method}() failed for {}: {e:?}", self.chart_id),
            })?;
        Ok(())
    }
}

impl RenderHandle for JsChartHandle {
    fn plot(&mut self, rows: &[Row]) -> MetricsViewResult<()> {
        self.call("plot", &Array::of1(&to_js(rows)?))
    }

    fn resize(&mut self) -> MetricsViewResult<()> {
        self.call("resize", &Array::new())
    }
}
