//! The dashboard's page, written through web-sys

use metrics_view_dashboard::{
    ChartHolder, ChartMount, DashboardSurface, SeriesToggle, ViewToggle,
};
use metrics_view_data::FilterForm;
use metrics_view_shared::RangeBound;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement};

pub const VIEWS_SELECTION_ID: &str = "viewsSelection";
pub const CHART_HOLDER_ID: &str = "chartHolder";
pub const FORM_ID: &str = "formInput";
const INVALID_CLASS: &str = "has-error";

pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Result<Element, JsValue> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("No element #{id}")))
    }

    fn html_element(&self, id: &str) -> Result<HtmlElement, JsValue> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
    }

    /// Named controls of `#formInput`, in document order. The date pickers
    /// are read separately.
    pub fn read_filter_form(&self) -> Result<FilterForm, JsValue> {
        let controls = self.element(FORM_ID)?.query_selector_all("[name]")?;
        let mut fields = Vec::new();
        for i in 0..controls.length() {
            let Some(node) = controls.item(i) else {
                continue;
            };
            let (name, value) = if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
                if input.id() == RangeBound::From.field_id() || input.id() == RangeBound::To.field_id() {
                    continue;
                }
                (input.name(), input.value())
            } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
                (select.name(), select.value())
            } else {
                continue;
            };
            fields.push((name, value));
        }

        let mut form = FilterForm::new(fields);
        let (from, to) = self.read_custom_range();
        form.set_custom_range(from, to);
        Ok(form)
    }

    /// Current values of the date pickers in epoch milliseconds
    pub fn read_custom_range(&self) -> (Option<i64>, Option<i64>) {
        let read = |bound: RangeBound| {
            self.element(bound.field_id())
                .ok()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value_as_number())
                .filter(|millis| millis.is_finite())
                .map(|millis| millis as i64)
        };
        (read(RangeBound::From), read(RangeBound::To))
    }

    fn checkbox(&self, id: &str, checked: bool, data: &[(&str, &str)]) -> Result<HtmlInputElement, JsValue> {
        let input = self
            .document
            .create_element("input")?
            .dyn_into::<HtmlInputElement>()?;
        input.set_type("checkbox");
        input.set_id(id);
        input.set_checked(checked);
        for (name, value) in data {
            input.set_attribute(&format!("data-{name}"), value)?;
        }
        Ok(input)
    }

    fn labelled(&self, input: &HtmlInputElement, text: &str) -> Result<Element, JsValue> {
        let label = self.document.create_element("label")?;
        label.append_child(input)?;
        label.append_child(&self.document.create_text_node(&format!(" {text}")))?;
        Ok(label)
    }

    fn try_render_view_toggles(&self, toggles: &[ViewToggle]) -> Result<(), JsValue> {
        let container = self.element(VIEWS_SELECTION_ID)?;
        container.set_inner_html("");
        for toggle in toggles {
            let input = self.checkbox(
                &toggle.toggle_key,
                toggle.checked,
                &[("view", toggle.view_key.as_str())],
            )?;
            let label: Element = self.labelled(&input, &toggle.label)?;
            container.append_child(&label)?;
        }
        Ok(())
    }

    fn try_rebuild_chart_holders(&self, holders: &[ChartHolder]) -> Result<(), JsValue> {
        let container = self.element(CHART_HOLDER_ID)?;
        container.set_inner_html("");
        for holder in holders {
            let mount = ChartMount::for_chart(&holder.chart_id);

            let panel = self.document.create_element("div")?;
            panel.set_class_name("chart-panel");

            let title = self.document.create_element("h4")?;
            title.set_text_content(Some(&holder.title));
            panel.append_child(&title)?;

            let toggles = self.document.create_element("div")?;
            toggles.set_id(&mount.toggle_id);
            panel.append_child(&toggles)?;

            let plot = self.document.create_element("div")?;
            plot.set_id(&mount.plot_id);
            panel.append_child(&plot)?;

            let no_data = self
                .document
                .create_element("div")?
                .dyn_into::<HtmlElement>()?;
            no_data.set_id(&mount.no_data_id);
            no_data.set_text_content(Some("No data available"));
            no_data.set_hidden(true);
            panel.append_child(&no_data)?;

            container.append_child(&panel)?;
        }
        Ok(())
    }

    fn try_render_series_toggles(&self, chart_id: &str, toggles: &[SeriesToggle]) -> Result<(), JsValue> {
        let container = self.element(&ChartMount::for_chart(chart_id).toggle_id)?;
        container.set_inner_html("");
        for toggle in toggles {
            let column = toggle.column.to_string();
            let input = self.checkbox(
                &toggle.toggle_key,
                toggle.checked,
                &[("chart", chart_id), ("column", column.as_str())],
            )?;
            let label: Element = self.labelled(&input, &toggle.label)?;
            container.append_child(&label)?;
        }
        Ok(())
    }

    fn try_show_no_data(&self, chart_id: &str) -> Result<(), JsValue> {
        let mount = ChartMount::for_chart(chart_id);
        self.element(&mount.plot_id)?.set_inner_html("");
        self.html_element(&mount.no_data_id)?.set_hidden(false);
        Ok(())
    }

    fn try_clear_invalid_fields(&self) -> Result<(), JsValue> {
        let marked = self
            .document
            .query_selector_all(&format!(".{INVALID_CLASS}"))?;
        for i in 0..marked.length() {
            if let Some(el) = marked.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                el.class_list().remove_1(INVALID_CLASS)?;
            }
        }
        Ok(())
    }

    fn try_set_custom_range_visible(&self, visible: bool) -> Result<(), JsValue> {
        for bound in [RangeBound::From, RangeBound::To] {
            self.html_element(bound.field_id())?.set_hidden(!visible);
        }
        Ok(())
    }
}

fn log_failure(operation: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("{operation} failed: {e:?}");
    }
}

impl DashboardSurface for DomSurface {
    fn render_view_toggles(&self, toggles: &[ViewToggle]) {
        log_failure("Rendering view toggles", self.try_render_view_toggles(toggles));
    }

    fn rebuild_chart_holders(&self, holders: &[ChartHolder]) {
        log_failure("Rebuilding chart holders", self.try_rebuild_chart_holders(holders));
    }

    fn render_series_toggles(&self, chart_id: &str, toggles: &[SeriesToggle]) {
        log_failure(
            "Rendering series toggles",
            self.try_render_series_toggles(chart_id, toggles),
        );
    }

    fn show_no_data(&self, chart_id: &str) {
        log_failure("Showing no data", self.try_show_no_data(chart_id));
    }

    fn mark_field_invalid(&self, field_id: &str) {
        log_failure(
            "Highlighting field",
            self.element(field_id)
                .and_then(|el| el.class_list().add_1(INVALID_CLASS)),
        );
    }

    fn clear_invalid_fields(&self) {
        log_failure("Clearing highlights", self.try_clear_invalid_fields());
    }

    fn holder_width(&self) -> u32 {
        self.element(CHART_HOLDER_ID)
            .map(|el| el.client_width().max(0) as u32)
            .unwrap_or_default()
    }

    fn set_custom_range_visible(&self, visible: bool) {
        log_failure(
            "Toggling custom range",
            self.try_set_custom_range_visible(visible),
        );
    }
}
