//! Page events to dashboard commands
//!
//! Listeners only carry the instance id and look the dashboard up on every
//! event, so a removed instance is never kept alive by its closures.

use crate::dom_surface::{DomSurface, CHART_HOLDER_ID, FORM_ID, VIEWS_SELECTION_ID};
use crate::instance_manager::InstanceManager;
use metrics_view_shared::{CommandOutcome, DashboardCommand, RangeBound};
use uuid::Uuid;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlInputElement, HtmlSelectElement};

type EventClosure = Closure<dyn FnMut(Event)>;

/// An attached DOM listener, detached on drop
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: EventClosure,
}

impl Listener {
    fn attach(
        target: EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Page location used to resolve a relative data URL
pub fn page_location() -> Option<String> {
    web_sys::window().and_then(|window| window.location().href().ok())
}

/// Apply a command and schedule the replot it asks for
pub fn run_command(instance_id: Uuid, command: DashboardCommand) -> Option<CommandOutcome> {
    let Some(dashboard) = InstanceManager::dashboard(&instance_id) else {
        log::warn!("Dashboard {instance_id} is gone, ignoring {command:?}");
        return None;
    };

    let outcome = dashboard.handle(command);
    if outcome == CommandOutcome::Replot {
        wasm_bindgen_futures::spawn_local(async move {
            dashboard.plot_charts().await;
        });
    }
    Some(outcome)
}

fn target_input(event: &Event) -> Option<HtmlInputElement> {
    event.target()?.dyn_into::<HtmlInputElement>().ok()
}

/// A checkbox click the dashboard refused is undone by cancelling the click
fn revert_if_rejected(event: &Event, outcome: Option<CommandOutcome>) {
    if outcome == Some(CommandOutcome::Rejected) {
        event.prevent_default();
    }
}

fn on_view_click(instance_id: Uuid, event: Event) {
    let Some(input) = target_input(&event) else {
        return;
    };
    let Some(key) = input.get_attribute("data-view") else {
        return;
    };
    let outcome = run_command(
        instance_id,
        DashboardCommand::ToggleView {
            key,
            checked: input.checked(),
        },
    );
    revert_if_rejected(&event, outcome);
}

fn on_series_click(instance_id: Uuid, event: Event) {
    let Some(input) = target_input(&event) else {
        return;
    };
    let (Some(chart_id), Some(column)) = (
        input.get_attribute("data-chart"),
        input.get_attribute("data-column"),
    ) else {
        return;
    };
    let Ok(column) = column.parse() else {
        log::warn!("Series checkbox of {chart_id} has a bad column {column:?}");
        return;
    };
    let outcome = run_command(
        instance_id,
        DashboardCommand::ToggleSeries {
            chart_id,
            column,
            checked: input.checked(),
        },
    );
    revert_if_rejected(&event, outcome);
}

fn on_form_change(instance_id: Uuid, surface: &DomSurface, event: Event) {
    let Some(target) = event.target() else {
        return;
    };

    let command = if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        let id = input.id();
        if id == RangeBound::From.field_id() || id == RangeBound::To.field_id() {
            let (from, to) = surface.read_custom_range();
            DashboardCommand::CustomRangeChanged { from, to }
        } else if input.name().is_empty() {
            return;
        } else {
            DashboardCommand::FilterChanged {
                field: input.name(),
                value: input.value(),
            }
        }
    } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
        DashboardCommand::FilterChanged {
            field: select.name(),
            value: select.value(),
        }
    } else {
        return;
    };

    run_command(instance_id, command);
}

/// Hook the page's events up to the dashboard
pub fn attach(instance_id: Uuid) -> Result<Vec<Listener>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
    let surface = DomSurface::new()?;
    let element = |id: &str| -> Result<EventTarget, JsValue> {
        surface
            .document()
            .get_element_by_id(id)
            .map(EventTarget::from)
            .ok_or_else(|| JsValue::from_str(&format!("No element #{id}")))
    };

    let views = element(VIEWS_SELECTION_ID)?;
    let holders = element(CHART_HOLDER_ID)?;
    let form = element(FORM_ID)?;

    let listeners = vec![
        Listener::attach(window.into(), "resize", move |_| {
            run_command(instance_id, DashboardCommand::ResizeAll);
        })?,
        Listener::attach(views, "click", move |event| on_view_click(instance_id, event))?,
        Listener::attach(holders, "click", move |event| {
            on_series_click(instance_id, event)
        })?,
        Listener::attach(form, "change", move |event| {
            on_form_change(instance_id, &surface, event)
        })?,
    ];

    log::debug!("Attached {} listeners for dashboard {instance_id}", listeners.len());
    Ok(listeners)
}
