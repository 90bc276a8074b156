//! Instance management for dashboards living on the page
//! Keeps every dashboard in thread-local storage, keyed by the id handed to JavaScript

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

use crate::wiring::Listener;
use metrics_view_dashboard::Dashboard;

/// A dashboard together with the DOM listeners driving it
pub struct DashboardInstance {
    pub dashboard: Rc<Dashboard>,
    pub listeners: Vec<Listener>,
}

// Thread-local storage for dashboard instances
thread_local! {
    static DASHBOARD_INSTANCES: RefCell<HashMap<Uuid, DashboardInstance>> = RefCell::new(HashMap::new());
}

/// Manages dashboard instances without global mutable state
pub struct InstanceManager;

impl InstanceManager {
    /// Register a dashboard and return its ID
    pub fn create_instance(dashboard: Dashboard) -> Uuid {
        let id = Uuid::new_v4();
        let instance = DashboardInstance {
            dashboard: Rc::new(dashboard),
            listeners: Vec::new(),
        };

        DASHBOARD_INSTANCES.with(|instances| {
            instances.borrow_mut().insert(id, instance);
        });

        id
    }

    /// Shared handle to a dashboard; callers may hold it across awaits
    pub fn dashboard(id: &Uuid) -> Option<Rc<Dashboard>> {
        DASHBOARD_INSTANCES.with(|instances| {
            instances
                .borrow()
                .get(id)
                .map(|instance| Rc::clone(&instance.dashboard))
        })
    }

    /// Replace the listeners of an instance; the previous ones are detached
    pub fn set_listeners(id: &Uuid, listeners: Vec<Listener>) -> bool {
        let previous = DASHBOARD_INSTANCES.with(|instances| {
            instances
                .borrow_mut()
                .get_mut(id)
                .map(|instance| std::mem::replace(&mut instance.listeners, listeners))
        });
        // old listeners detach here, after the borrow is released
        previous.is_some()
    }

    pub fn instance_exists(id: &Uuid) -> bool {
        DASHBOARD_INSTANCES.with(|instances| instances.borrow().contains_key(id))
    }

    /// Remove an instance, detaching its listeners
    pub fn remove_instance(id: &Uuid) -> Option<DashboardInstance> {
        DASHBOARD_INSTANCES.with(|instances| instances.borrow_mut().remove(id))
    }

    pub fn instance_count() -> usize {
        DASHBOARD_INSTANCES.with(|instances| instances.borrow().len())
    }

    pub fn clear_all() {
        let drained: Vec<DashboardInstance> = DASHBOARD_INSTANCES
            .with(|instances| instances.borrow_mut().drain().map(|(_, v)| v).collect());
        drop(drained);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_view_config::DashboardConfig;
    use metrics_view_dashboard::{
        ChartHolder, ChartMount, ChartRenderer, DashboardSurface, RenderHandle, SeriesToggle,
        ViewToggle,
    };
    use metrics_view_data::FilterForm;
    use metrics_view_shared::{DataTable, MetricsViewError, MetricsViewResult, RenderConfig};
    use metrics_view_storage::MemoryToggleStore;

    struct BlankPage;

    impl DashboardSurface for BlankPage {
        fn render_view_toggles(&self, _: &[ViewToggle]) {}
        fn rebuild_chart_holders(&self, _: &[ChartHolder]) {}
        fn render_series_toggles(&self, _: &str, _: &[SeriesToggle]) {}
        fn show_no_data(&self, _: &str) {}
        fn mark_field_invalid(&self, _: &str) {}
        fn clear_invalid_fields(&self) {}
        fn holder_width(&self) -> u32 {
            800
        }
        fn set_custom_range_visible(&self, _: bool) {}
    }

    struct NoRenderer;

    impl ChartRenderer for NoRenderer {
        fn set_up(
            &self,
            _: &ChartMount,
            _: &RenderConfig,
            _: &DataTable,
        ) -> MetricsViewResult<Box<dyn RenderHandle>> {
            Err(MetricsViewError::Renderer {
                message: "no renderer".to_string(),
            })
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(
            DashboardConfig::default(),
            FilterForm::default(),
            None,
            Rc::new(NoRenderer),
            Rc::new(BlankPage),
            Rc::new(MemoryToggleStore::new()),
        )
    }

    #[test]
    fn test_instance_creation_and_retrieval() {
        InstanceManager::clear_all();

        let id = InstanceManager::create_instance(dashboard());
        assert!(InstanceManager::instance_exists(&id));
        assert_eq!(InstanceManager::instance_count(), 1);

        let shared = InstanceManager::dashboard(&id).unwrap();
        assert_eq!(shared.config().views.len(), 3);
        assert!(InstanceManager::set_listeners(&id, Vec::new()));

        InstanceManager::remove_instance(&id);
        assert!(!InstanceManager::instance_exists(&id));
        assert!(InstanceManager::dashboard(&id).is_none());
        assert!(!InstanceManager::set_listeners(&id, Vec::new()));
        assert_eq!(InstanceManager::instance_count(), 0);
    }
}
