//! Which charts are shown, derived from the selected views

use crate::surface::{ChartHolder, ViewToggle};
use metrics_view_config::{View, ViewRegistry};
use metrics_view_storage::{view_toggle_key, ToggleStore};
use std::collections::HashSet;

/// Active charts and their titles, index aligned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    charts: Vec<String>,
    titles: Vec<String>,
}

impl SelectionState {
    /// Concatenate the charts of `views` in order
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a View>) -> Self {
        let mut state = Self::default();
        for view in views {
            if view.titles.len() != view.charts.len() {
                log::warn!(
                    "View {} has {} charts but {} titles",
                    view.key,
                    view.charts.len(),
                    view.titles.len()
                );
            }
            for (i, chart) in view.charts.iter().enumerate() {
                let title = view.titles.get(i).unwrap_or(chart);
                state.charts.push(chart.clone());
                state.titles.push(title.clone());
            }
        }

        let mut seen = HashSet::new();
        for chart in &state.charts {
            if !seen.insert(chart.as_str()) {
                log::warn!("Chart {chart} is selected by more than one view");
            }
        }
        state
    }

    /// Build the initial selection. A view is visible when its stored toggle
    /// says so, or when nothing is stored and the view is visible by default.
    pub fn compute_active_charts(
        registry: &ViewRegistry,
        store: &dyn ToggleStore,
    ) -> (Self, Vec<ViewToggle>) {
        let mut toggles = Vec::with_capacity(registry.len());
        let mut visible = Vec::new();

        for view in registry.iter() {
            let toggle_key = view_toggle_key(&view.key);
            let checked = store.get(&toggle_key).unwrap_or(view.visible);
            toggles.push(ViewToggle {
                view_key: view.key.clone(),
                toggle_key,
                label: view.name.clone(),
                checked,
            });
            if checked {
                visible.push(view);
            }
        }

        let state = Self::from_views(visible);
        log::debug!(
            "{} of {} views visible, {} charts active",
            toggles.iter().filter(|t| t.checked).count(),
            toggles.len(),
            state.len()
        );
        (state, toggles)
    }

    /// Recompute the selection from the checked view keys.
    ///
    /// With nothing checked the state is left alone and `false` is returned;
    /// the caller must revert the checkbox. Otherwise `changed`
    /// (`(view key, checked)`) is persisted and the state replaced.
    pub fn refresh_on_view_toggle(
        &mut self,
        registry: &ViewRegistry,
        selected_keys: &[&str],
        changed: Option<(&str, bool)>,
        store: &dyn ToggleStore,
    ) -> bool {
        if selected_keys.is_empty() {
            log::debug!("Refusing to deselect the last view");
            return false;
        }

        let views = selected_keys.iter().filter_map(|key| {
            let view = registry.get(key);
            if view.is_none() {
                log::warn!("Skipping unknown view {key}");
            }
            view
        });
        let next = Self::from_views(views);

        if let Some((view_key, checked)) = changed {
            store.set(&view_toggle_key(view_key), checked);
        }

        *self = next;
        true
    }

    pub fn charts(&self) -> &[String] {
        &self.charts
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Title of the first occurrence of `chart_id`
    pub fn title_for(&self, chart_id: &str) -> Option<&str> {
        self.charts
            .iter()
            .position(|c| c == chart_id)
            .map(|i| self.titles[i].as_str())
    }

    pub fn contains(&self, chart_id: &str) -> bool {
        self.charts.iter().any(|c| c == chart_id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// One holder per distinct chart, first occurrence wins
    pub fn holders(&self) -> Vec<ChartHolder> {
        let mut seen = HashSet::new();
        self.charts
            .iter()
            .zip(&self.titles)
            .filter(|(chart, _)| seen.insert(chart.as_str()))
            .map(|(chart, title)| ChartHolder {
                chart_id: chart.clone(),
                title: title.clone(),
            })
            .collect()
    }
}
