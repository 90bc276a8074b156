//! Central command handler tying selection, sessions and the filter form
//! together

use crate::selection::SelectionState;
use crate::session::{ChartSessionManager, PlotOutcome};
use crate::surface::{ChartRenderer, DashboardSurface, ViewToggle};
use metrics_view_config::DashboardConfig;
use metrics_view_data::{DataFetcher, FilterForm, RangeMode, FROM_FIELD};
use metrics_view_shared::{CommandOutcome, DashboardCommand};
use metrics_view_storage::ToggleStore;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Dashboard {
    config: DashboardConfig,
    store: Rc<dyn ToggleStore>,
    surface: Rc<dyn DashboardSurface>,
    sessions: ChartSessionManager,
    selection: RefCell<SelectionState>,
    view_toggles: RefCell<Vec<ViewToggle>>,
    form: RefCell<FilterForm>,
}

impl Dashboard {
    /// `fetcher` is `None` when no data endpoint is configured; every chart
    /// then shows "no data".
    pub fn new(
        config: DashboardConfig,
        form: FilterForm,
        fetcher: Option<DataFetcher>,
        renderer: Rc<dyn ChartRenderer>,
        surface: Rc<dyn DashboardSurface>,
        store: Rc<dyn ToggleStore>,
    ) -> Self {
        let sessions = ChartSessionManager::new(
            fetcher,
            renderer,
            Rc::clone(&surface),
            Rc::clone(&store),
            config.layout.clone(),
        );
        Self {
            config,
            store,
            surface,
            sessions,
            selection: RefCell::new(SelectionState::default()),
            view_toggles: RefCell::new(Vec::new()),
            form: RefCell::new(form),
        }
    }

    /// Restore the view selection and render the view checkboxes. The caller
    /// plots afterwards.
    pub fn init(&self) -> CommandOutcome {
        let (selection, toggles) =
            SelectionState::compute_active_charts(&self.config.views, self.store.as_ref());
        self.surface.render_view_toggles(&toggles);
        self.surface
            .set_custom_range_visible(self.form.borrow().range_mode() == RangeMode::Custom);

        log::info!(
            "Dashboard initialised with {} views and {} active charts",
            toggles.len(),
            selection.len()
        );
        *self.selection.borrow_mut() = selection;
        *self.view_toggles.borrow_mut() = toggles;
        CommandOutcome::Replot
    }

    /// Apply a command to the dashboard state. A [`CommandOutcome::Replot`]
    /// must be followed by [`Dashboard::plot_charts`].
    pub fn handle(&self, command: DashboardCommand) -> CommandOutcome {
        match command {
            DashboardCommand::PlotAll => CommandOutcome::Replot,
            DashboardCommand::ResizeAll => {
                self.sessions.resize_all();
                CommandOutcome::Applied
            }
            DashboardCommand::FilterChanged { field, value } => {
                if field == FROM_FIELD {
                    let mut form = self.form.borrow_mut();
                    let was_custom = form.range_mode() == RangeMode::Custom;
                    form.set_field(&field, value);
                    let is_custom = form.range_mode() == RangeMode::Custom;
                    if was_custom != is_custom {
                        self.surface.set_custom_range_visible(is_custom);
                    }
                } else {
                    self.form.borrow_mut().set_field(&field, value);
                }
                CommandOutcome::Replot
            }
            DashboardCommand::CustomRangeChanged { from, to } => {
                let mut form = self.form.borrow_mut();
                form.set_custom_range(from, to);
                if form.range_mode() == RangeMode::Custom {
                    CommandOutcome::Replot
                } else {
                    CommandOutcome::Applied
                }
            }
            DashboardCommand::ToggleView { key, checked } => self.toggle_view(&key, checked),
            DashboardCommand::ToggleSeries {
                chart_id,
                column,
                checked,
            } => match self.sessions.toggle_series(&chart_id, column, checked) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("Cannot toggle series {column} of {chart_id}: {e}");
                    CommandOutcome::Rejected
                }
            },
        }
    }

    fn toggle_view(&self, key: &str, checked: bool) -> CommandOutcome {
        let mut toggles = self.view_toggles.borrow().clone();
        match toggles.iter_mut().find(|t| t.view_key == key) {
            Some(toggle) => toggle.checked = checked,
            None => {
                log::warn!("Toggle for unknown view {key}");
                return CommandOutcome::Rejected;
            }
        }

        let selected: Vec<&str> = toggles
            .iter()
            .filter(|t| t.checked)
            .map(|t| t.view_key.as_str())
            .collect();
        let accepted = self.selection.borrow_mut().refresh_on_view_toggle(
            &self.config.views,
            &selected,
            Some((key, checked)),
            self.store.as_ref(),
        );
        if !accepted {
            return CommandOutcome::Rejected;
        }

        *self.view_toggles.borrow_mut() = toggles;
        CommandOutcome::Replot
    }

    /// Rebuild the chart holders and plot every active chart
    pub async fn plot_charts(&self) -> Vec<(String, PlotOutcome)> {
        let selection = self.selection.borrow().clone();
        let form = self.form.borrow().clone();
        self.sessions.plot_all(&selection, &form).await
    }

    /// Handle a command and run the replot it asks for
    pub async fn dispatch(&self, command: DashboardCommand) -> CommandOutcome {
        let outcome = self.handle(command);
        if outcome == CommandOutcome::Replot {
            self.plot_charts().await;
        }
        outcome
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.borrow().clone()
    }

    pub fn view_toggles(&self) -> Vec<ViewToggle> {
        self.view_toggles.borrow().clone()
    }

    pub fn form(&self) -> FilterForm {
        self.form.borrow().clone()
    }

    pub fn sessions(&self) -> &ChartSessionManager {
        &self.sessions
    }
}
