use crate::feedback::MissingField;
use crate::model::{FuturePredictionSet, ParkingCandidate, SearchResultSet, ViewMode};
use tokio::sync::watch;

/// What the feedback panel is showing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackPanel {
    pub visible: bool,
    pub selected: Option<ParkingCandidate>,
    pub missing_fields: Vec<MissingField>,
}

/// The controller's state record.
///
/// Every setter also publishes on a watch channel so renderers can follow
/// changes without polling. Result sets are only ever replaced whole.
#[derive(Debug)]
pub struct AppState {
    view_mode: ViewMode,
    view_mode_tx: watch::Sender<ViewMode>,
    search_results: Option<SearchResultSet>,
    search_results_tx: watch::Sender<Option<SearchResultSet>>,
    future_results: Option<FuturePredictionSet>,
    future_results_tx: watch::Sender<Option<FuturePredictionSet>>,
    panel: FeedbackPanel,
    panel_tx: watch::Sender<FeedbackPanel>,
}

impl AppState {
    pub fn new() -> Self {
        let (view_mode_tx, _view_mode_rx) = watch::channel(ViewMode::default());
        let (search_results_tx, _search_results_rx) = watch::channel(None);
        let (future_results_tx, _future_results_rx) = watch::channel(None);
        let (panel_tx, _panel_rx) = watch::channel(FeedbackPanel::default());
        Self {
            view_mode: ViewMode::default(),
            view_mode_tx,
            search_results: None,
            search_results_tx,
            future_results: None,
            future_results_tx,
            panel: FeedbackPanel::default(),
            panel_tx,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn subscribe_view_mode(&self) -> watch::Receiver<ViewMode> {
        self.view_mode_tx.subscribe()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.view_mode_tx.send_replace(mode);
    }

    pub fn search_results(&self) -> Option<&SearchResultSet> {
        self.search_results.as_ref()
    }

    pub fn subscribe_search_results(&self) -> watch::Receiver<Option<SearchResultSet>> {
        self.search_results_tx.subscribe()
    }

    pub fn set_search_results(&mut self, results: SearchResultSet) {
        self.search_results = Some(results.clone());
        self.search_results_tx.send_replace(Some(results));
    }

    pub fn future_results(&self) -> Option<&FuturePredictionSet> {
        self.future_results.as_ref()
    }

    pub fn subscribe_future_results(&self) -> watch::Receiver<Option<FuturePredictionSet>> {
        self.future_results_tx.subscribe()
    }

    pub fn set_future_results(&mut self, results: FuturePredictionSet) {
        self.future_results = Some(results.clone());
        self.future_results_tx.send_replace(Some(results));
    }

    pub fn selected_parking(&self) -> Option<&ParkingCandidate> {
        self.panel.selected.as_ref()
    }

    pub fn feedback_visible(&self) -> bool {
        self.panel.visible
    }

    pub fn missing_fields(&self) -> &[MissingField] {
        &self.panel.missing_fields
    }

    pub fn subscribe_feedback_panel(&self) -> watch::Receiver<FeedbackPanel> {
        self.panel_tx.subscribe()
    }

    /// Remember `parking` as the selection without showing the panel yet.
    pub fn set_selected_parking(&mut self, parking: ParkingCandidate) {
        self.panel.selected = Some(parking);
        self.publish_panel();
    }

    pub fn open_feedback(&mut self, missing_fields: Vec<MissingField>) {
        self.panel.visible = true;
        self.panel.missing_fields = missing_fields;
        self.publish_panel();
    }

    pub fn close_feedback(&mut self) {
        self.panel = FeedbackPanel::default();
        self.publish_panel();
    }

    fn publish_panel(&self) {
        self.panel_tx.send_replace(self.panel.clone());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
