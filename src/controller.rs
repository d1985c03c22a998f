//! Top-level orchestration of searches, predictions and feedback.

use crate::api::{ApiError, ParkingApi};
use crate::booking;
use crate::error::AppError;
use crate::feedback::{FeedbackDraft, FeedbackError, FeedbackStepMachine};
use crate::model::{ParkingCandidate, ViewMode};
use crate::notify::{Notice, NotificationSink};
use crate::state::AppState;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// Wires user intents to the backend and keeps the single state record.
///
/// All operations take `&mut self`, so one action resolves before the next
/// starts. A failed call never touches the existing state.
pub struct AppController<A, N> {
    api: A,
    notifier: N,
    state: AppState,
    feedback: Option<FeedbackStepMachine>,
}

impl<A, N> AppController<A, N>
where
    A: ParkingApi,
    N: NotificationSink,
{
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            state: AppState::new(),
            feedback: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The feedback flow for the selected parking, while the panel is open.
    pub fn feedback(&self) -> Option<&FeedbackStepMachine> {
        self.feedback.as_ref()
    }

    pub fn feedback_mut(&mut self) -> Option<&mut FeedbackStepMachine> {
        self.feedback.as_mut()
    }

    /// Switch tabs. Results of the other mode are kept.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        debug!(?mode, "View mode changed");
        self.state.set_view_mode(mode);
    }

    pub async fn run_search(&mut self, address: &str) -> Result<(), AppError> {
        let address = match booking::require_address(address) {
            Ok(address) => address,
            Err(err) => return Err(self.surface("search", err.into())),
        };

        let results = match self.api.find_parking(address).await {
            Ok(results) => results,
            Err(err) => return Err(self.surface("search", err.into())),
        };

        info!(
            address,
            top = results.top_parkings.len(),
            all = results.all_parkings.len(),
            "Search results received"
        );
        self.state.set_search_results(results);
        self.state.set_view_mode(ViewMode::Current);
        Ok(())
    }

    pub async fn run_prediction(
        &mut self,
        address: &str,
        when: OffsetDateTime,
        duration_minutes: u32,
    ) -> Result<(), AppError> {
        let request = match booking::build(address, when, duration_minutes) {
            Ok(request) => request,
            Err(err) => return Err(self.surface("prediction", err.into())),
        };

        let results = match self.api.predict_future_parking(&request).await {
            Ok(results) => results.with_requested_duration(request.duration_minutes),
            Err(err) => return Err(self.surface("prediction", err.into())),
        };

        info!(
            address = %request.address,
            target = %request.target_datetime,
            count = results.parkings.len(),
            "Prediction results received"
        );
        self.state.set_future_results(results);
        self.state.set_view_mode(ViewMode::Future);
        Ok(())
    }

    /// Select a parking and open its feedback panel.
    ///
    /// If the missing-info lookup fails the panel still opens, going straight
    /// to the general form.
    pub async fn select_parking(&mut self, candidate: ParkingCandidate) {
        let parking_id = candidate.id.clone();
        self.state.set_selected_parking(candidate);

        let missing_fields = match self.api.missing_info(&parking_id).await {
            Ok(fields) => fields,
            Err(err) => {
                warn!(
                    parking_id = %parking_id,
                    error = %err,
                    "Missing info unavailable, collecting general feedback only"
                );
                Vec::new()
            }
        };

        debug!(
            parking_id = %parking_id,
            questions = missing_fields.len(),
            "Feedback panel opened"
        );
        self.feedback = Some(FeedbackStepMachine::new(missing_fields.clone()));
        self.state.open_feedback(missing_fields);
    }

    /// Send `draft` for the selected parking. On success the panel closes; on
    /// failure it stays open for a retry.
    ///
    /// While a question flow is open, nothing is sent until it reaches the
    /// general step.
    pub async fn submit_feedback(&mut self, draft: FeedbackDraft) -> Result<(), AppError> {
        let Some(parking_id) = self.state.selected_parking().map(|p| p.id.clone()) else {
            return Err(self.surface("feedback", FeedbackError::NoActiveFeedback.into()));
        };
        if self.feedback.as_ref().is_some_and(|machine| !machine.is_final()) {
            return Err(self.surface("feedback", FeedbackError::NotAtGeneralStep.into()));
        }

        let record = draft.into_record(&parking_id);
        if let Err(err) = self.api.submit_feedback(&record).await {
            return Err(self.surface("feedback", err.into()));
        }

        info!(parking_id = %parking_id, "Feedback submitted");
        self.notifier.notify(Notice::info("Feedback sent, thank you!"));
        self.feedback = None;
        self.state.close_feedback();
        Ok(())
    }

    /// Submit whatever the open feedback flow has collected.
    pub async fn submit_current_feedback(&mut self) -> Result<(), AppError> {
        let draft = match self.feedback.as_ref().map(FeedbackStepMachine::submit) {
            Some(Ok(draft)) => draft,
            Some(Err(err)) => return Err(err.into()),
            None => return Err(FeedbackError::NoActiveFeedback.into()),
        };
        self.submit_feedback(draft).await
    }

    /// Hide the panel and drop the selection and any collected answers.
    pub fn close_feedback(&mut self) {
        if let Some(machine) = self.feedback.take() {
            machine.cancel();
        }
        self.state.close_feedback();
    }

    fn surface(&self, action: &str, err: AppError) -> AppError {
        let message = match &err {
            AppError::Api(ApiError::Backend { message, .. }) => message.clone(),
            other => other.to_string(),
        };
        warn!(action, error = %err, "Action failed");
        self.notifier
            .notify(Notice::error(format!("{action} failed: {message}")));
        err
    }
}
