use crate::api::wire::{RegisterParkingRequest, RegisterParkingResponse};
use crate::api::{ApiError, ParkingApi};
use crate::booking::PredictionRequest;
use crate::feedback::{FeedbackRecord, MissingField};
use crate::model::{FuturePredictionSet, SearchResultSet};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Requests the mock has seen, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct MockCalls {
    pub searches: Vec<String>,
    pub predictions: Vec<PredictionRequest>,
    pub missing_info: Vec<String>,
    pub feedback: Vec<FeedbackRecord>,
    pub registrations: Vec<RegisterParkingRequest>,
}

impl MockCalls {
    pub fn total(&self) -> usize {
        self.searches.len()
            + self.predictions.len()
            + self.missing_info.len()
            + self.feedback.len()
            + self.registrations.len()
    }
}

#[derive(Default)]
struct MockReplies {
    searches: VecDeque<Result<SearchResultSet, ApiError>>,
    predictions: VecDeque<Result<FuturePredictionSet, ApiError>>,
    missing_info: VecDeque<Result<Vec<MissingField>, ApiError>>,
    feedback: VecDeque<Result<(), ApiError>>,
    registrations: VecDeque<Result<RegisterParkingResponse, ApiError>>,
    calls: MockCalls,
}

/// Scripted [`ParkingApi`]. Each endpoint replays queued replies in order and
/// falls back to an empty success once its queue runs dry.
#[derive(Default)]
pub struct MockParkingApi {
    replies: Mutex<MockReplies>,
}

impl MockParkingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_search(&self, reply: Result<SearchResultSet, ApiError>) -> &Self {
        self.lock().searches.push_back(reply);
        self
    }

    pub fn push_prediction(&self, reply: Result<FuturePredictionSet, ApiError>) -> &Self {
        self.lock().predictions.push_back(reply);
        self
    }

    pub fn push_missing_info(&self, reply: Result<Vec<MissingField>, ApiError>) -> &Self {
        self.lock().missing_info.push_back(reply);
        self
    }

    pub fn push_feedback(&self, reply: Result<(), ApiError>) -> &Self {
        self.lock().feedback.push_back(reply);
        self
    }

    pub fn push_registration(&self, reply: Result<RegisterParkingResponse, ApiError>) -> &Self {
        self.lock().registrations.push_back(reply);
        self
    }

    pub fn calls(&self) -> MockCalls {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockReplies> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Convenience for scripting a backend refusal.
pub fn backend_error(status: u16, message: &str) -> ApiError {
    ApiError::Backend {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl ParkingApi for MockParkingApi {
    async fn find_parking(&self, address: &str) -> Result<SearchResultSet, ApiError> {
        let mut replies = self.lock();
        replies.calls.searches.push(address.to_string());
        replies
            .searches
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResultSet::default()))
    }

    async fn predict_future_parking(
        &self,
        request: &PredictionRequest,
    ) -> Result<FuturePredictionSet, ApiError> {
        let mut replies = self.lock();
        replies.calls.predictions.push(request.clone());
        replies
            .predictions
            .pop_front()
            .unwrap_or_else(|| Ok(FuturePredictionSet::default()))
    }

    async fn missing_info(&self, parking_id: &str) -> Result<Vec<MissingField>, ApiError> {
        let mut replies = self.lock();
        replies.calls.missing_info.push(parking_id.to_string());
        replies
            .missing_info
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError> {
        let mut replies = self.lock();
        replies.calls.feedback.push(record.clone());
        replies.feedback.pop_front().unwrap_or(Ok(()))
    }

    async fn register_parking(
        &self,
        request: &RegisterParkingRequest,
    ) -> Result<RegisterParkingResponse, ApiError> {
        let mut replies = self.lock();
        replies.calls.registrations.push(request.clone());
        replies.registrations.pop_front().unwrap_or_else(|| {
            Ok(RegisterParkingResponse {
                id: "park_mock".to_string(),
                status: "registered".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_are_replayed_in_order_then_default() {
        let api = MockParkingApi::new();
        api.push_missing_info(Ok(vec![MissingField::Covered]))
            .push_missing_info(Err(backend_error(500, "boom")));

        assert_eq!(
            api.missing_info("p1").await.expect("first reply"),
            vec![MissingField::Covered]
        );
        let err = api.missing_info("p1").await.expect_err("second reply");
        assert_eq!(err.to_string(), "boom");
        assert!(api.missing_info("p2").await.expect("default reply").is_empty());

        assert_eq!(api.calls().missing_info, vec!["p1", "p1", "p2"]);
    }

    #[tokio::test]
    async fn registrations_are_recorded_and_scripted() {
        let api = MockParkingApi::new();
        api.push_registration(Ok(RegisterParkingResponse {
            id: "park_1a2b3c4d".to_string(),
            status: "registered".to_string(),
        }))
        .push_registration(Err(backend_error(422, "latitude out of range")));
        let request = RegisterParkingRequest {
            latitude: 45.4642,
            longitude: 9.19,
            address: "Via Torino 1, Milano".to_string(),
            covered: None,
            paid: Some(true),
            capacity: None,
            pricing_info: None,
        };

        let first = api.register_parking(&request).await.expect("scripted reply");
        let second = api.register_parking(&request).await.expect_err("scripted error");
        let fallback = api.register_parking(&request).await.expect("default reply");

        assert_eq!(first.id, "park_1a2b3c4d");
        assert_eq!(second.to_string(), "latitude out of range");
        assert_eq!(fallback.id, "park_mock");
        assert_eq!(api.calls().registrations, vec![request.clone(); 3]);
        assert_eq!(api.calls().total(), 3);
    }
}
