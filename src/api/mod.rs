//! Client side of the parking backend.
//!
//! [`ParkingApi`] is the seam the controller talks through. [`http`] speaks
//! JSON over HTTP; [`mock`] replays scripted replies for tests.

use crate::booking::PredictionRequest;
use crate::feedback::{FeedbackRecord, MissingField};
use crate::model::{FuturePredictionSet, SearchResultSet};
use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod mock;
pub mod wire;

pub use http::HttpParkingApi;
use wire::{RegisterParkingRequest, RegisterParkingResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered but refused the request. `message` is taken from
    /// the reply body when it carries one.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ParkingApi: Send + Sync {
    /// `POST /find-parking`
    async fn find_parking(&self, address: &str) -> Result<SearchResultSet, ApiError>;

    /// `POST /predict-future-parking`
    async fn predict_future_parking(
        &self,
        request: &PredictionRequest,
    ) -> Result<FuturePredictionSet, ApiError>;

    /// `GET /missing-info/{parking_id}`
    async fn missing_info(&self, parking_id: &str) -> Result<Vec<MissingField>, ApiError>;

    /// `POST /submit-feedback`. The reply body is not used.
    async fn submit_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError>;

    /// `POST /register-parking`
    async fn register_parking(
        &self,
        request: &RegisterParkingRequest,
    ) -> Result<RegisterParkingResponse, ApiError>;
}
