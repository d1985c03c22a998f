use crate::api::wire::{
    FindParkingRequest, MissingInfoResponse, RegisterParkingRequest, RegisterParkingResponse,
    backend_message, embedded_error,
};
use crate::api::{ApiError, ParkingApi};
use crate::booking::PredictionRequest;
use crate::feedback::{FeedbackRecord, MissingField};
use crate::model::{FuturePredictionSet, SearchResultSet};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`ParkingApi`] over JSON/HTTP against a configured base URL.
#[derive(Clone)]
pub struct HttpParkingApi {
    client: Client,
    base_url: Url,
}

impl HttpParkingApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: only http(s) base urls are supported"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Debug for HttpParkingApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpParkingApi")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Read a reply body, turning non-2xx statuses into [`ApiError::Backend`].
async fn read_body(response: Response) -> Result<(u16, String), ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = backend_message(status.as_u16(), &body);
        warn!(status = status.as_u16(), message = %message, "Parking service rejected request");
        return Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        });
    }
    Ok((status.as_u16(), body))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[async_trait]
impl ParkingApi for HttpParkingApi {
    async fn find_parking(&self, address: &str) -> Result<SearchResultSet, ApiError> {
        let url = self.endpoint(&["find-parking"])?;
        debug!(%url, address, "Searching parkings");
        let response = self
            .client
            .post(url)
            .json(&FindParkingRequest { address })
            .send()
            .await?;
        let (status, body) = read_body(response).await?;

        let value: serde_json::Value = decode(&body)?;
        if let Some(message) = embedded_error(&value) {
            return Err(ApiError::Backend {
                status,
                message: message.to_string(),
            });
        }
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn predict_future_parking(
        &self,
        request: &PredictionRequest,
    ) -> Result<FuturePredictionSet, ApiError> {
        let url = self.endpoint(&["predict-future-parking"])?;
        debug!(
            %url,
            address = %request.address,
            target = %request.target_datetime,
            duration_minutes = request.duration_minutes,
            "Requesting prediction"
        );
        let response = self.client.post(url).json(request).send().await?;
        let (_, body) = read_body(response).await?;
        decode(&body)
    }

    async fn missing_info(&self, parking_id: &str) -> Result<Vec<MissingField>, ApiError> {
        let url = self.endpoint(&["missing-info", parking_id])?;
        debug!(%url, "Fetching missing info");
        let response = self.client.get(url).send().await?;
        let (_, body) = read_body(response).await?;
        let reply: MissingInfoResponse = decode(&body)?;
        Ok(reply.into_fields())
    }

    async fn submit_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError> {
        let url = self.endpoint(&["submit-feedback"])?;
        debug!(%url, parking_id = %record.parking_id, "Submitting feedback");
        let response = self.client.post(url).json(record).send().await?;
        read_body(response).await?;
        Ok(())
    }

    async fn register_parking(
        &self,
        request: &RegisterParkingRequest,
    ) -> Result<RegisterParkingResponse, ApiError> {
        let url = self.endpoint(&["register-parking"])?;
        debug!(%url, address = %request.address, "Registering parking");
        let response = self.client.post(url).json(request).send().await?;
        let (_, body) = read_body(response).await?;
        decode(&body)
    }
}
