//! Packaging of future-booking prediction requests.

use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("address must not be blank")]
    BlankAddress,
    #[error("target time cannot be formatted: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Stay lengths offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationOption {
    OneHour,
    TwoHours,
    ThreeHours,
    FourHours,
    FiveHoursOrMore,
}

impl DurationOption {
    pub const ALL: &[Self] = &[
        Self::OneHour,
        Self::TwoHours,
        Self::ThreeHours,
        Self::FourHours,
        Self::FiveHoursOrMore,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
            Self::FourHours => 240,
            Self::FiveHoursOrMore => 300,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1 hour",
            Self::TwoHours => "2 hours",
            Self::ThreeHours => "3 hours",
            Self::FourHours => "4 hours",
            Self::FiveHoursOrMore => "5+ hours",
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.minutes() == minutes)
    }
}

/// JSON body of `POST /predict-future-parking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub address: String,
    pub target_datetime: String,
    pub duration_minutes: u32,
}

/// Validate a destination and target moment into a [`PredictionRequest`].
///
/// The address is trimmed and must not be empty. `when` is converted to UTC
/// and rendered as RFC 3339. Past moments are accepted; limiting the picker is
/// the caller's business.
pub fn build(
    address: &str,
    when: OffsetDateTime,
    duration_minutes: u32,
) -> Result<PredictionRequest, ValidationError> {
    let address = require_address(address)?;
    let target_datetime = when.to_offset(UtcOffset::UTC).format(&Rfc3339)?;

    Ok(PredictionRequest {
        address: address.to_string(),
        target_datetime,
        duration_minutes,
    })
}

/// Trim `address`, rejecting it when nothing is left.
pub fn require_address(address: &str) -> Result<&str, ValidationError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankAddress);
    }
    Ok(trimmed)
}

/// Initial target offered by the date picker: one hour from `now`.
pub fn default_target(now: OffsetDateTime) -> OffsetDateTime {
    now + Duration::hours(1)
}
