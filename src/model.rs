use crate::availability::{Tier, classify};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Duration assumed for a prediction when the backend does not echo one.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Current,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A parking location as returned by either search endpoint.
///
/// `distance` is only filled by current searches; `target_time` and
/// `duration_minutes` only by future predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingCandidate {
    pub id: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub availability_prob: f64,
    #[serde(default)]
    pub covered: Option<bool>,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_time: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl ParkingCandidate {
    pub fn tier(&self) -> Tier {
        classify(self.availability_prob)
    }

    pub fn position(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Body of a successful `/find-parking` reply. Ranked best-first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    #[serde(default)]
    pub user_location: Option<Coordinate>,
    #[serde(default)]
    pub top_parkings: Vec<ParkingCandidate>,
    #[serde(default)]
    pub all_parkings: Vec<ParkingCandidate>,
}

/// Body of a successful `/predict-future-parking` reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FuturePredictionSet {
    #[serde(default)]
    pub parkings: Vec<ParkingCandidate>,
}

impl FuturePredictionSet {
    /// Fill `duration_minutes` on every candidate the backend left without one.
    pub fn with_requested_duration(mut self, duration_minutes: u32) -> Self {
        for parking in &mut self.parkings {
            parking.duration_minutes.get_or_insert(duration_minutes);
        }
        self
    }

    pub fn target_time(&self) -> Option<OffsetDateTime> {
        self.parkings.first().and_then(|p| p.target_time)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.parkings
            .first()
            .and_then(|p| p.duration_minutes)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    pub fn is_empty(&self) -> bool {
        self.parkings.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn search_reply_parses_with_null_location_and_missing_optionals() {
        let body = json!({
            "user_location": null,
            "top_parkings": [],
            "all_parkings": [{
                "id": "park_1a2b3c4d",
                "address": "Piazza Duomo, Milano",
                "latitude": 45.4642,
                "longitude": 9.19,
                "distance": 0.12,
                "availability_prob": 0.82,
                "covered": true,
                "paid": false,
                "capacity": null
            }]
        });

        let set: SearchResultSet = serde_json::from_value(body).expect("parse search reply");

        assert!(set.user_location.is_none());
        assert_eq!(set.all_parkings.len(), 1);
        let parking = &set.all_parkings[0];
        assert_eq!(parking.distance, Some(0.12));
        assert_eq!(parking.capacity, None);
        assert_eq!(parking.tier(), Tier::High);
    }

    #[test]
    fn prediction_reply_parses_offset_target_time() {
        let body = json!({
            "parkings": [{
                "id": "park_x",
                "address": "Stadio San Siro, Milano",
                "latitude": 45.478,
                "longitude": 9.124,
                "distance": 0.4,
                "availability_prob": 0.55,
                "target_time": "2026-10-18T20:30:00+02:00",
                "covered": false,
                "paid": true,
                "capacity": 300
            }]
        });

        let set: FuturePredictionSet =
            serde_json::from_value(body).expect("parse prediction reply");

        assert_eq!(set.target_time(), Some(datetime!(2026-10-18 18:30 UTC)));
        assert_eq!(set.duration_minutes(), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn requested_duration_fills_only_missing_values() {
        let mut echoed = fixtures::candidate("a", 0.5);
        echoed.duration_minutes = Some(240);
        let set = FuturePredictionSet {
            parkings: vec![fixtures::candidate("b", 0.5), echoed],
        }
        .with_requested_duration(120);

        assert_eq!(set.parkings[0].duration_minutes, Some(120));
        assert_eq!(set.parkings[1].duration_minutes, Some(240));
        assert_eq!(set.duration_minutes(), 120);
    }
}
