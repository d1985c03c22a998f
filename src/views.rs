//! View models handed to the map, list and card renderers.
//!
//! Renderers only draw what they get here; tiers always come from
//! [`crate::availability::classify`] via [`ParkingCandidate::tier`].

use crate::availability::{Tier, percent_label};
use crate::model::{Coordinate, FuturePredictionSet, ParkingCandidate, SearchResultSet};
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

/// Map center when neither the user nor any parking has a position.
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    lat: 45.4642,
    lng: 9.19,
};
pub const DEFAULT_ZOOM: u8 = 15;
/// Rows shown by a list that is not expanded.
pub const COLLAPSED_LIST_LEN: usize = 3;
pub const EMPTY_LIST_MESSAGE: &str = "No parking found";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub parking_id: String,
    pub position: Coordinate,
    pub tier: Tier,
    pub color: &'static str,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub user_location: Option<Coordinate>,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Map of a current search: every parking, centered on the user.
    pub fn for_search(results: &SearchResultSet) -> Self {
        Self::build(results.user_location, &results.all_parkings, search_popup)
    }

    /// Map of a prediction: popups show the target time instead of distance.
    pub fn for_prediction(results: &FuturePredictionSet) -> Self {
        Self::build(None, &results.parkings, prediction_popup)
    }

    fn build(
        user_location: Option<Coordinate>,
        parkings: &[ParkingCandidate],
        popup: fn(&ParkingCandidate) -> String,
    ) -> Self {
        let center = user_location
            .or_else(|| parkings.first().map(ParkingCandidate::position))
            .unwrap_or(FALLBACK_CENTER);
        let markers = parkings
            .iter()
            .map(|parking| {
                let tier = parking.tier();
                MapMarker {
                    parking_id: parking.id.clone(),
                    position: parking.position(),
                    tier,
                    color: tier.color(),
                    popup: popup(parking),
                }
            })
            .collect();
        Self {
            center,
            zoom: DEFAULT_ZOOM,
            user_location,
            markers,
        }
    }
}

fn search_popup(parking: &ParkingCandidate) -> String {
    format!(
        "{}\nDistance: {} km\nAvailability: {}",
        parking.address,
        distance_label(parking.distance),
        percent_label(parking.availability_prob)
    )
}

fn prediction_popup(parking: &ParkingCandidate) -> String {
    format!(
        "{}\nDate: {}\nExpected availability: {}",
        parking.address,
        parking
            .target_time
            .map(format_moment)
            .unwrap_or_else(|| "N/A".to_string()),
        percent_label(parking.availability_prob)
    )
}

pub fn distance_label(distance: Option<f64>) -> String {
    match distance {
        Some(km) if km.is_finite() => format!("{km:.2}"),
        _ => "N/A".to_string(),
    }
}

pub fn format_moment(moment: OffsetDateTime) -> String {
    let format = format_description!(
        "[day]/[month]/[year] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]"
    );
    moment
        .format(&format)
        .unwrap_or_else(|_| moment.unix_timestamp().to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub parking_id: String,
    pub address: String,
    pub distance: String,
    pub availability: String,
    pub tier: Tier,
}

/// Rows for a parking list. Collapsed lists keep the first three.
pub fn list_items(parkings: &[ParkingCandidate], expanded: bool) -> Vec<ListItem> {
    let limit = if expanded {
        parkings.len()
    } else {
        COLLAPSED_LIST_LEN
    };
    parkings
        .iter()
        .take(limit)
        .map(|parking| ListItem {
            parking_id: parking.id.clone(),
            address: parking.address.clone(),
            distance: distance_label(parking.distance),
            availability: percent_label(parking.availability_prob),
            tier: parking.tier(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionCard {
    pub parking_id: String,
    pub address: String,
    pub availability: String,
    pub tier: Tier,
    pub distance: String,
    pub covered: &'static str,
    pub capacity: String,
}

pub fn prediction_cards(results: &FuturePredictionSet) -> Vec<PredictionCard> {
    results
        .parkings
        .iter()
        .map(|parking| PredictionCard {
            parking_id: parking.id.clone(),
            address: parking.address.clone(),
            availability: percent_label(parking.availability_prob),
            tier: parking.tier(),
            distance: distance_label(parking.distance),
            covered: match parking.covered {
                Some(true) => "Yes",
                Some(false) => "No",
                None => "N/A",
            },
            capacity: parking
                .capacity
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect()
}

/// Heading of the prediction view, e.g. `Forecast for 18/10/2026 20:30 +02:00`.
pub fn prediction_header(results: &FuturePredictionSet) -> Option<String> {
    let target = results.target_time()?;
    Some(format!(
        "Forecast for {} ({} minutes)",
        format_moment(target),
        results.duration_minutes()
    ))
}
