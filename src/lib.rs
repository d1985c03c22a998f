//! Client-side controller for finding and pre-booking parking.
//!
//! [`controller::AppController`] owns the view mode, the latest search and
//! prediction results and the feedback panel, and talks to the backend
//! through [`api::ParkingApi`]. Availability tiers for every surface come from
//! [`availability::classify`].

pub mod api;
pub mod availability;
pub mod booking;
pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod model;
pub mod notify;
pub mod state;
pub mod views;
