//! Availability tiers shared by every surface that colors or labels a parking.
//!
//! Thresholds live only in [`classify`]; map markers, list rows, prediction
//! cards and the CLI all go through it.

use serde::{Deserialize, Serialize};

/// Probability above which a parking is considered likely free.
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Probability above which a parking is considered a coin toss.
pub const MEDIUM_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

/// Map an availability probability to a display tier.
///
/// `prob > 0.7` is high, `0.4 < prob <= 0.7` is medium, anything else
/// (including NaN) is low.
pub fn classify(prob: f64) -> Tier {
    if prob > HIGH_THRESHOLD {
        Tier::High
    } else if prob > MEDIUM_THRESHOLD {
        Tier::Medium
    } else {
        Tier::Low
    }
}

impl Tier {
    /// Marker fill color used by the map renderer.
    pub fn color(self) -> &'static str {
        match self {
            Tier::High => "green",
            Tier::Medium => "orange",
            Tier::Low => "red",
        }
    }

    /// Class name used by list rows and prediction cards.
    pub fn class_name(self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Tier::High => "🟢",
            Tier::Medium => "🟡",
            Tier::Low => "🔴",
        }
    }

    fn severity(self) -> u8 {
        match self {
            Tier::High => 0,
            Tier::Medium => 1,
            Tier::Low => 2,
        }
    }
}

/// Rounded percentage shown next to a parking, e.g. `0.456 -> "46%"`.
pub fn percent_label(prob: f64) -> String {
    let clamped = if prob.is_finite() {
        prob.clamp(0.0, 1.0)
    } else {
        0.0
    };
    format!("{}%", (clamped * 100.0).round() as u32)
}

/// True when `a` is at least as severe (less available) as `b`.
pub fn at_least_as_severe(a: Tier, b: Tier) -> bool {
    a.severity() >= b.severity()
}
