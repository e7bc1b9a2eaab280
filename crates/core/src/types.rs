use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric key identifying an offer. Ordered so score ties break
/// deterministically toward the lowest id.
pub type OfferId = u64;

/// Identifier tying a served recommendation to later feedback.
pub type ClickId = Uuid;

/// Per-offer counters. Derived rates are never stored; they are recomputed
/// from the counters on every read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OfferStats {
    pub impressions: u64,
    pub conversions: u64,
    pub cumulative_reward: f64,
}

impl OfferStats {
    /// Conversions per impression; 0.0 before the first impression.
    pub fn conversion_rate(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.conversions as f64 / self.impressions as f64
        }
    }

    /// Cumulative reward per impression; 0.0 before the first impression.
    pub fn revenue_per_click(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.cumulative_reward / self.impressions as f64
        }
    }
}

/// Read-only stats view returned by the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferStatsSnapshot {
    pub offer_id: OfferId,
    pub impressions: u64,
    pub conversions: u64,
    pub cumulative_reward: f64,
    pub conversion_rate: f64,
    pub revenue_per_click: f64,
}

/// One recommendation served by `sample()`, awaiting feedback.
/// The timestamp is audit-only and never enters scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClickRecord {
    pub click_id: ClickId,
    pub offer_id: OfferId,
    pub recommended_at: DateTime<Utc>,
}

/// Offer selection strategy with its tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    Ucb { exploration_c: f64 },
    Thompson { prior_a: f64, prior_b: f64 },
}

/// Result of a `sample()` call: the click handle plus the chosen offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Recommendation {
    pub click_id: ClickId,
    pub offer_id: OfferId,
}

/// Resolved feedback, echoing which offer the click mapped to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub click_id: ClickId,
    pub offer_id: OfferId,
    pub is_conversion: bool,
    pub reward: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rates_zero_impressions() {
        let stats = OfferStats::default();
        assert_eq!(stats.conversion_rate(), 0.0);
        assert_eq!(stats.revenue_per_click(), 0.0);
    }

    #[test]
    fn test_derived_rates() {
        let stats = OfferStats {
            impressions: 100,
            conversions: 10,
            cumulative_reward: 50.0,
        };
        assert!((stats.conversion_rate() - 0.10).abs() < f64::EPSILON);
        assert!((stats.revenue_per_click() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strategy_tokens() {
        let ucb: Strategy =
            serde_json::from_str(r#"{"strategy":"ucb","exploration_c":1.0}"#).unwrap();
        assert_eq!(ucb, Strategy::Ucb { exploration_c: 1.0 });

        let thompson: Strategy =
            serde_json::from_str(r#"{"strategy":"thompson","prior_a":1.0,"prior_b":1.0}"#)
                .unwrap();
        assert_eq!(
            thompson,
            Strategy::Thompson {
                prior_a: 1.0,
                prior_b: 1.0
            }
        );

        assert!(serde_json::from_str::<Strategy>(r#"{"strategy":"egreedy"}"#).is_err());
    }
}
