//! Upper Confidence Bound selection.
//!
//! Scores each candidate with an optimistic estimate of expected reward per
//! impression and returns the arg-max. Pure reads over the store; recording
//! the impression for the winner is the engine's job, which keeps the
//! sampler independently testable.

use offer_core::error::{OfferError, OfferResult};
use offer_core::types::OfferId;

use crate::store::StatsStore;

pub struct UcbSampler {
    exploration_c: f64,
}

impl UcbSampler {
    pub fn new(exploration_c: f64) -> OfferResult<Self> {
        if !exploration_c.is_finite() || exploration_c <= 0.0 {
            return Err(OfferError::InvalidRequest(format!(
                "exploration_c must be a positive number, got {exploration_c}"
            )));
        }
        Ok(Self { exploration_c })
    }

    /// Pick the offer with the highest UCB score. Ties break to the lowest
    /// offer id so selection is reproducible.
    pub fn select(&self, offer_ids: &[OfferId], store: &StatsStore) -> OfferResult<OfferId> {
        if offer_ids.is_empty() {
            return Err(OfferError::InvalidRequest(
                "offer_ids must not be empty".to_string(),
            ));
        }

        // Shared round count across the eligible set.
        let total_impressions: u64 = offer_ids
            .iter()
            .map(|id| store.stats_for(*id).impressions)
            .sum();

        let mut best_id = offer_ids[0];
        let mut best_score = self.score(best_id, total_impressions, store);

        for &id in &offer_ids[1..] {
            let score = self.score(id, total_impressions, store);
            if score > best_score || (score == best_score && id < best_id) {
                best_score = score;
                best_id = id;
            }
        }

        Ok(best_id)
    }

    fn score(&self, offer_id: OfferId, total_impressions: u64, store: &StatsStore) -> f64 {
        let stats = store.stats_for(offer_id);

        // Unsampled offers are tried before anything with data.
        if stats.impressions == 0 {
            return f64::INFINITY;
        }

        // Expected reward per impression: CR × RPC. The multiplicative form
        // is the contract; an additive RPC term would reweight conversion
        // frequency against revenue.
        let exploit = stats.conversion_rate() * stats.revenue_per_click();
        let explore = self.exploration_c
            * ((total_impressions as f64).ln() / stats.impressions as f64).sqrt();
        exploit + explore
    }
}
