//! Thompson Sampling selection.
//!
//! Draws each candidate's conversion rate from its Beta posterior, scales by
//! revenue per click, and returns the arg-max of the drawn values. The RNG is
//! injected so seeded runs are fully reproducible.

use offer_core::error::{OfferError, OfferResult};
use offer_core::types::OfferId;
use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::store::StatsStore;

/// Floor for the failure-side Beta shape when out-of-order feedback has
/// pushed conversions past impressions. Clamp and continue rather than fail.
const MIN_BETA_SHAPE: f64 = 1e-6;

pub struct ThompsonSampler {
    prior_a: f64,
    prior_b: f64,
}

impl ThompsonSampler {
    pub fn new(prior_a: f64, prior_b: f64) -> OfferResult<Self> {
        if !prior_a.is_finite() || prior_a <= 0.0 {
            return Err(OfferError::InvalidRequest(format!(
                "prior_a must be a positive number, got {prior_a}"
            )));
        }
        if !prior_b.is_finite() || prior_b <= 0.0 {
            return Err(OfferError::InvalidRequest(format!(
                "prior_b must be a positive number, got {prior_b}"
            )));
        }
        Ok(Self { prior_a, prior_b })
    }

    /// Pick an offer in proportion to its posterior probability of being
    /// best. Ties break to the lowest offer id, matching UCB.
    pub fn select(
        &self,
        offer_ids: &[OfferId],
        store: &StatsStore,
        rng: &mut impl Rng,
    ) -> OfferResult<OfferId> {
        if offer_ids.is_empty() {
            return Err(OfferError::InvalidRequest(
                "offer_ids must not be empty".to_string(),
            ));
        }

        // With zero conversions everywhere, every CR×RPC sample is zero and
        // the arg-max would degenerate to the lowest id. Choose uniformly
        // until a conversion signal exists.
        let total_conversions: u64 = offer_ids
            .iter()
            .map(|id| store.stats_for(*id).conversions)
            .sum();
        if total_conversions == 0 {
            let idx = rng.gen_range(0..offer_ids.len());
            return Ok(offer_ids[idx]);
        }

        let mut best_id = offer_ids[0];
        let mut best_sample = self.draw(best_id, store, rng)?;

        for &id in &offer_ids[1..] {
            let sample = self.draw(id, store, rng)?;
            if sample > best_sample || (sample == best_sample && id < best_id) {
                best_sample = sample;
                best_id = id;
            }
        }

        Ok(best_id)
    }

    fn draw(&self, offer_id: OfferId, store: &StatsStore, rng: &mut impl Rng) -> OfferResult<f64> {
        let stats = store.stats_for(offer_id);

        let alpha = self.prior_a + stats.conversions as f64;
        let beta = (self.prior_b + stats.impressions as f64 - stats.conversions as f64)
            .max(MIN_BETA_SHAPE);

        let posterior = Beta::new(alpha, beta).map_err(|e| {
            OfferError::Internal(anyhow::anyhow!(
                "invalid Beta shape ({alpha}, {beta}) for offer {offer_id}: {e}"
            ))
        })?;

        let cr_sample = posterior.sample(rng);
        Ok(cr_sample * stats.revenue_per_click())
    }
}
