//! Engine façade tying the store and samplers together. This is the unit the
//! API layer calls; it owns the shared state and the Thompson RNG.

use chrono::Utc;
use offer_core::error::{OfferError, OfferResult};
use offer_core::types::{
    ClickId, ClickRecord, FeedbackOutcome, OfferId, OfferStatsSnapshot, Recommendation, Strategy,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use uuid::Uuid;

use crate::store::StatsStore;
use crate::thompson::ThompsonSampler;
use crate::ucb::UcbSampler;

pub struct BanditEngine {
    store: StatsStore,
    // Shared across callers; Thompson draws lock it so concurrent sampling
    // never races on generator state.
    rng: Mutex<StdRng>,
}

impl BanditEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine with a fixed RNG seed, for reproducible Thompson selection.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            store: StatsStore::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Select an offer from the eligible set, record the impression, and
    /// store a click record so later feedback can resolve the offer.
    ///
    /// The caller may supply its own click id; otherwise one is generated.
    /// A click id that is already pending is rejected before any state
    /// changes, so the call applies fully or not at all.
    pub fn sample(
        &self,
        offer_ids: &[OfferId],
        strategy: Strategy,
        click_id: Option<ClickId>,
    ) -> OfferResult<Recommendation> {
        if offer_ids.is_empty() {
            return Err(OfferError::InvalidRequest(
                "offer_ids must not be empty".to_string(),
            ));
        }

        let offer_id = match strategy {
            Strategy::Ucb { exploration_c } => {
                UcbSampler::new(exploration_c)?.select(offer_ids, &self.store)?
            }
            Strategy::Thompson { prior_a, prior_b } => {
                let sampler = ThompsonSampler::new(prior_a, prior_b)?;
                let mut rng = self.rng.lock();
                sampler.select(offer_ids, &self.store, &mut *rng)?
            }
        };

        let click_id = click_id.unwrap_or_else(Uuid::new_v4);
        let record = ClickRecord {
            click_id,
            offer_id,
            recommended_at: Utc::now(),
        };
        if !self.store.insert_click(record) {
            return Err(OfferError::InvalidRequest(format!(
                "click {click_id} already has a pending recommendation"
            )));
        }
        self.store.record_impression(offer_id);

        debug!(%click_id, offer_id, ?strategy, "Offer sampled");
        Ok(Recommendation { click_id, offer_id })
    }

    /// Resolve a click to its offer and apply the outcome. A non-conversion
    /// consumes the click without touching the counters; a conversion adds
    /// the reward. Rejected conversions leave the click pending so the
    /// caller can retry with corrected input.
    pub fn record_feedback(
        &self,
        click_id: ClickId,
        converted: bool,
        reward: f64,
    ) -> OfferResult<FeedbackOutcome> {
        if !reward.is_finite() || reward < 0.0 {
            return Err(OfferError::InvalidFeedback(format!(
                "reward must be a non-negative number, got {reward}"
            )));
        }

        let record = self.store.take_click(click_id).ok_or_else(|| {
            OfferError::NotFound(format!("click {click_id} has no pending recommendation"))
        })?;

        if converted {
            if let Err(e) = self.store.record_conversion(record.offer_id, reward) {
                self.store.restore_click(record);
                return Err(e);
            }
        }

        debug!(%click_id, offer_id = record.offer_id, converted, reward, "Feedback recorded");
        Ok(FeedbackOutcome {
            click_id,
            offer_id: record.offer_id,
            is_conversion: converted,
            reward,
        })
    }

    pub fn get_stats(&self, offer_id: OfferId) -> OfferResult<OfferStatsSnapshot> {
        self.store.snapshot(offer_id)
    }

    /// Clear all offer statistics and pending clicks.
    pub fn reset(&self) {
        self.store.reset();
        debug!("Engine state reset");
    }

    pub fn pending_clicks(&self) -> usize {
        self.store.pending_clicks()
    }
}

impl Default for BanditEngine {
    fn default() -> Self {
        Self::new()
    }
}
