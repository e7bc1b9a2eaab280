//! Shared in-memory store for per-offer counters and pending click records.
//!
//! All read-modify-write sequences happen under the dashmap entry lock for
//! the touched offer, so concurrent callers cannot lose an increment. Derived
//! rates are recomputed on every read, never cached.

use dashmap::DashMap;
use offer_core::error::{OfferError, OfferResult};
use offer_core::types::{ClickId, ClickRecord, OfferId, OfferStats, OfferStatsSnapshot};

pub struct StatsStore {
    offers: DashMap<OfferId, OfferStats>,
    clicks: DashMap<ClickId, ClickRecord>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self {
            offers: DashMap::new(),
            clicks: DashMap::new(),
        }
    }

    /// Returns the offer's current counters, creating a zero-valued record on
    /// first reference. Never fails.
    pub fn get_or_create(&self, offer_id: OfferId) -> OfferStats {
        *self.offers.entry(offer_id).or_default()
    }

    /// Read the offer's counters without creating a record. An offer that has
    /// never been selected reads as all-zero, which keeps unseen candidates
    /// cold-start-eligible without polluting the table.
    pub fn stats_for(&self, offer_id: OfferId) -> OfferStats {
        self.offers.get(&offer_id).map(|s| *s).unwrap_or_default()
    }

    pub fn record_impression(&self, offer_id: OfferId) {
        self.offers.entry(offer_id).or_default().impressions += 1;
    }

    /// Record a conversion and its reward. The conversion count may never
    /// exceed the impression count, and rewards may not be negative; either
    /// case is rejected with no partial update.
    pub fn record_conversion(&self, offer_id: OfferId, reward: f64) -> OfferResult<()> {
        if !reward.is_finite() || reward < 0.0 {
            return Err(OfferError::InvalidFeedback(format!(
                "reward must be a non-negative number, got {reward}"
            )));
        }

        let mut entry = self.offers.entry(offer_id).or_default();
        if entry.conversions >= entry.impressions {
            return Err(OfferError::InvalidFeedback(format!(
                "offer {offer_id} already has {} conversions for {} impressions",
                entry.conversions, entry.impressions
            )));
        }
        entry.conversions += 1;
        entry.cumulative_reward += reward;
        Ok(())
    }

    /// Read-only snapshot with derived rates. `NotFound` distinguishes an
    /// offer that has never been referenced from one with zero stats.
    pub fn snapshot(&self, offer_id: OfferId) -> OfferResult<OfferStatsSnapshot> {
        let stats = self
            .offers
            .get(&offer_id)
            .map(|s| *s)
            .ok_or_else(|| OfferError::NotFound(format!("offer {offer_id} has no stats")))?;

        Ok(OfferStatsSnapshot {
            offer_id,
            impressions: stats.impressions,
            conversions: stats.conversions,
            cumulative_reward: stats.cumulative_reward,
            conversion_rate: stats.conversion_rate(),
            revenue_per_click: stats.revenue_per_click(),
        })
    }

    /// Store a pending click record. Returns false if the click id is already
    /// pending, so the caller can reject a duplicate instead of silently
    /// overwriting an unresolved recommendation.
    pub fn insert_click(&self, record: ClickRecord) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.clicks.entry(record.click_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Claim and remove a pending click. Removal is atomic, so two racing
    /// feedback submissions for the same click resolve to exactly one winner.
    pub fn take_click(&self, click_id: ClickId) -> Option<ClickRecord> {
        self.clicks.remove(&click_id).map(|(_, record)| record)
    }

    /// Put a claimed click back after its conversion was rejected, leaving
    /// the store as if the feedback call never happened.
    pub fn restore_click(&self, record: ClickRecord) {
        self.clicks.insert(record.click_id, record);
    }

    pub fn pending_clicks(&self) -> usize {
        self.clicks.len()
    }

    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }

    /// Clear all offers and all click records. The single reset operation;
    /// afterwards the store behaves as freshly constructed.
    pub fn reset(&self) {
        self.offers.clear();
        self.clicks.clear();
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}
