//! Integration test for the full sample → feedback → stats flow.

use offer_bandit::BanditEngine;
use offer_core::error::OfferError;
use offer_core::types::Strategy;
use std::sync::Arc;

const UCB: Strategy = Strategy::Ucb { exploration_c: 1.0 };
const THOMPSON: Strategy = Strategy::Thompson {
    prior_a: 1.0,
    prior_b: 1.0,
};

#[test]
fn test_full_recommendation_cycle() {
    let engine = BanditEngine::with_seed(1234);
    let offers = [10u64, 20, 30];

    // Cold start: the first three UCB rounds must visit every offer once
    // (infinite score for unsampled arms, lowest id first).
    let first = engine.sample(&offers, UCB, None).unwrap();
    assert_eq!(first.offer_id, 10);
    let second = engine.sample(&offers, UCB, None).unwrap();
    assert_eq!(second.offer_id, 20);
    let third = engine.sample(&offers, UCB, None).unwrap();
    assert_eq!(third.offer_id, 30);

    // Offer 20 converts well; feed the engine and keep sampling.
    engine.record_feedback(second.click_id, true, 8.0).unwrap();
    engine.record_feedback(first.click_id, false, 0.0).unwrap();
    engine.record_feedback(third.click_id, false, 0.0).unwrap();

    let mut wins = [0u32; 3];
    for _ in 0..200 {
        let rec = engine.sample(&offers, UCB, None).unwrap();
        let idx = offers.iter().position(|&o| o == rec.offer_id).unwrap();
        wins[idx] += 1;
        // Keep offer 20 converting so its lead is real, not just the bonus.
        if rec.offer_id == 20 {
            engine.record_feedback(rec.click_id, true, 8.0).unwrap();
        } else {
            engine.record_feedback(rec.click_id, false, 0.0).unwrap();
        }
    }
    assert!(
        wins[1] > wins[0] && wins[1] > wins[2],
        "offer 20 should dominate, got {wins:?}"
    );

    let snap = engine.get_stats(20).unwrap();
    assert!(snap.conversion_rate > 0.9);
    assert!(snap.revenue_per_click > 7.0);
}

#[test]
fn test_thompson_converges_on_better_offer() {
    let engine = BanditEngine::with_seed(99);
    let offers = [1u64, 2];

    // Seed history: offer 2 converts half the time at 4.0, offer 1 never.
    for i in 0..100 {
        let rec = engine.sample(&offers, THOMPSON, None).unwrap();
        let converted = rec.offer_id == 2 && i % 2 == 0;
        engine
            .record_feedback(rec.click_id, converted, if converted { 4.0 } else { 0.0 })
            .unwrap();
    }

    let mut wins_for_2 = 0;
    for _ in 0..200 {
        let rec = engine.sample(&offers, THOMPSON, None).unwrap();
        if rec.offer_id == 2 {
            wins_for_2 += 1;
        }
        engine.record_feedback(rec.click_id, false, 0.0).unwrap();
    }
    assert!(wins_for_2 > 150, "offer 2 won only {wins_for_2}/200");
}

#[test]
fn test_concurrent_sampling_loses_no_increments() {
    let engine = Arc::new(BanditEngine::with_seed(5));
    let threads: u64 = 8;
    let per_thread: u64 = 250;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..per_thread {
                    let rec = engine.sample(&[1], UCB, None).unwrap();
                    engine.record_feedback(rec.click_id, false, 0.0).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snap = engine.get_stats(1).unwrap();
    assert_eq!(snap.impressions, threads * per_thread);
    assert_eq!(engine.pending_clicks(), 0);
}

#[test]
fn test_reset_between_cycles() {
    let engine = BanditEngine::with_seed(1);
    let rec = engine.sample(&[1, 2, 3], UCB, None).unwrap();
    engine.record_feedback(rec.click_id, true, 1.0).unwrap();

    engine.reset();

    for offer in [1u64, 2, 3] {
        assert!(matches!(
            engine.get_stats(offer),
            Err(OfferError::NotFound(_))
        ));
    }

    // The engine behaves as freshly constructed: cold-start order repeats.
    let rec = engine.sample(&[3, 1, 2], UCB, None).unwrap();
    assert_eq!(rec.offer_id, 1);
}
