//! Same batch in, same bytes out.
//!
//! Two engines, same input. The serialized reports must match
//! exactly. Any divergence means something reached for a platform
//! RNG, a clock, or hash-map iteration order.

use referralguard_core::{engine::ReportEngine, provider::ProviderRecord};

fn batch() -> Vec<ProviderRecord> {
    let specialties = ["Emergency Medicine", "Cardiology", "Dermatology", "Oncology", ""];
    (0..40u64)
        .map(|i| {
            ProviderRecord::new(format!("{}", 1_003_000_000 + i * 37))
                .with_specialty(specialties[(i % 5) as usize])
                .with_market_share((i * 13 % 100) as f64)
                .with_revenue(75_000.0 * (i + 1) as f64)
                .with_provider_count(i % 12)
                .with_zip(format!("{:05}", 10_000 + i))
        })
        .collect()
}

#[test]
fn same_input_produces_identical_reports() {
    let engine_a = ReportEngine::build_default().expect("engine a");
    let engine_b = ReportEngine::build_default().expect("engine b");

    let json_a = serde_json::to_string(&engine_a.analyze(&batch())).unwrap();
    let json_b = serde_json::to_string(&engine_b.analyze(&batch())).unwrap();

    assert_eq!(json_a.len(), json_b.len(), "Report lengths differ");
    assert_eq!(json_a, json_b, "Reports diverged");
}

#[test]
fn repeated_scoring_on_one_engine_is_stable() {
    let engine = ReportEngine::build_default().unwrap();
    let first = engine.analyze(&batch());
    for _ in 0..5 {
        assert_eq!(engine.analyze(&batch()), first);
    }
}

#[test]
fn position_in_batch_is_observable() {
    // Display extras are keyed on (id, index), so moving a row can
    // change its variation but never its fixed components.
    let engine = ReportEngine::build_default().unwrap();
    let rows = batch();
    let mut reversed = rows.clone();
    reversed.reverse();

    let forward = engine.scorer.score_batch(&rows);
    let backward = engine.scorer.score_batch(&reversed);

    let a = &forward[0];
    let b = backward.last().unwrap();
    assert_eq!(a.provider_id(), b.provider_id());
    assert_eq!(a.components.revenue_risk, b.components.revenue_risk);
    assert_eq!(a.components.market_share_risk, b.components.market_share_risk);
    assert_eq!(a.competitor_threat, b.competitor_threat);

    let any_different = forward
        .iter()
        .zip(backward.iter().rev())
        .any(|(x, y)| x.components.variation != y.components.variation);
    assert!(any_different, "Batch index is not feeding the variation term");
}

#[test]
fn scorer_can_be_shared_across_threads() {
    let engine = std::sync::Arc::new(ReportEngine::build_default().unwrap());
    let expected = serde_json::to_string(&engine.analyze(&batch())).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || serde_json::to_string(&engine.analyze(&batch())).unwrap())
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
