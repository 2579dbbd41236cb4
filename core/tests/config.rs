//! Config loading and fail-fast validation.

use referralguard_core::{
    catalog::Catalogs,
    config::{EngineConfig, RecoveryConfig, ScoringConfig},
    engine::ReportEngine,
    error::ScoreError,
    recovery::RecoveryPlanner,
    scoring::RiskScorer,
};
use std::path::PathBuf;

fn repo_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

/// Fresh scratch directory per test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "referralguard-{}-{name}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn assert_invalid(result: Result<impl std::fmt::Debug, ScoreError>, field_prefix: &str) {
    match result {
        Err(ScoreError::InvalidConfig { field, .. }) => assert!(
            field.starts_with(field_prefix),
            "expected invalid '{field_prefix}', got '{field}'"
        ),
        other => panic!("expected InvalidConfig for {field_prefix}, got {other:?}"),
    }
}

#[test]
fn shipped_data_files_match_defaults() {
    let loaded = EngineConfig::load(repo_data_dir()).expect("load data/");
    assert_eq!(loaded, EngineConfig::default());

    let catalogs = Catalogs::load(repo_data_dir()).expect("load catalogs");
    assert_eq!(catalogs.competitors(), Catalogs::default().competitors());
    assert!(!catalogs.names.is_empty());
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let dir = scratch_dir("empty");
    assert_eq!(EngineConfig::load(&dir).unwrap(), EngineConfig::default());
    assert_eq!(Catalogs::load(&dir).unwrap(), Catalogs::default());
}

#[test]
fn partial_override_keeps_other_defaults() {
    let dir = scratch_dir("partial");
    std::fs::create_dir_all(dir.join("scoring")).unwrap();
    std::fs::write(
        dir.join("scoring/risk_model.json"),
        r#"{ "sigmoid": { "min_display": 60.0 }, "tiers": { "high_above": 88 } }"#,
    )
    .unwrap();

    let config = EngineConfig::load(&dir).unwrap();
    assert_eq!(config.scoring.sigmoid.min_display, 60.0);
    assert_eq!(config.scoring.sigmoid.max_display, 95.0);
    assert_eq!(config.scoring.tiers.high_above, 88);
    assert_eq!(config.scoring.tiers.medium_above, 75);
    assert_eq!(config.scoring.specialty.modifier_for("Emergency Medicine"), 8.0);
}

#[test]
fn unparseable_config_is_an_error() {
    let dir = scratch_dir("broken");
    std::fs::create_dir_all(dir.join("recovery")).unwrap();
    std::fs::write(dir.join("recovery/recovery_plan.json"), "{ nope").unwrap();
    assert!(matches!(
        EngineConfig::load(&dir),
        Err(ScoreError::Serialization(_))
    ));
}

#[test]
fn invalid_scoring_config_fails_at_construction() {
    let mut c = ScoringConfig::default();
    c.sigmoid.max_raw = 5.0;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "sigmoid.max_raw");

    let mut c = ScoringConfig::default();
    c.sigmoid.max_display = 120.0;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "sigmoid.max_display");

    let mut c = ScoringConfig::default();
    c.sigmoid.steepness = 0.0;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "sigmoid.steepness");

    let mut c = ScoringConfig::default();
    c.components.leakage_weight = -0.2;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "components.leakage_weight");

    let mut c = ScoringConfig::default();
    c.specialty.modifiers.insert("Cardiology".into(), -1.0);
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "specialty.modifiers");

    let mut c = ScoringConfig::default();
    c.tiers.medium_above = 90;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "tiers");

    let mut c = ScoringConfig::default();
    c.interventions.competitive_response_above = 95;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "interventions");

    let mut c = ScoringConfig::default();
    c.variation.range = 0;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "variation");

    let mut c = ScoringConfig::default();
    c.trend.max_monthly_step = u32::MAX;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "trend.max_monthly_step");

    let mut c = ScoringConfig::default();
    c.trend.max_monthly_step = 41;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "trend.max_monthly_step");

    let mut c = ScoringConfig::default();
    c.sigmoid.min_display = 55.5;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "sigmoid.min_display");

    let mut c = ScoringConfig::default();
    c.sigmoid.max_display = 94.5;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "sigmoid.min_display");

    let mut c = ScoringConfig::default();
    c.markets.high_concentration_above = 120.0;
    assert_invalid(RiskScorer::new(c, Catalogs::default()), "markets.high_concentration_above");
}

#[test]
fn step_as_wide_as_the_display_span_is_accepted() {
    let mut c = ScoringConfig::default();
    c.trend.max_monthly_step = 40;
    let scorer = RiskScorer::new(c, Catalogs::default()).expect("span-wide step");
    let scored = scorer.score(&referralguard_core::provider::ProviderRecord::new("1"), 0);
    assert!(scored.risk_history.iter().all(|p| (55..=95).contains(p)));
}

#[test]
fn invalid_recovery_config_fails_at_construction() {
    let mut c = RecoveryConfig::default();
    c.strategic.recovery_rate = -0.3;
    assert_invalid(RecoveryPlanner::new(c), "strategic.recovery_rate");

    let mut c = RecoveryConfig::default();
    c.expansion.cost_rate = 1.5;
    assert_invalid(RecoveryPlanner::new(c), "expansion.cost_rate");

    let mut c = RecoveryConfig::default();
    c.immediate.provider_share = 0.8;
    c.strategic.provider_share = 0.4;
    assert_invalid(RecoveryPlanner::new(c), "strategic.provider_share");

    let mut c = RecoveryConfig::default();
    c.months_per_year = 0.0;
    assert_invalid(RecoveryPlanner::new(c), "months_per_year");
}

#[test]
fn empty_competitor_catalog_is_rejected() {
    assert_invalid(
        Catalogs::new(Vec::new(), Default::default()),
        "catalogs.competitors",
    );
}

#[test]
fn engine_build_surfaces_config_errors() {
    let dir = scratch_dir("bad-range");
    std::fs::create_dir_all(dir.join("scoring")).unwrap();
    std::fs::write(
        dir.join("scoring/risk_model.json"),
        r#"{ "sigmoid": { "min_raw": 90.0 } }"#,
    )
    .unwrap();
    assert_invalid(ReportEngine::build(&dir), "sigmoid.max_raw");
}
