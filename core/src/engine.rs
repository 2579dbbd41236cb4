//! The report engine — wires ingest, scoring and planning together.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Ingest     (market document → ProviderRecord)
//!   2. Score      (RiskScorer, row by row, index = position)
//!   3. Summarize  (BatchSummary over the scored rows)
//!   4. Markets    (leakage opportunities over the scored rows)
//!   5. Plan       (RecoveryPlanner over the scored rows)
//!
//! RULES:
//!   - The engine holds no per-request state; `analyze` takes `&self`.
//!   - Config and catalogs are loaded once, at construction.
//!   - Same input, same report, byte for byte.

use crate::{
    catalog::Catalogs,
    config::EngineConfig,
    error::ScoreResult,
    ingest::parse_market_document,
    opportunities::{identify_leakage_opportunities, LeakageOpportunity},
    provider::{ProviderRecord, ScoredProvider},
    recovery::{RecoveryPlan, RecoveryPlanner},
    scoring::{BatchSummary, RiskScorer},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralReport {
    pub providers: Vec<ScoredProvider>,
    pub summary: BatchSummary,
    pub leakage_opportunities: Vec<LeakageOpportunity>,
    pub recovery_plan: RecoveryPlan,
}

#[derive(Debug, Clone)]
pub struct ReportEngine {
    pub scorer: RiskScorer,
    pub planner: RecoveryPlanner,
}

impl ReportEngine {
    pub fn new(config: EngineConfig, catalogs: Catalogs) -> ScoreResult<Self> {
        Ok(Self {
            scorer: RiskScorer::new(config.scoring, catalogs)?,
            planner: RecoveryPlanner::new(config.recovery)?,
        })
    }

    /// Build a fully wired engine from the data/ directory.
    pub fn build(data_dir: impl AsRef<Path>) -> ScoreResult<Self> {
        let data_dir = data_dir.as_ref();
        let config = EngineConfig::load(data_dir)?;
        let catalogs = Catalogs::load(data_dir)?;
        Self::new(config, catalogs)
    }

    /// Engine with compiled-in defaults and no name directory.
    pub fn build_default() -> ScoreResult<Self> {
        Self::new(EngineConfig::default(), Catalogs::default())
    }

    pub fn analyze(&self, records: &[ProviderRecord]) -> ReferralReport {
        let providers = self.scorer.score_batch(records);
        let summary = self.scorer.summarize(&providers);
        let leakage_opportunities =
            identify_leakage_opportunities(&providers, &self.scorer.config().markets);
        let recovery_plan = self.planner.plan_from_scored(&providers);
        log::debug!(
            "Report: {} providers, {} high risk, revenue at risk {:.0}",
            summary.total_providers,
            summary.high_risk_count,
            summary.total_revenue_at_risk
        );
        ReferralReport {
            providers,
            summary,
            leakage_opportunities,
            recovery_plan,
        }
    }

    pub fn analyze_document(&self, json: &str) -> ScoreResult<ReferralReport> {
        let records = parse_market_document(json)?;
        Ok(self.analyze(&records))
    }
}
