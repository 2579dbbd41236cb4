//! Recovery plan — phased projection of recoverable revenue.
//!
//! Three phases, always in this order:
//!   1. Immediate  — the highest-risk slice of the cohort
//!   2. Strategic
//!   3. Expansion  — absorbs the rounding remainder
//!
//! Phase recovery is a fixed share of TOTAL cohort revenue, not of the
//! phase's own providers; the immediate phase targets the riskiest,
//! highest-revenue providers and so recovers more per head.
//!
//! RULE: phase provider counts always sum to the cohort size exactly.

use crate::{
    config::{PhaseConfig, RecoveryConfig},
    error::ScoreResult,
    provider::ScoredProvider,
    types::ProviderId,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Immediate,
    Strategic,
    Expansion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryPhase {
    pub kind: PhaseKind,
    pub label: String,
    pub timeline: String,
    pub providers: u64,
    pub recovery_rate: f64,
    pub recovery: f64,
    pub cost_rate: f64,
    pub cost: f64,
    /// Filled only when planning from a concrete scored cohort.
    pub provider_ids: Vec<ProviderId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryPlan {
    pub total_providers: u64,
    pub phases: Vec<RecoveryPhase>,
    pub total_recovery_potential: f64,
    pub implementation_cost: f64,
    pub net_benefit: f64,
    pub monthly_recovery: f64,
    #[serde(rename = "expectedROI")]
    pub expected_roi: f64,
    pub payback_period_months: u32,
}

impl RecoveryPlan {
    pub fn phase(&self, kind: PhaseKind) -> Option<&RecoveryPhase> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    pub fn phase_provider_total(&self) -> u64 {
        self.phases.iter().map(|p| p.providers).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryPlanner {
    config: RecoveryConfig,
}

impl RecoveryPlanner {
    pub fn new(config: RecoveryConfig) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Plan for an assumed cohort of `total_providers` at an average revenue.
    pub fn plan_for_cohort(&self, total_providers: u64, average_revenue: f64) -> RecoveryPlan {
        let average_revenue = if average_revenue.is_finite() {
            average_revenue.max(0.0)
        } else {
            0.0
        };
        let total_revenue = total_providers as f64 * average_revenue;
        self.build(total_providers, total_revenue, [Vec::new(), Vec::new(), Vec::new()])
    }

    /// Plan for a concrete scored cohort. Providers are ranked by risk
    /// score, then revenue at risk, then id, and fill the phases in order.
    pub fn plan_from_scored(&self, scored: &[ScoredProvider]) -> RecoveryPlan {
        let total = scored.len() as u64;
        let total_revenue: f64 = scored.iter().map(|p| p.provider_revenue()).sum();

        let mut ranked: Vec<&ScoredProvider> = scored.iter().collect();
        ranked.sort_by(|a, b| {
            b.risk_score
                .cmp(&a.risk_score)
                .then_with(|| {
                    b.revenue_at_risk
                        .partial_cmp(&a.revenue_at_risk)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.provider_id().cmp(b.provider_id()))
        });

        let (p1, p2, _) = self.split(total);
        let ids: Vec<ProviderId> = ranked.iter().map(|p| p.provider_id().to_string()).collect();
        let (first, rest) = ids.split_at(p1 as usize);
        let (second, third) = rest.split_at(p2 as usize);

        self.build(
            total,
            total_revenue,
            [first.to_vec(), second.to_vec(), third.to_vec()],
        )
    }

    /// Phase provider counts. The expansion phase takes the remainder.
    pub fn split(&self, total: u64) -> (u64, u64, u64) {
        let share = |rate: f64| (total as f64 * rate).round() as u64;
        let p1 = share(self.config.immediate.provider_share).min(total);
        let p2 = share(self.config.strategic.provider_share).min(total - p1);
        (p1, p2, total - p1 - p2)
    }

    fn build(
        &self,
        total_providers: u64,
        total_revenue: f64,
        ids: [Vec<ProviderId>; 3],
    ) -> RecoveryPlan {
        if total_providers == 0 {
            return self.zeroed();
        }

        let (p1, p2, p3) = self.split(total_providers);
        let [ids1, ids2, ids3] = ids;
        let phases = vec![
            phase(PhaseKind::Immediate, &self.config.immediate, p1, total_revenue, ids1),
            phase(PhaseKind::Strategic, &self.config.strategic, p2, total_revenue, ids2),
            phase(PhaseKind::Expansion, &self.config.expansion, p3, total_revenue, ids3),
        ];

        let total_recovery: f64 = phases.iter().map(|p| p.recovery).sum();
        let total_cost: f64 = phases.iter().map(|p| p.cost).sum();
        let monthly_recovery = total_recovery / self.config.months_per_year;

        let expected_roi = if total_cost > 0.0 {
            (total_recovery - total_cost) / total_cost
        } else {
            0.0
        };
        let payback_period_months = if monthly_recovery > 0.0 {
            ((total_cost / monthly_recovery).ceil() as u32).max(1)
        } else {
            0
        };

        log::debug!(
            "Recovery plan: {total_providers} providers, recovery {total_recovery:.0}, cost {total_cost:.0}"
        );

        RecoveryPlan {
            total_providers,
            phases,
            total_recovery_potential: total_recovery,
            implementation_cost: total_cost,
            net_benefit: total_recovery - total_cost,
            monthly_recovery,
            expected_roi,
            payback_period_months,
        }
    }

    fn zeroed(&self) -> RecoveryPlan {
        let empty = |kind, cfg: &PhaseConfig| phase(kind, cfg, 0, 0.0, Vec::new());
        RecoveryPlan {
            total_providers: 0,
            phases: vec![
                empty(PhaseKind::Immediate, &self.config.immediate),
                empty(PhaseKind::Strategic, &self.config.strategic),
                empty(PhaseKind::Expansion, &self.config.expansion),
            ],
            total_recovery_potential: 0.0,
            implementation_cost: 0.0,
            net_benefit: 0.0,
            monthly_recovery: 0.0,
            expected_roi: 0.0,
            payback_period_months: 0,
        }
    }
}

fn phase(
    kind: PhaseKind,
    cfg: &PhaseConfig,
    providers: u64,
    total_revenue: f64,
    provider_ids: Vec<ProviderId>,
) -> RecoveryPhase {
    let recovery = total_revenue * cfg.recovery_rate;
    RecoveryPhase {
        kind,
        label: cfg.label.clone(),
        timeline: cfg.timeline.clone(),
        providers,
        recovery_rate: cfg.recovery_rate,
        recovery,
        cost_rate: cfg.cost_rate,
        cost: recovery * cfg.cost_rate,
        provider_ids,
    }
}
