//! Market-level leakage opportunities.
//!
//! Two kinds of market are flagged from the scored rows:
//!   - High Concentration Risk: one provider holds more than 80% of the
//!     market, so a competitor that poaches them takes most of it.
//!   - Market Share Opportunity: the leading provider holds under 25%
//!     of a market with more than 5 providers.
//!
//! Each list keeps input order and is capped per kind.

use crate::{config::MarketThresholds, provider::ScoredProvider};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityKind {
    #[serde(rename = "High Concentration Risk")]
    HighConcentrationRisk,
    #[serde(rename = "Market Share Opportunity")]
    MarketShareOpportunity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakageOpportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub zip_code: String,
    pub specialty: String,
    pub description: String,
    /// Total revenue of the market, not of the provider.
    pub revenue: f64,
}

pub fn is_high_concentration(provider: &ScoredProvider, t: &MarketThresholds) -> bool {
    provider.record.clamped_share() > t.high_concentration_above
}

pub fn is_fragmented(provider: &ScoredProvider, t: &MarketThresholds) -> bool {
    provider.record.clamped_share() < t.fragmented_share_below
        && provider.record.provider_count > t.fragmented_count_above
}

/// Concentration risks first, then fragmentation opportunities.
pub fn identify_leakage_opportunities(
    scored: &[ScoredProvider],
    t: &MarketThresholds,
) -> Vec<LeakageOpportunity> {
    let risks = scored
        .iter()
        .filter(|p| is_high_concentration(p, t))
        .take(t.max_per_kind)
        .map(|p| LeakageOpportunity {
            kind: OpportunityKind::HighConcentrationRisk,
            zip_code: p.record.zip_code.clone(),
            specialty: p.record.specialty.clone(),
            description: format!(
                "{} has a {:.1}% market share in {} in zip {}.",
                p.display_name,
                p.record.clamped_share(),
                p.record.specialty,
                p.record.zip_code
            ),
            revenue: market_revenue(p),
        });

    let openings = scored
        .iter()
        .filter(|p| is_fragmented(p, t))
        .take(t.max_per_kind)
        .map(|p| LeakageOpportunity {
            kind: OpportunityKind::MarketShareOpportunity,
            zip_code: p.record.zip_code.clone(),
            specialty: p.record.specialty.clone(),
            description: format!(
                "Fragmented market: {} in zip {} has {} providers, with the top provider holding only {:.1}% share.",
                p.record.specialty,
                p.record.zip_code,
                p.record.provider_count,
                p.record.clamped_share()
            ),
            revenue: market_revenue(p),
        });

    let opportunities: Vec<LeakageOpportunity> = risks.chain(openings).collect();
    log::debug!("Identified {} leakage opportunities", opportunities.len());
    opportunities
}

fn market_revenue(p: &ScoredProvider) -> f64 {
    if p.record.market_revenue.is_finite() {
        p.record.market_revenue.max(0.0)
    } else {
        0.0
    }
}
