//! Risk scorer — raw market attributes → bounded display score.
//!
//! Pipeline per row:
//!   1. Raw signal: revenue + market share + leakage + specialty + variation.
//!   2. Sigmoid normalization onto the display range (55–95 by default).
//!   3. Tier/urgency, intervention and risk factors from the display score.
//!   4. Seeded display extras: competitor name, risk sparkline, trend.
//!
//! The batch index only ever feeds the variation term and the display
//! extras. Everything is a pure function of (config, catalogs, row, index).

use crate::{
    catalog::Catalogs,
    config::{MarketThresholds, ScoringConfig},
    opportunities::{is_fragmented, is_high_concentration},
    error::ScoreResult,
    provider::{ProviderRecord, RiskComponents, ScoredProvider},
    rng::{provider_seed, ProviderRng},
    types::{InterventionType, RiskLevel, RiskScore, TrendDirection},
};
use serde::{Deserialize, Serialize};

/// Digits of the provider id shown in fallback display names.
const DISPLAY_ID_DIGITS: usize = 4;

#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: ScoringConfig,
    catalogs: Catalogs,
}

impl RiskScorer {
    /// Validates the config up front; scoring itself never fails.
    pub fn new(config: ScoringConfig, catalogs: Catalogs) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self { config, catalogs })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Score one row at position `index` in its batch.
    pub fn score(&self, record: &ProviderRecord, index: usize) -> ScoredProvider {
        let seed = provider_seed(&record.provider_id);
        let components = self.components(record, index);
        let risk_score = self.normalize(components.raw_score);
        let tier = self.tier_for(risk_score);
        let revenue = record.clamped_revenue();
        let (risk_history, trend) = self.risk_history(seed, index, risk_score);

        ScoredProvider {
            display_name: self.display_name(record),
            risk_score,
            risk_tier: tier,
            urgency: tier,
            intervention_type: self.intervention_for(risk_score),
            competitor_threat: self.catalogs.competitor_for(seed).to_string(),
            market_share_display: (record.clamped_share() * 10.0).round() / 10.0,
            revenue_at_risk: revenue * f64::from(risk_score) / 100.0,
            revenue_per_competitor: revenue_per_competitor(record),
            risk_factors: self.risk_factors(record),
            trend,
            risk_history,
            components,
            record: record.clone(),
        }
    }

    /// Score every row; the index is the row's position.
    pub fn score_batch(&self, records: &[ProviderRecord]) -> Vec<ScoredProvider> {
        let scored: Vec<ScoredProvider> = records
            .iter()
            .enumerate()
            .map(|(i, r)| self.score(r, i))
            .collect();
        log::debug!("Scored {} providers", scored.len());
        scored
    }

    /// The raw additive risk signal.
    pub fn components(&self, record: &ProviderRecord, index: usize) -> RiskComponents {
        let w = &self.config.components;
        let share = record.clamped_share();
        let unheld = 100.0 - share;

        let revenue_risk =
            (record.clamped_revenue() / 1_000_000.0 * w.revenue_per_million).min(w.revenue_cap);
        let market_share_risk = (unheld * w.market_share_weight).max(0.0);
        let leakage_risk = (unheld * w.leakage_weight).min(w.leakage_cap);
        let specialty_risk = self.config.specialty.modifier_for(&record.specialty);
        let variation = self.variation(&record.provider_id, index);

        RiskComponents {
            revenue_risk,
            market_share_risk,
            leakage_risk,
            specialty_risk,
            variation,
            raw_score: revenue_risk
                + market_share_risk
                + leakage_risk
                + specialty_risk
                + variation as f64,
        }
    }

    /// Deterministic 0..range jitter from the id seed and batch position.
    pub fn variation(&self, provider_id: &str, index: usize) -> u64 {
        let v = &self.config.variation;
        let seed_part = provider_seed(provider_id) % v.seed_modulus;
        (index as u64)
            .wrapping_mul(v.index_stride)
            .wrapping_add(seed_part)
            % v.range
    }

    /// Logistic transform of the raw score onto the display range.
    pub fn normalize(&self, raw_score: f64) -> RiskScore {
        let s = &self.config.sigmoid;
        let raw = if raw_score.is_nan() { s.min_raw } else { raw_score };
        let normalized = (raw.clamp(s.min_raw, s.max_raw) - s.min_raw) / (s.max_raw - s.min_raw);
        let sigmoid = 1.0 / (1.0 + (-s.steepness * (normalized - 0.5)).exp());
        let display = (sigmoid * (s.max_display - s.min_display) + s.min_display).round();
        display.clamp(s.min_display, s.max_display) as RiskScore
    }

    pub fn tier_for(&self, score: RiskScore) -> RiskLevel {
        let t = &self.config.tiers;
        if score > t.high_above {
            RiskLevel::High
        } else if score > t.medium_above {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn intervention_for(&self, score: RiskScore) -> InterventionType {
        let t = &self.config.interventions;
        if score > t.contract_renegotiation_above {
            InterventionType::ContractRenegotiation
        } else if score > t.competitive_response_above {
            InterventionType::CompetitiveResponse
        } else if score > t.service_expansion_above {
            InterventionType::ServiceExpansion
        } else {
            InterventionType::RelationshipBuilding
        }
    }

    pub fn risk_factors(&self, record: &ProviderRecord) -> Vec<String> {
        let t = &self.config.risk_factors;
        let mut factors = Vec::new();

        if record.clamped_share() < t.low_share_below {
            factors.push("Low market share".to_string());
        }
        if record.clamped_revenue() >= t.high_revenue_at_least {
            factors.push("High revenue exposure".to_string());
        }
        if record.provider_count >= t.fragmented_market_at_least {
            factors.push("Fragmented market".to_string());
        }
        if self.config.specialty.modifier_for(&record.specialty)
            >= t.high_leakage_specialty_at_least
        {
            factors.push("High-leakage specialty".to_string());
        }
        if factors.is_empty() {
            factors.push("Moderate risk profile".to_string());
        }
        factors
    }

    /// Directory name if known, else "{specialty} Provider {last digits}".
    pub fn display_name(&self, record: &ProviderRecord) -> String {
        if let Some(name) = self.catalogs.names.lookup(&record.provider_id) {
            return name.to_string();
        }
        if let Some(name) = record
            .provider_name
            .as_deref()
            .filter(|n| !crate::catalog::is_placeholder_name(n))
        {
            return name.to_string();
        }
        let id = record.provider_id.trim();
        let suffix: String = id
            .chars()
            .skip(id.chars().count().saturating_sub(DISPLAY_ID_DIGITS))
            .collect();
        let specialty = record.specialty.trim();
        match (specialty.is_empty(), suffix.is_empty()) {
            (true, true) => "Provider".to_string(),
            (true, false) => format!("Provider {suffix}"),
            (false, true) => format!("{specialty} Provider"),
            (false, false) => format!("{specialty} Provider {suffix}"),
        }
    }

    /// Monthly sparkline walking backwards from the current score.
    /// The last point is always `current`.
    fn risk_history(
        &self,
        seed: u64,
        index: usize,
        current: RiskScore,
    ) -> (Vec<RiskScore>, TrendDirection) {
        let t = &self.config.trend;
        let s = &self.config.sigmoid;
        let (lo, hi) = (s.min_display as i64, s.max_display as i64);
        let mut rng = ProviderRng::new(seed, index);

        let mut points = vec![current];
        let mut value = i64::from(current);
        for _ in 1..t.history_months {
            value = (value - rng.step(t.max_monthly_step)).clamp(lo, hi);
            points.push(value as RiskScore);
        }
        points.reverse();

        let first = i32::from(points[0]);
        let delta = i32::from(current) - first;
        let trend = if delta > i32::from(t.tolerance) {
            TrendDirection::Up
        } else if delta < -i32::from(t.tolerance) {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };
        (points, trend)
    }

    /// Roll-up over a scored batch.
    pub fn summarize(&self, scored: &[ScoredProvider]) -> BatchSummary {
        BatchSummary::from_scored(scored, &self.config.markets)
    }
}

/// Market revenue split across its providers. A zero count reads as 1.
pub fn revenue_per_competitor(record: &ProviderRecord) -> f64 {
    let market = if record.market_revenue.is_finite() {
        record.market_revenue.max(0.0)
    } else {
        0.0
    };
    market / record.provider_count.max(1) as f64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_providers: usize,
    pub average_risk_score: f64,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub total_revenue_analyzed: f64,
    pub total_revenue_at_risk: f64,
    pub average_market_share: f64,
    pub high_concentration_markets: usize,
    pub fragmented_markets: usize,
}

impl BatchSummary {
    pub fn from_scored(scored: &[ScoredProvider], markets: &MarketThresholds) -> Self {
        if scored.is_empty() {
            return Self::default();
        }
        let n = scored.len() as f64;
        let count = |level: RiskLevel| scored.iter().filter(|p| p.risk_tier == level).count();

        Self {
            total_providers: scored.len(),
            average_risk_score: scored.iter().map(|p| f64::from(p.risk_score)).sum::<f64>() / n,
            high_risk_count: count(RiskLevel::High),
            medium_risk_count: count(RiskLevel::Medium),
            low_risk_count: count(RiskLevel::Low),
            total_revenue_analyzed: scored.iter().map(|p| p.provider_revenue()).sum(),
            total_revenue_at_risk: scored.iter().map(|p| p.revenue_at_risk).sum(),
            average_market_share: scored.iter().map(|p| p.record.clamped_share()).sum::<f64>() / n,
            high_concentration_markets: scored
                .iter()
                .filter(|p| is_high_concentration(p, markets))
                .count(),
            fragmented_markets: scored.iter().filter(|p| is_fragmented(p, markets)).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RiskScorer {
        RiskScorer::new(ScoringConfig::default(), Catalogs::default()).unwrap()
    }

    #[test]
    fn sigmoid_midpoint_lands_mid_range() {
        // raw 45 is the middle of 10..80, sigmoid(0) = 0.5 → 75
        assert_eq!(scorer().normalize(45.0), 75);
    }

    #[test]
    fn raw_score_outside_working_range_is_clamped() {
        let s = scorer();
        assert_eq!(s.normalize(-500.0), s.normalize(10.0));
        assert_eq!(s.normalize(10_000.0), s.normalize(80.0));
        assert_eq!(s.normalize(f64::NAN), s.normalize(10.0));
    }

    #[test]
    fn history_ends_at_current_score() {
        let s = scorer();
        let (points, _) = s.risk_history(123, 4, 88);
        assert_eq!(points.len(), 6);
        assert_eq!(*points.last().unwrap(), 88);
        assert!(points.iter().all(|p| (55..=95).contains(p)));
    }

    #[test]
    fn fallback_name_uses_specialty_and_last_digits() {
        let rec = ProviderRecord::new("1234567890").with_specialty("Cardiology");
        assert_eq!(scorer().display_name(&rec), "Cardiology Provider 7890");
    }

    #[test]
    fn directory_name_wins_over_row_name() {
        let names = [("42".to_string(), "Rivera, Ana".to_string())]
            .into_iter()
            .collect();
        let catalogs = Catalogs::new(vec!["Rival".into()], names).unwrap();
        let s = RiskScorer::new(ScoringConfig::default(), catalogs).unwrap();
        let rec = ProviderRecord::new("42").with_name("Some Clinic");
        assert_eq!(s.display_name(&rec), "Rivera, Ana");
    }
}
