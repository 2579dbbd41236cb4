//! Provider rows, before and after scoring.

use crate::types::{InterventionType, ProviderId, RiskLevel, RiskScore, TrendDirection};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_SPECIALTY: &str = "Unknown Specialty";

/// One market/provider row in canonical shape.
/// Built by `ingest` from whatever the upstream document contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub provider_id: ProviderId,
    pub provider_name: Option<String>,
    pub specialty: String,
    pub market_share_percentage: f64,
    pub provider_revenue: f64,
    pub provider_services: u64,
    pub provider_count: u64,
    /// Total revenue of the provider's local market.
    pub market_revenue: f64,
    pub zip_code: String,
}

impl ProviderRecord {
    /// A record with the documented defaults for every missing field.
    pub fn new(provider_id: impl Into<ProviderId>) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_name: None,
            specialty: UNKNOWN_SPECIALTY.to_string(),
            market_share_percentage: 0.0,
            provider_revenue: 0.0,
            provider_services: 0,
            provider_count: 0,
            market_revenue: 0.0,
            zip_code: String::new(),
        }
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = specialty.into();
        self
    }

    pub fn with_market_share(mut self, pct: f64) -> Self {
        self.market_share_percentage = pct;
        self
    }

    /// Sets provider revenue; market revenue follows unless set later.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.provider_revenue = revenue;
        self.market_revenue = revenue;
        self
    }

    pub fn with_market_revenue(mut self, revenue: f64) -> Self {
        self.market_revenue = revenue;
        self
    }

    pub fn with_provider_count(mut self, count: u64) -> Self {
        self.provider_count = count;
        self
    }

    pub fn with_services(mut self, services: u64) -> Self {
        self.provider_services = services;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = zip.into();
        self
    }

    /// Market share clamped into [0, 100]. NaN reads as 0.
    pub fn clamped_share(&self) -> f64 {
        if self.market_share_percentage.is_nan() {
            0.0
        } else {
            self.market_share_percentage.clamp(0.0, 100.0)
        }
    }

    /// Revenue floored at 0. Non-finite reads as 0.
    pub fn clamped_revenue(&self) -> f64 {
        if self.provider_revenue.is_finite() {
            self.provider_revenue.max(0.0)
        } else {
            0.0
        }
    }
}

/// The five additive parts of the raw risk signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskComponents {
    pub revenue_risk: f64,
    pub market_share_risk: f64,
    pub leakage_risk: f64,
    pub specialty_risk: f64,
    pub variation: u64,
    pub raw_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProvider {
    #[serde(flatten)]
    pub record: ProviderRecord,
    pub display_name: String,
    pub risk_score: RiskScore,
    pub risk_tier: RiskLevel,
    pub urgency: RiskLevel,
    pub intervention_type: InterventionType,
    pub competitor_threat: String,
    pub market_share_display: f64,
    pub revenue_at_risk: f64,
    pub revenue_per_competitor: f64,
    pub risk_factors: Vec<String>,
    pub trend: TrendDirection,
    pub risk_history: Vec<RiskScore>,
    pub components: RiskComponents,
}

impl ScoredProvider {
    pub fn provider_id(&self) -> &str {
        &self.record.provider_id
    }

    pub fn provider_revenue(&self) -> f64 {
        self.record.clamped_revenue()
    }
}
