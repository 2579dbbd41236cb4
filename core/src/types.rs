//! Shared primitive types used across the scoring engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque provider identifier (usually an NPI).
pub type ProviderId = String;

/// A display risk score. Always inside the configured display range.
pub type RiskScore = u8;

/// Coarse LOW/MEDIUM/HIGH bucket used for both tier and urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended intervention strategy, ordered from least to most aggressive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InterventionType {
    #[serde(rename = "Relationship Building")]
    RelationshipBuilding,
    #[serde(rename = "Service Expansion")]
    ServiceExpansion,
    #[serde(rename = "Competitive Response")]
    CompetitiveResponse,
    #[serde(rename = "Contract Renegotiation")]
    ContractRenegotiation,
}

impl InterventionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RelationshipBuilding => "Relationship Building",
            Self::ServiceExpansion => "Service Expansion",
            Self::CompetitiveResponse => "Competitive Response",
            Self::ContractRenegotiation => "Contract Renegotiation",
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of the risk sparkline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}
