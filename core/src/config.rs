use crate::error::{ScoreError, ScoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ── Risk scoring ───────────────────────────────────────────────────

/// Logistic curve mapping the raw risk signal onto the display range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmoidConfig {
    pub min_raw: f64,
    pub max_raw: f64,
    pub min_display: f64,
    pub max_display: f64,
    pub steepness: f64,
}

impl Default for SigmoidConfig {
    fn default() -> Self {
        Self {
            min_raw: 10.0,
            max_raw: 80.0,
            min_display: 55.0,
            max_display: 95.0,
            steepness: 6.0,
        }
    }
}

/// Weights and caps of the three market-derived risk components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    /// Points per $1M of provider revenue.
    pub revenue_per_million: f64,
    pub revenue_cap: f64,
    /// Points per percentage point of market share NOT held.
    pub market_share_weight: f64,
    pub leakage_weight: f64,
    pub leakage_cap: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            revenue_per_million: 5.0,
            revenue_cap: 30.0,
            market_share_weight: 0.4,
            leakage_weight: 0.2,
            leakage_cap: 20.0,
        }
    }
}

/// `variation = (index * index_stride + seed % seed_modulus) % range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationConfig {
    pub index_stride: u64,
    pub seed_modulus: u64,
    pub range: u64,
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            index_stride: 7,
            seed_modulus: 100,
            range: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialtyConfig {
    pub default_modifier: f64,
    pub modifiers: BTreeMap<String, f64>,
}

impl SpecialtyConfig {
    /// Risk modifier for a specialty. Unknown and empty specialties
    /// get the default.
    pub fn modifier_for(&self, specialty: &str) -> f64 {
        self.modifiers
            .get(specialty.trim())
            .copied()
            .unwrap_or(self.default_modifier)
    }
}

impl Default for SpecialtyConfig {
    fn default() -> Self {
        let modifiers = [
            ("Emergency Medicine", 8.0),
            ("Cardiology", 7.0),
            ("Oncology", 7.0),
            ("Orthopedic Surgery", 6.0),
            ("Neurology", 6.0),
            ("Gastroenterology", 5.0),
            ("Radiology", 5.0),
            ("Pulmonary Disease", 5.0),
            ("Nephrology", 4.0),
            ("Internal Medicine", 4.0),
            ("Endocrinology", 4.0),
            ("Family Practice", 3.0),
            ("Dermatology", 3.0),
            ("Psychiatry", 3.0),
        ]
        .into_iter()
        .map(|(name, m)| (name.to_string(), m))
        .collect();

        Self {
            default_modifier: 4.0,
            modifiers,
        }
    }
}

/// Tier and urgency share these. Comparisons are strict `>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub high_above: u8,
    pub medium_above: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high_above: 85,
            medium_above: 75,
        }
    }
}

/// Independent of the tier thresholds. Comparisons are strict `>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionThresholds {
    pub contract_renegotiation_above: u8,
    pub competitive_response_above: u8,
    pub service_expansion_above: u8,
}

impl Default for InterventionThresholds {
    fn default() -> Self {
        Self {
            contract_renegotiation_above: 90,
            competitive_response_above: 80,
            service_expansion_above: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactorThresholds {
    pub low_share_below: f64,
    pub high_revenue_at_least: f64,
    pub fragmented_market_at_least: u64,
    pub high_leakage_specialty_at_least: f64,
}

impl Default for RiskFactorThresholds {
    fn default() -> Self {
        Self {
            low_share_below: 30.0,
            high_revenue_at_least: 1_000_000.0,
            fragmented_market_at_least: 10,
            high_leakage_specialty_at_least: 7.0,
        }
    }
}

/// Shape of the seeded risk sparkline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub history_months: usize,
    pub max_monthly_step: u32,
    /// Net movement (points) at or below which the trend is STABLE.
    pub tolerance: u8,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            history_months: 6,
            max_monthly_step: 3,
            tolerance: 2,
        }
    }
}

/// Market-level leakage flags: concentrated and fragmented markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketThresholds {
    pub high_concentration_above: f64,
    pub fragmented_share_below: f64,
    pub fragmented_count_above: u64,
    /// Cap on listed opportunities of each kind.
    pub max_per_kind: usize,
}

impl Default for MarketThresholds {
    fn default() -> Self {
        Self {
            high_concentration_above: 80.0,
            fragmented_share_below: 25.0,
            fragmented_count_above: 5,
            max_per_kind: 15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub sigmoid: SigmoidConfig,
    pub components: ComponentWeights,
    pub variation: VariationConfig,
    pub specialty: SpecialtyConfig,
    pub tiers: TierThresholds,
    pub interventions: InterventionThresholds,
    pub risk_factors: RiskFactorThresholds,
    pub trend: TrendConfig,
    pub markets: MarketThresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> ScoreResult<()> {
        let s = &self.sigmoid;
        finite("sigmoid.min_raw", s.min_raw)?;
        finite("sigmoid.max_raw", s.max_raw)?;
        if s.min_raw >= s.max_raw {
            return Err(ScoreError::invalid_config(
                "sigmoid.max_raw",
                format!("must exceed min_raw ({} >= {})", s.min_raw, s.max_raw),
            ));
        }
        non_negative("sigmoid.min_display", s.min_display)?;
        if s.max_display > 100.0 || s.min_display >= s.max_display {
            return Err(ScoreError::invalid_config(
                "sigmoid.max_display",
                format!(
                    "display range must satisfy 0 <= min < max <= 100 (got {}..{})",
                    s.min_display, s.max_display
                ),
            ));
        }
        if s.min_display.fract() != 0.0 || s.max_display.fract() != 0.0 {
            return Err(ScoreError::invalid_config(
                "sigmoid.min_display",
                format!(
                    "display bounds must be whole numbers (got {}..{})",
                    s.min_display, s.max_display
                ),
            ));
        }
        positive("sigmoid.steepness", s.steepness)?;

        let c = &self.components;
        non_negative("components.revenue_per_million", c.revenue_per_million)?;
        non_negative("components.revenue_cap", c.revenue_cap)?;
        non_negative("components.market_share_weight", c.market_share_weight)?;
        non_negative("components.leakage_weight", c.leakage_weight)?;
        non_negative("components.leakage_cap", c.leakage_cap)?;

        if self.variation.seed_modulus == 0 || self.variation.range == 0 {
            return Err(ScoreError::invalid_config(
                "variation",
                "seed_modulus and range must be non-zero",
            ));
        }

        non_negative("specialty.default_modifier", self.specialty.default_modifier)?;
        for (name, m) in &self.specialty.modifiers {
            non_negative(&format!("specialty.modifiers.{name}"), *m)?;
        }

        if self.tiers.medium_above >= self.tiers.high_above {
            return Err(ScoreError::invalid_config(
                "tiers",
                "medium_above must be below high_above",
            ));
        }
        let i = &self.interventions;
        if !(i.service_expansion_above < i.competitive_response_above
            && i.competitive_response_above < i.contract_renegotiation_above)
        {
            return Err(ScoreError::invalid_config(
                "interventions",
                "thresholds must strictly increase toward contract_renegotiation_above",
            ));
        }

        let r = &self.risk_factors;
        non_negative("risk_factors.low_share_below", r.low_share_below)?;
        non_negative("risk_factors.high_revenue_at_least", r.high_revenue_at_least)?;
        non_negative(
            "risk_factors.high_leakage_specialty_at_least",
            r.high_leakage_specialty_at_least,
        )?;

        if self.trend.history_months == 0 {
            return Err(ScoreError::invalid_config(
                "trend.history_months",
                "must be at least 1",
            ));
        }
        let display_span = s.max_display - s.min_display;
        if f64::from(self.trend.max_monthly_step) > display_span {
            return Err(ScoreError::invalid_config(
                "trend.max_monthly_step",
                format!(
                    "must not exceed the display span {display_span} (got {})",
                    self.trend.max_monthly_step
                ),
            ));
        }

        let m = &self.markets;
        unit_percent("markets.high_concentration_above", m.high_concentration_above)?;
        unit_percent("markets.fragmented_share_below", m.fragmented_share_below)?;
        Ok(())
    }
}

// ── Recovery plan ──────────────────────────────────────────────────

/// A phase is overridden as a whole; every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub label: String,
    pub timeline: String,
    /// Share of the cohort assigned to this phase. The expansion
    /// phase always takes the remainder; its share is informational.
    pub provider_share: f64,
    /// Fraction of total cohort revenue this phase recovers.
    pub recovery_rate: f64,
    /// Fraction of this phase's recovery spent on implementation.
    pub cost_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub immediate: PhaseConfig,
    pub strategic: PhaseConfig,
    pub expansion: PhaseConfig,
    pub months_per_year: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            immediate: PhaseConfig {
                label: "Immediate Intervention".into(),
                timeline: "0-3 months".into(),
                provider_share: 0.40,
                recovery_rate: 0.40,
                cost_rate: 0.12,
            },
            strategic: PhaseConfig {
                label: "Strategic Initiatives".into(),
                timeline: "3-6 months".into(),
                provider_share: 0.35,
                recovery_rate: 0.30,
                cost_rate: 0.10,
            },
            expansion: PhaseConfig {
                label: "Network Expansion".into(),
                timeline: "6-12 months".into(),
                provider_share: 0.25,
                recovery_rate: 0.30,
                cost_rate: 0.085,
            },
            months_per_year: 12.0,
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&self) -> ScoreResult<()> {
        for (name, phase) in [
            ("immediate", &self.immediate),
            ("strategic", &self.strategic),
            ("expansion", &self.expansion),
        ] {
            unit_interval(&format!("{name}.provider_share"), phase.provider_share)?;
            unit_interval(&format!("{name}.recovery_rate"), phase.recovery_rate)?;
            unit_interval(&format!("{name}.cost_rate"), phase.cost_rate)?;
        }
        if self.immediate.provider_share + self.strategic.provider_share > 1.0 {
            return Err(ScoreError::invalid_config(
                "strategic.provider_share",
                "immediate and strategic shares together exceed the cohort",
            ));
        }
        positive("months_per_year", self.months_per_year)?;
        Ok(())
    }
}

// ── Loading ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub recovery: RecoveryConfig,
}

impl EngineConfig {
    /// Load from the data/ directory. Missing files fall back to the
    /// compiled-in defaults; files that exist must parse.
    pub fn load(data_dir: impl AsRef<Path>) -> ScoreResult<Self> {
        let data_dir = data_dir.as_ref();
        let scoring: ScoringConfig =
            read_json_or_default(&data_dir.join("scoring").join("risk_model.json"))?;
        let recovery: RecoveryConfig =
            read_json_or_default(&data_dir.join("recovery").join("recovery_plan.json"))?;

        let config = Self { scoring, recovery };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScoreResult<()> {
        self.scoring.validate()?;
        self.recovery.validate()
    }
}

pub(crate) fn read_json_or_default<T>(path: &Path) -> ScoreResult<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        log::info!("{} not found, using defaults", path.display());
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ScoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_json::from_str(&content)?;
    log::info!("Loaded {}", path.display());
    Ok(value)
}

fn finite(field: &str, v: f64) -> ScoreResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ScoreError::invalid_config(field, format!("must be finite (got {v})")))
    }
}

fn non_negative(field: &str, v: f64) -> ScoreResult<()> {
    finite(field, v)?;
    if v < 0.0 {
        return Err(ScoreError::invalid_config(field, format!("must be >= 0 (got {v})")));
    }
    Ok(())
}

fn positive(field: &str, v: f64) -> ScoreResult<()> {
    finite(field, v)?;
    if v <= 0.0 {
        return Err(ScoreError::invalid_config(field, format!("must be > 0 (got {v})")));
    }
    Ok(())
}

fn unit_percent(field: &str, v: f64) -> ScoreResult<()> {
    non_negative(field, v)?;
    if v > 100.0 {
        return Err(ScoreError::invalid_config(field, format!("must be <= 100 (got {v})")));
    }
    Ok(())
}

fn unit_interval(field: &str, v: f64) -> ScoreResult<()> {
    non_negative(field, v)?;
    if v > 1.0 {
        return Err(ScoreError::invalid_config(field, format!("must be <= 1 (got {v})")));
    }
    Ok(())
}
