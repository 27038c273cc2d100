//! Scouting rules: thresholds, casualty profiles, intel tiers and bands

use serde::{Deserialize, Serialize};

use crate::core::config::ensure;
use crate::core::error::{EngineError, Result};

/// Ratio boundaries between outcome bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeThresholds {
    pub failure: f64,
    pub partial_low: f64,
    pub partial_high: f64,
}

impl Default for OutcomeThresholds {
    fn default() -> Self {
        Self {
            failure: 0.5,
            partial_low: 1.0,
            partial_high: 1.5,
        }
    }
}

/// Share of each side's scouts lost, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossProfile {
    pub attacker_loss_pct: f64,
    pub defender_loss_pct: f64,
}

impl LossProfile {
    pub const fn new(attacker_loss_pct: f64, defender_loss_pct: f64) -> Self {
        Self {
            attacker_loss_pct,
            defender_loss_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasualtyProfiles {
    pub failure: LossProfile,
    pub partial_low: LossProfile,
    pub partial_high: LossProfile,
    pub success: LossProfile,
}

impl Default for CasualtyProfiles {
    fn default() -> Self {
        Self {
            failure: LossProfile::new(100.0, 0.0),
            partial_low: LossProfile::new(50.0, 10.0),
            partial_high: LossProfile::new(25.0, 20.0),
            success: LossProfile::new(5.0, 30.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelTierId {
    PresenceEconomy,
    Defenses,
    Garrison,
    Reinforcements,
    Infrastructure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelTier {
    pub id: IntelTierId,
    /// Minimum power ratio that unlocks the tier
    pub ratio_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FidelityConfig {
    /// Exact numbers need `ratio >= margin × highest tier threshold`
    pub exact_ratio_margin: f64,
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            exact_ratio_margin: 1.25,
        }
    }
}

/// A labelled range `[min, max)`; `max = None` is unbounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Band {
    fn new(label: &str, min: f64, max: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandTables {
    /// Percent of storage capacity
    pub resources_pct: Vec<Band>,
    /// Absolute unit counts, also used for reinforcements
    pub troops: Vec<Band>,
    pub traps: Vec<Band>,
}

impl Default for BandTables {
    fn default() -> Self {
        Self {
            resources_pct: vec![
                Band::new("low", 0.0, Some(25.0)),
                Band::new("moderate", 25.0, Some(50.0)),
                Band::new("high", 50.0, Some(75.0)),
                Band::new("full", 75.0, None),
            ],
            troops: vec![
                Band::new("none", 0.0, Some(1.0)),
                Band::new("few", 1.0, Some(10.0)),
                Band::new("some", 10.0, Some(50.0)),
                Band::new("many", 50.0, Some(200.0)),
                Band::new("horde", 200.0, None),
            ],
            traps: vec![
                Band::new("none", 0.0, Some(1.0)),
                Band::new("few", 1.0, Some(10.0)),
                Band::new("several", 10.0, Some(50.0)),
                Band::new("many", 50.0, None),
            ],
        }
    }
}

/// Label of the band `value` falls into
pub fn band_label(bands: &[Band], value: f64) -> Result<&str> {
    bands
        .iter()
        .find(|b| b.contains(value))
        .map(|b| b.label.as_str())
        .ok_or_else(|| EngineError::configuration(format!("no band covers value {}", value)))
}

/// Parameters for callers that rate-limit repeated scouting of one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamThrottle {
    pub window_seconds: u64,
    pub max_reports_per_window: u32,
    pub min_scouts_per_report: u32,
}

impl Default for SpamThrottle {
    fn default() -> Self {
        Self {
            window_seconds: 300,
            max_reports_per_window: 3,
            min_scouts_per_report: 1,
        }
    }
}

impl SpamThrottle {
    /// Whether another report may be produced; the caller counts its own history
    pub fn permits(&self, reports_in_window: u32, scouts_sent: u32) -> bool {
        scouts_sent >= self.min_scouts_per_report && reports_in_window < self.max_reports_per_window
    }
}

/// Bonus percentages per building level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutTechConfig {
    pub smithy_pct_per_level: f64,
    pub watchtower_pct_per_level: f64,
}

impl Default for ScoutTechConfig {
    fn default() -> Self {
        Self {
            smithy_pct_per_level: 2.0,
            watchtower_pct_per_level: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutingConfig {
    pub thresholds: OutcomeThresholds,
    pub casualties: CasualtyProfiles,
    /// Ordered by ascending `ratio_min`
    pub tiers: Vec<IntelTier>,
    pub fidelity: FidelityConfig,
    pub bands: BandTables,
    pub spam: SpamThrottle,
    pub tech: ScoutTechConfig,
}

impl Default for ScoutingConfig {
    fn default() -> Self {
        use IntelTierId::*;
        let tier = |id, ratio_min| IntelTier { id, ratio_min };
        Self {
            thresholds: OutcomeThresholds::default(),
            casualties: CasualtyProfiles::default(),
            tiers: vec![
                tier(PresenceEconomy, 0.5),
                tier(Defenses, 0.8),
                tier(Garrison, 1.0),
                tier(Reinforcements, 1.5),
                tier(Infrastructure, 2.0),
            ],
            fidelity: FidelityConfig::default(),
            bands: BandTables::default(),
            spam: SpamThrottle::default(),
            tech: ScoutTechConfig::default(),
        }
    }
}

impl ScoutingConfig {
    /// Ratio needed for exact fidelity
    pub fn exact_ratio(&self) -> f64 {
        self.tiers.last().map_or(0.0, |t| t.ratio_min) * self.fidelity.exact_ratio_margin
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        ensure(
            t.failure > 0.0 && t.failure < t.partial_low && t.partial_low < t.partial_high,
            "scouting thresholds must be positive and strictly ascending",
        )?;

        let c = &self.casualties;
        for profile in [c.failure, c.partial_low, c.partial_high, c.success] {
            ensure(
                (0.0..=100.0).contains(&profile.attacker_loss_pct)
                    && (0.0..=100.0).contains(&profile.defender_loss_pct),
                "scout loss percentages must be within 0..=100",
            )?;
        }

        ensure(!self.tiers.is_empty(), "at least one intel tier is required")?;
        ensure(
            self.tiers.windows(2).all(|w| w[0].ratio_min < w[1].ratio_min),
            "intel tiers must have strictly ascending ratio_min",
        )?;
        ensure(
            self.tiers[0].ratio_min >= t.failure,
            "the first intel tier must not unlock below the failure threshold",
        )?;
        ensure(
            self.fidelity.exact_ratio_margin >= 1.0,
            "exact_ratio_margin must be at least 1",
        )?;

        for (name, bands) in [
            ("resources_pct", &self.bands.resources_pct),
            ("troops", &self.bands.troops),
            ("traps", &self.bands.traps),
        ] {
            validate_bands(name, bands)?;
        }

        ensure(
            self.spam.max_reports_per_window >= 1,
            "max_reports_per_window must be at least 1",
        )?;
        ensure(
            self.tech.smithy_pct_per_level >= 0.0 && self.tech.watchtower_pct_per_level >= 0.0,
            "scout tech bonuses must be non-negative",
        )
    }
}

/// Bands start at zero, touch each other and end unbounded
fn validate_bands(name: &str, bands: &[Band]) -> Result<()> {
    ensure(!bands.is_empty(), format!("{} bands are empty", name))?;
    ensure(bands[0].min == 0.0, format!("{} bands must start at 0", name))?;
    for pair in bands.windows(2) {
        ensure(
            pair[0].max == Some(pair[1].min) && pair[0].min < pair[1].min,
            format!(
                "{} bands '{}' and '{}' are not contiguous",
                name, pair[0].label, pair[1].label
            ),
        )?;
    }
    ensure(
        bands.last().map_or(false, |b| b.max.is_none()),
        format!("{} bands must end unbounded", name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScoutingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_band_lookup() {
        let bands = BandTables::default();
        assert_eq!(band_label(&bands.troops, 0.0).unwrap(), "none");
        assert_eq!(band_label(&bands.troops, 9.0).unwrap(), "few");
        assert_eq!(band_label(&bands.troops, 10.0).unwrap(), "some");
        assert_eq!(band_label(&bands.troops, 10_000.0).unwrap(), "horde");
        assert_eq!(band_label(&bands.resources_pct, 74.9).unwrap(), "high");
        assert!(band_label(&bands.troops, -1.0).is_err());
    }

    #[test]
    fn test_unordered_tiers_rejected() {
        let mut config = ScoutingConfig::default();
        config.tiers.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gap_in_bands_rejected() {
        let mut config = ScoutingConfig::default();
        config.bands.troops[1].min = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tier_below_failure_rejected() {
        let mut config = ScoutingConfig::default();
        config.tiers[0].ratio_min = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spam_throttle() {
        let spam = SpamThrottle::default();
        assert!(spam.permits(0, 1));
        assert!(spam.permits(2, 5));
        assert!(!spam.permits(3, 5));
        assert!(!spam.permits(0, 0));
    }

    #[test]
    fn test_exact_ratio() {
        assert!((ScoutingConfig::default().exact_ratio() - 2.5).abs() < 1e-12);
    }
}
