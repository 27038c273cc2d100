//! Scouting outcome from relative scouting power

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{IntelTierId, LossProfile, ScoutingConfig};
use crate::core::error::{EngineError, Result};
use crate::core::rng::{derive_stream, SCOUT_STREAM};

/// Scouts and scouting bonuses of one side
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutSide {
    pub scouts: u32,
    pub smithy_level: u32,
    pub watchtower_level: u32,
    /// Hero vision (attacker) or counter-scouting (defender), in percent
    pub hero_bonus_pct: f64,
    pub item_bonus_pct: f64,
}

impl ScoutSide {
    pub fn new(scouts: u32) -> Self {
        Self {
            scouts,
            ..Self::default()
        }
    }

    /// `scouts × (1 + bonuses)`
    pub fn power(&self, config: &ScoutingConfig) -> f64 {
        let bonus_pct = self.smithy_level as f64 * config.tech.smithy_pct_per_level
            + self.watchtower_level as f64 * config.tech.watchtower_pct_per_level
            + self.hero_bonus_pct
            + self.item_bonus_pct;
        self.scouts as f64 * (1.0 + bonus_pct / 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutRequest {
    pub attacker: ScoutSide,
    pub defender: ScoutSide,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoutOutcome {
    Failure,
    PartialLow,
    PartialHigh,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    Exact,
    Partial,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutMissionResult {
    pub outcome: ScoutOutcome,
    /// Any outcome but failure brings information home
    pub success: bool,
    /// Attacker over defender power; infinite against an unguarded target
    pub ratio: f64,
    pub unlocked_tiers: Vec<IntelTierId>,
    pub fidelity: Fidelity,
    pub attacker_loss_pct: f64,
    pub defender_loss_pct: f64,
    pub attacker_losses: u32,
    pub defender_losses: u32,
}

impl ScoutMissionResult {
    pub fn has_tier(&self, tier: IntelTierId) -> bool {
        self.unlocked_tiers.contains(&tier)
    }
}

pub fn classify(ratio: f64, config: &ScoutingConfig) -> ScoutOutcome {
    let t = &config.thresholds;
    if ratio < t.failure {
        ScoutOutcome::Failure
    } else if ratio < t.partial_low {
        ScoutOutcome::PartialLow
    } else if ratio < t.partial_high {
        ScoutOutcome::PartialHigh
    } else {
        ScoutOutcome::Success
    }
}

/// Tiers whose threshold the ratio meets, in configured order
pub fn unlocked_tiers(ratio: f64, config: &ScoutingConfig) -> Vec<IntelTierId> {
    config
        .tiers
        .iter()
        .take_while(|t| ratio >= t.ratio_min)
        .map(|t| t.id)
        .collect()
}

pub fn resolve_scouting(request: &ScoutRequest, config: &ScoutingConfig) -> Result<ScoutMissionResult> {
    if request.attacker.scouts == 0 {
        return Err(EngineError::validation("a scouting mission needs at least one scout"));
    }
    for (name, side) in [("attacker", &request.attacker), ("defender", &request.defender)] {
        if !(side.hero_bonus_pct.is_finite() && side.item_bonus_pct.is_finite())
            || side.hero_bonus_pct < 0.0
            || side.item_bonus_pct < 0.0
        {
            return Err(EngineError::validation(format!(
                "{} scouting bonuses must be non-negative",
                name
            )));
        }
    }

    let attacker_power = request.attacker.power(config);
    let defender_power = request.defender.power(config);
    let ratio = if defender_power > 0.0 {
        attacker_power / defender_power
    } else {
        f64::INFINITY
    };

    let outcome = classify(ratio, config);
    let profile = loss_profile(outcome, config);

    let unlocked = if outcome == ScoutOutcome::Failure {
        Vec::new()
    } else {
        unlocked_tiers(ratio, config)
    };
    let fidelity = if unlocked.is_empty() {
        Fidelity::None
    } else if ratio >= config.exact_ratio() {
        Fidelity::Exact
    } else {
        Fidelity::Partial
    };

    let mut rng = derive_stream(request.seed, SCOUT_STREAM);
    let attacker_losses = stochastic_losses(request.attacker.scouts, profile.attacker_loss_pct, &mut rng);
    let defender_losses = stochastic_losses(request.defender.scouts, profile.defender_loss_pct, &mut rng);

    tracing::debug!(ratio, ?outcome, ?fidelity, tiers = unlocked.len(), "scouting resolved");

    Ok(ScoutMissionResult {
        outcome,
        success: outcome != ScoutOutcome::Failure,
        ratio,
        unlocked_tiers: unlocked,
        fidelity,
        attacker_loss_pct: profile.attacker_loss_pct,
        defender_loss_pct: profile.defender_loss_pct,
        attacker_losses,
        defender_losses,
    })
}

fn loss_profile(outcome: ScoutOutcome, config: &ScoutingConfig) -> LossProfile {
    let c = &config.casualties;
    match outcome {
        ScoutOutcome::Failure => c.failure,
        ScoutOutcome::PartialLow => c.partial_low,
        ScoutOutcome::PartialHigh => c.partial_high,
        ScoutOutcome::Success => c.success,
    }
}

/// `count × pct`, with the fractional unit lost with matching probability
fn stochastic_losses<R: Rng>(count: u32, pct: f64, rng: &mut R) -> u32 {
    let expected = count as f64 * pct / 100.0;
    let whole = expected.floor();
    let extra = if rng.gen::<f64>() < expected - whole { 1.0 } else { 0.0 };
    ((whole + extra) as u32).min(count)
}
