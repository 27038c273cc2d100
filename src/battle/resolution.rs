//! Round-based battle resolution
//!
//! Both sides deal losses simultaneously each round. A side's loss fraction
//! is `min(1, intensity × enemy_power / own_power)`, applied to every stack
//! and rounded per stack, until one side is wiped out or the round cap hits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::luck::draw_luck;
use super::morale::morale_multiplier;
use super::report::{
    Aggregates, BattleReport, LossRates, Multipliers, RoundResult, SideOutcome, UnitCasualties,
};
use super::weighting::{defense_weights, effective_defense, DefenseWeights};
use crate::army::{tech_factor, Army, UnitStack};
use crate::core::config::WorldConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{MissionKind, Wall};
use crate::siege::resolve_rams;

/// Everything about a battle that is not an army
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleEnvironment {
    pub mission: MissionKind,
    pub wall: Wall,
    /// Account sizes feeding the morale curve (population or points)
    pub attacker_size: f64,
    pub defender_size: f64,
    /// Required; a battle without a seed is rejected
    pub seed: Option<u64>,
    /// Extra defense multiplier from the night policy (1.0 outside the window)
    pub night_multiplier: f64,
}

impl Default for BattleEnvironment {
    fn default() -> Self {
        Self {
            mission: MissionKind::Attack,
            wall: Wall::default(),
            attacker_size: 0.0,
            defender_size: 0.0,
            seed: None,
            night_multiplier: 1.0,
        }
    }
}

impl BattleEnvironment {
    pub fn new(mission: MissionKind, seed: u64) -> Self {
        Self {
            mission,
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.wall = wall;
        self
    }

    pub fn with_sizes(mut self, attacker_size: f64, defender_size: f64) -> Self {
        self.attacker_size = attacker_size;
        self.defender_size = defender_size;
        self
    }

    fn validate(&self) -> Result<u64> {
        if !self.mission.is_combat() {
            return Err(EngineError::validation(format!(
                "{:?} missions do not fight battles",
                self.mission
            )));
        }
        for (name, size) in [("attacker", self.attacker_size), ("defender", self.defender_size)] {
            if !size.is_finite() || size < 0.0 {
                return Err(EngineError::validation(format!(
                    "{} size must be a non-negative number, got {}",
                    name, size
                )));
            }
        }
        if !self.night_multiplier.is_finite() || self.night_multiplier <= 0.0 {
            return Err(EngineError::validation(format!(
                "night multiplier must be positive, got {}",
                self.night_multiplier
            )));
        }
        self.seed
            .ok_or_else(|| EngineError::validation("battle requires an explicit seed"))
    }
}

/// Battle outcome plus the surviving armies
#[derive(Debug, Clone, PartialEq)]
pub struct BattleOutcome {
    pub report: BattleReport,
    pub attacker_survivors: Army,
    pub defender_survivors: Army,
}

/// Per-unit fighting strength of one side, multipliers excluded
struct SidePower {
    per_unit: Vec<f64>,
}

impl SidePower {
    fn offense(stacks: &[UnitStack], tech_pct: f64) -> Self {
        Self {
            per_unit: stacks
                .iter()
                .map(|s| s.attack * tech_factor(s.tech.attack_level, tech_pct))
                .collect(),
        }
    }

    fn defense(stacks: &[UnitStack], weights: DefenseWeights, tech_pct: f64) -> Self {
        Self {
            per_unit: stacks
                .iter()
                .map(|s| {
                    weights.blend(s.def_inf, s.def_cav) * tech_factor(s.tech.defense_level, tech_pct)
                })
                .collect(),
        }
    }

    fn total(&self, counts: &[u32]) -> f64 {
        self.per_unit
            .iter()
            .zip(counts)
            .map(|(p, &c)| p * c as f64)
            .sum()
    }
}

/// Resolve a battle and return the report with both survivor armies
pub fn resolve_battle(
    attacker: &Army,
    defender: &Army,
    env: &BattleEnvironment,
    config: &WorldConfig,
) -> Result<BattleOutcome> {
    let seed = env.validate()?;
    let combat = &config.combat;
    let tech_pct = combat.tech_pct_per_level;

    let weights = defense_weights(attacker, tech_pct);

    // Rams hit before the fight, against the unwalled weighted defense
    let counter_defense = effective_defense(defender, weights, tech_pct);
    let pre_combat = resolve_rams(attacker, env.wall, counter_defense, combat, &config.siege)?;
    let wall_level = pre_combat.map_or(env.wall.level, |r| r.wall_after);
    let wall = if wall_level == 0 {
        1.0
    } else {
        1.0 + wall_level as f64 * combat.wall(env.wall.wall_type)?.defense_pct_per_level / 100.0
    };

    let morale = morale_multiplier(env.attacker_size, env.defender_size, &combat.morale);
    let named: BTreeMap<String, f64> = combat
        .unit_multipliers
        .iter()
        .filter(|m| attacker.has_unit_type(&m.unit_type))
        .map(|m| (m.name.clone(), m.attack_multiplier))
        .collect();
    let luck = draw_luck(seed, combat.luck_bound);

    let multipliers = Multipliers {
        morale,
        wall,
        night: env.night_multiplier,
        named,
    };
    let attack_factor = morale * multipliers.named_product() * (1.0 + luck.attacker);
    let defense_factor = wall * env.night_multiplier;

    let attack_power = SidePower::offense(attacker.stacks(), tech_pct);
    let defense_power = SidePower::defense(defender.stacks(), weights, tech_pct);

    let mut att: Vec<u32> = attacker.stacks().iter().map(|s| s.count).collect();
    let mut def: Vec<u32> = defender.stacks().iter().map(|s| s.count).collect();

    let max_rounds = if env.mission == MissionKind::Raid {
        combat.raid_max_rounds
    } else {
        combat.max_rounds
    };

    let mut rounds = Vec::new();
    for round in 1..=max_rounds {
        if total(&att) == 0 || total(&def) == 0 {
            break;
        }
        let a = attack_power.total(&att) * attack_factor;
        let d = defense_power.total(&def) * defense_factor;
        let (att_frac, def_frac) = loss_fractions(a, d, combat.round_intensity);

        let attacker_casualties = apply_losses(&mut att, att_frac);
        let defender_casualties = apply_losses(&mut def, def_frac);
        tracing::trace!(round, a, d, attacker_casualties, defender_casualties, "battle round");

        rounds.push(RoundResult {
            round,
            attacker_power: a,
            defender_power: d,
            attacker_casualties,
            defender_casualties,
        });
    }

    let attacker_side = side_outcome(attacker, &att);
    let defender_side = side_outcome(defender, &def);
    let attacker_won = attacker_side.total_initial > 0 && defender_side.total_survivors == 0;

    let report = BattleReport {
        rounds,
        aggregates: Aggregates { defender: weights },
        multipliers,
        luck,
        loss_rates: LossRates {
            attacker: attacker_side.loss_rate(),
            defender: defender_side.loss_rate(),
        },
        attacker: attacker_side,
        defender: defender_side,
        attacker_won,
        pre_combat,
    };
    report.check_invariants(combat.luck_bound)?;

    tracing::debug!(
        attacker = attacker.label(),
        defender = defender.label(),
        rounds = report.rounds.len(),
        attacker_won,
        luck = luck.attacker,
        "battle resolved"
    );

    Ok(BattleOutcome {
        attacker_survivors: attacker.with_counts(&att)?,
        defender_survivors: defender.with_counts(&def)?,
        report,
    })
}

/// `(attacker, defender)` loss fractions for one round
///
/// A side without fighting power cannot inflict losses and is routed.
fn loss_fractions(attack: f64, defense: f64, intensity: f64) -> (f64, f64) {
    if attack <= 0.0 {
        return (1.0, 0.0);
    }
    if defense <= 0.0 {
        return (0.0, 1.0);
    }
    (
        (intensity * defense / attack).min(1.0),
        (intensity * attack / defense).min(1.0),
    )
}

fn apply_losses(counts: &mut [u32], fraction: f64) -> u64 {
    let mut lost = 0u64;
    for count in counts.iter_mut() {
        let casualties = ((*count as f64 * fraction).round() as u32).min(*count);
        *count -= casualties;
        lost += casualties as u64;
    }
    lost
}

fn total(counts: &[u32]) -> u64 {
    counts.iter().map(|&c| c as u64).sum()
}

fn side_outcome(army: &Army, survivors: &[u32]) -> SideOutcome {
    let units: Vec<UnitCasualties> = army
        .stacks()
        .iter()
        .zip(survivors)
        .map(|(s, &left)| UnitCasualties {
            unit_type: s.unit_type.clone(),
            initial: s.count,
            casualties: s.count - left,
            survivors: left,
        })
        .collect();
    SideOutcome {
        total_initial: army.total_units(),
        total_survivors: total(survivors),
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::{StackOrder, TechLevels};
    use crate::core::types::WallType;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    fn army(label: &str, orders: &[StackOrder]) -> Army {
        Army::build(label, orders, &config()).unwrap()
    }

    #[test]
    fn test_missing_seed_rejected() {
        let a = army("a", &[StackOrder::new("axeman", 10)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 10)]);
        let env = BattleEnvironment::default();
        let err = resolve_battle(&a, &d, &env, &config()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_scout_mission_is_not_a_battle() {
        let a = army("a", &[StackOrder::new("axeman", 10)]);
        let d = army("d", &[]);
        let env = BattleEnvironment::new(MissionKind::Scout, 1);
        assert!(resolve_battle(&a, &d, &env, &config()).is_err());
    }

    #[test]
    fn test_empty_defender_attacker_wins_without_rounds() {
        let a = army("a", &[StackOrder::new("axeman", 10)]);
        let d = army("d", &[]);
        let outcome = resolve_battle(&a, &d, &BattleEnvironment::new(MissionKind::Attack, 3), &config())
            .unwrap();
        assert!(outcome.report.attacker_won);
        assert!(outcome.report.rounds.is_empty());
        assert_eq!(outcome.attacker_survivors.total_units(), 10);
    }

    #[test]
    fn test_empty_attacker_loses() {
        let a = army("a", &[]);
        let d = army("d", &[StackOrder::new("spear_fighter", 10)]);
        let outcome = resolve_battle(&a, &d, &BattleEnvironment::new(MissionKind::Attack, 3), &config())
            .unwrap();
        assert!(!outcome.report.attacker_won);
        assert!(outcome.report.rounds.is_empty());
        assert_eq!(outcome.report.defender.total_survivors, 10);
    }

    #[test]
    fn test_overwhelming_attacker_wipes_defender() {
        let a = army("a", &[StackOrder::new("axeman", 1000)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 10)]);
        let outcome = resolve_battle(&a, &d, &BattleEnvironment::new(MissionKind::Attack, 11), &config())
            .unwrap();
        let report = &outcome.report;
        assert!(report.attacker_won);
        assert_eq!(report.rounds.len(), 1);
        assert_eq!(report.loss_rates.defender, 1.0);
        assert!(report.loss_rates.attacker < 0.05);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = army("a", &[StackOrder::new("axeman", 120), StackOrder::new("light_cavalry", 30)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 150), StackOrder::new("swordsman", 60)]);
        let env = BattleEnvironment::new(MissionKind::Attack, 77).with_wall(Wall::new(WallType::CityWall, 5));
        let first = resolve_battle(&a, &d, &env, &config()).unwrap();
        let second = resolve_battle(&a, &d, &env, &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_raid_is_capped_at_one_round() {
        let a = army("a", &[StackOrder::new("axeman", 100)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 150)]);
        let outcome = resolve_battle(&a, &d, &BattleEnvironment::new(MissionKind::Raid, 5), &config())
            .unwrap();
        assert_eq!(outcome.report.rounds.len(), 1);
    }

    #[test]
    fn test_cavalry_attack_uses_cavalry_defense() {
        let a = army("a", &[StackOrder::new("light_cavalry", 10)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 10)]);
        let outcome = resolve_battle(&a, &d, &BattleEnvironment::new(MissionKind::Attack, 5), &config())
            .unwrap();
        assert_eq!(outcome.report.aggregates.defender.w_cav, 1.0);
        // 10 x 45 cavalry defense
        assert!((outcome.report.rounds[0].defender_power - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_wall_raises_defense() {
        let a = army("a", &[StackOrder::new("axeman", 100)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 100)]);
        let env = BattleEnvironment::new(MissionKind::Attack, 9).with_wall(Wall::new(WallType::CityWall, 10));
        let outcome = resolve_battle(&a, &d, &env, &config()).unwrap();
        assert!((outcome.report.multipliers.wall - 1.3).abs() < 1e-9);
        assert!(outcome.report.pre_combat.is_none());
        assert!((outcome.report.rounds[0].defender_power - 1500.0 * 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_morale_penalizes_bigger_attacker() {
        let a = army("a", &[StackOrder::new("axeman", 100)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 100)]);
        let env = BattleEnvironment::new(MissionKind::Attack, 9).with_sizes(5000.0, 100.0);
        let outcome = resolve_battle(&a, &d, &env, &config()).unwrap();
        assert!(outcome.report.multipliers.morale < 1.0);
        assert!(outcome.report.multipliers.morale >= config().combat.morale.floor);
    }

    #[test]
    fn test_paladin_multiplier_applies_when_present() {
        let d = army("d", &[StackOrder::new("spear_fighter", 10)]);
        let with = army("a", &[StackOrder::new("paladin", 1), StackOrder::new("axeman", 10)]);
        let without = army("a", &[StackOrder::new("axeman", 10)]);
        let env = BattleEnvironment::new(MissionKind::Attack, 1);

        let report = resolve_battle(&with, &d, &env, &config()).unwrap().report;
        assert_eq!(report.multipliers.named.get("paladin_attack"), Some(&1.1));
        let report = resolve_battle(&without, &d, &env, &config()).unwrap().report;
        assert!(report.multipliers.named.is_empty());
    }

    #[test]
    fn test_tech_levels_shift_outcome() {
        let d = army("d", &[StackOrder::new("spear_fighter", 100)]);
        let plain = army("a", &[StackOrder::new("axeman", 60)]);
        let teched = army(
            "a",
            &[StackOrder::new("axeman", 60).with_tech(TechLevels::new(20, 0))],
        );
        let env = BattleEnvironment::new(MissionKind::Attack, 4);
        let r1 = resolve_battle(&plain, &d, &env, &config()).unwrap().report;
        let r2 = resolve_battle(&teched, &d, &env, &config()).unwrap().report;
        assert!(r2.rounds[0].attacker_power > r1.rounds[0].attacker_power);
    }

    #[test]
    fn test_survivor_armies_match_report() {
        let a = army("a", &[StackOrder::new("axeman", 80), StackOrder::new("ram", 10)]);
        let d = army("d", &[StackOrder::new("spear_fighter", 90)]);
        let env = BattleEnvironment::new(MissionKind::Attack, 21).with_wall(Wall::new(WallType::Palisade, 6));
        let outcome = resolve_battle(&a, &d, &env, &config()).unwrap();
        assert_eq!(
            outcome.attacker_survivors.total_units(),
            outcome.report.attacker.total_survivors
        );
        assert_eq!(
            outcome.defender_survivors.total_units(),
            outcome.report.defender.total_survivors
        );
        assert!(outcome.report.pre_combat.is_some());
    }

    #[test]
    fn test_loss_fractions() {
        assert_eq!(loss_fractions(100.0, 100.0, 0.5), (0.5, 0.5));
        assert_eq!(loss_fractions(200.0, 100.0, 0.5), (0.25, 1.0));
        assert_eq!(loss_fractions(0.0, 100.0, 0.5), (1.0, 0.0));
        assert_eq!(loss_fractions(100.0, 0.0, 0.5), (0.0, 1.0));
    }
}
