//! Structured battle report and its invariants

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::luck::Luck;
use super::weighting::DefenseWeights;
use crate::core::error::{EngineError, Result};
use crate::core::types::UnitTypeId;
use crate::siege::WallResolution;

/// Casualties of one combat round, per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    /// Effective powers at the start of the round
    pub attacker_power: f64,
    pub defender_power: f64,
    pub attacker_casualties: u64,
    pub defender_casualties: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub defender: DefenseWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub morale: f64,
    pub wall: f64,
    pub night: f64,
    /// Unit-specific attack multipliers that applied (e.g. `paladin_attack`)
    pub named: BTreeMap<String, f64>,
}

impl Multipliers {
    pub fn named_product(&self) -> f64 {
        self.named.values().product()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCasualties {
    pub unit_type: UnitTypeId,
    pub initial: u32,
    pub casualties: u32,
    pub survivors: u32,
}

/// Per-stack losses of one side, in stack order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideOutcome {
    pub units: Vec<UnitCasualties>,
    pub total_initial: u64,
    pub total_survivors: u64,
}

impl SideOutcome {
    pub fn total_casualties(&self) -> u64 {
        self.units.iter().map(|u| u.casualties as u64).sum()
    }

    pub fn survivor_counts(&self) -> Vec<u32> {
        self.units.iter().map(|u| u.survivors).collect()
    }

    pub fn loss_rate(&self) -> f64 {
        if self.total_initial == 0 {
            0.0
        } else {
            self.total_casualties() as f64 / self.total_initial as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRates {
    pub attacker: f64,
    pub defender: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub rounds: Vec<RoundResult>,
    pub aggregates: Aggregates,
    pub multipliers: Multipliers,
    pub luck: Luck,
    pub attacker: SideOutcome,
    pub defender: SideOutcome,
    pub loss_rates: LossRates,
    pub attacker_won: bool,
    pub pre_combat: Option<WallResolution>,
}

impl BattleReport {
    /// Verify conservation of unit counts, round sums and bounded rates
    pub fn check_invariants(&self, luck_bound: f64) -> Result<()> {
        for (name, side, round_sum) in [
            (
                "attacker",
                &self.attacker,
                self.rounds.iter().map(|r| r.attacker_casualties).sum::<u64>(),
            ),
            (
                "defender",
                &self.defender,
                self.rounds.iter().map(|r| r.defender_casualties).sum::<u64>(),
            ),
        ] {
            for unit in &side.units {
                if unit.casualties as u64 + unit.survivors as u64 != unit.initial as u64 {
                    return Err(EngineError::invariant(format!(
                        "{} stack '{}': {} survivors + {} casualties != {} initial",
                        name, unit.unit_type, unit.survivors, unit.casualties, unit.initial
                    )));
                }
            }
            let casualties = side.total_casualties();
            if side.total_survivors + casualties != side.total_initial {
                return Err(EngineError::invariant(format!(
                    "{}: {} survivors + {} casualties != {} initial",
                    name, side.total_survivors, casualties, side.total_initial
                )));
            }
            if round_sum != casualties {
                return Err(EngineError::invariant(format!(
                    "{}: round casualties sum to {} but total is {}",
                    name, round_sum, casualties
                )));
            }
        }

        for rate in [self.loss_rates.attacker, self.loss_rates.defender] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(EngineError::invariant(format!("loss rate {} outside [0, 1]", rate)));
            }
        }

        if self.luck.attacker != -self.luck.defender || self.luck.attacker.abs() > luck_bound {
            return Err(EngineError::invariant(format!(
                "luck {:?} is not symmetric within ±{}",
                self.luck, luck_bound
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(initial: u32, casualties: u32) -> SideOutcome {
        SideOutcome {
            units: vec![UnitCasualties {
                unit_type: "spear_fighter".into(),
                initial,
                casualties,
                survivors: initial - casualties,
            }],
            total_initial: initial as u64,
            total_survivors: (initial - casualties) as u64,
        }
    }

    fn report(attacker: SideOutcome, defender: SideOutcome) -> BattleReport {
        let rounds = vec![RoundResult {
            round: 1,
            attacker_power: 100.0,
            defender_power: 50.0,
            attacker_casualties: attacker.total_casualties(),
            defender_casualties: defender.total_casualties(),
        }];
        BattleReport {
            rounds,
            aggregates: Aggregates {
                defender: DefenseWeights { w_inf: 1.0, w_cav: 0.0 },
            },
            multipliers: Multipliers {
                morale: 1.0,
                wall: 1.0,
                night: 1.0,
                named: BTreeMap::new(),
            },
            luck: Luck {
                attacker: 0.1,
                defender: -0.1,
            },
            loss_rates: LossRates {
                attacker: attacker.loss_rate(),
                defender: defender.loss_rate(),
            },
            attacker,
            defender,
            attacker_won: true,
            pre_combat: None,
        }
    }

    #[test]
    fn test_consistent_report_passes() {
        let report = report(side(10, 3), side(5, 5));
        assert!(report.check_invariants(0.25).is_ok());
    }

    #[test]
    fn test_broken_conservation_detected() {
        let mut report = report(side(10, 3), side(5, 5));
        report.attacker.total_survivors = 9;
        let err = report.check_invariants(0.25).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
    }

    #[test]
    fn test_round_sum_mismatch_detected() {
        let mut report = report(side(10, 3), side(5, 5));
        report.rounds[0].defender_casualties = 4;
        assert!(report.check_invariants(0.25).is_err());
    }

    #[test]
    fn test_asymmetric_luck_detected() {
        let mut report = report(side(10, 3), side(5, 5));
        report.luck.defender = 0.1;
        assert!(report.check_invariants(0.25).is_err());
        report.luck = Luck {
            attacker: 0.3,
            defender: -0.3,
        };
        assert!(report.check_invariants(0.25).is_err());
    }

    #[test]
    fn test_empty_side_loss_rate_is_zero() {
        assert_eq!(side(0, 0).loss_rate(), 0.0);
    }
}
