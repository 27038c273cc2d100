//! Defense weighting by attacker composition

use serde::{Deserialize, Serialize};

use crate::army::Army;

/// Share of attacker offense that is infantry vs cavalry; `w_inf + w_cav = 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseWeights {
    pub w_inf: f64,
    pub w_cav: f64,
}

impl DefenseWeights {
    pub fn infantry_only() -> Self {
        Self { w_inf: 1.0, w_cav: 0.0 }
    }

    /// Weighted defense of one unit with the given stats
    pub fn blend(&self, def_inf: f64, def_cav: f64) -> f64 {
        self.w_inf * def_inf + self.w_cav * def_cav
    }
}

/// Weights from the attacker's tech-adjusted offense split. An attacker
/// without offense is treated as pure infantry.
pub fn defense_weights(attacker: &Army, tech_pct: f64) -> DefenseWeights {
    let (inf, cav) = attacker.offense_split(tech_pct);
    let total = inf + cav;
    if total <= 0.0 {
        return DefenseWeights::infantry_only();
    }
    let w_cav = cav / total;
    DefenseWeights {
        w_inf: 1.0 - w_cav,
        w_cav,
    }
}

/// `w_inf × Σ defInf + w_cav × Σ defCav` of the defending army
pub fn effective_defense(defender: &Army, weights: DefenseWeights, tech_pct: f64) -> f64 {
    let (inf, cav) = defender.defense_totals(tech_pct);
    weights.blend(inf, cav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::StackOrder;
    use crate::core::config::WorldConfig;

    fn army(orders: &[StackOrder]) -> Army {
        Army::build("a", orders, &WorldConfig::default()).unwrap()
    }

    #[test]
    fn test_pure_infantry_attacker() {
        let weights = defense_weights(&army(&[StackOrder::new("axeman", 100)]), 2.0);
        assert_eq!(weights.w_inf, 1.0);
        assert_eq!(weights.w_cav, 0.0);
    }

    #[test]
    fn test_pure_cavalry_attacker() {
        let weights = defense_weights(&army(&[StackOrder::new("light_cavalry", 10)]), 2.0);
        assert_eq!(weights.w_cav, 1.0);
        assert_eq!(weights.w_inf, 0.0);
    }

    #[test]
    fn test_mixed_weights_sum_to_one() {
        let weights = defense_weights(
            &army(&[StackOrder::new("axeman", 13), StackOrder::new("light_cavalry", 4)]),
            2.0,
        );
        // 520 infantry vs 520 cavalry offense
        assert!((weights.w_inf - 0.5).abs() < 1e-12);
        assert!((weights.w_inf + weights.w_cav - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_offense_defaults_to_infantry() {
        let weights = defense_weights(&army(&[StackOrder::new("scout", 10)]), 2.0);
        assert_eq!(weights, DefenseWeights::infantry_only());
    }

    #[test]
    fn test_effective_defense_uses_weights() {
        let defender = army(&[StackOrder::new("spear_fighter", 10)]);
        let vs_inf = effective_defense(&defender, DefenseWeights::infantry_only(), 2.0);
        let vs_cav = effective_defense(&defender, DefenseWeights { w_inf: 0.0, w_cav: 1.0 }, 2.0);
        assert_eq!(vs_inf, 150.0);
        assert_eq!(vs_cav, 450.0);
    }
}
