//! Army composition builder
//!
//! Normalizes unit stacks into an immutable `Army` value. Stats are copied
//! out of the unit catalog at build time so every downstream calculation
//! works from the same snapshot.

use serde::{Deserialize, Serialize};

use super::catalog::tech_factor;
use crate::core::config::WorldConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{UnitRole, UnitTypeId};

/// Smithy (attack) and armory (defense) levels of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechLevels {
    pub attack_level: u32,
    pub defense_level: u32,
}

impl TechLevels {
    pub fn new(attack_level: u32, defense_level: u32) -> Self {
        Self {
            attack_level,
            defense_level,
        }
    }
}

/// A count of one unit type within an army
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStack {
    pub unit_type: UnitTypeId,
    pub role: UnitRole,
    pub count: u32,
    pub attack: f64,
    pub def_inf: f64,
    pub def_cav: f64,
    #[serde(default)]
    pub tech: TechLevels,
}

impl UnitStack {
    /// Tech-adjusted offense of the whole stack
    pub fn offense(&self, tech_pct: f64) -> f64 {
        self.attack * tech_factor(self.tech.attack_level, tech_pct) * self.count as f64
    }

    /// Tech-adjusted `(infantry, cavalry)` defense of the whole stack
    pub fn defense(&self, tech_pct: f64) -> (f64, f64) {
        let factor = tech_factor(self.tech.defense_level, tech_pct) * self.count as f64;
        (self.def_inf * factor, self.def_cav * factor)
    }

    pub fn with_count(&self, count: u32) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }
}

/// Request for one stack, resolved against the unit catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOrder {
    pub unit_type: UnitTypeId,
    pub count: u32,
    #[serde(default)]
    pub tech: TechLevels,
}

impl StackOrder {
    pub fn new(unit_type: impl Into<UnitTypeId>, count: u32) -> Self {
        Self {
            unit_type: unit_type.into(),
            count,
            tech: TechLevels::default(),
        }
    }

    pub fn with_tech(mut self, tech: TechLevels) -> Self {
        self.tech = tech;
        self
    }
}

/// Immutable set of unit stacks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Army {
    label: String,
    stacks: Vec<UnitStack>,
}

impl Army {
    /// Build an army from catalog lookups
    pub fn build(label: impl Into<String>, orders: &[StackOrder], config: &WorldConfig) -> Result<Self> {
        let mut stacks = Vec::with_capacity(orders.len());
        for order in orders {
            let spec = config.units.get(&order.unit_type)?;
            let max = config.max_tech_level;
            if order.tech.attack_level > max || order.tech.defense_level > max {
                return Err(EngineError::configuration(format!(
                    "tech level {:?} for '{}' exceeds the configured maximum {}",
                    order.tech, order.unit_type, max
                )));
            }
            stacks.push(UnitStack {
                unit_type: order.unit_type.clone(),
                role: spec.role,
                count: order.count,
                attack: spec.attack,
                def_inf: spec.def_inf,
                def_cav: spec.def_cav,
                tech: order.tech,
            });
        }
        Self::from_stacks(label, stacks)
    }

    /// Wrap explicit stacks, rejecting non-finite or negative stats
    pub fn from_stacks(label: impl Into<String>, stacks: Vec<UnitStack>) -> Result<Self> {
        let label = label.into();
        for stack in &stacks {
            let stats = [stack.attack, stack.def_inf, stack.def_cav];
            if stats.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(EngineError::validation(format!(
                    "stack '{}' in army '{}' has negative or non-finite stats",
                    stack.unit_type, label
                )));
            }
        }
        Ok(Self { label, stacks })
    }

    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stacks: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stacks(&self) -> &[UnitStack] {
        &self.stacks
    }

    pub fn total_units(&self) -> u64 {
        self.stacks.iter().map(|s| s.count as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }

    pub fn count_role(&self, role: UnitRole) -> u64 {
        self.stacks
            .iter()
            .filter(|s| s.role == role)
            .map(|s| s.count as u64)
            .sum()
    }

    pub fn has_unit_type(&self, unit_type: &UnitTypeId) -> bool {
        self.stacks
            .iter()
            .any(|s| &s.unit_type == unit_type && s.count > 0)
    }

    pub fn stacks_with_role(&self, role: UnitRole) -> impl Iterator<Item = &UnitStack> {
        self.stacks.iter().filter(move |s| s.role == role && s.count > 0)
    }

    /// Tech-adjusted offense split into `(infantry, cavalry)` contributions
    pub fn offense_split(&self, tech_pct: f64) -> (f64, f64) {
        self.stacks.iter().fold((0.0, 0.0), |(inf, cav), s| {
            let value = s.offense(tech_pct);
            if s.role.is_mounted() {
                (inf, cav + value)
            } else {
                (inf + value, cav)
            }
        })
    }

    /// Tech-adjusted defense sums `(Σ defInf, Σ defCav)`
    pub fn defense_totals(&self, tech_pct: f64) -> (f64, f64) {
        self.stacks.iter().fold((0.0, 0.0), |(inf, cav), s| {
            let (di, dc) = s.defense(tech_pct);
            (inf + di, cav + dc)
        })
    }

    /// Same army with each stack's count replaced, in stack order
    pub fn with_counts(&self, counts: &[u32]) -> Result<Self> {
        if counts.len() != self.stacks.len() {
            return Err(EngineError::invariant(format!(
                "army '{}' has {} stacks but {} counts were supplied",
                self.label,
                self.stacks.len(),
                counts.len()
            )));
        }
        let stacks = self
            .stacks
            .iter()
            .zip(counts)
            .map(|(s, &c)| s.with_count(c))
            .collect();
        Ok(Self {
            label: self.label.clone(),
            stacks,
        })
    }

    /// `(unit type, count)` pairs of the moving stacks
    pub fn movement(&self) -> Vec<(UnitTypeId, u32)> {
        self.stacks
            .iter()
            .map(|s| (s.unit_type.clone(), s.count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    #[test]
    fn test_build_copies_catalog_stats() {
        let army = Army::build(
            "raiders",
            &[
                StackOrder::new("axeman", 10),
                StackOrder::new("light_cavalry", 5),
            ],
            &config(),
        )
        .unwrap();

        assert_eq!(army.total_units(), 15);
        assert_eq!(army.stacks()[0].attack, 40.0);
        assert_eq!(army.stacks()[1].role, UnitRole::Cavalry);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = Army::build("x", &[StackOrder::new("dragon", 1)], &config()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_tech_above_maximum_rejected() {
        let order = StackOrder::new("axeman", 1).with_tech(TechLevels::new(99, 0));
        let err = Army::build("x", &[order], &config()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_offense_split_by_role() {
        let army = Army::build(
            "mixed",
            &[
                StackOrder::new("axeman", 10),
                StackOrder::new("light_cavalry", 2),
                StackOrder::new("ram", 5),
            ],
            &config(),
        )
        .unwrap();

        let (inf, cav) = army.offense_split(2.0);
        // Rams fight with the infantry
        assert!((inf - (400.0 + 10.0)).abs() < 1e-9);
        assert!((cav - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_tech_raises_defense() {
        let plain = Army::build("a", &[StackOrder::new("spear_fighter", 10)], &config()).unwrap();
        let teched = Army::build(
            "b",
            &[StackOrder::new("spear_fighter", 10).with_tech(TechLevels::new(0, 3))],
            &config(),
        )
        .unwrap();
        assert!(teched.defense_totals(2.0).0 > plain.defense_totals(2.0).0);
    }

    #[test]
    fn test_with_counts_requires_matching_length() {
        let army = Army::build("a", &[StackOrder::new("spear_fighter", 10)], &config()).unwrap();
        assert_eq!(army.with_counts(&[4]).unwrap().total_units(), 4);
        assert!(army.with_counts(&[1, 2]).is_err());
    }

    #[test]
    fn test_negative_stats_rejected() {
        let stack = UnitStack {
            unit_type: "broken".into(),
            role: UnitRole::Infantry,
            count: 1,
            attack: -1.0,
            def_inf: 0.0,
            def_cav: 0.0,
            tech: TechLevels::default(),
        };
        assert!(Army::from_stacks("x", vec![stack]).is_err());
    }
}
