//! Catapult step: building damage after combat

use serde::{Deserialize, Serialize};

use super::{demolish, engine_power, siege_damage};
use crate::army::Army;
use crate::core::config::{CombatConfig, SiegeConfig};
use crate::core::types::UnitRole;

/// A building designated as catapult target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTarget {
    pub id: String,
    pub level: u32,
}

impl BuildingTarget {
    pub fn new(id: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatapultResolution {
    /// Every designated target with its post-damage level
    pub targets: Vec<BuildingTarget>,
    pub damage: f64,
}

/// Spend the surviving catapults' damage on the designated targets
///
/// All damage lands on the first target unless `allow_dual_targets` is set,
/// in which case each volley is split evenly between the first two. Targets
/// beyond the reachable ones are reported unchanged. Returns `None` without
/// surviving catapults or targets.
pub fn resolve_catapults(
    survivors: &Army,
    targets: &[BuildingTarget],
    allow_dual_targets: bool,
    counter_defense: f64,
    combat: &CombatConfig,
    siege: &SiegeConfig,
) -> Option<CatapultResolution> {
    if survivors.count_role(UnitRole::Catapult) == 0 || targets.is_empty() {
        return None;
    }

    let power = engine_power(
        survivors.stacks_with_role(UnitRole::Catapult),
        combat.tech_pct_per_level,
    );
    let damage = siege_damage(power, &siege.catapult, siege.building_durability, counter_defense);

    let reachable = (if allow_dual_targets { 2 } else { 1 }).min(targets.len());
    let share = damage / reachable as f64;

    let targets = targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            if i < reachable {
                BuildingTarget::new(target.id.clone(), demolish(target.level, share))
            } else {
                target.clone()
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(catapult_power = power, damage, ?targets, "catapults resolved");

    Some(CatapultResolution { targets, damage })
}
