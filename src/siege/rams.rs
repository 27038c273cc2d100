//! Ram step: wall reduction before combat

use serde::{Deserialize, Serialize};

use super::{demolish, engine_power, siege_damage};
use crate::army::Army;
use crate::core::config::{CombatConfig, SiegeConfig};
use crate::core::error::Result;
use crate::core::types::{UnitRole, Wall};

/// Wall level before and after the rams hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallResolution {
    pub wall_before: u32,
    pub wall_after: u32,
    pub wall_drop: u32,
}

impl WallResolution {
    pub fn untouched(level: u32) -> Self {
        Self {
            wall_before: level,
            wall_after: level,
            wall_drop: 0,
        }
    }
}

/// Reduce the wall with the attacker's rams
///
/// Returns `None` when the attacking force carries no rams. The stored wall
/// is never touched; `wall_after` is what the battle fights against.
pub fn resolve_rams(
    attacker: &Army,
    wall: Wall,
    counter_defense: f64,
    combat: &CombatConfig,
    siege: &SiegeConfig,
) -> Result<Option<WallResolution>> {
    if attacker.count_role(UnitRole::Ram) == 0 {
        return Ok(None);
    }
    if wall.level == 0 {
        return Ok(Some(WallResolution::untouched(0)));
    }

    let spec = combat.wall(wall.wall_type)?;
    let power = engine_power(attacker.stacks_with_role(UnitRole::Ram), combat.tech_pct_per_level);
    let damage = siege_damage(power, &siege.ram, spec.durability, counter_defense);
    let wall_after = demolish(wall.level, damage);

    tracing::debug!(
        ram_power = power,
        damage,
        wall_before = wall.level,
        wall_after,
        "rams resolved"
    );

    Ok(Some(WallResolution {
        wall_before: wall.level,
        wall_after,
        wall_drop: wall.level - wall_after,
    }))
}
