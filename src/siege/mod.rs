//! Siege engines: pre-combat wall reduction and post-combat building damage
//!
//! Both engines turn their attack power into "damage points" and spend them
//! on levels top-down, so a high level costs more to knock out than a low one.

pub mod catapults;
pub mod rams;

pub use catapults::{resolve_catapults, BuildingTarget, CatapultResolution};
pub use rams::{resolve_rams, WallResolution};

use crate::army::UnitStack;
use crate::core::config::SiegeEngineConfig;

/// Tech-adjusted attack power of the given stacks
pub fn engine_power<'a>(stacks: impl Iterator<Item = &'a UnitStack>, tech_pct: f64) -> f64 {
    stacks.map(|s| s.offense(tech_pct)).sum()
}

/// Damage points dealt by an engine against a structure
pub fn siege_damage(
    power: f64,
    engine: &SiegeEngineConfig,
    durability: f64,
    counter_defense: f64,
) -> f64 {
    let resistance = durability + engine.counter_weight * counter_defense.max(0.0);
    if power <= 0.0 || resistance <= 0.0 {
        return 0.0;
    }
    engine.efficiency * power / resistance
}

/// Level left after spending `damage` points on a structure at `level`
pub fn demolish(level: u32, damage: f64) -> u32 {
    let mut level = level;
    let mut remaining = damage - 0.5;
    while level > 0 && remaining >= level as f64 {
        remaining -= level as f64;
        level -= 1;
    }
    level
}
