//! Travel planning for troop movements
//!
//! An army moves at the pace of its slowest unit type; there is no splitting
//! of fast and slow stacks.

use serde::{Deserialize, Serialize};

use crate::army::UnitCatalog;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Coord, MissionKind, Timestamp, UnitTypeId, SECONDS_PER_HOUR};

/// Distance, bottleneck speed and duration of one movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    pub mission: MissionKind,
    pub origin: Coord,
    pub target: Coord,
    pub distance: f64,
    pub slowest_speed: f64,
    pub duration_hours: f64,
}

impl TravelPlan {
    /// Travel time rounded up to whole seconds
    pub fn duration_seconds(&self) -> u64 {
        (self.duration_hours * SECONDS_PER_HOUR).ceil() as u64
    }

    pub fn arrival_at(&self, depart_at: Timestamp) -> Timestamp {
        depart_at.saturating_add(self.duration_seconds())
    }
}

/// Plan a movement of the given `(unit type, count)` stacks
///
/// Stacks with a zero count do not slow the army down. At least one stack
/// must actually move.
pub fn plan_travel(
    origin: Coord,
    target: Coord,
    mission: MissionKind,
    stacks: &[(UnitTypeId, u32)],
    catalog: &UnitCatalog,
    world_speed: f64,
) -> Result<TravelPlan> {
    if !origin.is_finite() || !target.is_finite() {
        return Err(EngineError::validation("travel coordinates must be finite"));
    }
    if !world_speed.is_finite() || world_speed <= 0.0 {
        return Err(EngineError::validation(format!(
            "world speed must be positive, got {}",
            world_speed
        )));
    }

    let mut slowest: Option<f64> = None;
    for (unit_type, count) in stacks {
        if *count == 0 {
            continue;
        }
        let speed = catalog.get(unit_type)?.speed;
        slowest = Some(slowest.map_or(speed, |s: f64| s.min(speed)));
    }
    let slowest_speed =
        slowest.ok_or_else(|| EngineError::validation("cannot plan travel for an empty army"))?;

    let distance = origin.distance(&target);
    let duration_hours = distance / slowest_speed / world_speed;

    tracing::trace!(?mission, distance, slowest_speed, duration_hours, "travel planned");

    Ok(TravelPlan {
        mission,
        origin,
        target,
        distance,
        slowest_speed,
        duration_hours,
    })
}

/// Plan the way home for the survivors of a movement
pub fn plan_return(
    outbound: &TravelPlan,
    survivors: &[(UnitTypeId, u32)],
    catalog: &UnitCatalog,
    world_speed: f64,
) -> Result<TravelPlan> {
    plan_travel(
        outbound.target,
        outbound.origin,
        MissionKind::Return,
        survivors,
        catalog,
        world_speed,
    )
}
