//! Crop upkeep and starvation
//!
//! Every stationed unit eats crop each hour. When production can't cover
//! upkeep the oldest stacks are disbanded first, one unit at a time, until
//! the freed upkeep covers the deficit.

use serde::{Deserialize, Serialize};

use crate::army::UnitCatalog;
use crate::core::error::Result;
use crate::core::types::{Timestamp, UnitTypeId};

/// Troops stationed in a village
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarrisonStack {
    pub unit_type: UnitTypeId,
    pub count: u32,
    pub stationed_since: Timestamp,
}

impl GarrisonStack {
    pub fn new(unit_type: impl Into<UnitTypeId>, count: u32, stationed_since: Timestamp) -> Self {
        Self {
            unit_type: unit_type.into(),
            count,
            stationed_since,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepResult {
    pub food_production: u64,
    pub total_upkeep: u64,
    /// Negative when the village is starving
    pub net_crop: i64,
}

impl UpkeepResult {
    pub fn deficit(&self) -> u64 {
        if self.net_crop < 0 {
            self.net_crop.unsigned_abs()
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub unit_type: UnitTypeId,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarvationResult {
    /// Disbanded units per type, in the order they were first touched
    pub removals: Vec<Removal>,
    pub upkeep_freed: u64,
    /// False when disbanding everything eligible still leaves a deficit
    pub deficit_covered: bool,
    pub remaining: Vec<GarrisonStack>,
}

pub fn compute_upkeep(
    troops: &[GarrisonStack],
    food_production: u64,
    catalog: &UnitCatalog,
) -> Result<UpkeepResult> {
    let mut total_upkeep = 0u64;
    for stack in troops {
        total_upkeep += catalog.get(&stack.unit_type)?.upkeep * stack.count as u64;
    }
    Ok(UpkeepResult {
        food_production,
        total_upkeep,
        net_crop: food_production as i64 - total_upkeep as i64,
    })
}

/// Disband units, oldest stack first, until `deficit` upkeep is freed
pub fn resolve_starvation(
    deficit: u64,
    troops: &[GarrisonStack],
    catalog: &UnitCatalog,
) -> Result<StarvationResult> {
    let mut order: Vec<usize> = (0..troops.len()).collect();
    order.sort_by_key(|&i| troops[i].stationed_since);

    let mut remaining: Vec<GarrisonStack> = troops.to_vec();
    let mut removals: Vec<Removal> = Vec::new();
    let mut freed = 0u64;

    for idx in order {
        if freed >= deficit {
            break;
        }
        let stack = &mut remaining[idx];
        let upkeep = catalog.get(&stack.unit_type)?.upkeep;
        if upkeep == 0 || stack.count == 0 {
            continue;
        }
        let needed = (deficit - freed).div_ceil(upkeep);
        let removed = needed.min(stack.count as u64) as u32;
        stack.count -= removed;
        freed += removed as u64 * upkeep;

        match removals.iter_mut().find(|r| r.unit_type == stack.unit_type) {
            Some(r) => r.count += removed,
            None => removals.push(Removal {
                unit_type: stack.unit_type.clone(),
                count: removed,
            }),
        }
    }

    tracing::debug!(deficit, freed, ?removals, "starvation resolved");

    Ok(StarvationResult {
        removals,
        upkeep_freed: freed,
        deficit_covered: freed >= deficit,
        remaining,
    })
}

/// Upkeep balance plus starvation when the balance is negative
pub fn resolve_upkeep(
    troops: &[GarrisonStack],
    food_production: u64,
    catalog: &UnitCatalog,
) -> Result<(UpkeepResult, Option<StarvationResult>)> {
    let upkeep = compute_upkeep(troops, food_production, catalog)?;
    let starvation = if upkeep.net_crop < 0 {
        Some(resolve_starvation(upkeep.deficit(), troops, catalog)?)
    } else {
        None
    };
    Ok((upkeep, starvation))
}
