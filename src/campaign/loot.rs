//! Loot extraction under cranny protection

use serde::{Deserialize, Serialize};

use crate::army::{Army, UnitCatalog};
use crate::core::config::ProtectionConfig;
use crate::core::error::Result;
use crate::core::types::{Resource, ResourceBundle, Tribe};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootResolution {
    /// Amount hidden per resource after tribe modifiers
    pub protection: u64,
    pub carry_capacity: u64,
    pub taken: ResourceBundle,
}

/// Total carry capacity of an army
pub fn carry_capacity(army: &Army, catalog: &UnitCatalog) -> Result<u64> {
    army.stacks().iter().try_fold(0u64, |total, stack| {
        let carry = catalog.get(&stack.unit_type)?.carry;
        Ok(total + carry * stack.count as u64)
    })
}

/// Amount of each resource the cranny hides from this attacker
///
/// Tribe modifiers apply to the table value before it is subtracted from
/// the stock.
pub fn protection_per_resource(
    cranny_level: u32,
    defender_tribe: Option<Tribe>,
    attacker_tribe: Option<Tribe>,
    config: &ProtectionConfig,
) -> u64 {
    let table = &config.cranny_capacity;
    let base = match table.len() {
        0 => 0,
        len => table[(cranny_level as usize).min(len - 1)],
    };
    let capacity_mult = config.modifier(defender_tribe).cranny_capacity_multiplier;
    let reduction = config.modifier(attacker_tribe).enemy_cranny_reduction;
    (base as f64 * capacity_mult * (1.0 - reduction)).floor().max(0.0) as u64
}

/// Take loot from `stock`, limited by protection and carry capacity
///
/// Capacity is shared evenly between resources; share a resource cannot
/// use flows to the ones with more stock left.
pub fn resolve_loot(
    stock: &ResourceBundle,
    cranny_level: u32,
    carry_capacity: u64,
    defender_tribe: Option<Tribe>,
    attacker_tribe: Option<Tribe>,
    config: &ProtectionConfig,
) -> LootResolution {
    let protection = protection_per_resource(cranny_level, defender_tribe, attacker_tribe, config);
    let lootable = stock.saturating_sub(&ResourceBundle::uniform(protection));

    let mut order: Vec<Resource> = Resource::ALL.to_vec();
    order.sort_by_key(|r| lootable.get(*r));

    let mut remaining = carry_capacity;
    let mut taken = ResourceBundle::default();
    for (i, resource) in order.iter().enumerate() {
        let share = remaining / (order.len() - i) as u64;
        let amount = lootable.get(*resource).min(share);
        taken.set(*resource, amount);
        remaining -= amount;
    }

    tracing::debug!(protection, carry_capacity, total = taken.total(), "loot resolved");

    LootResolution {
        protection,
        carry_capacity,
        taken,
    }
}
