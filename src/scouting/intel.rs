//! Intel disclosure: what a scouting report reveals about the target

use serde::{Deserialize, Serialize};

use super::config::{band_label, Band, IntelTierId, ScoutingConfig};
use super::resolver::{Fidelity, ScoutMissionResult};
use crate::core::error::Result;
use crate::core::types::{Resource, ResourceBundle, UnitTypeId, Wall};
use crate::siege::BuildingTarget;

/// True state of the scouted village, supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetIntel {
    pub resources: ResourceBundle,
    pub storage_capacity: u64,
    pub wall: Wall,
    pub traps: u32,
    pub garrison: Vec<(UnitTypeId, u32)>,
    pub reinforcements: Vec<(UnitTypeId, u32)>,
    pub buildings: Vec<BuildingTarget>,
}

/// A numeric field, exact or replaced by its band label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disclosed {
    Exact(u64),
    Band(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIntel {
    pub wood: Disclosed,
    pub clay: Disclosed,
    pub iron: Disclosed,
    pub crop: Disclosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseIntel {
    pub wall: Wall,
    pub traps: Disclosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIntel {
    pub unit_type: UnitTypeId,
    pub count: Disclosed,
}

/// Report sections are present only for unlocked tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelReport {
    pub fidelity: Fidelity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceIntel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defenses: Option<DefenseIntel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garrison: Option<Vec<UnitIntel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reinforcements: Option<Vec<UnitIntel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings: Option<Vec<BuildingTarget>>,
}

pub fn disclose(target: &TargetIntel, result: &ScoutMissionResult, config: &ScoutingConfig) -> Result<IntelReport> {
    let exact = result.fidelity == Fidelity::Exact;
    let bands = &config.bands;

    let field = |value: f64, exact_value: u64, table: &[Band]| -> Result<Disclosed> {
        if exact {
            Ok(Disclosed::Exact(exact_value))
        } else {
            Ok(Disclosed::Band(band_label(table, value)?.to_string()))
        }
    };

    let units = |stacks: &[(UnitTypeId, u32)]| -> Result<Vec<UnitIntel>> {
        stacks
            .iter()
            .map(|(unit_type, count)| -> Result<UnitIntel> {
                Ok(UnitIntel {
                    unit_type: unit_type.clone(),
                    count: field(*count as f64, *count as u64, &bands.troops)?,
                })
            })
            .collect()
    };

    let resources = if result.has_tier(IntelTierId::PresenceEconomy) {
        let pct = |r: Resource| {
            let amount = target.resources.get(r);
            if target.storage_capacity == 0 {
                if amount > 0 { 100.0 } else { 0.0 }
            } else {
                amount as f64 * 100.0 / target.storage_capacity as f64
            }
        };
        let disclose_resource = |r: Resource| field(pct(r), target.resources.get(r), &bands.resources_pct);
        Some(ResourceIntel {
            wood: disclose_resource(Resource::Wood)?,
            clay: disclose_resource(Resource::Clay)?,
            iron: disclose_resource(Resource::Iron)?,
            crop: disclose_resource(Resource::Crop)?,
        })
    } else {
        None
    };

    let defenses = if result.has_tier(IntelTierId::Defenses) {
        Some(DefenseIntel {
            wall: target.wall,
            traps: field(target.traps as f64, target.traps as u64, &bands.traps)?,
        })
    } else {
        None
    };

    let garrison = if result.has_tier(IntelTierId::Garrison) {
        Some(units(&target.garrison)?)
    } else {
        None
    };

    let reinforcements = if result.has_tier(IntelTierId::Reinforcements) {
        Some(units(&target.reinforcements)?)
    } else {
        None
    };

    let buildings = result
        .has_tier(IntelTierId::Infrastructure)
        .then(|| target.buildings.clone());

    Ok(IntelReport {
        fidelity: result.fidelity,
        resources,
        defenses,
        garrison,
        reinforcements,
        buildings,
    })
}
