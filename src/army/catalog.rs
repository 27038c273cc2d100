//! World unit catalog: per-unit-type stats, speeds, costs and upkeep
//!
//! The catalog is external configuration. A document that lists units is
//! laid over the built-in table: listed units replace or extend the
//! defaults, unlisted defaults stay available.

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{BuildingKind, ResourceBundle, UnitRole, UnitTypeId};

/// Static stats of one unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub role: UnitRole,
    pub attack: f64,
    pub def_inf: f64,
    pub def_cav: f64,
    /// Map units per hour
    pub speed: f64,
    #[serde(default)]
    pub carry: u64,
    /// Crop consumed per unit per hour
    #[serde(default)]
    pub upkeep: u64,
    #[serde(default)]
    pub cost: ResourceBundle,
    #[serde(default)]
    pub train_seconds: u64,
    pub building: BuildingKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnitCatalog {
    units: AHashMap<UnitTypeId, UnitSpec>,
}

impl UnitCatalog {
    /// Catalog with no units at all
    pub fn empty() -> Self {
        Self {
            units: AHashMap::new(),
        }
    }

    pub fn with_unit(mut self, id: impl Into<UnitTypeId>, spec: UnitSpec) -> Self {
        self.insert(id, spec);
        self
    }

    pub fn insert(&mut self, id: impl Into<UnitTypeId>, spec: UnitSpec) {
        self.units.insert(id.into(), spec);
    }

    pub fn get(&self, id: &UnitTypeId) -> Result<&UnitSpec> {
        self.units
            .get(id)
            .ok_or_else(|| EngineError::configuration(format!("unknown unit type '{}'", id)))
    }

    pub fn contains(&self, id: &UnitTypeId) -> bool {
        self.units.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitTypeId, &UnitSpec)> {
        self.units.iter()
    }

    pub fn validate(&self) -> Result<()> {
        for (id, spec) in &self.units {
            let stats = [spec.attack, spec.def_inf, spec.def_cav];
            if stats.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(EngineError::configuration(format!(
                    "unit '{}' has negative or non-finite combat stats",
                    id
                )));
            }
            if !spec.speed.is_finite() || spec.speed <= 0.0 {
                return Err(EngineError::configuration(format!(
                    "unit '{}' must have a positive speed, got {}",
                    id, spec.speed
                )));
            }
        }
        Ok(())
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        use BuildingKind::*;
        use UnitRole::*;

        #[allow(clippy::too_many_arguments)]
        fn spec(
            role: UnitRole,
            (attack, def_inf, def_cav): (f64, f64, f64),
            speed: f64,
            carry: u64,
            upkeep: u64,
            cost: [u64; 4],
            train_seconds: u64,
            building: BuildingKind,
        ) -> UnitSpec {
            UnitSpec {
                role,
                attack,
                def_inf,
                def_cav,
                speed,
                carry,
                upkeep,
                cost: ResourceBundle::new(cost[0], cost[1], cost[2], cost[3]),
                train_seconds,
                building,
            }
        }

        Self::empty()
            .with_unit("spear_fighter", spec(Infantry, (10.0, 15.0, 45.0), 3.33, 25, 1, [50, 30, 10, 20], 1020, Barracks))
            .with_unit("swordsman", spec(Infantry, (25.0, 50.0, 15.0), 2.73, 15, 1, [30, 30, 70, 20], 1500, Barracks))
            .with_unit("axeman", spec(Infantry, (40.0, 10.0, 5.0), 3.33, 10, 1, [60, 30, 40, 20], 1320, Barracks))
            .with_unit("scout", spec(Scout, (0.0, 2.0, 1.0), 6.67, 0, 2, [50, 50, 20, 20], 900, Stable))
            .with_unit("light_cavalry", spec(Cavalry, (130.0, 30.0, 40.0), 6.0, 80, 4, [125, 100, 250, 40], 1800, Stable))
            .with_unit("paladin", spec(Cavalry, (150.0, 250.0, 400.0), 6.0, 100, 10, [400, 300, 600, 100], 2400, Stable))
            .with_unit("heavy_cavalry", spec(Cavalry, (150.0, 200.0, 80.0), 5.45, 50, 6, [200, 150, 600, 60], 3600, Stable))
            .with_unit("ram", spec(Ram, (2.0, 20.0, 50.0), 2.0, 0, 5, [300, 200, 200, 50], 4800, Workshop))
            .with_unit("catapult", spec(Catapult, (100.0, 100.0, 50.0), 2.0, 0, 8, [320, 400, 100, 50], 7200, Workshop))
            .with_unit("admin", spec(Admin, (30.0, 100.0, 50.0), 1.71, 0, 100, [40000, 50000, 50000, 10000], 18000, Academy))
            .with_unit("settler", spec(Settler, (0.0, 20.0, 20.0), 2.0, 0, 1, [750, 750, 750, 750], 7200, Residence))
    }
}

impl<'de> Deserialize<'de> for UnitCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let overrides = AHashMap::<UnitTypeId, UnitSpec>::deserialize(deserializer)?;
        let mut catalog = UnitCatalog::default();
        for (id, spec) in overrides {
            catalog.insert(id, spec);
        }
        Ok(catalog)
    }
}

/// Multiplier applied to a base stat for a smithy/armory level
pub fn tech_factor(level: u32, pct_per_level: f64) -> f64 {
    1.0 + level as f64 * pct_per_level / 100.0
}
