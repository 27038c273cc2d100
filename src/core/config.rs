//! World configuration with documented defaults
//!
//! Every balance number the engine consumes lives here (or in the scouting
//! and night-policy sections it aggregates). Documents are merged over the
//! defaults: each section and field is optional, so a world only spells out
//! what it changes.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::army::catalog::UnitCatalog;
use crate::campaign::night::NightPolicyConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{BuildingKind, Tribe, UnitTypeId, WallType};
use crate::scouting::config::ScoutingConfig;

/// Highest smithy/armory level a stack may carry
pub const DEFAULT_MAX_TECH_LEVEL: u32 = 20;

/// Complete set of external tables consumed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Global travel-time divisor (2.0 = everything arrives twice as fast)
    pub world_speed: f64,
    pub max_tech_level: u32,
    pub units: UnitCatalog,
    pub combat: CombatConfig,
    pub siege: SiegeConfig,
    pub protection: ProtectionConfig,
    pub training: TrainingConfig,
    pub loyalty: LoyaltyConfig,
    pub settlement: SettlementConfig,
    pub scouting: ScoutingConfig,
    pub night: NightPolicyConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_speed: 1.0,
            max_tech_level: DEFAULT_MAX_TECH_LEVEL,
            units: UnitCatalog::default(),
            combat: CombatConfig::default(),
            siege: SiegeConfig::default(),
            protection: ProtectionConfig::default(),
            training: TrainingConfig::default(),
            loyalty: LoyaltyConfig::default(),
            settlement: SettlementConfig::default(),
            scouting: ScoutingConfig::default(),
            night: NightPolicyConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a `.toml` or `.json` world file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(EngineError::configuration(format!(
                "unsupported world config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        ensure(
            self.world_speed.is_finite() && self.world_speed > 0.0,
            format!("world_speed must be positive, got {}", self.world_speed),
        )?;
        self.units.validate()?;
        self.combat.validate()?;
        self.siege.validate()?;
        self.protection.validate()?;
        self.training.validate()?;
        self.loyalty.validate()?;
        self.settlement.validate()?;
        self.scouting.validate()?;
        self.night.validate()?;
        Ok(())
    }
}

// === COMBAT ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Luck is drawn from `[-luck_bound, +luck_bound]`
    pub luck_bound: f64,
    pub morale: MoraleConfig,
    /// Round cap for attacks
    pub max_rounds: u32,
    /// Round cap for raids (skirmishes end early)
    pub raid_max_rounds: u32,
    /// Share of the power ratio converted into casualties each round
    ///
    /// At 0.5 a side facing twice its power loses everything in one round,
    /// while equal forces each lose half.
    pub round_intensity: f64,
    /// Smithy/armory bonus per tech level, in percent of the base stat
    pub tech_pct_per_level: f64,
    pub walls: AHashMap<WallType, WallSpec>,
    /// Named attack multipliers unlocked by specific unit types in the attacking force
    pub unit_multipliers: Vec<UnitMultiplier>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        let mut walls = AHashMap::new();
        walls.insert(
            WallType::CityWall,
            WallSpec {
                defense_pct_per_level: 3.0,
                durability: 1.0,
            },
        );
        walls.insert(
            WallType::EarthWall,
            WallSpec {
                defense_pct_per_level: 2.0,
                durability: 2.0,
            },
        );
        walls.insert(
            WallType::Palisade,
            WallSpec {
                defense_pct_per_level: 2.5,
                durability: 1.5,
            },
        );

        Self {
            luck_bound: 0.25,
            morale: MoraleConfig::default(),
            max_rounds: 10,
            raid_max_rounds: 1,
            round_intensity: 0.5,
            tech_pct_per_level: 2.0,
            walls,
            unit_multipliers: vec![UnitMultiplier {
                unit_type: UnitTypeId::new("paladin"),
                name: "paladin_attack".to_string(),
                attack_multiplier: 1.1,
            }],
        }
    }
}

impl CombatConfig {
    pub fn wall(&self, wall_type: WallType) -> Result<&WallSpec> {
        self.walls.get(&wall_type).ok_or_else(|| {
            EngineError::configuration(format!("no wall spec configured for {:?}", wall_type))
        })
    }

    fn validate(&self) -> Result<()> {
        ensure(
            (0.0..1.0).contains(&self.luck_bound),
            format!("luck_bound must be in [0, 1), got {}", self.luck_bound),
        )?;
        self.morale.validate()?;
        ensure(self.max_rounds >= 1, "max_rounds must be at least 1")?;
        ensure(self.raid_max_rounds >= 1, "raid_max_rounds must be at least 1")?;
        ensure(
            self.round_intensity.is_finite() && self.round_intensity > 0.0,
            format!("round_intensity must be positive, got {}", self.round_intensity),
        )?;
        ensure(
            self.tech_pct_per_level.is_finite() && self.tech_pct_per_level >= 0.0,
            "tech_pct_per_level must be non-negative",
        )?;
        for (wall_type, spec) in &self.walls {
            ensure(
                spec.defense_pct_per_level.is_finite() && spec.defense_pct_per_level >= 0.0,
                format!("{:?} defense_pct_per_level must be non-negative", wall_type),
            )?;
            ensure(
                spec.durability.is_finite() && spec.durability > 0.0,
                format!("{:?} durability must be positive", wall_type),
            )?;
        }
        for m in &self.unit_multipliers {
            ensure(
                m.attack_multiplier.is_finite() && m.attack_multiplier >= 1.0,
                format!("multiplier '{}' must be >= 1, got {}", m.name, m.attack_multiplier),
            )?;
        }
        Ok(())
    }
}

/// Morale curve: `max(floor, (defender / attacker) ^ exponent)` once the
/// attacker outgrows the defender by more than `tolerance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoraleConfig {
    pub exponent: f64,
    pub floor: f64,
    /// Relative size margin tolerated before morale drops (0.1 = 10% larger)
    pub tolerance: f64,
}

impl Default for MoraleConfig {
    fn default() -> Self {
        Self {
            exponent: 0.2,
            floor: 0.667,
            tolerance: 0.0,
        }
    }
}

impl MoraleConfig {
    fn validate(&self) -> Result<()> {
        ensure(
            self.floor > 0.0 && self.floor <= 1.0,
            format!("morale floor must be in (0, 1], got {}", self.floor),
        )?;
        ensure(
            self.exponent.is_finite() && self.exponent >= 0.0,
            "morale exponent must be non-negative",
        )?;
        ensure(
            self.tolerance.is_finite() && self.tolerance >= 0.0,
            "morale tolerance must be non-negative",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub defense_pct_per_level: f64,
    /// Resistance of each level against siege engines
    pub durability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMultiplier {
    pub unit_type: UnitTypeId,
    pub name: String,
    pub attack_multiplier: f64,
}

// === SIEGE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeConfig {
    pub ram: SiegeEngineConfig,
    pub catapult: SiegeEngineConfig,
    /// Resistance of each building level against catapults
    pub building_durability: f64,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            ram: SiegeEngineConfig {
                efficiency: 4.0,
                counter_weight: 0.01,
            },
            catapult: SiegeEngineConfig {
                efficiency: 0.05,
                counter_weight: 0.01,
            },
            building_durability: 1.0,
        }
    }
}

impl SiegeConfig {
    fn validate(&self) -> Result<()> {
        for (name, engine) in [("ram", &self.ram), ("catapult", &self.catapult)] {
            ensure(
                engine.efficiency.is_finite() && engine.efficiency >= 0.0,
                format!("{} efficiency must be non-negative", name),
            )?;
            ensure(
                engine.counter_weight.is_finite() && engine.counter_weight >= 0.0,
                format!("{} counter_weight must be non-negative", name),
            )?;
        }
        ensure(
            self.building_durability.is_finite() && self.building_durability > 0.0,
            "building_durability must be positive",
        )
    }
}

/// `damage = efficiency × power / (durability + counter_weight × counter_defense)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiegeEngineConfig {
    pub efficiency: f64,
    pub counter_weight: f64,
}

// === LOOT PROTECTION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Protected amount per resource, indexed by cranny level (saturates at the last entry)
    pub cranny_capacity: Vec<u64>,
    pub tribe_modifiers: AHashMap<Tribe, TribeLootModifier>,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        let mut tribe_modifiers = AHashMap::new();
        tribe_modifiers.insert(
            Tribe::Gauls,
            TribeLootModifier {
                cranny_capacity_multiplier: 1.5,
                enemy_cranny_reduction: 0.0,
            },
        );
        tribe_modifiers.insert(
            Tribe::Teutons,
            TribeLootModifier {
                cranny_capacity_multiplier: 1.0,
                enemy_cranny_reduction: 0.2,
            },
        );

        Self {
            cranny_capacity: vec![0, 200, 260, 340, 440, 560, 720, 920, 1200, 1540, 2000],
            tribe_modifiers,
        }
    }
}

impl ProtectionConfig {
    pub fn modifier(&self, tribe: Option<Tribe>) -> TribeLootModifier {
        tribe
            .and_then(|t| self.tribe_modifiers.get(&t).cloned())
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        ensure(!self.cranny_capacity.is_empty(), "cranny_capacity table is empty")?;
        ensure(
            self.cranny_capacity.windows(2).all(|w| w[0] <= w[1]),
            "cranny_capacity must be non-decreasing by level",
        )?;
        for (tribe, m) in &self.tribe_modifiers {
            ensure(
                m.cranny_capacity_multiplier.is_finite() && m.cranny_capacity_multiplier >= 0.0,
                format!("{:?} cranny_capacity_multiplier must be non-negative", tribe),
            )?;
            ensure(
                (0.0..=1.0).contains(&m.enemy_cranny_reduction),
                format!("{:?} enemy_cranny_reduction must be in [0, 1]", tribe),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TribeLootModifier {
    /// Applied to the cranny of a defender of this tribe
    pub cranny_capacity_multiplier: f64,
    /// Fraction of enemy cranny protection ignored when this tribe attacks
    pub enemy_cranny_reduction: f64,
}

impl Default for TribeLootModifier {
    fn default() -> Self {
        Self {
            cranny_capacity_multiplier: 1.0,
            enemy_cranny_reduction: 0.0,
        }
    }
}

// === TRAINING ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Speed multiplier per building level (index 0 = level 1), saturating
    pub speed_curves: AHashMap<BuildingKind, Vec<f64>>,
    /// Percent of the cost returned on an early cancellation
    pub refund_pct: f64,
    /// Progress fraction below which a cancellation is refunded
    pub refund_progress_limit: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        // Each level trains 1/0.9 times faster than the one below it
        let curve: Vec<f64> = (0..20).map(|i| (1.0_f64 / 0.9).powi(i)).collect();
        let speed_curves = [
            BuildingKind::Barracks,
            BuildingKind::Stable,
            BuildingKind::Workshop,
            BuildingKind::Academy,
            BuildingKind::Residence,
        ]
        .into_iter()
        .map(|b| (b, curve.clone()))
        .collect();

        Self {
            speed_curves,
            refund_pct: 90.0,
            refund_progress_limit: 0.10,
        }
    }
}

impl TrainingConfig {
    /// Speed multiplier of `building` at `level` (level >= 1)
    pub fn speed_multiplier(&self, building: BuildingKind, level: u32) -> Result<f64> {
        let curve = self.speed_curves.get(&building).ok_or_else(|| {
            EngineError::configuration(format!("no speed curve configured for {:?}", building))
        })?;
        if level == 0 {
            return Err(EngineError::validation(format!("{:?} is not built (level 0)", building)));
        }
        curve
            .get(level as usize - 1)
            .or_else(|| curve.last())
            .copied()
            .ok_or_else(|| EngineError::configuration(format!("{:?} speed curve is empty", building)))
    }

    fn validate(&self) -> Result<()> {
        for (building, curve) in &self.speed_curves {
            ensure(!curve.is_empty(), format!("{:?} speed curve is empty", building))?;
            ensure(
                curve.iter().all(|m| m.is_finite() && *m > 0.0),
                format!("{:?} speed curve must be positive", building),
            )?;
            ensure(
                curve.windows(2).all(|w| w[0] <= w[1]),
                format!("{:?} speed curve must be non-decreasing", building),
            )?;
        }
        ensure(
            (0.0..=100.0).contains(&self.refund_pct),
            "refund_pct must be within 0..=100",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.refund_progress_limit),
            "refund_progress_limit must be within 0..=1",
        )
    }
}

// === LOYALTY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// Loyalty damage per admin is rolled uniformly from `damage_min..=damage_max`
    pub damage_min: u32,
    pub damage_max: u32,
    /// Bonus damage per admin attack tech level, in percent
    pub tech_pct_per_level: f64,
    pub max_loyalty: u32,
    /// Loyalty taken off `max_loyalty` when a village changes hands
    pub capture_penalty: u32,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            damage_min: 20,
            damage_max: 35,
            tech_pct_per_level: 2.0,
            max_loyalty: 100,
            capture_penalty: 75,
        }
    }
}

impl LoyaltyConfig {
    pub fn post_capture_loyalty(&self) -> u32 {
        self.max_loyalty.saturating_sub(self.capture_penalty)
    }

    fn validate(&self) -> Result<()> {
        ensure(
            self.damage_min <= self.damage_max,
            "loyalty damage_min must not exceed damage_max",
        )?;
        ensure(self.max_loyalty > 0, "max_loyalty must be positive")?;
        ensure(
            self.capture_penalty <= self.max_loyalty,
            "capture_penalty must not exceed max_loyalty",
        )?;
        ensure(
            self.tech_pct_per_level.is_finite() && self.tech_pct_per_level >= 0.0,
            "loyalty tech_pct_per_level must be non-negative",
        )
    }
}

// === SETTLEMENT ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub min_settlers: u32,
    pub min_culture_points: u64,
    pub min_expansion_slots: u32,
    /// Loyalty of a freshly founded village
    pub starting_loyalty: u32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_settlers: 3,
            min_culture_points: 500,
            min_expansion_slots: 1,
            starting_loyalty: 100,
        }
    }
}

impl SettlementConfig {
    fn validate(&self) -> Result<()> {
        ensure(self.min_settlers >= 1, "min_settlers must be at least 1")
    }
}

pub(crate) fn ensure(condition: bool, msg: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(EngineError::configuration(msg))
    }
}
