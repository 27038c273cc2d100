//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock time in whole seconds (epoch chosen by the caller)
pub type Timestamp = u64;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Identifier of a unit type in the world unit catalog (e.g. `spear_fighter`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(pub String);

impl UnitTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitTypeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Combat category of a unit, used for defense weighting and stage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    #[serde(alias = "inf")]
    Infantry,
    #[serde(alias = "cav")]
    Cavalry,
    Ram,
    Catapult,
    Scout,
    #[serde(alias = "noble")]
    Admin,
    Settler,
}

impl UnitRole {
    /// Mounted units are matched against cavalry defense; everything else
    /// (siege engines and admins included) fights as infantry.
    pub fn is_mounted(&self) -> bool {
        matches!(self, UnitRole::Cavalry)
    }
}

/// Kind of troop movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Attack,
    Raid,
    Scout,
    Settle,
    Reinforce,
    Return,
}

impl MissionKind {
    pub fn allows_loot(&self) -> bool {
        matches!(self, MissionKind::Attack | MissionKind::Raid)
    }

    pub fn allows_capture(&self) -> bool {
        matches!(self, MissionKind::Attack)
    }

    pub fn is_combat(&self) -> bool {
        matches!(self, MissionKind::Attack | MissionKind::Raid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tribe {
    Romans,
    Teutons,
    Gauls,
}

/// Buildings that train units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Barracks,
    Stable,
    Workshop,
    Academy,
    Residence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallType {
    CityWall,
    EarthWall,
    Palisade,
}

impl Default for WallType {
    fn default() -> Self {
        Self::CityWall
    }
}

/// Defender fortification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wall {
    pub wall_type: WallType,
    pub level: u32,
}

impl Wall {
    pub fn new(wall_type: WallType, level: u32) -> Self {
        Self { wall_type, level }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Clay,
    Iron,
    Crop,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::Wood, Resource::Clay, Resource::Iron, Resource::Crop];
}

/// Amounts of the four village resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBundle {
    pub wood: u64,
    pub clay: u64,
    pub iron: u64,
    pub crop: u64,
}

impl ResourceBundle {
    pub fn new(wood: u64, clay: u64, iron: u64, crop: u64) -> Self {
        Self { wood, clay, iron, crop }
    }

    pub fn uniform(amount: u64) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Clay => self.clay,
            Resource::Iron => self.iron,
            Resource::Crop => self.crop,
        }
    }

    pub fn set(&mut self, resource: Resource, amount: u64) {
        match resource {
            Resource::Wood => self.wood = amount,
            Resource::Clay => self.clay = amount,
            Resource::Iron => self.iron = amount,
            Resource::Crop => self.crop = amount,
        }
    }

    pub fn total(&self) -> u64 {
        self.wood + self.clay + self.iron + self.crop
    }

    /// Multiply every amount by `factor`, rounding down
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: u64| (v as f64 * factor).floor().max(0.0) as u64;
        Self::new(scale(self.wood), scale(self.clay), scale(self.iron), scale(self.crop))
    }

    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self::new(
            self.wood.saturating_sub(other.wood),
            self.clay.saturating_sub(other.clay),
            self.iron.saturating_sub(other.iron),
            self.crop.saturating_sub(other.crop),
        )
    }
}

impl std::ops::Add for ResourceBundle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.wood + rhs.wood,
            self.clay + rhs.clay,
            self.iron + rhs.iron,
            self.crop + rhs.crop,
        )
    }
}

impl std::ops::Mul<u64> for ResourceBundle {
    type Output = Self;
    fn mul(self, rhs: u64) -> Self {
        Self::new(self.wood * rhs, self.clay * rhs, self.iron * rhs, self.crop * rhs)
    }
}

/// Map coordinate of a village
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in map units
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
