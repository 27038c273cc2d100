//! Mission Engine - deterministic resolution of troop movements
//!
//! Travel, battle, siege, loot, loyalty, scouting, settlement and upkeep for
//! a persistent village-strategy world. Every resolver is a pure function of
//! its inputs, the world configuration and an explicit seed.

pub mod army;
pub mod battle;
pub mod campaign;
pub mod core;
pub mod scouting;
pub mod siege;
