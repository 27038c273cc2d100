//! Battle resolution between an attacking and a defending army
//!
//! A battle runs in three steps:
//! - rams reduce the wall against the weighted defense
//! - casualty rounds run with morale, wall, night, named multipliers and luck
//! - the report is assembled and checked for conservation
//!
//! Catapults, loot and loyalty come after the battle and are driven by the
//! mission orchestrator in `campaign::mission`.

pub mod luck;
pub mod morale;
pub mod report;
pub mod resolution;
pub mod weighting;

pub use luck::{draw_luck, Luck};
pub use morale::morale_multiplier;
pub use report::{BattleReport, LossRates, Multipliers, RoundResult, SideOutcome, UnitCasualties};
pub use resolution::{resolve_battle, BattleEnvironment, BattleOutcome};
pub use weighting::{defense_weights, effective_defense, DefenseWeights};
