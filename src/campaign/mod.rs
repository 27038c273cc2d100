//! Campaign layer: everything around a battle
//!
//! Travel, training, loot, loyalty, settlement, upkeep, the night policy
//! and the mission orchestrator that strings them together.

pub mod loot;
pub mod loyalty;
pub mod mission;
pub mod night;
pub mod route;
pub mod settlement;
pub mod supply;
pub mod training;

pub use loot::{carry_capacity, protection_per_resource, resolve_loot, LootResolution};
pub use loyalty::{resolve_loyalty, LoyaltyResolution};
pub use mission::{resolve_batch, run_mission, MissionRequest, MissionResult, ReturnPlan};
pub use night::{NightEffect, NightMode, NightPolicyConfig};
pub use route::{plan_return, plan_travel, TravelPlan};
pub use settlement::{
    check_settlement_prerequisites, resolve_settlement_outcome, resolve_settler_race,
    PrerequisiteCheck, SettlementOutcome, SettlementResources, SettlerCandidate,
};
pub use supply::{
    compute_upkeep, resolve_starvation, resolve_upkeep, GarrisonStack, Removal, StarvationResult,
    UpkeepResult,
};
pub use training::{quote_cancellation, schedule_training, CancellationQuote, TrainingOrder, TrainingPlan};
