//! Mission orchestration: one hostile movement from departure to return
//!
//! Stages run in order and each one only runs when its preconditions hold:
//! travel, night policy, battle (with rams), catapults, loot, loyalty and
//! the return trip. A skipped stage leaves its result field empty.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::loot::{carry_capacity, resolve_loot, LootResolution};
use super::loyalty::{resolve_loyalty, LoyaltyResolution};
use super::route::{plan_return, plan_travel, TravelPlan};
use crate::army::{Army, StackOrder};
use crate::battle::{effective_defense, resolve_battle, BattleEnvironment, BattleReport};
use crate::core::config::WorldConfig;
use crate::core::error::{EngineError, Result};
use crate::core::rng::{derive_stream, LOYALTY_STREAM};
use crate::core::types::{
    Coord, MissionKind, ResourceBundle, Timestamp, Tribe, UnitRole, UnitTypeId, Wall,
};
use crate::siege::{resolve_catapults, BuildingTarget, CatapultResolution, WallResolution};

/// Complete input of one attack or raid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub mission: MissionKind,
    pub origin: Coord,
    pub target: Coord,
    #[serde(default)]
    pub depart_at: Timestamp,
    pub attacker: Vec<StackOrder>,
    #[serde(default)]
    pub defender: Vec<StackOrder>,
    #[serde(default)]
    pub wall: Wall,
    #[serde(default)]
    pub attacker_size: f64,
    #[serde(default)]
    pub defender_size: f64,
    /// Required; feeds battle luck and loyalty rolls
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub catapult_targets: Vec<BuildingTarget>,
    #[serde(default)]
    pub allow_dual_targets: bool,
    #[serde(default)]
    pub defender_stock: ResourceBundle,
    #[serde(default)]
    pub cranny_level: u32,
    #[serde(default)]
    pub attacker_tribe: Option<Tribe>,
    #[serde(default)]
    pub defender_tribe: Option<Tribe>,
    /// Current loyalty of the target; the world's maximum when omitted
    #[serde(default)]
    pub defender_loyalty: Option<u32>,
}

impl MissionRequest {
    pub fn new(mission: MissionKind, origin: Coord, target: Coord, seed: u64) -> Self {
        Self {
            id: None,
            mission,
            origin,
            target,
            depart_at: 0,
            attacker: Vec::new(),
            defender: Vec::new(),
            wall: Wall::default(),
            attacker_size: 0.0,
            defender_size: 0.0,
            seed: Some(seed),
            catapult_targets: Vec::new(),
            allow_dual_targets: false,
            defender_stock: ResourceBundle::default(),
            cranny_level: 0,
            attacker_tribe: None,
            defender_tribe: None,
            defender_loyalty: None,
        }
    }

    pub fn with_attacker(mut self, stacks: Vec<StackOrder>) -> Self {
        self.attacker = stacks;
        self
    }

    pub fn with_defender(mut self, stacks: Vec<StackOrder>) -> Self {
        self.defender = stacks;
        self
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.wall = wall;
        self
    }
}

/// The survivors' way home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPlan {
    pub travel: TravelPlan,
    pub arrival_at: Timestamp,
    pub survivors: Vec<(UnitTypeId, u32)>,
    pub carrying: ResourceBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionResult {
    pub id: Option<String>,
    pub mission: MissionKind,
    pub outbound: TravelPlan,
    pub arrival_at: Timestamp,
    pub battle: BattleReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_resolution: Option<WallResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catapult_resolution: Option<CatapultResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot_resolution: Option<LootResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_resolution: Option<LoyaltyResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_plan: Option<ReturnPlan>,
}

/// Run one attack or raid through every applicable stage
pub fn run_mission(request: &MissionRequest, config: &WorldConfig) -> Result<MissionResult> {
    let mission = request.mission;
    if !mission.is_combat() {
        return Err(EngineError::validation(format!(
            "{:?} missions are resolved by their dedicated resolver, not the mission orchestrator",
            mission
        )));
    }
    let seed = request
        .seed
        .ok_or_else(|| EngineError::validation("mission requires an explicit seed"))?;

    let attacker = Army::build("attacker", &request.attacker, config)?;
    let defender = Army::build("defender", &request.defender, config)?;

    let outbound = plan_travel(
        request.origin,
        request.target,
        mission,
        &attacker.movement(),
        &config.units,
        config.world_speed,
    )?;
    let arrival_at = outbound.arrival_at(request.depart_at);
    let night_multiplier = config.night.defense_multiplier(arrival_at)?;

    let env = BattleEnvironment {
        mission,
        wall: request.wall,
        attacker_size: request.attacker_size,
        defender_size: request.defender_size,
        seed: Some(seed),
        night_multiplier,
    };
    let outcome = resolve_battle(&attacker, &defender, &env, config)?;
    let report = outcome.report;
    let survivors = outcome.attacker_survivors;

    let catapult_resolution = if mission == MissionKind::Attack {
        let tech_pct = config.combat.tech_pct_per_level;
        let counter = effective_defense(&outcome.defender_survivors, report.aggregates.defender, tech_pct);
        resolve_catapults(
            &survivors,
            &request.catapult_targets,
            request.allow_dual_targets,
            counter,
            &config.combat,
            &config.siege,
        )
    } else {
        None
    };

    let loot_resolution = if report.attacker_won && mission.allows_loot() {
        let capacity = carry_capacity(&survivors, &config.units)?;
        Some(resolve_loot(
            &request.defender_stock,
            request.cranny_level,
            capacity,
            request.defender_tribe,
            request.attacker_tribe,
            &config.protection,
        ))
    } else {
        None
    };

    let loyalty_resolution =
        if report.attacker_won && mission.allows_capture() && survivors.count_role(UnitRole::Admin) > 0 {
            let mut rng = derive_stream(seed, LOYALTY_STREAM);
            let current = request.defender_loyalty.unwrap_or(config.loyalty.max_loyalty);
            Some(resolve_loyalty(
                current,
                survivors.stacks_with_role(UnitRole::Admin),
                true,
                &mut rng,
                &config.loyalty,
            )?)
        } else {
            None
        };

    let return_plan = if survivors.is_empty() {
        None
    } else {
        let moving: Vec<(UnitTypeId, u32)> =
            survivors.movement().into_iter().filter(|(_, c)| *c > 0).collect();
        let travel = plan_return(&outbound, &moving, &config.units, config.world_speed)?;
        Some(ReturnPlan {
            arrival_at: travel.arrival_at(arrival_at),
            travel,
            survivors: moving,
            carrying: loot_resolution
                .as_ref()
                .map(|l| l.taken)
                .unwrap_or_default(),
        })
    };

    tracing::debug!(
        id = ?request.id,
        ?mission,
        arrival_at,
        attacker_won = report.attacker_won,
        "mission resolved"
    );

    Ok(MissionResult {
        id: request.id.clone(),
        mission,
        outbound,
        arrival_at,
        ram_resolution: report.pre_combat,
        battle: report,
        catapult_resolution,
        loot_resolution,
        loyalty_resolution,
        return_plan,
    })
}

/// Resolve independent missions in parallel, keeping input order
pub fn resolve_batch(requests: &[MissionRequest], config: &WorldConfig) -> Vec<Result<MissionResult>> {
    requests
        .par_iter()
        .map(|request| run_mission(request, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::TechLevels;
    use crate::campaign::night::NightMode;
    use crate::core::types::WallType;

    fn siege_request() -> MissionRequest {
        MissionRequest::new(MissionKind::Attack, Coord::new(0.0, 0.0), Coord::new(6.0, 8.0), 2024)
            .with_attacker(vec![
                StackOrder::new("spear_fighter", 80).with_tech(TechLevels::new(5, 0)),
                StackOrder::new("ram", 15),
                StackOrder::new("catapult", 10),
                StackOrder::new("admin", 2),
            ])
            .with_defender(vec![StackOrder::new("spear_fighter", 60).with_tech(TechLevels::new(0, 3))])
            .with_wall(Wall::new(WallType::CityWall, 10))
    }

    #[test]
    fn test_full_attack_runs_every_stage() {
        let mut request = siege_request();
        request.catapult_targets = vec![BuildingTarget::new("warehouse", 10)];
        request.defender_stock = ResourceBundle::uniform(1000);
        let result = run_mission(&request, &WorldConfig::default()).unwrap();

        assert!(result.battle.attacker_won);
        assert!(result.ram_resolution.unwrap().wall_after < 10);
        assert!(result.catapult_resolution.is_some());
        assert!(result.loot_resolution.is_some());
        assert!(result.loyalty_resolution.is_some());
        let back = result.return_plan.unwrap();
        assert_eq!(back.travel.mission, MissionKind::Return);
        assert_eq!(back.travel.origin, request.target);
    }

    #[test]
    fn test_stages_omitted_without_preconditions() {
        let request =
            MissionRequest::new(MissionKind::Raid, Coord::new(0.0, 0.0), Coord::new(3.0, 4.0), 5)
                .with_attacker(vec![StackOrder::new("light_cavalry", 50)]);
        let result = run_mission(&request, &WorldConfig::default()).unwrap();

        assert!(result.battle.attacker_won);
        assert!(result.ram_resolution.is_none());
        assert!(result.catapult_resolution.is_none());
        assert!(result.loyalty_resolution.is_none());
        // Nothing to take, but the loot stage still ran
        assert_eq!(result.loot_resolution.unwrap().taken.total(), 0);
    }

    #[test]
    fn test_scout_and_settle_rejected() {
        for kind in [MissionKind::Scout, MissionKind::Settle, MissionKind::Reinforce] {
            let request = MissionRequest::new(kind, Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), 1)
                .with_attacker(vec![StackOrder::new("scout", 5)]);
            let err = run_mission(&request, &WorldConfig::default()).unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }
    }

    #[test]
    fn test_missing_seed_rejected() {
        let mut request = siege_request();
        request.seed = None;
        assert!(run_mission(&request, &WorldConfig::default()).is_err());
    }

    #[test]
    fn test_empty_attacker_rejected() {
        let request = MissionRequest::new(MissionKind::Attack, Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), 1);
        assert!(run_mission(&request, &WorldConfig::default()).is_err());
    }

    #[test]
    fn test_night_truce_blocks_arrival() {
        let mut config = WorldConfig::default();
        config.night.enabled = true;
        config.night.start_hour = 0;
        config.night.end_hour = 23;
        config.night.mode = NightMode::Truce;
        let err = run_mission(&siege_request(), &config).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_night_bonus_reported() {
        let mut config = WorldConfig::default();
        config.night.enabled = true;
        config.night.start_hour = 0;
        config.night.end_hour = 23;
        let result = run_mission(&siege_request(), &config).unwrap();
        assert_eq!(result.battle.multipliers.night, 2.0);
    }

    #[test]
    fn test_batch_keeps_order() {
        let config = WorldConfig::default();
        let requests: Vec<MissionRequest> = (0..8)
            .map(|i| {
                let mut r = siege_request();
                r.id = Some(format!("m{}", i));
                r.seed = Some(i);
                r
            })
            .collect();
        let results = resolve_batch(&requests, &config);
        for (i, result) in results.iter().enumerate() {
            let result = result.as_ref().unwrap();
            assert_eq!(result.id.as_deref(), Some(format!("m{}", i).as_str()));
            assert_eq!(result, &run_mission(&requests[i], &config).unwrap());
        }
    }
}
