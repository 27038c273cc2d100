//! Training scheduler: cost and duration of a unit batch

use serde::{Deserialize, Serialize};

use crate::core::config::{TrainingConfig, WorldConfig};
use crate::core::error::{EngineError, Result};
use crate::core::types::{BuildingKind, ResourceBundle, Timestamp, UnitTypeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingOrder {
    pub unit_type: UnitTypeId,
    pub count: u32,
    pub building: BuildingKind,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub order: TrainingOrder,
    pub total_cost: ResourceBundle,
    pub total_duration_seconds: u64,
}

/// Schedule `count` units of `unit_type` in `building` at `building_level`
///
/// The batch starts immediately. Its duration is the catalog base time per
/// unit divided by the building's speed multiplier, rounded up.
pub fn schedule_training(
    unit_type: &UnitTypeId,
    count: u32,
    building: BuildingKind,
    building_level: u32,
    now: Timestamp,
    config: &WorldConfig,
) -> Result<TrainingPlan> {
    if count == 0 {
        return Err(EngineError::validation("training batch must contain at least one unit"));
    }
    let spec = config.units.get(unit_type)?;
    if spec.building != building {
        return Err(EngineError::validation(format!(
            "'{}' is trained in {:?}, not {:?}",
            unit_type, spec.building, building
        )));
    }
    let multiplier = config.training.speed_multiplier(building, building_level)?;

    let base_seconds = spec.train_seconds as f64 * count as f64;
    let total_duration_seconds = (base_seconds / multiplier).ceil() as u64;
    let total_cost = spec.cost * count as u64;

    tracing::debug!(
        %unit_type,
        count,
        building_level,
        total_duration_seconds,
        "training scheduled"
    );

    Ok(TrainingPlan {
        order: TrainingOrder {
            unit_type: unit_type.clone(),
            count,
            building,
            start_at: now,
            finish_at: now.saturating_add(total_duration_seconds),
        },
        total_cost,
        total_duration_seconds,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationQuote {
    /// Fraction of the batch duration already elapsed (0..=1)
    pub progress: f64,
    pub refunded: bool,
    pub refund: ResourceBundle,
}

/// What cancelling a batch at `now` would return
pub fn quote_cancellation(plan: &TrainingPlan, now: Timestamp, config: &TrainingConfig) -> CancellationQuote {
    let progress = if plan.total_duration_seconds == 0 {
        1.0
    } else {
        let elapsed = now.saturating_sub(plan.order.start_at) as f64;
        (elapsed / plan.total_duration_seconds as f64).min(1.0)
    };

    let refunded = progress < config.refund_progress_limit;
    let refund = if refunded {
        plan.total_cost.scaled(config.refund_pct / 100.0)
    } else {
        ResourceBundle::default()
    };

    CancellationQuote {
        progress,
        refunded,
        refund,
    }
}
