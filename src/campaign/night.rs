//! Night policy: defense bonus or truce during a nightly window

use serde::{Deserialize, Serialize};

use crate::core::config::ensure;
use crate::core::error::{EngineError, Result};
use crate::core::types::Timestamp;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NightMode {
    /// Defender power is multiplied during the window
    DefenseBonus { multiplier: f64 },
    /// Hostile movements may not land during the window
    Truce,
}

/// Nightly window evaluated against arrival time (local hours, may wrap midnight)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightPolicyConfig {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
    pub utc_offset_hours: i32,
    pub mode: NightMode,
}

impl Default for NightPolicyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 0,
            end_hour: 6,
            utc_offset_hours: 0,
            mode: NightMode::DefenseBonus { multiplier: 2.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NightEffect {
    Day,
    DefenseBonus(f64),
    Truce,
}

impl NightPolicyConfig {
    /// Local hour (0..24) of a timestamp
    pub fn local_hour(&self, at: Timestamp) -> u32 {
        let local = at as i64 + self.utc_offset_hours as i64 * 3600;
        (local.rem_euclid(SECONDS_PER_DAY) / 3600) as u32
    }

    pub fn is_night(&self, at: Timestamp) -> bool {
        if !self.enabled || self.start_hour == self.end_hour {
            return false;
        }
        let hour = self.local_hour(at);
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    pub fn evaluate(&self, arrival_at: Timestamp) -> NightEffect {
        if !self.is_night(arrival_at) {
            return NightEffect::Day;
        }
        match self.mode {
            NightMode::DefenseBonus { multiplier } => NightEffect::DefenseBonus(multiplier),
            NightMode::Truce => NightEffect::Truce,
        }
    }

    /// Defense multiplier for a hostile arrival; a truce rejects the movement
    pub fn defense_multiplier(&self, arrival_at: Timestamp) -> Result<f64> {
        match self.evaluate(arrival_at) {
            NightEffect::Day => Ok(1.0),
            NightEffect::DefenseBonus(multiplier) => Ok(multiplier),
            NightEffect::Truce => Err(EngineError::validation(format!(
                "arrival at {} falls inside the night truce ({}:00-{}:00)",
                arrival_at, self.start_hour, self.end_hour
            ))),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure(
            self.start_hour < 24 && self.end_hour < 24,
            "night window hours must be within 0..24",
        )?;
        ensure(
            (-12..=14).contains(&self.utc_offset_hours),
            format!("utc_offset_hours {} out of range", self.utc_offset_hours),
        )?;
        if let NightMode::DefenseBonus { multiplier } = self.mode {
            ensure(
                multiplier.is_finite() && multiplier >= 1.0,
                format!("night defense multiplier must be >= 1, got {}", multiplier),
            )?;
        }
        Ok(())
    }
}
