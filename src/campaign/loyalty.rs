//! Loyalty damage from admin units and village capture

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::army::{tech_factor, UnitStack};
use crate::core::config::LoyaltyConfig;
use crate::core::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyResolution {
    pub loyalty_before: u32,
    pub loyalty_after: u32,
    /// Signed change; positive only when a capture resets loyalty upward
    pub delta: i32,
    pub captured: bool,
}

/// Apply the loyalty damage of the surviving admin stacks
///
/// Each admin rolls its own damage from the configured range, boosted by
/// the stack's attack tech. Loyalty that reaches zero transfers the village
/// when `capture_allowed`, resetting it to the post-capture baseline;
/// otherwise it stays at zero.
pub fn resolve_loyalty<'a, R: Rng>(
    current: u32,
    admins: impl IntoIterator<Item = &'a UnitStack>,
    capture_allowed: bool,
    rng: &mut R,
    config: &LoyaltyConfig,
) -> Result<LoyaltyResolution> {
    if current > config.max_loyalty {
        return Err(EngineError::validation(format!(
            "loyalty {} exceeds the maximum {}",
            current, config.max_loyalty
        )));
    }

    // Rolling stops once loyalty is gone; further damage changes nothing
    let mut damage = 0.0;
    'admins: for stack in admins {
        let factor = tech_factor(stack.tech.attack_level, config.tech_pct_per_level);
        for _ in 0..stack.count {
            if damage >= current as f64 {
                break 'admins;
            }
            damage += rng.gen_range(config.damage_min..=config.damage_max) as f64 * factor;
        }
    }
    let damage = damage.round() as i64;
    let remaining = current as i64 - damage;

    let (loyalty_after, captured) = if remaining <= 0 && capture_allowed {
        (config.post_capture_loyalty(), true)
    } else {
        (remaining.max(0) as u32, false)
    };

    tracing::debug!(current, damage, loyalty_after, captured, "loyalty resolved");

    Ok(LoyaltyResolution {
        loyalty_before: current,
        loyalty_after,
        delta: loyalty_after as i32 - current as i32,
        captured,
    })
}
