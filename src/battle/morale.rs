//! Morale: penalizes large accounts attacking much smaller ones
//!
//! The multiplier scales attacker offense. It is exactly 1 while the
//! attacker is no larger than the defender (plus tolerance), then follows
//! `(defender / attacker) ^ exponent` down to the configured floor. There is
//! no bonus for attacking a bigger account.

use crate::core::config::MoraleConfig;

pub fn morale_multiplier(attacker_size: f64, defender_size: f64, config: &MoraleConfig) -> f64 {
    if attacker_size <= defender_size * (1.0 + config.tolerance) {
        return 1.0;
    }
    if defender_size <= 0.0 {
        return config.floor;
    }
    (defender_size / attacker_size)
        .powf(config.exponent)
        .clamp(config.floor, 1.0)
}
