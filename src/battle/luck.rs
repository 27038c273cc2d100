//! Seeded battle luck

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::rng::{derive_stream, LUCK_STREAM};

/// Signed luck per side; the defender's is always the attacker's negation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Luck {
    pub attacker: f64,
    pub defender: f64,
}

impl Luck {
    pub fn neutral() -> Self {
        Self {
            attacker: 0.0,
            defender: 0.0,
        }
    }
}

/// Draw luck in `[-bound, +bound]` from the battle seed
pub fn draw_luck(seed: u64, bound: f64) -> Luck {
    if bound <= 0.0 {
        return Luck::neutral();
    }
    let mut rng = derive_stream(seed, LUCK_STREAM);
    let attacker: f64 = rng.gen_range(-bound..=bound);
    Luck {
        attacker,
        defender: -attacker,
    }
}
