//! Seeded randomness
//!
//! Every random draw in the engine comes from a `ChaCha8Rng` built from an
//! explicit seed. A single mission seed feeds several independent streams
//! (battle luck, loyalty rolls, scout casualty rounding) so that a stage
//! added later never shifts another stage's draws.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream used for battle luck
pub const LUCK_STREAM: u64 = 0x4c55_434b;
/// Stream used for loyalty damage rolls
pub const LOYALTY_STREAM: u64 = 0x4c4f_5941;
/// Stream used for scout casualty rounding
pub const SCOUT_STREAM: u64 = 0x5343_4f55;

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// RNG for one consumer of a mission seed
pub fn derive_stream(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(splitmix(seed ^ splitmix(stream)))
}

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
