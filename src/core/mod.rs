pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::WorldConfig;
pub use error::{EngineError, Result};
