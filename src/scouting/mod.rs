//! Scouting: outcome bands, intel tiers and disclosure fidelity
//!
//! The resolver is stateless. Spam throttling parameters live in
//! `ScoutingConfig::spam` for callers that track report history.

pub mod config;
pub mod intel;
pub mod resolver;

pub use config::{Band, IntelTierId, ScoutingConfig, SpamThrottle};
pub use intel::{disclose, Disclosed, IntelReport, TargetIntel};
pub use resolver::{
    classify, resolve_scouting, unlocked_tiers, Fidelity, ScoutMissionResult, ScoutOutcome,
    ScoutRequest, ScoutSide,
};
