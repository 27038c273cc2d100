//! Settlement prerequisites and contested settler races

use serde::{Deserialize, Serialize};

use crate::core::config::SettlementConfig;
use crate::core::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementResources {
    pub settlers_available: u32,
    pub culture_points: u64,
    pub expansion_slots: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteCheck {
    pub ok: bool,
    pub settlers_ok: bool,
    pub culture_ok: bool,
    pub slots_ok: bool,
}

pub fn check_settlement_prerequisites(
    resources: &SettlementResources,
    config: &SettlementConfig,
) -> PrerequisiteCheck {
    let settlers_ok = resources.settlers_available >= config.min_settlers;
    let culture_ok = resources.culture_points >= config.min_culture_points;
    let slots_ok = resources.expansion_slots >= config.min_expansion_slots;
    PrerequisiteCheck {
        ok: settlers_ok && culture_ok && slots_ok,
        settlers_ok,
        culture_ok,
        slots_ok,
    }
}

/// One settler party heading for a contested location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlerCandidate {
    pub id: String,
    pub arrival_at: Timestamp,
    pub has_requirements: bool,
}

/// Earliest qualified arrival wins; ties go to the earlier candidate in input order
pub fn resolve_settler_race(candidates: &[SettlerCandidate]) -> Option<&SettlerCandidate> {
    // min_by_key keeps the first of equal keys
    let winner = candidates
        .iter()
        .filter(|c| c.has_requirements)
        .min_by_key(|c| c.arrival_at);
    if let Some(w) = winner {
        tracing::debug!(winner = %w.id, arrival_at = w.arrival_at, "settler race resolved");
    }
    winner
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub success: bool,
    /// Loyalty of the new village; zero when nothing was founded
    pub loyalty_granted: u32,
}

pub fn resolve_settlement_outcome(
    prerequisites: &PrerequisiteCheck,
    won_race: bool,
    config: &SettlementConfig,
) -> SettlementOutcome {
    let success = prerequisites.ok && won_race;
    SettlementOutcome {
        success,
        loyalty_granted: if success { config.starting_loyalty } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, arrival_at: Timestamp, has_requirements: bool) -> SettlerCandidate {
        SettlerCandidate {
            id: id.to_string(),
            arrival_at,
            has_requirements,
        }
    }

    #[test]
    fn test_prerequisites_need_all_three() {
        let config = SettlementConfig::default();
        let ready = SettlementResources {
            settlers_available: 3,
            culture_points: 500,
            expansion_slots: 1,
        };
        assert!(check_settlement_prerequisites(&ready, &config).ok);

        let short = SettlementResources {
            settlers_available: 2,
            ..ready
        };
        let check = check_settlement_prerequisites(&short, &config);
        assert!(!check.ok);
        assert!(!check.settlers_ok);
        assert!(check.culture_ok && check.slots_ok);

        let no_slot = SettlementResources {
            expansion_slots: 0,
            ..ready
        };
        assert!(!check_settlement_prerequisites(&no_slot, &config).ok);
    }

    #[test]
    fn test_earliest_qualified_candidate_wins() {
        let candidates = vec![
            candidate("early_but_unqualified", 100, false),
            candidate("second", 300, true),
            candidate("first", 200, true),
        ];
        assert_eq!(resolve_settler_race(&candidates).unwrap().id, "first");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![candidate("a", 500, true), candidate("b", 500, true)];
        assert_eq!(resolve_settler_race(&candidates).unwrap().id, "a");
    }

    #[test]
    fn test_no_qualified_candidate() {
        let candidates = vec![candidate("a", 1, false)];
        assert!(resolve_settler_race(&candidates).is_none());
        assert!(resolve_settler_race(&[]).is_none());
    }

    #[test]
    fn test_outcome_requires_prerequisites_and_win() {
        let config = SettlementConfig::default();
        let ok = PrerequisiteCheck {
            ok: true,
            settlers_ok: true,
            culture_ok: true,
            slots_ok: true,
        };
        let outcome = resolve_settlement_outcome(&ok, true, &config);
        assert!(outcome.success);
        assert_eq!(outcome.loyalty_granted, 100);

        assert!(!resolve_settlement_outcome(&ok, false, &config).success);
        let failed = PrerequisiteCheck { ok: false, ..ok };
        assert_eq!(resolve_settlement_outcome(&failed, true, &config).loyalty_granted, 0);
    }
}
