//! Result models produced by the assignment passes.
//!
//! None of these are persisted by the engine; callers turn them into
//! platform records (group memberships, assignment edges).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Why the priority load planner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No SAC has two or more allowed tracks.
    NoCandidates,
    /// A full sweep found no improving volunteer move.
    NoImprovement,
    /// The iteration cap was reached.
    MaxIterations,
}

impl StopReason {
    /// Wire name (`no_candidates`, `no_improvement`, `max_iterations`).
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::NoCandidates => "no_candidates",
            StopReason::NoImprovement => "no_improvement",
            StopReason::MaxIterations => "max_iterations",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-SAC paper targets from the priority load planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPlan {
    /// SAC → track → paper share.
    pub per_sac_track_paper_targets: BTreeMap<String, BTreeMap<String, u32>>,
    /// SAC → total papers across tracks.
    pub per_sac_total_papers: BTreeMap<String, u32>,
    /// SAC → tracks it volunteered into.
    pub volunteered_tracks: BTreeMap<String, BTreeSet<String>>,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Stop reason.
    pub stopped: StopReason,
}

impl LoadPlan {
    /// Whether the plan hit the iteration cap and may be suboptimal.
    pub fn is_best_effort(&self) -> bool {
        self.stopped == StopReason::MaxIterations
    }

    /// Sum of all SAC shares for a track.
    pub fn track_total(&self, track_id: &str) -> u32 {
        self.per_sac_track_paper_targets
            .values()
            .filter_map(|shares| shares.get(track_id))
            .sum()
    }

    /// Max minus min of the per-SAC totals (0 when there are no SACs).
    pub fn load_range(&self) -> u32 {
        let max = self.per_sac_total_papers.values().max().copied().unwrap_or(0);
        let min = self.per_sac_total_papers.values().min().copied().unwrap_or(0);
        max - min
    }
}

/// A committed track merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// Track whose fallback list proposed the merge.
    pub track: String,
    /// Neighbor merged into `track`'s component.
    pub neighbor: String,
    /// Global disparity before the merge.
    pub disparity_before: f64,
    /// Global disparity after the merge.
    pub disparity_after: f64,
    /// Weighted merge score.
    pub score: f64,
}

/// Result of rebalancing SACs across merged tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// SAC → every track in its primary track's component (sorted).
    pub sac_to_tracks: BTreeMap<String, Vec<String>>,
    /// SAC → rounded per-SAC load of its component.
    pub sac_to_load: BTreeMap<String, u32>,
    /// Track → tracks merged into it, in merge order.
    pub track_graph: BTreeMap<String, Vec<String>>,
    /// Committed merges, in order.
    pub history: Vec<MergeRecord>,
}

/// Result of placing ACs under SACs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcAssignment {
    /// SAC → ACs in placement order. SACs without ACs are absent.
    pub sac_to_acs: BTreeMap<String, Vec<String>>,
    /// SAC → papers carried by its ACs.
    pub sac_loads: BTreeMap<String, u32>,
    /// ACs placed by ignoring a SAC's load cap.
    pub over_capacity: Vec<String>,
    /// ACs that could not be placed because no SAC exists.
    pub unplaced: Vec<String>,
}

impl AcAssignment {
    /// SAC holding `ac_id`, if any.
    pub fn sac_of(&self, ac_id: &str) -> Option<&str> {
        self.sac_to_acs
            .iter()
            .find(|(_, acs)| acs.iter().any(|a| a == ac_id))
            .map(|(sac, _)| sac.as_str())
    }

    /// Number of placed ACs.
    pub fn placed_count(&self) -> usize {
        self.sac_to_acs.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_wire_names() {
        assert_eq!(StopReason::NoCandidates.to_string(), "no_candidates");
        let json = serde_json::to_string(&StopReason::MaxIterations).unwrap();
        assert_eq!(json, "\"max_iterations\"");
        let back: StopReason = serde_json::from_str("\"no_improvement\"").unwrap();
        assert_eq!(back, StopReason::NoImprovement);
    }

    #[test]
    fn test_load_plan_helpers() {
        let mut targets = BTreeMap::new();
        targets.insert("s1".to_string(), BTreeMap::from([("A".to_string(), 30)]));
        targets.insert("s2".to_string(), BTreeMap::from([("A".to_string(), 20)]));
        let plan = LoadPlan {
            per_sac_track_paper_targets: targets,
            per_sac_total_papers: BTreeMap::from([("s1".to_string(), 30), ("s2".to_string(), 20)]),
            volunteered_tracks: BTreeMap::new(),
            iterations: 10_000,
            stopped: StopReason::MaxIterations,
        };
        assert_eq!(plan.track_total("A"), 50);
        assert_eq!(plan.track_total("B"), 0);
        assert_eq!(plan.load_range(), 10);
        assert!(plan.is_best_effort());
    }

    #[test]
    fn test_ac_assignment_lookup() {
        let mut result = AcAssignment::default();
        result
            .sac_to_acs
            .insert("s1".into(), vec!["a1".into(), "a2".into()]);
        assert_eq!(result.sac_of("a2"), Some("s1"));
        assert_eq!(result.sac_of("a3"), None);
        assert_eq!(result.placed_count(), 2);
    }
}
