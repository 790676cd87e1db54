//! Roster input container.
//!
//! Upstream loaders build a [`MatchingInput`] from the host platform; the
//! projection methods turn it into the plain maps the assignment passes
//! consume, so the passes never see the model structs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{AreaChair, SeniorAreaChair, Track};

/// Tracks and committee rosters for a single matching run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingInput {
    /// Submission tracks.
    pub tracks: Vec<Track>,
    /// Senior Area Chairs.
    pub sacs: Vec<SeniorAreaChair>,
    /// Area Chairs.
    pub acs: Vec<AreaChair>,
}

impl MatchingInput {
    /// Creates an input container.
    pub fn new(tracks: Vec<Track>, sacs: Vec<SeniorAreaChair>, acs: Vec<AreaChair>) -> Self {
        Self { tracks, sacs, acs }
    }

    /// Track → paper count.
    pub fn track_counts(&self) -> BTreeMap<String, u32> {
        self.tracks
            .iter()
            .map(|t| (t.id.clone(), t.paper_count))
            .collect()
    }

    /// Track → fallback neighbors, nearest first.
    pub fn track_fallback(&self) -> BTreeMap<String, Vec<String>> {
        self.tracks
            .iter()
            .map(|t| (t.id.clone(), t.fallback_adjacency.clone()))
            .collect()
    }

    /// SAC ids in roster order.
    pub fn sac_ids(&self) -> Vec<String> {
        self.sacs.iter().map(|s| s.id.clone()).collect()
    }

    /// SAC → candidate tracks.
    pub fn sac_candidates(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.sacs
            .iter()
            .map(|s| (s.id.clone(), s.candidate_tracks.clone()))
            .collect()
    }

    /// SAC → candidate tracks as a sorted list.
    pub fn sac_track_lists(&self) -> BTreeMap<String, Vec<String>> {
        self.sacs
            .iter()
            .map(|s| (s.id.clone(), s.candidate_tracks.iter().cloned().collect()))
            .collect()
    }

    /// SAC → priority tracks.
    pub fn sac_priority_tracks(&self) -> BTreeMap<String, Vec<String>> {
        self.sacs
            .iter()
            .map(|s| (s.id.clone(), s.priority_tracks.clone()))
            .collect()
    }

    /// SAC → allowed (volunteer) tracks.
    pub fn sac_allowed_tracks(&self) -> BTreeMap<String, Vec<String>> {
        self.sacs
            .iter()
            .map(|s| (s.id.clone(), s.allowed_tracks.clone()))
            .collect()
    }

    /// SAC → conflicted submissions.
    pub fn sac_conflicts(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.sacs
            .iter()
            .map(|s| (s.id.clone(), s.conflicts.clone()))
            .collect()
    }

    /// SAC → load cap, for capped SACs only.
    pub fn sac_max_loads(&self) -> BTreeMap<String, u32> {
        self.sacs
            .iter()
            .filter_map(|s| s.max_load.map(|cap| (s.id.clone(), cap)))
            .collect()
    }

    /// AC → primary track as a zero- or one-element list.
    pub fn ac_tracks(&self) -> BTreeMap<String, Vec<String>> {
        self.acs
            .iter()
            .map(|a| (a.id.clone(), a.primary_track.iter().cloned().collect()))
            .collect()
    }

    /// AC → assigned submissions, for ACs with an assignment record.
    pub fn ac_assignments(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.acs
            .iter()
            .filter_map(|a| a.paper_assignments.clone().map(|p| (a.id.clone(), p)))
            .collect()
    }

    /// AC → existing conflicts, for ACs with a conflict record.
    pub fn ac_conflicts(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.acs
            .iter()
            .filter_map(|a| a.conflicts.clone().map(|c| (a.id.clone(), c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchingInput {
        MatchingInput::new(
            vec![
                Track::new("A").with_paper_count(30).with_fallback("B"),
                Track::new("B").with_paper_count(10),
            ],
            vec![
                SeniorAreaChair::new("s1")
                    .with_candidate("A")
                    .with_priority("A")
                    .with_max_load(25),
                SeniorAreaChair::new("s2")
                    .with_candidate("B")
                    .with_candidate("A")
                    .with_conflict("p1"),
            ],
            vec![
                AreaChair::new("a1").with_track("A").with_paper("p1"),
                AreaChair::new("a2"),
            ],
        )
    }

    #[test]
    fn test_projections() {
        let input = sample();
        assert_eq!(input.track_counts()["A"], 30);
        assert_eq!(input.track_fallback()["A"], vec!["B"]);
        assert_eq!(input.sac_ids(), vec!["s1", "s2"]);
        assert_eq!(input.sac_track_lists()["s2"], vec!["A", "B"]);
        assert_eq!(input.sac_allowed_tracks()["s2"], vec!["B", "A"]);
        assert_eq!(input.sac_max_loads().len(), 1);
        assert!(input.sac_conflicts()["s2"].contains("p1"));
        assert_eq!(input.ac_tracks()["a1"], vec!["A"]);
        assert!(input.ac_tracks()["a2"].is_empty());
        assert_eq!(input.ac_assignments().len(), 1);
        assert!(input.ac_conflicts().is_empty());
    }
}
