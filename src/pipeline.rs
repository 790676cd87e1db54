//! End-to-end SAC matching run.
//!
//! # Algorithm
//!
//! 1. Validate configuration and roster.
//! 2. Partition tracks among SACs:
//!    - [`PartitionStrategy::PriorityLoadPlan`]: per-SAC paper targets with
//!      volunteering, then widen each SAC's tracks by its volunteered ones.
//!    - [`PartitionStrategy::SingleTrackMerge`]: one primary track per SAC,
//!      then merge tracks until loads are balanced.
//! 3. Place ACs under SACs over the resulting membership.
//! 4. Derive conflict transfers and SAC paper assignments.
//!
//! Every intermediate result is kept in [`MatchingOutcome`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assign::{AcAssignmentRequest, AreaChairAssigner, LoadPlanner, TrackAssigner, TrackMerger};
use crate::config::EngineConfig;
use crate::handoff::{conflicts_to_transfer, infer_sac_paper_assignments, merge_sac_tracks_with_volunteers};
use crate::metrics::LoadKpi;
use crate::models::{AcAssignment, LoadPlan, MatchingInput, MergeOutcome};
use crate::validation::{validate_config, validate_input, ValidationError};

/// How tracks are partitioned among SACs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Priority-track load plan with volunteering.
    PriorityLoadPlan,
    /// Single primary track per SAC, then track merging.
    SingleTrackMerge,
}

/// Result of a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingOutcome {
    /// Strategy used to partition tracks.
    pub strategy: PartitionStrategy,
    /// SAC → primary track (`SingleTrackMerge` only).
    pub primary_tracks: Option<BTreeMap<String, String>>,
    /// Load plan (`PriorityLoadPlan` only).
    pub load_plan: Option<LoadPlan>,
    /// Merge result (`SingleTrackMerge` only).
    pub merge: Option<MergeOutcome>,
    /// SAC → tracks used for AC placement.
    pub sac_tracks: BTreeMap<String, Vec<String>>,
    /// AC placement.
    pub ac_assignment: AcAssignment,
    /// AC → conflicts inherited from its SAC.
    pub conflict_transfers: BTreeMap<String, BTreeSet<String>>,
    /// SAC → papers inherited from its ACs.
    pub sac_papers: BTreeMap<String, BTreeSet<String>>,
}

impl MatchingOutcome {
    /// Merge graph of the run. Empty for `PriorityLoadPlan`.
    pub fn track_graph(&self) -> BTreeMap<String, Vec<String>> {
        self.merge
            .as_ref()
            .map(|m| m.track_graph.clone())
            .unwrap_or_default()
    }
}

/// SAC → priority tracks, using the candidate tracks of SACs that list none.
fn priority_tracks(input: &MatchingInput) -> BTreeMap<String, Vec<String>> {
    let candidates = input.sac_track_lists();
    let mut priority = input.sac_priority_tracks();
    for (sac, tracks) in priority.iter_mut() {
        if tracks.is_empty() {
            if let Some(c) = candidates.get(sac) {
                tracks.clone_from(c);
            }
        }
    }
    priority
}

/// Runs the full SAC matching flow.
///
/// # Example
///
/// ```
/// use u_committee::pipeline::{PartitionStrategy, SacMatchingPipeline};
/// use u_committee::models::{AreaChair, MatchingInput, SeniorAreaChair, Track};
///
/// let input = MatchingInput::new(
///     vec![Track::new("A").with_paper_count(10)],
///     vec![SeniorAreaChair::new("s1").with_candidate("A")],
///     vec![AreaChair::new("a1").with_track("A").with_paper("p1")],
/// );
///
/// let outcome = SacMatchingPipeline::new().run(&input).unwrap();
/// assert_eq!(outcome.strategy, PartitionStrategy::SingleTrackMerge);
/// assert_eq!(outcome.ac_assignment.sac_of("a1"), Some("s1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SacMatchingPipeline {
    config: EngineConfig,
}

impl SacMatchingPipeline {
    /// Creates a pipeline with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Strategy selected by the current configuration.
    pub fn strategy(&self) -> PartitionStrategy {
        if self.config.priority_track_loads.enabled {
            PartitionStrategy::PriorityLoadPlan
        } else {
            PartitionStrategy::SingleTrackMerge
        }
    }

    /// Per-SAC caps: each SAC's own `max_load`, overridden by config.
    fn caps(&self, input: &MatchingInput) -> BTreeMap<String, u32> {
        let mut caps = input.sac_max_loads();
        if let Some(overrides) = &self.config.sac_max_loads {
            caps.extend(overrides.iter().map(|(s, &c)| (s.clone(), c)));
        }
        caps
    }

    /// Validates and runs the matching flow.
    ///
    /// # Errors
    /// Returns every configuration and roster problem found.
    pub fn run(&self, input: &MatchingInput) -> Result<MatchingOutcome, Vec<ValidationError>> {
        let mut errors = validate_config(&self.config).err().unwrap_or_default();
        errors.extend(validate_input(input).err().unwrap_or_default());
        if !errors.is_empty() {
            return Err(errors);
        }

        let strategy = self.strategy();
        info!(
            strategy = ?strategy,
            tracks = input.tracks.len(),
            sacs = input.sacs.len(),
            acs = input.acs.len(),
            "starting SAC matching"
        );

        let track_counts = input.track_counts();
        let original_tracks = input.sac_track_lists();

        let mut primary_tracks = None;
        let mut load_plan = None;
        let mut merge = None;
        let sac_tracks = match strategy {
            PartitionStrategy::PriorityLoadPlan => {
                let priority = priority_tracks(input);
                let plan = LoadPlanner::new()
                    .with_config(self.config.priority_track_loads.clone())
                    .compute_priority_track_load_plan(
                        &input.sac_ids(),
                        &track_counts,
                        &priority,
                        &input.sac_allowed_tracks(),
                    );
                let widened = merge_sac_tracks_with_volunteers(&original_tracks, &plan.volunteered_tracks);
                load_plan = Some(plan);
                widened
            }
            PartitionStrategy::SingleTrackMerge => {
                let primary = TrackAssigner::new().assign_primary_track(&input.sac_candidates(), &track_counts);
                let outcome = TrackMerger::new()
                    .with_config(self.config.merge.clone())
                    .rebalance_sacs_across_tracks(
                        &primary,
                        &track_counts,
                        &input.track_fallback(),
                        self.config.merge.disparity_threshold,
                    );
                let tracks = outcome.sac_to_tracks.clone();
                primary_tracks = Some(primary);
                merge = Some(outcome);
                tracks
            }
        };

        let ac_papers = input.ac_assignments();
        let request = AcAssignmentRequest::new(
            input.ac_tracks(),
            sac_tracks.clone(),
            track_counts,
            ac_papers.clone(),
        )
        .with_original_tracks(original_tracks)
        .with_track_graph(merge.as_ref().map(|m| m.track_graph.clone()).unwrap_or_default())
        .with_conflicts(input.sac_conflicts())
        .with_max_loads(self.caps(input));
        let ac_assignment = AreaChairAssigner::new().assign_acs_to_sac(&request);

        let conflict_transfers =
            conflicts_to_transfer(&ac_assignment.sac_to_acs, &input.sac_conflicts(), &input.ac_conflicts());
        let sac_papers = infer_sac_paper_assignments(&ac_assignment.sac_to_acs, &ac_papers);

        let kpi = LoadKpi::calculate(&ac_assignment.sac_loads);
        info!(
            placed = ac_assignment.placed_count(),
            unplaced = ac_assignment.unplaced.len(),
            over_capacity = ac_assignment.over_capacity.len(),
            transfers = conflict_transfers.len(),
            max_load = kpi.max,
            min_load = kpi.min,
            disparity = kpi.disparity,
            balanced = kpi.is_balanced(self.config.merge.disparity_threshold),
            "SAC matching finished"
        );

        Ok(MatchingOutcome {
            strategy,
            primary_tracks,
            load_plan,
            merge,
            sac_tracks,
            ac_assignment,
            conflict_transfers,
            sac_papers,
        })
    }
}
