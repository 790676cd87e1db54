//! Committee member models.
//!
//! Senior Area Chairs (SACs) own one or more tracks; Area Chairs (ACs)
//! carry paper assignments and must be placed under exactly one SAC.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A Senior Area Chair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeniorAreaChair {
    /// Unique SAC identifier.
    pub id: String,
    /// Tracks the SAC is willing to take.
    pub candidate_tracks: BTreeSet<String>,
    /// Ordered subset used to seed the priority load plan.
    pub priority_tracks: Vec<String>,
    /// Tracks the SAC may volunteer into.
    pub allowed_tracks: Vec<String>,
    /// Maximum paper load (`None` = uncapped).
    pub max_load: Option<u32>,
    /// Submission ids the SAC is conflicted with.
    pub conflicts: BTreeSet<String>,
}

/// An Area Chair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaChair {
    /// Unique AC identifier.
    pub id: String,
    /// Track the AC mostly reviews for.
    pub primary_track: Option<String>,
    /// Assigned submission ids. `None` = the AC has no assignment record.
    pub paper_assignments: Option<BTreeSet<String>>,
    /// Existing conflict-of-interest ids. `None` = no conflict record.
    pub conflicts: Option<BTreeSet<String>>,
}

impl SeniorAreaChair {
    /// Creates a SAC with no tracks.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            candidate_tracks: BTreeSet::new(),
            priority_tracks: Vec::new(),
            allowed_tracks: Vec::new(),
            max_load: None,
            conflicts: BTreeSet::new(),
        }
    }

    /// Adds a candidate track. Candidate tracks are also allowed tracks.
    pub fn with_candidate(mut self, track_id: impl Into<String>) -> Self {
        let track_id = track_id.into();
        if !self.allowed_tracks.contains(&track_id) {
            self.allowed_tracks.push(track_id.clone());
        }
        self.candidate_tracks.insert(track_id);
        self
    }

    /// Appends a priority track.
    pub fn with_priority(mut self, track_id: impl Into<String>) -> Self {
        self.priority_tracks.push(track_id.into());
        self
    }

    /// Replaces the allowed (volunteer) tracks.
    pub fn with_allowed(mut self, tracks: Vec<String>) -> Self {
        self.allowed_tracks = tracks;
        self
    }

    /// Sets the paper load cap.
    pub fn with_max_load(mut self, max_load: u32) -> Self {
        self.max_load = Some(max_load);
        self
    }

    /// Adds a conflicted submission.
    pub fn with_conflict(mut self, submission_id: impl Into<String>) -> Self {
        self.conflicts.insert(submission_id.into());
        self
    }
}

impl AreaChair {
    /// Creates an AC with no track and no assignment record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_track: None,
            paper_assignments: None,
            conflicts: None,
        }
    }

    /// Sets the primary track.
    pub fn with_track(mut self, track_id: impl Into<String>) -> Self {
        self.primary_track = Some(track_id.into());
        self
    }

    /// Adds an assigned submission, creating the record if needed.
    pub fn with_paper(mut self, submission_id: impl Into<String>) -> Self {
        self.paper_assignments
            .get_or_insert_with(BTreeSet::new)
            .insert(submission_id.into());
        self
    }

    /// Adds a conflict, creating the record if needed.
    pub fn with_conflict(mut self, id: impl Into<String>) -> Self {
        self.conflicts
            .get_or_insert_with(BTreeSet::new)
            .insert(id.into());
        self
    }

    /// Number of assigned papers (0 without a record).
    pub fn paper_count(&self) -> usize {
        self.paper_assignments.as_ref().map_or(0, BTreeSet::len)
    }
}
