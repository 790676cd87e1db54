//! Priority-track load planning with volunteering.
//!
//! # Algorithm
//!
//! 1. Seed: every track is split equally (integer division) across the
//!    SACs that list it as a priority track; the remainder goes one paper
//!    each to the lexicographically smallest ids.
//! 2. Tracks with fewer than `max(min_papers, ceil(alpha * median))`
//!    papers are "small" and never re-split.
//! 3. Sweep SACs with two or more allowed tracks, lightest first. For each
//!    SAC `u`, evaluate re-splitting every allowed non-small track it does
//!    not already hold across `donors ∪ {u}`, and apply the single best
//!    move if it strictly shrinks the global load range.
//! 4. Stop when no SAC can volunteer, when a sweep changes nothing, or at
//!    the iteration cap.
//!
//! Candidate moves are evaluated as [`ShareDelta`]s against the current
//! totals; only the winning delta is applied.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info};

use crate::config::PriorityTrackLoadConfig;
use crate::models::{LoadPlan, StopReason};
use crate::rules::{remainder_recipients, volunteer_order_key};

/// Splits `total` equally across `participants`.
///
/// Returns `(participant, share)` in input order. Shares differ by at
/// most one; the larger shares go to the smallest ids.
pub fn equal_split<'a>(total: u32, participants: &[&'a str]) -> Vec<(&'a str, u32)> {
    if participants.is_empty() {
        return Vec::new();
    }
    let n = participants.len() as u32;
    let (base, rem) = (total / n, total % n);
    let bonus = remainder_recipients(participants, rem as usize);
    participants
        .iter()
        .map(|&p| (p, base + u32::from(bonus.contains(&p))))
        .collect()
}

/// Median of track sizes; mean of the middle pair for even lengths.
fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

fn load_range(totals: impl IntoIterator<Item = u32>) -> u32 {
    let mut max = None::<u32>;
    let mut min = None::<u32>;
    for t in totals {
        max = Some(max.map_or(t, |m| m.max(t)));
        min = Some(min.map_or(t, |m| m.min(t)));
    }
    match (max, min) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

/// One SAC's share change on a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareChange {
    /// SAC id.
    pub sac: String,
    /// Share before the move.
    pub old: u32,
    /// Share after the move.
    pub new: u32,
}

/// A proposed re-split of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDelta {
    /// Track being re-split.
    pub track: String,
    /// Volunteer joining the track.
    pub volunteer: String,
    /// Changed shares (unchanged participants are omitted).
    pub changes: Vec<ShareChange>,
}

impl ShareDelta {
    /// Re-splits `track` equally across `donors` plus `volunteer`.
    fn propose(
        track: &str,
        papers: u32,
        donors: &[&str],
        volunteer: &str,
        shares: &BTreeMap<String, BTreeMap<String, u32>>,
    ) -> Self {
        let mut participants: Vec<&str> = donors.to_vec();
        participants.push(volunteer);
        participants.sort_unstable();
        participants.dedup();

        let changes = equal_split(papers, &participants)
            .into_iter()
            .filter_map(|(sac, new)| {
                let old = share_of(shares, sac, track);
                // The volunteer always gets an entry, even a zero one.
                (new != old || sac == volunteer).then(|| ShareChange {
                    sac: sac.to_string(),
                    old,
                    new,
                })
            })
            .collect();
        Self {
            track: track.to_string(),
            volunteer: volunteer.to_string(),
            changes,
        }
    }

    fn total_after(&self, sac: &str, total: u32) -> u32 {
        match self.changes.iter().find(|c| c.sac == sac) {
            Some(c) => total - c.old + c.new,
            None => total,
        }
    }

    /// Global load range if this delta were applied.
    pub fn range_after(&self, totals: &BTreeMap<String, u32>) -> u32 {
        load_range(totals.iter().map(|(s, &t)| self.total_after(s, t)))
    }

    fn apply(
        &self,
        shares: &mut BTreeMap<String, BTreeMap<String, u32>>,
        totals: &mut BTreeMap<String, u32>,
    ) {
        for change in &self.changes {
            shares
                .entry(change.sac.clone())
                .or_default()
                .insert(self.track.clone(), change.new);
            let total = totals.entry(change.sac.clone()).or_insert(0);
            *total = *total - change.old + change.new;
        }
    }
}

fn share_of(shares: &BTreeMap<String, BTreeMap<String, u32>>, sac: &str, track: &str) -> u32 {
    shares
        .get(sac)
        .and_then(|s| s.get(track))
        .copied()
        .unwrap_or(0)
}

/// Computes per-SAC paper targets seeded from priority tracks.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use u_committee::assign::LoadPlanner;
/// use u_committee::models::StopReason;
///
/// let sacs = vec!["s1".to_string(), "s2".to_string()];
/// let papers = BTreeMap::from([("A".to_string(), 100), ("B".to_string(), 0)]);
/// let priority = BTreeMap::from([
///     ("s1".to_string(), vec!["A".to_string()]),
///     ("s2".to_string(), vec!["A".to_string()]),
/// ]);
/// let allowed = BTreeMap::from([
///     ("s1".to_string(), vec!["A".to_string(), "B".to_string()]),
///     ("s2".to_string(), vec!["A".to_string(), "B".to_string()]),
/// ]);
///
/// let plan = LoadPlanner::new().compute_priority_track_load_plan(&sacs, &papers, &priority, &allowed);
/// assert_eq!(plan.per_sac_total_papers["s1"], 50);
/// assert_eq!(plan.stopped, StopReason::NoImprovement);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadPlanner {
    config: PriorityTrackLoadConfig,
}

impl LoadPlanner {
    /// Creates a planner with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the planner parameters.
    pub fn with_config(mut self, config: PriorityTrackLoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Small-track threshold for the given track sizes.
    pub fn small_track_threshold(&self, papers_by_track: &BTreeMap<String, u32>) -> u32 {
        let sizes: Vec<u32> = papers_by_track.values().copied().collect();
        let scaled = (self.config.small_track_percent_of_median * median(&sizes)).ceil();
        self.config.small_track_min_papers.max(scaled as u32)
    }

    /// Builds the load plan.
    ///
    /// Tracks no SAC lists as a priority are left unallocated.
    pub fn compute_priority_track_load_plan(
        &self,
        sac_ids: &[String],
        papers_by_track: &BTreeMap<String, u32>,
        sac_priority_tracks: &BTreeMap<String, Vec<String>>,
        sac_allowed_tracks: &BTreeMap<String, Vec<String>>,
    ) -> LoadPlan {
        info!(
            sacs = sac_ids.len(),
            tracks = papers_by_track.len(),
            small_track_min = self.config.small_track_min_papers,
            small_track_percent = self.config.small_track_percent_of_median,
            "computing priority track load plan"
        );

        let mut shares: BTreeMap<String, BTreeMap<String, u32>> =
            sac_ids.iter().map(|s| (s.clone(), BTreeMap::new())).collect();

        for (track, &papers) in papers_by_track {
            let eligible: Vec<&str> = sac_ids
                .iter()
                .filter(|s| {
                    sac_priority_tracks
                        .get(s.as_str())
                        .is_some_and(|p| p.contains(track))
                })
                .map(String::as_str)
                .collect();
            if eligible.is_empty() {
                debug!(track = %track, "no priority SACs, skipped during seeding");
                continue;
            }
            for (sac, share) in equal_split(papers, &eligible) {
                shares.entry(sac.to_string()).or_default().insert(track.clone(), share);
            }
        }

        let mut totals: BTreeMap<String, u32> = shares
            .iter()
            .map(|(s, per_track)| (s.clone(), per_track.values().sum()))
            .collect();

        let threshold = self.small_track_threshold(papers_by_track);
        debug!(threshold, range = load_range(totals.values().copied()), "seeded priority shares");

        let candidates: Vec<&str> = sac_ids
            .iter()
            .filter(|s| sac_allowed_tracks.get(s.as_str()).is_some_and(|a| a.len() >= 2))
            .map(String::as_str)
            .collect();

        let mut volunteered: BTreeMap<String, BTreeSet<String>> =
            sac_ids.iter().map(|s| (s.clone(), BTreeSet::new())).collect();
        let mut iterations = 0;
        let mut stopped = StopReason::MaxIterations;

        while iterations < self.config.max_iterations {
            iterations += 1;
            if candidates.is_empty() {
                debug!(iteration = iterations, "no SAC has multiple allowed tracks");
                stopped = StopReason::NoCandidates;
                break;
            }

            let mut ordered = candidates.clone();
            ordered.sort_by_key(|s| volunteer_order_key(totals.get(*s).copied().unwrap_or(0)));

            let mut improved = false;
            for u in ordered {
                let current = load_range(totals.values().copied());
                let allowed: HashSet<&str> = sac_allowed_tracks
                    .get(u)
                    .map(|a| a.iter().map(String::as_str).collect())
                    .unwrap_or_default();

                let mut best: Option<(ShareDelta, u32)> = None;
                for (track, &papers) in papers_by_track {
                    if !allowed.contains(track.as_str()) {
                        continue;
                    }
                    if papers < threshold {
                        debug!(track = %track, papers, threshold, "small track skipped");
                        continue;
                    }
                    let donors: Vec<&str> = sac_ids
                        .iter()
                        .map(String::as_str)
                        .filter(|d| share_of(&shares, d, track) > 0)
                        .collect();
                    if donors.is_empty() || donors.contains(&u) {
                        continue;
                    }
                    let delta = ShareDelta::propose(track, papers, &donors, u, &shares);
                    let score = delta.range_after(&totals);
                    let gain = current.saturating_sub(score);
                    if score < current && best.as_ref().map_or(true, |(_, g)| gain > *g) {
                        best = Some((delta, gain));
                    }
                }

                let Some((delta, _)) = best else {
                    debug!(iteration = iterations, sac = u, "no improving track for volunteer");
                    continue;
                };
                delta.apply(&mut shares, &mut totals);
                debug!(
                    iteration = iterations,
                    sac = u,
                    track = %delta.track,
                    range_before = current,
                    range_after = load_range(totals.values().copied()),
                    "applied volunteer move"
                );
                volunteered
                    .entry(u.to_string())
                    .or_default()
                    .insert(delta.track);
                improved = true;
            }

            if !improved {
                stopped = StopReason::NoImprovement;
                break;
            }
        }

        info!(
            iterations,
            stopped = %stopped,
            range = load_range(totals.values().copied()),
            "priority track load plan finished"
        );

        LoadPlan {
            per_sac_track_paper_targets: shares,
            per_sac_total_papers: totals,
            volunteered_tracks: volunteered,
            iterations,
            stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn lists(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries.iter().map(|(k, v)| (k.to_string(), ids(v))).collect()
    }

    fn papers(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|(t, n)| (t.to_string(), *n)).collect()
    }

    #[test]
    fn test_equal_split_remainder() {
        let split = equal_split(7, &["s2", "s1", "s3"]);
        assert_eq!(split, vec![("s2", 2), ("s1", 3), ("s3", 2)]);
        assert!(equal_split(5, &[]).is_empty());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5, 1, 3]), 3.0);
        assert_eq!(median(&[4, 1, 3, 10]), 3.5);
    }

    #[test]
    fn test_threshold_floor_and_percent() {
        let planner = LoadPlanner::new();
        assert_eq!(planner.small_track_threshold(&papers(&[("A", 100), ("B", 0)])), 10);

        let big = papers(&[("A", 400), ("B", 600), ("C", 500)]);
        // ceil(0.2 * 500) = 100
        assert_eq!(planner.small_track_threshold(&big), 100);
    }

    #[test]
    fn test_zero_paper_track_never_receives_volunteers() {
        let sacs = ids(&["s1", "s2"]);
        let plan = LoadPlanner::new().compute_priority_track_load_plan(
            &sacs,
            &papers(&[("A", 100), ("B", 0)]),
            &lists(&[("s1", &["A"]), ("s2", &["A"])]),
            &lists(&[("s1", &["A", "B"]), ("s2", &["A", "B"])]),
        );
        assert_eq!(plan.per_sac_track_paper_targets["s1"]["A"], 50);
        assert_eq!(plan.per_sac_track_paper_targets["s2"]["A"], 50);
        assert!(plan.volunteered_tracks.values().all(BTreeSet::is_empty));
        assert_eq!(plan.stopped, StopReason::NoImprovement);
        assert_eq!(plan.iterations, 1);
    }

    #[test]
    fn test_volunteering_shrinks_range_and_conserves_papers() {
        let sacs = ids(&["s1", "s2", "s3"]);
        let by_track = papers(&[("A", 60), ("B", 30)]);
        let plan = LoadPlanner::new().compute_priority_track_load_plan(
            &sacs,
            &by_track,
            &lists(&[("s1", &["A"]), ("s2", &["B"]), ("s3", &["B"])]),
            &lists(&[("s1", &["A"]), ("s2", &["A", "B"]), ("s3", &["A", "B"])]),
        );

        assert_eq!(plan.per_sac_total_papers["s1"], 20);
        assert_eq!(plan.per_sac_total_papers["s2"], 35);
        assert_eq!(plan.per_sac_total_papers["s3"], 35);
        assert_eq!(plan.load_range(), 15);
        assert!(plan.volunteered_tracks["s2"].contains("A"));
        assert!(plan.volunteered_tracks["s3"].contains("A"));
        assert!(plan.volunteered_tracks["s1"].is_empty());
        for (track, &n) in &by_track {
            assert_eq!(plan.track_total(track), n, "track {track} not conserved");
        }
        assert_eq!(plan.stopped, StopReason::NoImprovement);
        assert_eq!(plan.iterations, 2);
    }

    #[test]
    fn test_iteration_cap() {
        let config = PriorityTrackLoadConfig::default().with_max_iterations(1);
        let plan = LoadPlanner::new().with_config(config).compute_priority_track_load_plan(
            &ids(&["s1", "s2", "s3"]),
            &papers(&[("A", 60), ("B", 30)]),
            &lists(&[("s1", &["A"]), ("s2", &["B"]), ("s3", &["B"])]),
            &lists(&[("s1", &["A"]), ("s2", &["A", "B"]), ("s3", &["A", "B"])]),
        );
        assert_eq!(plan.stopped, StopReason::MaxIterations);
        assert_eq!(plan.iterations, 1);
        assert!(plan.is_best_effort());
    }

    #[test]
    fn test_no_candidates() {
        let plan = LoadPlanner::new().compute_priority_track_load_plan(
            &ids(&["s1", "s2"]),
            &papers(&[("A", 40), ("B", 20)]),
            &lists(&[("s1", &["A"]), ("s2", &["B"])]),
            &lists(&[("s1", &["A"]), ("s2", &["B"])]),
        );
        assert_eq!(plan.stopped, StopReason::NoCandidates);
        assert_eq!(plan.iterations, 1);
        assert_eq!(plan.per_sac_total_papers["s1"], 40);
    }

    #[test]
    fn test_unclaimed_track_is_not_allocated() {
        let plan = LoadPlanner::new().compute_priority_track_load_plan(
            &ids(&["s1"]),
            &papers(&[("A", 40), ("B", 20)]),
            &lists(&[("s1", &["A"])]),
            &lists(&[("s1", &["A"])]),
        );
        assert_eq!(plan.track_total("B"), 0);
        assert_eq!(plan.per_sac_total_papers["s1"], 40);
    }

    #[test]
    fn test_share_delta_range_without_cloning() {
        let mut shares: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        shares.insert("s1".into(), BTreeMap::from([("A".into(), 60)]));
        shares.insert("s2".into(), BTreeMap::new());
        let totals = BTreeMap::from([("s1".to_string(), 60), ("s2".to_string(), 0)]);

        let delta = ShareDelta::propose("A", 60, &["s1"], "s2", &shares);
        assert_eq!(delta.changes.len(), 2);
        assert_eq!(delta.range_after(&totals), 0);
    }
}
