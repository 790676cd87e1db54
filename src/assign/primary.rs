//! Scarcity-first primary track selection.
//!
//! # Algorithm
//!
//! 1. Index `track → unassigned eligible SACs`.
//! 2. Forced pass: a SAC with exactly one candidate takes it.
//! 3. Scarcity loop: pop the track with the smallest key
//!    `-(demand / max(eligible_count, 1))`, where `demand` is the track's
//!    paper count and `eligible_count` is the number of SACs that listed
//!    the track at all. The most constrained free SAC takes the track
//!    ([`sac_pick_key`]) and each of its candidate tracks is pushed again.
//!    A popped track with no free SAC is skipped.
//! 4. Swap pass: swap two SACs' tracks when both sides accept the other's
//!    track and the range of their two loads strictly drops. Track counts
//!    and loads are refreshed once per full pass, not after every swap.
//!
//! # Complexity
//! O((S + T) log T · d) for the greedy phase (d = max candidates per SAC),
//! O(S²) per swap pass.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::rules::{sac_pick_key, scarcity_key, ScarcityEntry, ScarcityHeap};

/// Assigns each SAC exactly one primary track from its candidates.
///
/// # Example
///
/// ```
/// use std::collections::{BTreeMap, BTreeSet};
/// use u_committee::assign::TrackAssigner;
///
/// let candidates = BTreeMap::from([
///     ("s1".to_string(), BTreeSet::from(["A".to_string()])),
///     ("s2".to_string(), BTreeSet::from(["A".to_string(), "B".to_string()])),
/// ]);
/// let demand = BTreeMap::from([("A".to_string(), 5), ("B".to_string(), 3)]);
///
/// let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
/// assert_eq!(primary["s1"], "A");
/// assert_eq!(primary["s2"], "B");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackAssigner;

impl TrackAssigner {
    /// Creates a track assigner.
    pub fn new() -> Self {
        Self
    }

    /// Returns `SAC → primary track`.
    ///
    /// `demand` maps each track to its paper count. A SAC whose candidates
    /// are all missing from `demand` falls back to its smallest candidate
    /// id; a SAC with no candidates is left out of the result.
    pub fn assign_primary_track(
        &self,
        candidates: &BTreeMap<String, BTreeSet<String>>,
        demand: &BTreeMap<String, u32>,
    ) -> BTreeMap<String, String> {
        info!(
            sacs = candidates.len(),
            tracks = demand.len(),
            "assigning primary tracks"
        );

        let mut pools: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for (sac, tracks) in candidates {
            for track in tracks {
                pools.entry(track.as_str()).or_default().insert(sac.as_str());
            }
        }
        let eligible: HashMap<&str, usize> =
            pools.iter().map(|(&track, pool)| (track, pool.len())).collect();

        let mut assigned: BTreeMap<String, String> = BTreeMap::new();

        for (sac, tracks) in candidates {
            if tracks.len() != 1 {
                continue;
            }
            if let Some(track) = tracks.iter().next() {
                debug!(sac = %sac, track = %track, "forced assignment");
                take(sac, track, candidates, &mut pools, &mut assigned);
            }
        }

        let mut heap = ScarcityHeap::new();
        for track in demand.keys() {
            heap.push(Reverse(scarcity_entry(track, demand, &eligible)));
        }

        while assigned.len() < candidates.len() {
            let Some(Reverse(entry)) = heap.pop() else {
                break;
            };
            let track = entry.track.as_str();
            let Some(best) = pools.get(track).and_then(|pool| {
                pool.iter().copied().min_by_key(|sac| {
                    let degree = candidates.get(*sac).map_or(0, BTreeSet::len);
                    sac_pick_key(degree, degree.saturating_sub(1))
                })
            }) else {
                continue;
            };
            let best = best.to_string();
            debug!(sac = %best, track, key = entry.key, "scarcity assignment");
            take(&best, track, candidates, &mut pools, &mut assigned);

            if let Some(options) = candidates.get(&best) {
                for option in options.iter().filter(|t| demand.contains_key(*t)) {
                    heap.push(Reverse(scarcity_entry(option, demand, &eligible)));
                }
            }
        }

        for (sac, tracks) in candidates {
            if assigned.contains_key(sac) {
                continue;
            }
            match tracks.iter().next() {
                Some(track) => {
                    warn!(sac = %sac, track = %track, "no scarcity slot left, using first candidate");
                    assigned.insert(sac.clone(), track.clone());
                }
                None => warn!(sac = %sac, "SAC has no candidate tracks, left unassigned"),
            }
        }

        let passes = improve_by_swaps(&mut assigned, candidates, demand);
        info!(assigned = assigned.len(), swap_passes = passes, "primary tracks assigned");
        assigned
    }
}

fn take(
    sac: &str,
    track: &str,
    candidates: &BTreeMap<String, BTreeSet<String>>,
    pools: &mut HashMap<&str, BTreeSet<&str>>,
    assigned: &mut BTreeMap<String, String>,
) {
    if let Some(options) = candidates.get(sac) {
        for option in options {
            if let Some(pool) = pools.get_mut(option.as_str()) {
                pool.remove(sac);
            }
        }
    }
    assigned.insert(sac.to_string(), track.to_string());
}

fn scarcity_entry(
    track: &str,
    demand: &BTreeMap<String, u32>,
    eligible: &HashMap<&str, usize>,
) -> ScarcityEntry {
    let papers = demand.get(track).copied().unwrap_or(0);
    ScarcityEntry {
        key: scarcity_key(papers as f64, eligible.get(track).copied().unwrap_or(0)),
        track: track.to_string(),
    }
}

/// Per-SAC load of a track: `paper_count / max(sacs_on_track, 1)`.
fn track_load(track: &str, demand: &BTreeMap<String, u32>, counts: &HashMap<String, usize>) -> f64 {
    let papers = demand.get(track).copied().unwrap_or(0) as f64;
    papers / counts.get(track).copied().unwrap_or(0).max(1) as f64
}

fn count_sacs(assigned: &BTreeMap<String, String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for track in assigned.values() {
        *counts.entry(track.clone()).or_insert(0) += 1;
    }
    counts
}

/// Runs swap passes to a fixed point. Returns the number of passes.
fn improve_by_swaps(
    assigned: &mut BTreeMap<String, String>,
    candidates: &BTreeMap<String, BTreeSet<String>>,
    demand: &BTreeMap<String, u32>,
) -> usize {
    let sacs: Vec<String> = assigned.keys().cloned().collect();
    let mut counts = count_sacs(assigned);
    let mut loads: HashMap<String, f64> = sacs
        .iter()
        .map(|s| (s.clone(), track_load(&assigned[s], demand, &counts)))
        .collect();

    let mut passes = 0;
    loop {
        passes += 1;
        let mut improved = false;
        for i in 0..sacs.len() {
            for j in (i + 1)..sacs.len() {
                let (si, sj) = (&sacs[i], &sacs[j]);
                let (ti, tj) = (assigned[si].clone(), assigned[sj].clone());
                if ti == tj || !accepts(candidates, si, &tj) || !accepts(candidates, sj, &ti) {
                    continue;
                }
                // Counts are from the start of the pass.
                let li_new = track_load(&tj, demand, &counts);
                let lj_new = track_load(&ti, demand, &counts);
                let range_old = (loads[si] - loads[sj]).abs();
                let range_new = (li_new - lj_new).abs();
                if range_new < range_old {
                    debug!(a = %si, b = %sj, range_old, range_new, "swapping tracks");
                    assigned.insert(si.clone(), tj);
                    assigned.insert(sj.clone(), ti);
                    loads.insert(si.clone(), li_new);
                    loads.insert(sj.clone(), lj_new);
                    improved = true;
                }
            }
        }
        if !improved {
            return passes;
        }
        counts = count_sacs(assigned);
        for sac in &sacs {
            loads.insert(sac.clone(), track_load(&assigned[sac], demand, &counts));
        }
    }
}

fn accepts(candidates: &BTreeMap<String, BTreeSet<String>>, sac: &str, track: &str) -> bool {
    candidates.get(sac).is_some_and(|c| c.contains(track))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cands(entries: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
        entries
            .iter()
            .map(|(s, ts)| (s.to_string(), ts.iter().map(|t| t.to_string()).collect()))
            .collect()
    }

    fn counts(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|(t, n)| (t.to_string(), *n)).collect()
    }

    #[test]
    fn test_forced_then_scarcity() {
        let candidates = cands(&[("s1", &["A"]), ("s2", &["A", "B"])]);
        let demand = counts(&[("A", 5), ("B", 3)]);

        let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
        assert_eq!(primary["s1"], "A");
        assert_eq!(primary["s2"], "B");
    }

    #[test]
    fn test_every_sac_gets_a_candidate() {
        let candidates = cands(&[
            ("s1", &["A", "B", "C"]),
            ("s2", &["A", "B"]),
            ("s3", &["B", "C"]),
            ("s4", &["C"]),
            ("s5", &["A", "C"]),
        ]);
        let demand = counts(&[("A", 40), ("B", 25), ("C", 60)]);

        let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
        assert_eq!(primary.len(), candidates.len());
        for (sac, track) in &primary {
            assert!(candidates[sac].contains(track), "{sac} got non-candidate {track}");
        }
        assert_eq!(primary["s4"], "C");
    }

    #[test]
    fn test_scarcest_track_keeps_winning() {
        // Same eligible pool for both tracks, so A's key stays below B's
        // for every pop and all SACs land on A.
        let all: &[&str] = &["A", "B"];
        let candidates = cands(&[("s1", all), ("s2", all), ("s3", all), ("s4", all)]);
        let demand = counts(&[("A", 90), ("B", 30)]);

        let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
        assert_eq!(primary.len(), 4);
        assert!(primary.values().all(|t| t == "A"), "{primary:?}");
    }

    #[test]
    fn test_eligible_count_dilutes_demand() {
        // A: 60 papers over 3 eligible SACs (-20); B: 30 over 1 (-30).
        let candidates = cands(&[
            ("s1", &["A", "B"]),
            ("s2", &["A", "C"]),
            ("s3", &["A", "C"]),
        ]);
        let demand = counts(&[("A", 60), ("B", 30), ("C", 5)]);

        let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
        assert_eq!(primary["s1"], "B");
        assert_eq!(primary["s2"], "A");
        assert_eq!(primary["s3"], "A");
    }

    #[test]
    fn test_unknown_candidate_falls_back() {
        let candidates = cands(&[("s1", &["X", "Y"]), ("s2", &[])]);
        let demand = counts(&[("A", 10)]);

        let primary = TrackAssigner::new().assign_primary_track(&candidates, &demand);
        assert_eq!(primary.get("s1").map(String::as_str), Some("X"));
        assert!(!primary.contains_key("s2"));
    }

    #[test]
    fn test_empty_input() {
        let primary = TrackAssigner::new().assign_primary_track(&BTreeMap::new(), &BTreeMap::new());
        assert!(primary.is_empty());
    }

    #[test]
    fn test_swap_pass_reaches_fixed_point() {
        // Swapping two SACs leaves per-track counts unchanged, so the pairwise
        // range is symmetric and the first pass is already a fixed point.
        let candidates = cands(&[("s1", &["A", "B"]), ("s2", &["A", "B"]), ("s3", &["A"])]);
        let demand = counts(&[("A", 10), ("B", 50)]);
        let mut assigned: BTreeMap<String, String> = BTreeMap::from([
            ("s1".into(), "A".into()),
            ("s2".into(), "B".into()),
            ("s3".into(), "A".into()),
        ]);
        let before = assigned.clone();

        let passes = improve_by_swaps(&mut assigned, &candidates, &demand);
        assert_eq!(passes, 1);
        assert_eq!(assigned, before);
    }

    #[test]
    fn test_swap_pass_keeps_balanced_pair() {
        let candidates = cands(&[("s1", &["A", "B"]), ("s2", &["A", "B"])]);
        let demand = counts(&[("A", 10), ("B", 10)]);
        let mut assigned: BTreeMap<String, String> =
            BTreeMap::from([("s1".into(), "A".into()), ("s2".into(), "B".into())]);

        // Equal loads: no swap improves a zero range.
        let passes = improve_by_swaps(&mut assigned, &candidates, &demand);
        assert_eq!(passes, 1);
        assert_eq!(assigned["s1"], "A");
    }
}
