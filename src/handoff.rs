//! Hand-off helpers between matching rounds.
//!
//! Pure functions that turn one round's output into the next round's
//! input: widened SAC track lists, AC track votes, conflict transfers,
//! and inferred SAC paper assignments.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

/// Extends each SAC's track list with its volunteered tracks.
///
/// Base order is preserved; volunteered tracks are appended in sorted
/// order, skipping any already listed. SACs that only appear in
/// `volunteered` get a list of their own.
pub fn merge_sac_tracks_with_volunteers(
    base: &BTreeMap<String, Vec<String>>,
    volunteered: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, Vec<String>> {
    let mut merged = base.clone();
    for (sac, tracks) in volunteered {
        let list = merged.entry(sac.clone()).or_default();
        for track in tracks {
            if !list.contains(track) {
                list.push(track.clone());
            }
        }
    }
    merged
}

/// Votes each AC's primary track from its assigned papers.
///
/// The most common track wins; ties go to the track seen first while
/// walking the AC's papers. Papers with no known track are ignored, and
/// an AC left with no votes is omitted.
pub fn vote_ac_tracks(
    ac_papers: &BTreeMap<String, BTreeSet<String>>,
    submission_track: &BTreeMap<String, String>,
) -> BTreeMap<String, Vec<String>> {
    let mut result = BTreeMap::new();
    for (ac, papers) in ac_papers {
        // track -> (votes, first seen)
        let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
        for (seen, paper) in papers.iter().enumerate() {
            if let Some(track) = submission_track.get(paper) {
                tally.entry(track.as_str()).or_insert((0, seen)).0 += 1;
            }
        }
        let winner = tally
            .into_iter()
            .min_by_key(|&(_, (votes, seen))| (std::cmp::Reverse(votes), seen))
            .map(|(track, _)| track.to_string());
        match winner {
            Some(track) => {
                result.insert(ac.clone(), vec![track]);
            }
            None => debug!(ac = %ac, "no tracked papers, skipping vote"),
        }
    }
    result
}

/// Conflicts each placed AC must inherit from its SAC.
///
/// Returns `AC → submissions`, holding only the SAC conflicts the AC does
/// not already carry. ACs without a conflict record are skipped.
pub fn conflicts_to_transfer(
    sac_to_acs: &BTreeMap<String, Vec<String>>,
    sac_conflicts: &BTreeMap<String, BTreeSet<String>>,
    ac_conflicts: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut transfers = BTreeMap::new();
    for (sac, acs) in sac_to_acs {
        let Some(inherited) = sac_conflicts.get(sac) else {
            continue;
        };
        for ac in acs {
            let Some(existing) = ac_conflicts.get(ac) else {
                debug!(ac = %ac, "no conflict record, skipping transfer");
                continue;
            };
            let missing: BTreeSet<String> = inherited.difference(existing).cloned().collect();
            if !missing.is_empty() {
                transfers.insert(ac.clone(), missing);
            }
        }
    }
    transfers
}

/// Papers each SAC inherits from its ACs.
///
/// Every SAC in `sac_to_acs` appears in the result, possibly empty.
pub fn infer_sac_paper_assignments(
    sac_to_acs: &BTreeMap<String, Vec<String>>,
    ac_papers: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, BTreeSet<String>> {
    sac_to_acs
        .iter()
        .map(|(sac, acs)| {
            let papers = acs
                .iter()
                .filter_map(|ac| ac_papers.get(ac))
                .flatten()
                .cloned()
                .collect();
            (sac.clone(), papers)
        })
        .collect()
}
