//! Named priority and tie-break rules for every greedy decision point.
//!
//! Each rule produces a sort key; **lower keys win** (`min_by_key`,
//! ascending sort), except where a rule says otherwise.
//!
//! | Decision point | Rule |
//! |----------------|------|
//! | Track served next by `TrackAssigner` | [`ScarcityEntry`] |
//! | SAC taking a served track | [`sac_pick_key`] |
//! | Volunteer sweep order | [`volunteer_order_key`] |
//! | Equal-split remainder | [`remainder_recipients`] |
//! | AC placement, primary pass | [`primary_pass_key`] |
//! | AC placement, redistribution | [`redistribution_key`] |
//! | Redistribution order | [`redistribution_order_key`] |

use std::cmp::{Ordering, Reverse};

/// Scarcity key of a track: `-(demand / max(eligible_count, 1))`.
///
/// The sign matters: the key is stored in a min-heap (`Reverse`), so the
/// most negative key, i.e. the highest demand per eligible SAC, is
/// served first.
pub fn scarcity_key(demand: f64, eligible_count: usize) -> f64 {
    -(demand / eligible_count.max(1) as f64)
}

/// Heap entry for the scarcity loop.
///
/// Ordered by `key` ascending, then track id ascending. A track is pushed
/// again every time a SAC that listed it is assigned; popping a track with
/// no free SAC left is a no-op.
#[derive(Debug, Clone)]
pub struct ScarcityEntry {
    /// Negated scarcity (see [`scarcity_key`]).
    pub key: f64,
    /// Track id.
    pub track: String,
}

impl PartialEq for ScarcityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScarcityEntry {}

impl PartialOrd for ScarcityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScarcityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.track.cmp(&other.track))
    }
}

/// Min-heap wrapper for [`ScarcityEntry`].
pub type ScarcityHeap = std::collections::BinaryHeap<Reverse<ScarcityEntry>>;

/// Choice of SAC for a served track: fewest total candidate tracks, then
/// fewest options left after taking this track.
pub fn sac_pick_key(candidate_count: usize, remaining_after: usize) -> (usize, usize) {
    (candidate_count, remaining_after)
}

/// Volunteer sweep order: lightest current total first.
pub fn volunteer_order_key(total: u32) -> u32 {
    total
}

/// SACs receiving one extra paper from an equal split remainder:
/// the `remainder` lexicographically smallest ids.
pub fn remainder_recipients<'a>(participants: &[&'a str], remainder: usize) -> Vec<&'a str> {
    let mut sorted = participants.to_vec();
    sorted.sort_unstable();
    sorted.truncate(remainder);
    sorted
}

/// AC placement in the primary pass: conflicts dominate, load breaks ties.
pub fn primary_pass_key(conflicts: usize, load: u32) -> (usize, u32) {
    (conflicts, load)
}

/// AC placement among minimum-conflict SACs during redistribution.
pub fn redistribution_key(load: u32, ac_count: usize) -> (u32, usize) {
    (load, ac_count)
}

/// Redistribution order: heaviest ACs first.
pub fn redistribution_order_key(paper_count: usize) -> Reverse<usize> {
    Reverse(paper_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: f64, track: &str) -> ScarcityEntry {
        ScarcityEntry {
            key,
            track: track.to_string(),
        }
    }

    #[test]
    fn test_scarcity_key_sign_and_guard() {
        assert!((scarcity_key(10.0, 2) - -5.0).abs() < 1e-10);
        // Empty pool is guarded, not a division by zero.
        assert!((scarcity_key(10.0, 0) - -10.0).abs() < 1e-10);
        // Higher demand per eligible SAC => more negative => served first.
        assert!(scarcity_key(9.0, 1) < scarcity_key(9.0, 3));
    }

    #[test]
    fn test_scarcity_heap_pops_scarcest_then_smallest_id() {
        let mut heap = ScarcityHeap::new();
        heap.push(Reverse(entry(-1.0, "A")));
        heap.push(Reverse(entry(-7.0, "C")));
        heap.push(Reverse(entry(-7.0, "B")));

        let order: Vec<String> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.track)).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sac_pick_prefers_constrained() {
        assert!(sac_pick_key(2, 1) < sac_pick_key(3, 0));
        assert!(sac_pick_key(2, 0) < sac_pick_key(2, 1));
    }

    #[test]
    fn test_remainder_goes_to_smallest_ids() {
        let participants = ["s3", "s1", "s2"];
        assert_eq!(remainder_recipients(&participants, 2), vec!["s1", "s2"]);
        assert!(remainder_recipients(&participants, 0).is_empty());
    }

    #[test]
    fn test_primary_pass_conflicts_dominate() {
        assert!(primary_pass_key(0, 100) < primary_pass_key(1, 0));
        assert!(primary_pass_key(1, 5) < primary_pass_key(1, 6));
    }

    #[test]
    fn test_redistribution_keys() {
        assert!(redistribution_key(3, 9) < redistribution_key(4, 0));
        assert!(redistribution_key(3, 1) < redistribution_key(3, 2));

        let mut loads = vec![2usize, 7, 4];
        loads.sort_by_key(|&n| redistribution_order_key(n));
        assert_eq!(loads, vec![7, 4, 2]);
    }

    #[test]
    fn test_volunteer_order() {
        let mut totals = vec![("s1", 30u32), ("s2", 10), ("s3", 20)];
        totals.sort_by_key(|&(_, t)| volunteer_order_key(t));
        assert_eq!(totals[0].0, "s2");
    }
}
