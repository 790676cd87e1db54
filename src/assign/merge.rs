//! Track merging to even out SAC load.
//!
//! # Algorithm
//!
//! Tracks start as singleton components of a [`UnionFind`]. Each round:
//!
//! 1. Group tracks and SACs (by primary track) into components; a
//!    component's per-SAC load is `papers / max(sacs, 1)`.
//! 2. Disparity is `(max - min) / max(max, 1)` over the loads of
//!    components that hold at least one SAC; tracks nobody owns carry no
//!    SAC load. Stop when it is within the threshold or there are no SACs.
//! 3. For every `(track, neighbor)` with `neighbor` in `track`'s fallback
//!    list and in another component, simulate the merge and score it as
//!    `w · improvement + (1 - w) · (1 - semantic_distance)`. Merges that
//!    would raise disparity are not candidates, which keeps disparity
//!    non-increasing across merges.
//! 4. Commit the best merge if its score exceeds the minimum score,
//!    otherwise stop.
//!
//! Each commit removes one component, so the loop runs at most
//! `tracks - 1` rounds.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use crate::config::MergeConfig;
use crate::metrics::disparity;
use crate::models::{MergeOutcome, MergeRecord};
use crate::partition::UnionFind;

#[derive(Debug, Clone, Default)]
struct Component {
    tracks: BTreeSet<String>,
    sacs: BTreeSet<String>,
    papers: u64,
}

impl Component {
    fn load(&self) -> f64 {
        self.papers as f64 / self.sacs.len().max(1) as f64
    }

    /// Per-SAC load, or `None` when no SAC sits on the component.
    fn sac_load(&self) -> Option<f64> {
        (!self.sacs.is_empty()).then(|| self.load())
    }
}

/// Components in order of their smallest track id, plus `root → index`.
fn group(
    uf: &mut UnionFind<String>,
    tracks: &BTreeMap<String, u32>,
    sac_to_track: &BTreeMap<String, String>,
) -> (Vec<Component>, HashMap<String, usize>) {
    let mut comps: Vec<Component> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (track, &papers) in tracks {
        let root = uf.find(track);
        let slot = *index.entry(root).or_insert_with(|| {
            comps.push(Component::default());
            comps.len() - 1
        });
        comps[slot].tracks.insert(track.clone());
        comps[slot].papers += u64::from(papers);
    }
    for (sac, track) in sac_to_track {
        if let Some(&slot) = index.get(&uf.find(track)) {
            comps[slot].sacs.insert(sac.clone());
        }
    }
    (comps, index)
}

fn spread(loads: impl IntoIterator<Item = f64>) -> f64 {
    let (mut max, mut min) = (f64::NEG_INFINITY, f64::INFINITY);
    for load in loads {
        max = max.max(load);
        min = min.min(load);
    }
    if max.is_finite() {
        disparity(max, min)
    } else {
        0.0
    }
}

/// SAC disparity if components `a` and `b` were merged.
fn disparity_after_merge(comps: &[Component], a: usize, b: usize) -> f64 {
    let merged_papers = comps[a].papers + comps[b].papers;
    let merged_sacs = comps[a].sacs.len() + comps[b].sacs.len();
    let merged = (merged_sacs > 0).then(|| merged_papers as f64 / merged_sacs as f64);
    let others = comps
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != a && *i != b)
        .filter_map(|(_, c)| c.sac_load());
    spread(others.chain(merged))
}

/// Normalized position of `neighbor` in `fallback` (0 = closest, 1.0 if absent).
pub fn semantic_distance(fallback: &[String], neighbor: &str) -> f64 {
    match fallback.iter().position(|t| t == neighbor) {
        Some(pos) => pos as f64 / (fallback.len().saturating_sub(1)).max(1) as f64,
        None => 1.0,
    }
}

/// Merges semantically adjacent tracks until SAC load disparity is acceptable.
#[derive(Debug, Clone, Default)]
pub struct TrackMerger {
    config: MergeConfig,
}

impl TrackMerger {
    /// Creates a merger with default scoring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scoring parameters.
    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = config;
        self
    }

    /// Weighted score of a candidate merge.
    pub fn merge_score(&self, current: f64, new: f64, semantic_distance: f64) -> f64 {
        let improvement = (current - new).max(0.0) / current.max(1.0);
        let w = self.config.disparity_weight;
        w * improvement + (1.0 - w) * (1.0 - semantic_distance)
    }

    /// Rebalances SACs by merging tracks.
    ///
    /// `sac_to_track` is each SAC's primary track; a primary track missing
    /// from `track_counts` is treated as a track with no papers. Fallback
    /// neighbors that are not tracks at all are ignored.
    ///
    /// Disparity is measured over SAC loads only and never increases
    /// across merges: a merge that would raise it is skipped even when its
    /// semantic score alone clears `min_merge_score`.
    pub fn rebalance_sacs_across_tracks(
        &self,
        sac_to_track: &BTreeMap<String, String>,
        track_counts: &BTreeMap<String, u32>,
        track_fallback: &BTreeMap<String, Vec<String>>,
        threshold: f64,
    ) -> MergeOutcome {
        let mut tracks = track_counts.clone();
        for track in sac_to_track.values() {
            tracks.entry(track.clone()).or_insert(0);
        }
        info!(
            sacs = sac_to_track.len(),
            tracks = tracks.len(),
            threshold,
            "rebalancing SACs across tracks"
        );

        let mut uf: UnionFind<String> = UnionFind::new();
        let mut outcome = MergeOutcome::default();

        let (comps, index) = loop {
            let (comps, index) = group(&mut uf, &tracks, sac_to_track);
            if sac_to_track.is_empty() {
                debug!("no SACs, nothing to rebalance");
                break (comps, index);
            }
            let current = spread(comps.iter().filter_map(Component::sac_load));
            debug!(components = comps.len(), disparity = current, "component loads");
            if current <= threshold {
                break (comps, index);
            }

            let mut best: Option<(String, String, f64, f64)> = None;
            let mut best_score = f64::NEG_INFINITY;
            for (ci, comp) in comps.iter().enumerate() {
                for track in &comp.tracks {
                    let Some(fallback) = track_fallback.get(track) else {
                        continue;
                    };
                    for neighbor in fallback {
                        if !tracks.contains_key(neighbor) {
                            continue;
                        }
                        let cj = index[&uf.find(neighbor)];
                        if ci == cj {
                            continue;
                        }
                        let new = disparity_after_merge(&comps, ci, cj);
                        if new > current {
                            continue;
                        }
                        let score =
                            self.merge_score(current, new, semantic_distance(fallback, neighbor));
                        if score > best_score {
                            best_score = score;
                            best = Some((track.clone(), neighbor.clone(), new, score));
                        }
                    }
                }
            }

            match best {
                Some((track, neighbor, new, score)) if score > self.config.min_merge_score => {
                    info!(
                        track = %track,
                        neighbor = %neighbor,
                        disparity_before = current,
                        disparity_after = new,
                        score,
                        "merged tracks"
                    );
                    uf.union(&track, &neighbor);
                    outcome
                        .track_graph
                        .entry(track.clone())
                        .or_default()
                        .push(neighbor.clone());
                    outcome.history.push(MergeRecord {
                        track,
                        neighbor,
                        disparity_before: current,
                        disparity_after: new,
                        score,
                    });
                }
                _ => {
                    debug!(best_score, "no beneficial merge");
                    break (comps, index);
                }
            }
        };

        for (sac, primary) in sac_to_track {
            let Some(comp) = index.get(&uf.find(primary)).map(|&i| &comps[i]) else {
                continue;
            };
            outcome
                .sac_to_tracks
                .insert(sac.clone(), comp.tracks.iter().cloned().collect());
            outcome
                .sac_to_load
                .insert(sac.clone(), comp.load().round_ties_even() as u32);
        }

        info!(
            merges = outcome.history.len(),
            components = comps.len(),
            "track rebalancing finished"
        );
        outcome
    }
}
