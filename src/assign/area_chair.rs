//! Area Chair to Senior Area Chair assignment.
//!
//! # Algorithm
//!
//! 1. Bucket ACs by primary track. ACs without an assignment record are
//!    ignored; ACs with a record but no usable track are deferred.
//! 2. Visit tracks from fewest to most papers. On a merged-away track
//!    (a key of the merge graph) only SACs that originally held the track
//!    are candidates.
//! 3. Each AC goes to the candidate SAC with spare capacity that minimizes
//!    [`primary_pass_key`]; with no such SAC it is deferred.
//! 4. Deferred ACs, heaviest first, go to the least-loaded SAC among those
//!    with the fewest conflicts anywhere, preferring spare capacity and
//!    ignoring caps only when no minimum-conflict SAC has room.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::metrics::LoadKpi;
use crate::models::AcAssignment;
use crate::rules::{primary_pass_key, redistribution_key, redistribution_order_key};

/// Input container for AC placement.
#[derive(Debug, Clone, Default)]
pub struct AcAssignmentRequest {
    /// AC → tracks; only the first track is used.
    pub ac_tracks: BTreeMap<String, Vec<String>>,
    /// SAC → tracks after partitioning (merged or volunteered).
    pub sac_tracks: BTreeMap<String, Vec<String>>,
    /// SAC → tracks before partitioning.
    pub original_sac_tracks: BTreeMap<String, Vec<String>>,
    /// Track → tracks merged into it.
    pub track_graph: BTreeMap<String, Vec<String>>,
    /// Track → paper count.
    pub track_counts: BTreeMap<String, u32>,
    /// AC → assigned papers.
    pub ac_asms: BTreeMap<String, BTreeSet<String>>,
    /// SAC → conflicted papers.
    pub sac_cois: BTreeMap<String, BTreeSet<String>>,
    /// SAC → paper cap. SACs absent here are uncapped.
    pub sac_max_loads: BTreeMap<String, u32>,
}

impl AcAssignmentRequest {
    /// Creates a request with no merge history, conflicts, or caps.
    pub fn new(
        ac_tracks: BTreeMap<String, Vec<String>>,
        sac_tracks: BTreeMap<String, Vec<String>>,
        track_counts: BTreeMap<String, u32>,
        ac_asms: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            ac_tracks,
            sac_tracks,
            track_counts,
            ac_asms,
            ..Default::default()
        }
    }

    /// Sets the pre-partition SAC tracks.
    pub fn with_original_tracks(mut self, original: BTreeMap<String, Vec<String>>) -> Self {
        self.original_sac_tracks = original;
        self
    }

    /// Sets the merge graph.
    pub fn with_track_graph(mut self, graph: BTreeMap<String, Vec<String>>) -> Self {
        self.track_graph = graph;
        self
    }

    /// Sets SAC conflicts.
    pub fn with_conflicts(mut self, cois: BTreeMap<String, BTreeSet<String>>) -> Self {
        self.sac_cois = cois;
        self
    }

    /// Sets SAC load caps.
    pub fn with_max_loads(mut self, caps: BTreeMap<String, u32>) -> Self {
        self.sac_max_loads = caps;
        self
    }
}

/// Running per-SAC counters.
#[derive(Default)]
struct Ledger<'a> {
    load: HashMap<&'a str, u32>,
    ac_count: HashMap<&'a str, usize>,
    result: AcAssignment,
}

impl<'a> Ledger<'a> {
    fn load(&self, sac: &str) -> u32 {
        self.load.get(sac).copied().unwrap_or(0)
    }

    fn ac_count(&self, sac: &str) -> usize {
        self.ac_count.get(sac).copied().unwrap_or(0)
    }

    fn has_capacity(&self, caps: &BTreeMap<String, u32>, sac: &str, papers: u32) -> bool {
        caps.get(sac).map_or(true, |&cap| self.load(sac) + papers <= cap)
    }

    fn commit(&mut self, sac: &'a str, ac: &str, papers: u32) {
        *self.load.entry(sac).or_insert(0) += papers;
        *self.ac_count.entry(sac).or_insert(0) += 1;
        self.result
            .sac_to_acs
            .entry(sac.to_string())
            .or_default()
            .push(ac.to_string());
    }
}

fn conflicts(papers: &BTreeSet<String>, cois: Option<&BTreeSet<String>>) -> usize {
    cois.map_or(0, |c| papers.intersection(c).count())
}

/// Places ACs under SACs.
#[derive(Debug, Clone, Default)]
pub struct AreaChairAssigner;

impl AreaChairAssigner {
    /// Creates an assigner.
    pub fn new() -> Self {
        Self
    }

    /// Returns the placement of every AC with an assignment record.
    ///
    /// Placement never fails while at least one SAC exists; caps are
    /// exceeded only in the redistribution fallback and such ACs are
    /// listed in [`AcAssignment::over_capacity`].
    pub fn assign_acs_to_sac(&self, request: &AcAssignmentRequest) -> AcAssignment {
        let empty = BTreeSet::new();
        let papers_of = |ac: &str| request.ac_asms.get(ac).unwrap_or(&empty);

        let mut track_to_acs: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut deferred: Vec<&str> = Vec::new();
        for (ac, tracks) in &request.ac_tracks {
            if !request.ac_asms.contains_key(ac) {
                debug!(ac = %ac, "AC has no assignments, skipped");
                continue;
            }
            match tracks.first() {
                Some(track) => track_to_acs.entry(track.as_str()).or_default().push(ac.as_str()),
                None => {
                    debug!(ac = %ac, "AC has no track");
                    deferred.push(ac.as_str());
                }
            }
        }
        for ac in request.ac_asms.keys() {
            if !request.ac_tracks.contains_key(ac) {
                debug!(ac = %ac, "AC missing from track map");
                deferred.push(ac.as_str());
            }
        }

        let mut track_to_sacs: HashMap<&str, Vec<&str>> = HashMap::new();
        for (sac, tracks) in &request.sac_tracks {
            for track in tracks {
                track_to_sacs.entry(track.as_str()).or_default().push(sac.as_str());
            }
        }

        info!(
            acs = request.ac_asms.len(),
            sacs = request.sac_tracks.len(),
            tracks = request.track_counts.len(),
            "assigning ACs to SACs"
        );

        let mut ledger = Ledger::default();
        for sac in request.sac_tracks.keys() {
            ledger.load.insert(sac.as_str(), 0);
        }

        let mut order: Vec<(&String, &u32)> = request.track_counts.iter().collect();
        order.sort_by_key(|&(_, &count)| count);

        for (track, _) in order {
            let acs = track_to_acs.get(track.as_str()).cloned().unwrap_or_default();
            let mut sacs_here = track_to_sacs.get(track.as_str()).cloned().unwrap_or_default();
            if sacs_here.is_empty() {
                debug!(track = %track, acs = acs.len(), "no SACs on track, ACs deferred");
                deferred.extend(acs);
                continue;
            }
            if request.track_graph.contains_key(track) {
                sacs_here.retain(|sac| {
                    request
                        .original_sac_tracks
                        .get(*sac)
                        .is_some_and(|orig| orig.contains(track))
                });
                debug!(track = %track, sacs = sacs_here.len(), "merged track, restricted to original SACs");
            }

            for ac in acs {
                let papers = papers_of(ac);
                let increment = papers.len() as u32;
                let best = sacs_here
                    .iter()
                    .copied()
                    .filter(|sac| ledger.has_capacity(&request.sac_max_loads, sac, increment))
                    .min_by_key(|sac| {
                        primary_pass_key(
                            conflicts(papers, request.sac_cois.get(*sac)),
                            ledger.load(sac),
                        )
                    });
                match best {
                    Some(sac) => ledger.commit(sac, ac, increment),
                    None => {
                        debug!(ac, track = %track, "no capacity on track, deferring");
                        deferred.push(ac);
                    }
                }
            }
        }

        for (track, acs) in &track_to_acs {
            if !request.track_counts.contains_key(*track) {
                debug!(track, acs = acs.len(), "unknown track, ACs deferred");
                deferred.extend(acs.iter().copied());
            }
        }

        if !deferred.is_empty() {
            info!(acs = deferred.len(), "redistributing deferred ACs");
        }
        deferred.sort_by_key(|ac| redistribution_order_key(papers_of(*ac).len()));

        for ac in deferred {
            let papers = papers_of(ac);
            let increment = papers.len() as u32;
            let counts: Vec<(&str, usize)> = request
                .sac_tracks
                .keys()
                .map(|sac| (sac.as_str(), conflicts(papers, request.sac_cois.get(sac))))
                .collect();
            let Some(min_conflicts) = counts.iter().map(|&(_, c)| c).min() else {
                warn!(ac, "no SACs exist, AC left unplaced");
                ledger.result.unplaced.push(ac.to_string());
                continue;
            };
            let fewest: Vec<&str> = counts
                .iter()
                .filter(|&&(_, c)| c == min_conflicts)
                .map(|&(sac, _)| sac)
                .collect();

            let mut pool: Vec<&str> = fewest
                .iter()
                .copied()
                .filter(|sac| ledger.has_capacity(&request.sac_max_loads, sac, increment))
                .collect();
            let over_capacity = pool.is_empty();
            if over_capacity {
                warn!(ac, papers = increment, "all SACs at capacity, assigning ignoring cap");
                pool = fewest;
            }

            let Some(sac) = pool
                .into_iter()
                .min_by_key(|sac| redistribution_key(ledger.load(sac), ledger.ac_count(sac)))
            else {
                continue;
            };
            ledger.commit(sac, ac, increment);
            if over_capacity {
                ledger.result.over_capacity.push(ac.to_string());
            }
            debug!(
                ac,
                sac,
                papers = increment,
                conflicts = min_conflicts,
                load = ledger.load(sac),
                "redistributed AC"
            );
        }

        let Ledger { load, mut result, .. } = ledger;
        result.sac_loads = load.into_iter().map(|(s, l)| (s.to_string(), l)).collect();

        let kpi = LoadKpi::calculate(&result.sac_loads);
        info!(
            placed = result.placed_count(),
            over_capacity = result.over_capacity.len(),
            unplaced = result.unplaced.len(),
            max_load = kpi.max,
            min_load = kpi.min,
            disparity = kpi.disparity,
            "AC assignment finished"
        );
        result
    }
}
