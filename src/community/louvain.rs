//! Louvain algorithm for community detection.
//!
//! Multi-level greedy modularity optimization on weighted keyed graphs.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! 1. **Local moving**: start from a singleton partition and repeatedly
//!    reassign each vertex to the neighboring community with the highest
//!    modularity gain, until the per-sweep gain drops below a tolerance.
//!
//! 2. **Aggregation**: contract each community into a single vertex of a
//!    coarser multigraph. Edge weights between coarse vertices are summed
//!    inter-community weights; a self-loop carries the internal weight.
//!
//! 3. **Repeat** on the coarser graph until a pass stops improving, then
//!    compose the per-level assignments back onto the original vertices.
//!
//! ## Bookkeeping
//!
//! The inner loop never rebuilds adjacency. Three vectors indexed by vertex
//! key carry the partition (`vcom`, `vtot`, `ctot`), and a [`ScanBuffer`]
//! acts as a sparse accumulator of per-community weights: sized to the
//! span, but reset in time proportional to the number of communities
//! actually touched. Moving a vertex is O(1) on top of its neighborhood
//! scan.
//!
//! Everything is deterministic: vertices are visited in ascending key
//! order, ties between equal-gain communities go to the community seen
//! first in the neighborhood scan.
//!
//! ## References
//!
//! Blondel, Guillaume, Lambiotte, Lefebvre (2008). "Fast unfolding of
//! communities in large networks." J. Stat. Mech., P10008.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{AdjacencyGraph, Graph};

/// Louvain community detection.
///
/// Configured through builder methods; all parameters are validated when a
/// run starts.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Number of independent full runs; reported time is the mean.
    pub(super) repeat: usize,
    /// Resolution parameter. Higher values favor smaller communities.
    pub(super) resolution: f64,
    /// Per-sweep gain threshold that ends the local-moving phase.
    pub(super) tolerance: f64,
    /// Per-pass gain threshold that ends the multi-level descent.
    pub(super) pass_tolerance: f64,
    /// Multiplicative decay applied to `tolerance` between passes.
    pub(super) tolerance_decline: f64,
    /// Safety cap on sweeps within one local-moving phase.
    pub(super) max_iterations: usize,
    /// Safety cap on coarsening passes.
    pub(super) max_passes: usize,
}

impl Louvain {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self {
            repeat: 1,
            resolution: 1.0,
            tolerance: 0.0,
            pass_tolerance: 0.0,
            tolerance_decline: 1.0,
            max_iterations: 500,
            max_passes: 500,
        }
    }

    /// Set the number of independent runs (timing is averaged over them).
    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the resolution parameter.
    ///
    /// Scales the null-model term of the modularity delta. Must be
    /// positive; values above 1 push toward singletons, values near 0
    /// merge aggressively.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the local-moving tolerance.
    ///
    /// A sweep whose summed realized gain is at or below this value ends
    /// the moving phase.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the per-pass tolerance that stops the multi-level descent.
    pub fn with_pass_tolerance(mut self, pass_tolerance: f64) -> Self {
        self.pass_tolerance = pass_tolerance;
        self
    }

    /// Set the tolerance decline factor in `(0, 1]`.
    ///
    /// The moving tolerance is multiplied by this after every pass, so
    /// later (smaller) levels are optimized more tightly.
    pub fn with_tolerance_decline(mut self, factor: f64) -> Self {
        self.tolerance_decline = factor;
        self
    }

    /// Set the sweep cap for a single moving phase.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the pass cap for the multi-level descent.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Resolution parameter currently configured.
    pub fn resolution_parameter(&self) -> f64 {
        self.resolution
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(Error::InvalidParameter {
                name: "repeat",
                message: "must be at least 1",
            });
        }
        if !(self.resolution > 0.0 && self.resolution.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be positive and finite",
            });
        }
        if !(self.tolerance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be non-negative",
            });
        }
        if !(self.pass_tolerance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "pass_tolerance",
                message: "must be non-negative",
            });
        }
        if !(self.tolerance_decline > 0.0 && self.tolerance_decline <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance_decline",
                message: "must lie in (0, 1]",
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1",
            });
        }
        if self.max_passes == 0 {
            return Err(Error::InvalidParameter {
                name: "max_passes",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Run the full multi-level algorithm from a singleton partition.
    ///
    /// ```
    /// use ward::{AdjacencyGraph, Louvain};
    ///
    /// let mut g = AdjacencyGraph::new();
    /// g.add_undirected_edge(0, 1, 1.0);
    /// g.add_undirected_edge(1, 2, 1.0);
    /// g.add_undirected_edge(0, 2, 1.0);
    ///
    /// let part = Louvain::new().run(&g).unwrap();
    /// assert_eq!(part.membership[0], part.membership[1]);
    /// assert_eq!(part.membership[1], part.membership[2]);
    /// ```
    pub fn run<G: Graph>(&self, x: &G) -> Result<Partition> {
        self.validate()?;
        let mut elapsed = Duration::ZERO;
        let mut outcome = RunOutcome::default();
        for _ in 0..self.repeat {
            let started = Instant::now();
            outcome = self.run_once(x, None, None);
            elapsed += started.elapsed();
        }
        Ok(Partition {
            membership: outcome.membership,
            iterations: outcome.iterations,
            passes: outcome.passes,
            time: elapsed / self.repeat as u32,
        })
    }

    /// One full descent. `init` seeds the finest-level partition and
    /// `affected` restricts finest-level moving to the flagged vertices;
    /// coarser levels always process everything.
    pub(super) fn run_once<G: Graph>(
        &self,
        x: &G,
        init: Option<&[usize]>,
        affected: Option<&[bool]>,
    ) -> RunOutcome {
        let span = x.span();
        let mut membership: Vec<usize> = match init {
            Some(prior) => prior.to_vec(),
            None => (0..span).collect(),
        };
        let vtot = vertex_weights(x);
        let m = vtot.iter().sum::<f64>() / 2.0;
        if span == 0 || m <= 0.0 {
            return RunOutcome { membership, iterations: 0, passes: 0 };
        }

        let mut scratch = ScanBuffer::new(span);
        let mut state = match init {
            Some(prior) => LevelState::seeded(x, prior, vtot),
            None => LevelState::singletons(vtot),
        };

        let mut iterations = 0;
        let mut passes = 0;
        let mut tolerance = self.tolerance;

        // Finest level: the only one that sees the seed and the affected set.
        let (iters, gain) = local_moving(
            x,
            &mut state,
            &mut scratch,
            m,
            self.resolution,
            tolerance,
            self.max_iterations,
            affected,
        );
        iterations += iters;
        membership.copy_from_slice(&state.vcom);
        debug!(pass = 0, iterations = iters, gain, "local-moving pass done");
        if gain <= self.pass_tolerance {
            return RunOutcome { membership, iterations, passes };
        }
        passes += 1;

        let mut coarse = aggregate_with(x, &state.vcom, &mut scratch);
        while passes < self.max_passes {
            tolerance *= self.tolerance_decline;
            state = LevelState::singletons(vertex_weights(&coarse));
            let (iters, gain) = local_moving(
                &coarse,
                &mut state,
                &mut scratch,
                m,
                self.resolution,
                tolerance,
                self.max_iterations,
                None,
            );
            iterations += iters;
            lookup_communities(&mut membership, &state.vcom);
            debug!(pass = passes, iterations = iters, gain, "local-moving pass done");
            if gain <= self.pass_tolerance {
                break;
            }
            passes += 1;
            coarse = aggregate_with(&coarse, &state.vcom, &mut scratch);
        }

        RunOutcome { membership, iterations, passes }
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a Louvain run.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Final community of each original vertex key.
    ///
    /// Community ids are vertex keys of the coarsest level and are not
    /// compacted; use [`compact_communities`] for dense `0..k` labels.
    /// Entries for absent vertex keys are unspecified.
    pub membership: Vec<usize>,
    /// Total local-moving sweeps across all passes.
    pub iterations: usize,
    /// Passes whose realized gain exceeded the pass tolerance.
    pub passes: usize,
    /// Wall-clock time, averaged over `repeat` runs.
    pub time: Duration,
}

#[derive(Debug, Clone, Default)]
pub(super) struct RunOutcome {
    pub(super) membership: Vec<usize>,
    pub(super) iterations: usize,
    pub(super) passes: usize,
}

/// Per-level partition bookkeeping.
///
/// Invariant between moves: `ctot[c]` equals the sum of `vtot[u]` over
/// vertices with `vcom[u] == c`, and the sum of `ctot` equals the sum of
/// `vtot`.
struct LevelState {
    /// Community of each vertex key.
    vcom: Vec<usize>,
    /// Total incident weight of each vertex, fixed per level.
    vtot: Vec<f64>,
    /// Total incident weight of each community, updated on every move.
    ctot: Vec<f64>,
}

impl LevelState {
    /// Singleton partition: every vertex its own community.
    fn singletons(vtot: Vec<f64>) -> Self {
        let vcom = (0..vtot.len()).collect();
        let ctot = vtot.clone();
        Self { vcom, vtot, ctot }
    }

    /// Partition seeded from an existing membership.
    fn seeded<G: Graph>(x: &G, membership: &[usize], vtot: Vec<f64>) -> Self {
        let ctot = community_weights(x, membership, &vtot);
        Self { vcom: membership.to_vec(), vtot, ctot }
    }

    fn move_vertex(&mut self, u: usize, c: usize) {
        let d = self.vcom[u];
        self.ctot[d] -= self.vtot[u];
        self.ctot[c] += self.vtot[u];
        self.vcom[u] = c;
    }
}

/// Sparse accumulator of weights from one vertex to its adjacent
/// communities.
///
/// `weight` is indexed by community id and sized to the span, but only the
/// ids recorded in `touched` are nonzero between [`clear`](Self::clear)
/// calls, so resetting costs O(communities touched) rather than O(span).
#[derive(Debug)]
pub struct ScanBuffer {
    touched: Vec<usize>,
    weight: Vec<f64>,
}

impl ScanBuffer {
    /// Zeroed buffer for graphs of the given span.
    pub fn new(span: usize) -> Self {
        Self { touched: Vec::new(), weight: vec![0.0; span] }
    }

    /// Accumulate the weights from `u` to each adjacent community.
    ///
    /// With `include_self` false, edges back to `u` itself are skipped;
    /// aggregation scans with it true so internal edges land on the
    /// community's own id.
    pub fn scan<G: Graph>(&mut self, x: &G, u: usize, vcom: &[usize], include_self: bool) {
        for &(v, w) in x.edges(u) {
            if !include_self && v == u {
                continue;
            }
            let c = vcom[v];
            if self.weight[c] == 0.0 {
                self.touched.push(c);
            }
            self.weight[c] += w;
        }
    }

    /// Reset every touched entry to zero.
    pub fn clear(&mut self) {
        for c in self.touched.drain(..) {
            self.weight[c] = 0.0;
        }
    }

    /// Community ids touched by the last scan, in discovery order.
    pub fn communities(&self) -> &[usize] {
        &self.touched
    }

    /// Accumulated weight from the scanned vertex to community `c`.
    pub fn weight_to(&self, c: usize) -> f64 {
        self.weight[c]
    }
}

/// Total incident weight of every vertex key, self-loops included.
pub fn vertex_weights<G: Graph>(x: &G) -> Vec<f64> {
    let mut vtot = vec![0.0; x.span()];
    for u in x.vertex_keys() {
        for &(_, w) in x.edges(u) {
            vtot[u] += w;
        }
    }
    vtot
}

/// Total incident weight of every community under `vcom`.
pub fn community_weights<G: Graph>(x: &G, vcom: &[usize], vtot: &[f64]) -> Vec<f64> {
    let mut ctot = vec![0.0; x.span()];
    for u in x.vertex_keys() {
        ctot[vcom[u]] += vtot[u];
    }
    ctot
}

/// Modularity change from moving a vertex out of community `d` into `c`.
///
/// `w_uc` and `w_ud` are the vertex's edge weights into each community,
/// `k_u` its total incident weight, `ctot_*` the community totals, `m` the
/// total undirected weight of the graph.
pub fn delta_modularity(
    w_uc: f64,
    w_ud: f64,
    k_u: f64,
    ctot_c: f64,
    ctot_d: f64,
    m: f64,
    resolution: f64,
) -> f64 {
    (w_uc - w_ud) / m - resolution * k_u * (ctot_c - ctot_d + k_u) / (2.0 * m * m)
}

/// Pick the scanned community with the best strictly positive gain.
///
/// Ties go to the community discovered first. The vertex's own community
/// is never a candidate. Returns `None` when no move improves modularity;
/// community 0 is an ordinary, legal target.
pub(super) fn best_community(
    scratch: &ScanBuffer,
    u: usize,
    vcom: &[usize],
    vtot: &[f64],
    ctot: &[f64],
    m: f64,
    resolution: f64,
) -> Option<(usize, f64)> {
    let d = vcom[u];
    let w_ud = scratch.weight_to(d);
    let mut best: Option<(usize, f64)> = None;
    for &c in scratch.communities() {
        if c == d {
            continue;
        }
        let gain =
            delta_modularity(scratch.weight_to(c), w_ud, vtot[u], ctot[c], ctot[d], m, resolution);
        if gain > best.map_or(0.0, |(_, g)| g) {
            best = Some((c, gain));
        }
    }
    best
}

/// Local-moving phase: greedy sweeps until the summed realized gain of a
/// sweep drops to `tolerance` or the sweep cap is hit.
///
/// Returns the sweeps performed and the total realized gain. When
/// `affected` is set, unflagged vertices are skipped for the whole phase.
#[allow(clippy::too_many_arguments)]
fn local_moving<G: Graph>(
    x: &G,
    state: &mut LevelState,
    scratch: &mut ScanBuffer,
    m: f64,
    resolution: f64,
    tolerance: f64,
    max_iterations: usize,
    affected: Option<&[bool]>,
) -> (usize, f64) {
    let mut iterations = 0;
    let mut total_gain = 0.0;
    while iterations < max_iterations {
        let mut gain = 0.0;
        for u in x.vertex_keys() {
            if let Some(mask) = affected {
                if !mask[u] {
                    continue;
                }
            }
            scratch.clear();
            scratch.scan(x, u, &state.vcom, false);
            if let Some((c, g)) =
                best_community(scratch, u, &state.vcom, &state.vtot, &state.ctot, m, resolution)
            {
                state.move_vertex(u, c);
                gain += g;
            }
        }
        iterations += 1;
        total_gain += gain;
        if gain <= tolerance {
            break;
        }
    }
    (iterations, total_gain)
}

/// Contract each community of `x` into a single vertex.
///
/// The coarse graph keeps community ids as vertex keys (gaps where
/// communities emptied), sums weights between communities, and carries the
/// internal weight of each community as a self-loop. Total edge weight is
/// conserved exactly.
pub fn aggregate<G: Graph>(x: &G, vcom: &[usize]) -> AdjacencyGraph {
    let mut scratch = ScanBuffer::new(x.span());
    aggregate_with(x, vcom, &mut scratch)
}

fn aggregate_with<G: Graph>(x: &G, vcom: &[usize], scratch: &mut ScanBuffer) -> AdjacencyGraph {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); x.span()];
    for u in x.vertex_keys() {
        members[vcom[u]].push(u);
    }
    let mut coarse = AdjacencyGraph::new();
    for (c, us) in members.iter().enumerate() {
        if us.is_empty() {
            continue;
        }
        scratch.clear();
        for &u in us {
            scratch.scan(x, u, vcom, true);
        }
        coarse.add_vertex(c);
        for &d in scratch.communities() {
            coarse.add_edge(c, d, scratch.weight_to(d));
        }
    }
    coarse
}

/// Substitute one level's communities into a membership vector.
///
/// Entries outside `vcom`'s range belong to absent vertices and are left
/// untouched.
pub fn lookup_communities(membership: &mut [usize], vcom: &[usize]) {
    for entry in membership.iter_mut() {
        if *entry < vcom.len() {
            *entry = vcom[*entry];
        }
    }
}

/// Relabel communities to dense `0..k` ids in first-seen order.
pub fn compact_communities(membership: &[usize]) -> Vec<usize> {
    let mut ids: HashMap<usize, usize> = HashMap::new();
    let mut next = 0;
    membership
        .iter()
        .map(|&c| {
            *ids.entry(c).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}
