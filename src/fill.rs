//! Adjacent-polygon merging and fill outline emission.
//!
//! Filled patches that visually form one region arrive as separate
//! polygons whose shared edges cause hairline anti-aliasing gaps.
//! Merging removes shared edges so neighbors become a single outline:
//!
//! 1. Polygons that touch themselves (an edge used twice in their own
//!    boundary) defeat the planar-merge assumption and are excluded.
//! 2. A greedy pass walks polygons in input order; the first edge
//!    shared with a neighbor is removed outright, further shared edges
//!    with the same neighbor are removed only while they extend the
//!    recorded open ends without splitting the outline.
//! 3. The surviving edges are traced into `M`/`L`/`cp` outlines.
//!    Edges still used twice (a slit between refused merges) force a
//!    choice at their endpoints; a chirality established at the first
//!    such choice keeps the traversal winding one way.
//!
//! When the heuristic refuses a merge the result is at worst the
//! un-merged input.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::geom::{self, Side, Turn};
use crate::graph::FillGraph;

/// Normalized undirected edge key.
type Edge = (u32, u32);

fn norm(a: u32, b: u32) -> Edge {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counters reported back for the verbose summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOutcome {
    pub outlines_out: usize,
    pub merges: usize,
}

/// Merge shared edges, then trace the remaining outline. Appends to
/// `out` with a leading `N` and a trailing `f`; emits nothing for an
/// empty graph.
pub fn emit(graph: &FillGraph, out: &mut String, nl: &str) -> FillOutcome {
    if graph.is_empty() {
        return FillOutcome::default();
    }
    let mut merger = Merger::new(graph);
    merger.merge();
    merger.emit(out, nl)
}

struct Merger<'a> {
    graph: &'a FillGraph,
    /// vertex → neighbor → remaining use count. Ordered neighbors
    /// keep the traversal deterministic.
    adj: Vec<BTreeMap<u32, u32>>,
    self_touch: Vec<bool>,
    /// Merge relabelling: alias[q] = p after q merged into p.
    alias: Vec<usize>,
    /// Polygon ids per merge group, for the merged self-edge re-check.
    members: Vec<Vec<usize>>,
    /// First polygon to claim each undirected edge.
    owners: HashMap<Edge, usize>,
    merges: usize,
}

impl<'a> Merger<'a> {
    fn new(graph: &'a FillGraph) -> Self {
        let mut adj: Vec<BTreeMap<u32, u32>> = vec![BTreeMap::new(); graph.points.len()];
        for poly in graph.polygons() {
            for &(u, v) in poly {
                *adj[u as usize].entry(v).or_insert(0) += 1;
                *adj[v as usize].entry(u).or_insert(0) += 1;
            }
        }
        let self_touch = graph.polygons().iter().map(|p| has_self_edge(p)).collect();
        let n = graph.polygon_count();
        Self {
            graph,
            adj,
            self_touch,
            alias: (0..n).collect(),
            members: (0..n).map(|p| vec![p]).collect(),
            owners: HashMap::new(),
            merges: 0,
        }
    }

    fn root(&self, mut p: usize) -> usize {
        while self.alias[p] != p {
            p = self.alias[p];
        }
        p
    }

    fn use_of(&self, a: u32, b: u32) -> u32 {
        self.adj[a as usize].get(&b).copied().unwrap_or(0)
    }

    fn remove_uses(&mut self, a: u32, b: u32, k: u32) {
        for (x, y) in [(a, b), (b, a)] {
            if let Some(c) = self.adj[x as usize].get_mut(&y) {
                *c = c.saturating_sub(k);
                if *c == 0 {
                    self.adj[x as usize].remove(&y);
                }
            }
        }
    }

    /// Greedy shared-edge removal, polygons in input order.
    fn merge(&mut self) {
        for p in 0..self.graph.polygon_count() {
            if self.self_touch[p] {
                continue;
            }
            // Per-neighbor open ends of the gap carved so far.
            let mut open_ends: HashMap<usize, (u32, u32)> = HashMap::new();
            let mut handled: Vec<usize> = Vec::new();

            for i in 0..self.graph.polygons()[p].len() {
                let (u, v) = self.graph.polygons()[p][i];
                let e = norm(u, v);
                if self.use_of(u, v) == 0 {
                    continue;
                }
                let q = match self.owner(e) {
                    None => {
                        self.claim(e, p);
                        continue;
                    }
                    Some(q0) => self.root(q0),
                };
                if q == p || self.self_touch[q] {
                    continue;
                }
                if let Some(&(a, b)) = open_ends.get(&q) {
                    // Already joined to Q: widen the gap only along its
                    // open ends, and only if one endpoint holds no other
                    // edge (removal then erases an interior vertex and
                    // cannot split the outline).
                    let touches = u == a || u == b || v == a || v == b;
                    let safe = self.adj[u as usize].len() == 1 || self.adj[v as usize].len() == 1;
                    if touches && safe {
                        self.remove_uses(u, v, 2);
                        let (s, t) = if u == a || u == b { (u, v) } else { (v, u) };
                        let ends = if s == a { (t, b) } else { (a, t) };
                        open_ends.insert(q, ends);
                    }
                } else {
                    // First edge shared with Q: removing it joins the
                    // two boundaries into one.
                    self.remove_uses(u, v, 2);
                    open_ends.insert(q, (u, v));
                    handled.push(q);
                }
            }

            if !handled.is_empty() {
                for q in handled {
                    self.alias[q] = p;
                    let moved = std::mem::take(&mut self.members[q]);
                    self.members[p].extend(moved);
                    self.merges += 1;
                }
                // A merge can itself produce a self-touching outline
                // (two refused shared edges now inside one polygon);
                // exclude the merged result from further merging.
                if self.group_has_self_edge(p) {
                    self.self_touch[p] = true;
                }
            }
        }
    }

    fn owner(&self, e: Edge) -> Option<usize> {
        self.owners.get(&e).copied()
    }

    fn claim(&mut self, e: Edge, p: usize) {
        self.owners.insert(e, p);
    }

    fn group_has_self_edge(&self, p: usize) -> bool {
        let mut seen: HashSet<Edge> = HashSet::new();
        for &q in &self.members[p] {
            for &(u, v) in &self.graph.polygons()[q] {
                if self.use_of(u, v) == 0 {
                    continue;
                }
                if !seen.insert(norm(u, v)) {
                    return true;
                }
            }
        }
        false
    }

    fn vertex_use(&self, v: u32) -> u32 {
        self.adj[v as usize].values().sum()
    }

    /// Trace all remaining edge uses into closed outlines.
    fn emit(&mut self, out: &mut String, nl: &str) -> FillOutcome {
        if self.adj.iter().all(|n| n.is_empty()) {
            return FillOutcome {
                outlines_out: 0,
                merges: self.merges,
            };
        }

        out.push_str("N");
        out.push_str(nl);

        // Ascending total edge-use; ties by intern index (stable sort).
        let mut order: Vec<u32> = (0..self.adj.len() as u32).collect();
        order.sort_by_key(|&v| self.vertex_use(v));

        let mut outlines = 0;
        for &seed in &order {
            let mut cur = seed;
            let mut prev: Option<u32> = None;
            let mut started = false;
            let mut winding: Option<Side> = None;

            while let Some(next) = self.pick_next(cur, prev, &mut winding) {
                self.remove_uses(cur, next, 1);
                if !started {
                    out.push_str(self.graph.points.id(seed));
                    out.push_str(" M");
                    out.push_str(nl);
                    started = true;
                    outlines += 1;
                }
                if next == seed {
                    out.push_str("cp");
                    out.push_str(nl);
                } else {
                    out.push_str(self.graph.points.id(next));
                    out.push_str(" L");
                    out.push_str(nl);
                }
                prev = Some(cur);
                cur = next;
            }
        }

        out.push_str("f");
        out.push_str(nl);

        FillOutcome {
            outlines_out: outlines,
            merges: self.merges,
        }
    }

    /// Choose the next vertex from `cur`. Double-edges go first
    /// (descending residual use); at a genuine choice the chirality
    /// rules of the traversal apply.
    fn pick_next(&self, cur: u32, prev: Option<u32>, winding: &mut Option<Side>) -> Option<u32> {
        if self.adj[cur as usize].is_empty() {
            return None;
        }
        let mut cands: Vec<(u32, u32)> = self.adj[cur as usize]
            .iter()
            .map(|(&n, &u)| (n, u))
            .collect();
        cands.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        if cands.len() == 1 {
            return Some(cands[0].0);
        }
        let Some(prev) = prev else {
            return Some(cands[0].0);
        };

        // Geometry is parsed only here, for vertices still incident
        // to unused edges. Ids that do not parse fall back to the
        // residual-use order.
        let Some(pp) = geom::parse_point(self.graph.points.id(prev)) else {
            return Some(cands[0].0);
        };
        let Some(cp) = geom::parse_point(self.graph.points.id(cur)) else {
            return Some(cands[0].0);
        };
        let turns: Vec<Option<Turn>> = cands
            .iter()
            .map(|&(n, _)| {
                geom::parse_point(self.graph.points.id(n)).and_then(|np| geom::turn(pp, cp, np))
            })
            .collect();

        if let Some(w) = *winding {
            // Reject neighbors whose chirality disagrees; among the
            // rest prefer residual use, then the most extreme turn in
            // the established direction.
            let mut best: Option<(u32, u32, f64)> = None;
            for (i, &(n, u)) in cands.iter().enumerate() {
                let Some(t) = turns[i] else { continue };
                if t.side != w {
                    continue;
                }
                let r = rightness(t);
                let better = match best {
                    None => true,
                    Some((_, bu, br)) => {
                        u > bu
                            || (u == bu
                                && match w {
                                    Side::Right => r > br,
                                    Side::Left => r < br,
                                })
                    }
                };
                if better {
                    best = Some((n, u, r));
                }
            }
            return Some(best.map_or(cands[0].0, |(n, _, _)| n));
        }

        // No winding yet: take the double-edge first; if that is a
        // genuine double-edge choice, record which way it turns
        // relative to the runner-up. That fixes the winding for the
        // rest of this traversal.
        let (choice, choice_use) = cands[0];
        if choice_use == 2 {
            if let (Some(tn), Some(ta)) = (turns[0], turns[1]) {
                let side = if rightness(tn) > rightness(ta) {
                    Side::Right
                } else {
                    Side::Left
                };
                *winding = Some(side);
            }
        }
        Some(choice)
    }
}

/// Overall rightward-ness of a turn: any right turn ranks above any
/// left turn, tighter right turns rank higher, looser left turns
/// rank higher. Gives a total order matching the cross/dot rules.
fn rightness(t: Turn) -> f64 {
    match t.side {
        Side::Right => 2.0 - t.dot,
        Side::Left => t.dot,
    }
}

fn has_self_edge(poly: &[(u32, u32)]) -> bool {
    let mut seen: HashSet<Edge> = HashSet::new();
    poly.iter().any(|&(u, v)| !seen.insert(norm(u, v)))
}
