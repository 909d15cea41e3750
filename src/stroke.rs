//! Continuous-polyline reconstruction from stroke graphs.
//!
//! Fragmented micro-segments sharing endpoints are traced back into
//! maximal trails. Seeding by ascending degree makes degree-1
//! vertices (endpoints of open polylines) go first, so open paths are
//! traced end to end and interior cycles only after all endpoints are
//! exhausted. Each connected component then yields
//! `max(1, odd-degree-vertices / 2)` polylines.

use crate::graph::StrokeGraph;

/// Trace the graph into `M`/`L`/`cp` lines appended to `out`,
/// consuming every edge exactly once. Emits its own leading `N` and
/// trailing `S`. Returns the number of polylines produced.
pub fn emit(graph: &mut StrokeGraph, out: &mut String, nl: &str) -> usize {
    if graph.is_empty() {
        return 0;
    }

    out.push_str("N");
    out.push_str(nl);

    // Seed order: ascending degree, ties by intern (first-seen) index.
    // Degrees are taken before any edge is consumed; the sort is
    // stable so the whole traversal is deterministic.
    let mut order: Vec<u32> = (0..graph.vertex_count() as u32).collect();
    order.sort_by_key(|&v| graph.degree(v));

    let mut polylines = 0;

    for &seed in &order {
        // One maximal trail per seed. A trail only ends at a vertex
        // with no remaining edges, and parity guarantees the seed
        // itself is drained when its trail ends, so a single pass
        // over the seed order consumes every edge.
        let mut cur = seed;
        let mut started = false;
        while let Some(next) = graph.take_edge(cur) {
            if !started {
                out.push_str(graph.points.id(seed));
                out.push_str(" M");
                out.push_str(nl);
                started = true;
                polylines += 1;
            }
            if next == seed {
                out.push_str("cp");
                out.push_str(nl);
            } else {
                out.push_str(graph.points.id(next));
                out.push_str(" L");
                out.push_str(nl);
            }
            cur = next;
        }
    }

    out.push_str("S");
    out.push_str(nl);
    polylines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(segments: &[(&str, &str)]) -> String {
        let mut g = StrokeGraph::default();
        for (a, b) in segments {
            g.add_segment(a, b);
        }
        let mut out = String::new();
        emit(&mut g, &mut out, "\n");
        assert!(g.is_empty(), "emitter must consume every edge");
        out
    }

    #[test]
    fn rejoins_consecutive_segments() {
        let out = trace(&[("0 0", "1 0"), ("1 0", "2 0")]);
        assert_eq!(out, "N\n0 0 M\n1 0 L\n2 0 L\nS\n");
    }

    #[test]
    fn closed_cycle_emits_cp() {
        let out = trace(&[("0 0", "1 0"), ("1 0", "1 1"), ("1 1", "0 0")]);
        assert_eq!(out, "N\n0 0 M\n1 0 L\n1 1 L\ncp\nS\n");
    }

    #[test]
    fn open_path_traced_from_endpoint() {
        // Segments given middle-first: the degree-1 endpoints still
        // seed the trace, so the polyline comes out in one piece.
        let out = trace(&[("1 0", "2 0"), ("0 0", "1 0"), ("2 0", "3 0")]);
        assert_eq!(out, "N\n0 0 M\n1 0 L\n2 0 L\n3 0 L\nS\n");
    }

    #[test]
    fn star_needs_two_polylines() {
        // Four spokes from a center: 4 odd vertices → 2 polylines.
        let out = trace(&[("5 5", "0 5"), ("5 5", "10 5"), ("5 5", "5 0"), ("5 5", "5 10")]);
        let moves = out.matches(" M\n").count();
        assert_eq!(moves, 2);
        assert_eq!(out.matches(" L\n").count(), 4);
    }

    #[test]
    fn duplicate_segments_emit_once() {
        let out = trace(&[("0 0", "1 0"), ("0 0", "1 0"), ("1 0", "0 0")]);
        assert_eq!(out, "N\n0 0 M\n1 0 L\nS\n");
    }
}
