//! Shared geometry utilities.
//!
//! Point ids stay textual everywhere else in the engine; coordinates
//! are parsed here, on demand, only when the fill emitter has to pick
//! between two remaining edges at a vertex.

use kurbo::{Point, Vec2};

/// Which side of the incoming direction a candidate edge turns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A candidate edge's turn relative to the incoming direction:
/// its side, plus the dot product of the unit direction vectors
/// (1 = straight on, -1 = full reversal) for ranking turn tightness.
#[derive(Debug, Clone, Copy)]
pub struct Turn {
    pub side: Side,
    pub dot: f64,
}

/// Parse a point id (`"123 456"`) into coordinates. Split on the
/// first space, both halves parsed as `f64`. Returns `None` for ids
/// the engine only ever passed through.
pub fn parse_point(id: &str) -> Option<Point> {
    let (x, y) = id.split_once(' ')?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some(Point::new(x, y))
}

/// Turn of the edge `c → n` relative to the incoming edge `p → c`.
///
/// The side comes from the sign of the 2D cross product of the unit
/// direction vectors; colinear (or degenerate) configurations return
/// `None` and are left to the caller's order-based fallback.
pub fn turn(p: Point, c: Point, n: Point) -> Option<Turn> {
    let v1 = unit(c - p)?;
    let v2 = unit(n - c)?;
    let cross = v1.cross(v2);
    if cross == 0.0 {
        return None;
    }
    let side = if cross > 0.0 { Side::Left } else { Side::Right };
    Some(Turn {
        side,
        dot: v1.dot(v2),
    })
}

fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    if len > 0.0 {
        Some(v / len)
    } else {
        None
    }
}
