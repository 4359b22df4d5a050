//! Self-intersection detector over a resolved trace.
//!
//! Model
//! - Each piece is flattened into its sampled polyline (`geom::sample`).
//! - Pieces sharing a topology edge are never compared (they meet at a joint),
//!   and bridges are exempt: they pass over whatever lies beneath.
//! - Two segments intersect unless one of them lies strictly on one side of the
//!   other's line (orientation beyond `CROSS_EPS`); collinear segments intersect
//!   when their extents meet within `CROSS_EPS`. Touching counts: two pieces
//!   that are not joined by an edge may not share any point.

use std::collections::HashSet;

use nalgebra::Vector2;

use super::Trace;
use crate::layout::Layout;

/// Orientation / overlap tolerance in track units.
pub const CROSS_EPS: f64 = 1e-6;

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

#[inline]
fn same_side(d1: f64, d2: f64) -> bool {
    (d1 > CROSS_EPS && d2 > CROSS_EPS) || (d1 < -CROSS_EPS && d2 < -CROSS_EPS)
}

/// Closed segment `a0-a1` meets closed segment `b0-b1`.
pub fn segments_cross(a0: Vector2<f64>, a1: Vector2<f64>, b0: Vector2<f64>, b1: Vector2<f64>) -> bool {
    let d1 = cross(b0, b1, a0);
    let d2 = cross(b0, b1, a1);
    let d3 = cross(a0, a1, b0);
    let d4 = cross(a0, a1, b1);
    if same_side(d1, d2) || same_side(d3, d4) {
        return false;
    }
    let flat = [d1, d2, d3, d4].iter().all(|d| d.abs() <= CROSS_EPS);
    if !flat {
        return true;
    }
    let dir = a1 - a0;
    let len = dir.norm();
    if len <= CROSS_EPS {
        return (b0 - a0).norm() <= CROSS_EPS || (b1 - a0).norm() <= CROSS_EPS;
    }
    let u = dir / len;
    let (s0, s1) = (u.dot(&(b0 - a0)), u.dot(&(b1 - a0)));
    let lo = s0.min(s1).max(0.0);
    let hi = s0.max(s1).min(len);
    hi - lo >= -CROSS_EPS
}

fn bbox(line: &[Vector2<f64>]) -> (Vector2<f64>, Vector2<f64>) {
    let mut lo = Vector2::repeat(f64::INFINITY);
    let mut hi = Vector2::repeat(f64::NEG_INFINITY);
    for p in line {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (lo, hi)
}

fn polylines_cross(a: &[Vector2<f64>], b: &[Vector2<f64>]) -> bool {
    let ((alo, ahi), (blo, bhi)) = (bbox(a), bbox(b));
    if alo.x > bhi.x + CROSS_EPS
        || blo.x > ahi.x + CROSS_EPS
        || alo.y > bhi.y + CROSS_EPS
        || blo.y > ahi.y + CROSS_EPS
    {
        return false;
    }
    a.windows(2)
        .any(|sa| b.windows(2).any(|sb| segments_cross(sa[0], sa[1], sb[0], sb[1])))
}

/// True when any two non-adjacent, non-bridge pieces of the traced layout intersect.
pub fn self_intersects(layout: &Layout, trace: &Trace) -> bool {
    let lines = trace.polylines(layout);
    let joints: HashSet<(usize, usize)> = layout
        .edges
        .iter()
        .map(|e| (e.from.min(e.to), e.from.max(e.to)))
        .collect();
    for i in 0..lines.len() {
        if layout.pieces[i].is_bridge() || lines[i].len() < 2 {
            continue;
        }
        for j in (i + 1)..lines.len() {
            if layout.pieces[j].is_bridge() || joints.contains(&(i, j)) {
                continue;
            }
            if polylines_cross(&lines[i], &lines[j]) {
                return true;
            }
        }
    }
    false
}
