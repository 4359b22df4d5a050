//! Pure step functions: advance a position over one piece, and small angle helpers.

use std::f64::consts::{PI, TAU};

use nalgebra::{Rotation2, Vector2};

use super::cfg::{BRIDGE_LENGTH, SAMPLE_ARC, TURN_RADIUS};
use super::types::Position;
use crate::layout::{Piece, Turn};

/// Wrap an angle into [0, 2π).
#[inline]
pub fn normalize_angle(a: f64) -> f64 {
    let t = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if t >= TAU {
        0.0
    } else {
        t
    }
}

/// Signed difference `a - b` wrapped into (-π, π].
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

#[inline]
pub fn rotate(v: Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * v
}

#[inline]
pub fn distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a - b).norm()
}

/// Distance from `p` to the closed segment `a-b`.
pub fn segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return distance(p, a);
    }
    let s = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    distance(p, a + ab * s)
}

/// Local displacement (forward, left) and heading change after sweeping `alpha`
/// of a turn with sign `sign` (+1 right).
#[inline]
fn arc_delta(alpha: f64, sign: f64) -> (Vector2<f64>, f64) {
    let d = Vector2::new(
        TURN_RADIUS * alpha.sin(),
        -sign * TURN_RADIUS * (1.0 - alpha.cos()),
    );
    (d, -sign * alpha)
}

fn local_delta(piece: Piece, turn: Turn) -> (Vector2<f64>, f64) {
    match piece {
        Piece::Straight(n) => (Vector2::new(f64::from(n), 0.0), 0.0),
        Piece::Bridge => (Vector2::new(BRIDGE_LENGTH, 0.0), 0.0),
        Piece::Turn { .. } => arc_delta(piece.arc(), turn.sign()),
    }
}

/// Position at the end of `piece` laid from `pos` with `turn`.
pub fn step(pos: Position, piece: Piece, turn: Turn) -> Position {
    let (d, dangle) = local_delta(piece, turn);
    Position {
        p: pos.p + rotate(d, pos.angle),
        angle: normalize_angle(pos.angle + dangle),
    }
}

/// Inverse of [`step`]: the start position of `piece` given its end.
pub fn step_back(end: Position, piece: Piece, turn: Turn) -> Position {
    let flipped = Position {
        p: end.p,
        angle: normalize_angle(end.angle + PI),
    };
    let back = step(flipped, piece, turn.reverse());
    Position {
        p: back.p,
        angle: normalize_angle(back.angle + PI),
    }
}

/// Polyline along the piece from start to end (turns sampled every `SAMPLE_ARC`).
pub fn sample(pos: Position, piece: Piece, turn: Turn) -> Vec<Vector2<f64>> {
    match piece {
        Piece::Turn { .. } if turn != Turn::Straight => {
            let arc = piece.arc();
            let k = ((arc / SAMPLE_ARC).ceil() as usize).max(1);
            let mut pts = Vec::with_capacity(k + 1);
            pts.push(pos.p);
            for j in 1..=k {
                let (d, _) = arc_delta(arc * j as f64 / k as f64, turn.sign());
                pts.push(pos.p + rotate(d, pos.angle));
            }
            pts
        }
        _ => vec![pos.p, step(pos, piece, turn).p],
    }
}
