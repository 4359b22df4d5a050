use super::cfg::TURN_RADIUS;
use super::*;
use crate::layout::{Piece, Turn};
use proptest::prelude::*;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        (1u8..=4).prop_map(Piece::Straight),
        Just(Piece::Bridge),
        prop_oneof![Just(1u8), Just(2), Just(4), Just(8)].prop_map(Piece::right),
        prop_oneof![Just(1u8), Just(2), Just(4), Just(8)].prop_map(Piece::left),
    ]
}

fn position_strategy() -> impl Strategy<Value = Position> {
    (-50.0f64..50.0, -50.0f64..50.0, 0.0f64..TAU).prop_map(|(x, y, a)| Position::new(x, y, a))
}

proptest! {
    #[test]
    fn step_back_inverts_step(pos in position_strategy(), piece in piece_strategy()) {
        let turn = piece.turn();
        let there = step(pos, piece, turn);
        let back = step_back(there, piece, turn);
        prop_assert!(back.approx_eq(&pos, 1e-9), "{pos:?} -> {there:?} -> {back:?}");
    }

    #[test]
    fn chaining_composes_transforms(
        start in position_strategy(),
        pieces in proptest::collection::vec(piece_strategy(), 1..12),
    ) {
        let mut cur = start;
        let mut composed = Transform::identity();
        for p in &pieces {
            let next = step(cur, *p, p.turn());
            composed = composed.then(&cur.transform_to(&next));
            cur = next;
        }
        prop_assert!(start.transform_to(&cur).approx_eq(&composed));
    }

    #[test]
    fn headings_stay_normalized(pos in position_strategy(), piece in piece_strategy()) {
        let a = step(pos, piece, piece.turn()).angle;
        prop_assert!((0.0..TAU).contains(&a));
    }
}

#[test]
fn straight_advances_along_heading() {
    let p = step(Position::new(1.0, 1.0, FRAC_PI_2), Piece::Straight(3), Turn::Straight);
    assert!((p.p.x - 1.0).abs() < 1e-12);
    assert!((p.p.y - 4.0).abs() < 1e-12);
    assert!((p.angle - FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn bridge_spans_four_units() {
    let p = step(Position::origin(), Piece::Bridge, Turn::Straight);
    assert!((p.p.x - 4.0).abs() < 1e-12 && p.p.y.abs() < 1e-12);
}

#[test]
fn right_quarter_turn_bends_clockwise() {
    let p = step(Position::origin(), Piece::right(2), Turn::Right);
    assert!((p.p.x - TURN_RADIUS).abs() < 1e-12);
    assert!((p.p.y + TURN_RADIUS).abs() < 1e-12);
    assert!((p.angle - 3.0 * FRAC_PI_2).abs() < 1e-12);
    let q = step(Position::origin(), Piece::left(4), Turn::Left);
    assert!(q.p.y > 0.0);
    assert!((q.angle - FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn eight_eighth_circle_turns_close() {
    let mut pos = Position::origin();
    for _ in 0..8 {
        pos = step(pos, Piece::right(4), Turn::Right);
    }
    assert!(pos.approx_eq(&Position::origin(), 1e-9));
}

#[test]
fn normalize_and_diff_wrap() {
    assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert!(normalize_angle(TAU).abs() < 1e-12);
    assert!((angle_diff(0.1, TAU - 0.1) - 0.2).abs() < 1e-12);
    assert!((angle_diff(PI, 0.0) - PI).abs() < 1e-12);
}

#[test]
fn cardinal_buckets() {
    assert_eq!(Cardinal::of(0.0), Some(Cardinal::East));
    assert_eq!(Cardinal::of(TAU - 1e-9), Some(Cardinal::East));
    assert_eq!(Cardinal::of(FRAC_PI_2), Some(Cardinal::North));
    assert_eq!(Cardinal::of(PI), Some(Cardinal::West));
    assert_eq!(Cardinal::of(3.0 * FRAC_PI_2), Some(Cardinal::South));
    assert_eq!(Cardinal::of(FRAC_PI_4), None);
    assert_eq!(Cardinal::North.opposite(), Cardinal::South);
}

#[test]
fn sampled_turn_ends_at_step() {
    let start = Position::new(2.0, -1.0, 1.0);
    let piece = Piece::left(2);
    let pts = sample(start, piece, piece.turn());
    assert_eq!(pts.len(), 9);
    let end = step(start, piece, piece.turn());
    assert!((pts[pts.len() - 1] - end.p).norm() < 1e-12);
    for w in pts.windows(2) {
        assert!((w[1] - w[0]).norm() < 1.0);
    }
}
