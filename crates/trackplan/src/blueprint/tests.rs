use super::*;
use crate::geom::{Cardinal, Transform};
use crate::layout::{Hand, Inventory, Layout, Piece};
use crate::trace::trace;

fn straights_only() -> Inventory {
    Inventory::new()
        .with(Piece::L1, 10, 1.0)
        .with(Piece::Straight(2), 0, 1.0)
        .with(Piece::Straight(3), 0, 1.0)
        .with(Piece::Straight(4), 0, 1.0)
        .with(Piece::right(4), 0, 1.0)
        .with(Piece::right(8), 0, 1.0)
}

fn full() -> Inventory {
    Inventory::new()
        .with(Piece::L1, 8, 1.0)
        .with(Piece::Straight(2), 4, 1.5)
        .with(Piece::Straight(4), 4, 2.5)
        .with(Piece::right(4), 8, 2.0)
        .with(Piece::left(4), 8, 2.0)
        .with(Piece::right(8), 4, 1.0)
        .with(Piece::Bridge, 1, 5.0)
}

#[test]
fn parses_tokens_and_rejects_garbage() {
    let bp = Blueprint::parse("L12T2t4B1").unwrap();
    assert_eq!(
        bp.tokens(),
        &[
            Token::Straight(12),
            Token::Turn {
                class: 2,
                hand: Hand::Right
            },
            Token::Turn {
                class: 4,
                hand: Hand::Left
            },
            Token::Bridge(1),
        ]
    );
    assert_eq!(bp.to_string(), "L12T2t4B1");
    for bad in ["", "L", "X1", "L0", "T2 L1", "Lé"] {
        assert!(
            matches!(Blueprint::parse(bad), Err(BlueprintError::Syntax { .. })),
            "{bad:?}"
        );
    }
}

#[test]
fn straight_run_packs_from_available_sizes() {
    let mut track = Track::new();
    let mut inv = straights_only();
    let root = Blueprint::parse("L4").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(track.pieces(root), vec![Piece::L1; 4]);
    assert_eq!(inv.count(Piece::L1), 6);
}

#[test]
fn straight_run_prefers_long_pieces() {
    let mut track = Track::new();
    let mut inv = full();
    let root = Blueprint::parse("L11").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(
        track.pieces(root),
        vec![
            Piece::Straight(4),
            Piece::Straight(4),
            Piece::Straight(2),
            Piece::L1
        ]
    );
    assert!((track.end(root).p.x - 11.0).abs() < 1e-12);
}

#[test]
fn turn_falls_back_to_eighth_stock() {
    let mut track = Track::new();
    let mut inv = Inventory::new().with(Piece::right(8), 2, 1.0);
    let root = Blueprint::parse("T4").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(track.pieces(root), vec![Piece::right(8); 2]);
    assert_eq!(inv.count(Piece::right(8)), 0);
}

#[test]
fn handedness_is_not_fungible() {
    let mut track = Track::new();
    let mut inv = Inventory::new().with(Piece::right(8), 2, 1.0);
    let err = Blueprint::parse("t4").unwrap().build(&mut track, &mut inv).unwrap_err();
    assert!(matches!(err, BlueprintError::Shortfall { missing: 2, .. }), "{err}");
    assert_eq!(inv.count(Piece::right(8)), 2);
}

#[test]
fn quarter_stock_is_used_first() {
    let mut track = Track::new();
    let mut inv = full();
    let root = Blueprint::parse("T2T8").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(
        track.pieces(root),
        vec![Piece::right(4), Piece::right(4), Piece::right(8)]
    );
    assert_eq!(inv.count(Piece::right(4)), 6);
    assert_eq!(inv.count(Piece::right(8)), 3);
}

#[test]
fn odd_eighths_mix_both_classes() {
    let mut track = Track::new();
    let mut inv = Inventory::new()
        .with(Piece::right(4), 1, 1.0)
        .with(Piece::right(8), 5, 1.0);
    let root = Blueprint::parse("T2").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(
        track.pieces(root),
        vec![Piece::right(4), Piece::right(8), Piece::right(8)]
    );
}

#[test]
fn bridge_and_turn_class_checks() {
    let mut track = Track::new();
    let mut inv = full();
    assert_eq!(
        Blueprint::parse("B2").unwrap().build(&mut track, &mut inv),
        Err(BlueprintError::BadBridge { length: 2 })
    );
    assert_eq!(
        Blueprint::parse("T3").unwrap().build(&mut track, &mut inv),
        Err(BlueprintError::UnsupportedTurn { class: 3 })
    );
    let b = Blueprint::parse("B1").unwrap().build(&mut track, &mut inv).unwrap();
    assert_eq!(track.pieces(b), vec![Piece::Bridge]);
    assert!(matches!(
        Blueprint::parse("B1").unwrap().build(&mut track, &mut inv),
        Err(BlueprintError::Shortfall { .. })
    ));
}

#[test]
fn earlier_tokens_stay_consumed_on_failure() {
    let mut track = Track::new();
    let mut inv = full();
    let err = Blueprint::parse("L2t8").unwrap().build(&mut track, &mut inv);
    assert!(err.is_err());
    assert_eq!(inv.count(Piece::Straight(2)), 3);
}

#[test]
fn circle_installs_default_symmetry_and_closes() {
    let mut track = Track::new();
    let mut inv = full();
    let root = circle(&mut track, &mut inv).unwrap();
    assert_eq!(track.pieces(root), vec![Piece::right(4); 8]);
    assert!(track.transform(root).approx_eq(&Transform::identity()));
    let dirs = track.directions(root);
    let n = dirs.first(Cardinal::North).unwrap();
    assert_eq!(track.symmetric(n), dirs.first(Cardinal::South));
    let layout: Layout = track.to_layout(root, inv, Vec::new());
    assert!(trace(&layout).is_valid());
}

#[test]
fn circle_falls_back_to_left_hand_stock() {
    let mut track = Track::new();
    let mut inv = Inventory::new()
        .with(Piece::right(4), 3, 1.0)
        .with(Piece::left(4), 8, 1.0);
    let root = circle(&mut track, &mut inv).unwrap();
    assert_eq!(track.pieces(root), vec![Piece::left(4); 8]);
    assert_eq!(inv.count(Piece::right(4)), 3);

    let mut poor = Inventory::new().with(Piece::right(4), 3, 1.0);
    assert!(circle(&mut track, &mut poor).is_err());
    assert_eq!(poor.count(Piece::right(4)), 3);
}

#[test]
fn library_and_seeds_parse() {
    assert_eq!(parse_all(LIBRARY.iter().copied()).len(), LIBRARY.len());
    assert_eq!(parse_all(SEEDS.iter().copied()).len(), SEEDS.len());
    assert_eq!(parse_all(["L1", "nope"]).len(), 1);
}

#[test]
fn seeds_are_closed_loops() {
    let mut stock = full();
    stock.insert(Piece::left(4), 16, 2.0);
    stock.insert(Piece::right(4), 16, 2.0);
    stock.insert(Piece::Straight(4), 8, 2.5);
    for bp in parse_all(SEEDS.iter().copied()) {
        let mut track = Track::new();
        let mut inv = stock.clone();
        let root = bp.build(&mut track, &mut inv).unwrap();
        assert!(
            track.transform(root).approx_eq(&Transform::identity()),
            "{bp} is open"
        );
    }
}
