use super::*;
use crate::geom::{Cardinal, Position, Transform};
use crate::layout::{Inventory, Piece};
use crate::trace::{self_intersects, trace};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::FRAC_PI_2;

fn stock() -> Inventory {
    Inventory::new()
        .with(Piece::L1, 10, 1.0)
        .with(Piece::Straight(2), 4, 1.5)
        .with(Piece::right(2), 4, 3.0)
        .with(Piece::right(4), 8, 2.0)
}

fn circle() -> (Track, NodeId) {
    let (mut track, root) = Track::from_pieces(&[Piece::right(4); 8]);
    track.install_default_symmetry(root);
    (track, root)
}

fn kids(track: &Track, id: NodeId) -> Vec<NodeId> {
    track.children(id).collect()
}

fn assert_closed(track: &Track, root: NodeId) {
    let t = track.transform(root);
    assert!(t.approx_eq(&Transform::identity()), "{t:?}");
    let layout = track.to_layout(root, stock(), Vec::new());
    let tr = trace(&layout);
    assert!(tr.is_valid(), "{:?}", tr.errors);
    assert!(!self_intersects(&layout, &tr));
}

#[test]
fn circle_is_identity_and_traces_cleanly() {
    let (track, root) = circle();
    assert_closed(&track, root);
}

#[test]
fn set_start_cascades_through_children() {
    let (mut track, root) = Track::from_pieces(&[Piece::L1, Piece::right(2), Piece::Straight(2)]);
    let start = Position::new(1.0, 2.0, FRAC_PI_2);
    track.set_start(root, start);
    let k = kids(&track, root);
    assert!(track.start(k[0]).approx_eq(&start, 1e-12));
    for w in k.windows(2) {
        assert!(track.start(w[1]).approx_eq(&track.end(w[0]), 1e-12));
    }
    // L1 north, quarter right to face east, then L2
    let end = track.end(root);
    assert!(end.approx_eq(&Position::new(7.0, 7.0, 0.0), 1e-9), "{end:?}");
}

#[test]
fn append_inserts_and_shifts_the_continuation() {
    let (mut track, root) = Track::from_pieces(&[Piece::L1, Piece::Straight(2)]);
    let first = kids(&track, root)[0];
    let l3 = track.leaf(Piece::Straight(3));
    track.append(first, l3);
    assert_eq!(
        track.pieces(root),
        vec![Piece::L1, Piece::Straight(3), Piece::Straight(2)]
    );
    let k = kids(&track, root);
    assert_eq!(track.parent(l3), Some(root));
    assert_eq!(track.tail(root), Some(k[2]));
    assert!(track.start(k[2]).approx_eq(&track.end(l3), 1e-12));
    assert!((track.end(root).p.x - 6.0).abs() < 1e-12);
}

#[test]
fn append_after_tail_moves_the_tail_pointer() {
    let (mut track, root) = Track::from_pieces(&[Piece::L1]);
    let head = kids(&track, root)[0];
    let extra = track.leaf(Piece::L1);
    track.append(head, extra);
    assert_eq!(track.tail(root), Some(extra));
    assert_eq!(track.next(extra), None);
}

#[test]
fn nested_append_reflows_outer_siblings() {
    let mut track = Track::new();
    let root = track.chain();
    let inner = track.chain_of(&[Piece::L1, Piece::L1]);
    let after = track.leaf(Piece::right(2));
    track.push(root, inner);
    track.push(root, after);
    let inner_tail = kids(&track, inner)[1];
    let extra = track.leaf(Piece::Straight(4));
    track.append(inner_tail, extra);
    assert!(track.start(after).approx_eq(&Position::new(6.0, 0.0, 0.0), 1e-12));
}

#[test]
fn whole_chain_is_its_own_shortest_match() {
    let (track, root) =
        Track::from_pieces(&[Piece::L1, Piece::right(2), Piece::Straight(2), Piece::left(4)]);
    let k = kids(&track, root);
    let t = track.transform(root);
    assert_eq!(track.find_sub_template(root, &t), Some((k[0], k[3])));
    assert!(track.can_mutate(root, Some(&t)));
}

#[test]
fn shortest_match_wins_and_all_matches_are_listed() {
    let (mut track, root) = Track::from_pieces(&[
        Piece::Straight(2),
        Piece::L1,
        Piece::L1,
        Piece::Straight(2),
    ]);
    let k = kids(&track, root);
    let probe = track.leaf(Piece::Straight(2));
    let t = track.transform(probe);
    assert_eq!(track.find_sub_template(root, &t), Some((k[0], k[0])));
    assert_eq!(
        track.find_all_sub_templates(root, &t),
        vec![(k[0], k[0]), (k[1], k[2]), (k[3], k[3])]
    );
    let turn = track.leaf(Piece::right(8));
    let tt = track.transform(turn);
    assert_eq!(track.find_sub_template(root, &tt), None);
    assert!(!track.can_mutate(root, Some(&tt)));
    assert!(track.can_mutate(root, None));
}

#[test]
fn directions_bucket_child_ends() {
    let (track, root) = circle();
    let k = kids(&track, root);
    let dirs = track.directions(root);
    assert_eq!(dirs.get(Cardinal::South), &[k[1]]);
    assert_eq!(dirs.get(Cardinal::West), &[k[3]]);
    assert_eq!(dirs.get(Cardinal::North), &[k[5]]);
    assert_eq!(dirs.get(Cardinal::East), &[k[7]]);
    assert_eq!(dirs.unaligned().len(), 4);
    assert_eq!(track.symmetric(k[5]), Some(k[1]));
    assert_eq!(track.symmetric(k[3]), Some(k[7]));
    assert_eq!(track.symmetric(k[0]), None);
}

#[test]
fn scaling_keeps_the_loop_closed_and_is_not_idempotent() {
    let (mut track, root) = circle();
    let mut inv = stock();
    let mut rng = StdRng::seed_from_u64(7);
    let before = track.pieces(root).len();

    assert!(track.can_scale(root, Some(Cardinal::North)));
    assert!(track.try_scale(root, Some(Cardinal::North), None, &mut inv, &mut rng));
    assert_eq!(inv.count(Piece::L1), 8);
    assert_eq!(track.pieces(root).len(), before + 2);
    assert_closed(&track, root);

    let l2 = track.leaf(Piece::Straight(2));
    assert!(track.try_scale(root, Some(Cardinal::South), Some(l2), &mut inv, &mut rng));
    assert_eq!(inv.count(Piece::Straight(2)), 2);
    assert_eq!(track.pieces(root).len(), before + 4);
    assert_ne!(track.pieces(root).len(), before);
    assert_closed(&track, root);
}

#[test]
fn scaling_pairs_the_new_pieces() {
    let (mut track, root) = circle();
    let mut inv = stock();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(track.try_scale(root, Some(Cardinal::East), None, &mut inv, &mut rng));
    let added: Vec<NodeId> = kids(&track, root)
        .into_iter()
        .filter(|&n| track.piece(n) == Some(Piece::L1))
        .collect();
    assert_eq!(added.len(), 2);
    assert_eq!(track.symmetric(added[0]), Some(added[1]));
    assert_eq!(track.symmetric(added[1]), Some(added[0]));
}

#[test]
fn scaling_fails_without_partner_or_stock() {
    let (mut track, root) = Track::from_pieces(&[Piece::right(4); 8]);
    let mut inv = stock();
    let mut rng = StdRng::seed_from_u64(3);
    assert!(!track.can_scale(root, None));
    assert!(!track.try_scale(root, None, None, &mut inv, &mut rng));

    let (mut track, root) = circle();
    let mut empty = Inventory::new().with(Piece::L1, 1, 1.0);
    assert!(!track.try_scale(root, Some(Cardinal::North), None, &mut empty, &mut rng));
    assert_eq!(empty.count(Piece::L1), 1);
    assert_eq!(track.pieces(root).len(), 8);
}

#[test]
fn mutate_splices_and_repairs_symmetry() {
    let (mut track, root) = Track::from_pieces(&[Piece::right(2); 4]);
    track.install_default_symmetry(root);
    let k = kids(&track, root);
    assert_eq!(track.symmetric(k[2]), Some(k[0]));

    let mut inv = stock();
    assert!(inv.take(Piece::right(4), 2));
    let replacement = track.chain_of(&[Piece::right(4), Piece::right(4)]);
    let r = kids(&track, replacement);
    let displaced = track.try_mutate(root, replacement, &mut inv);
    assert_eq!(displaced, Some(vec![k[0]]));
    assert_eq!(inv.count(Piece::right(2)), 5);

    assert_eq!(track.symmetric(k[2]), Some(r[1]));
    assert_eq!(track.symmetric(r[1]), Some(k[2]));
    assert_eq!(track.symmetric(k[0]), None);
    assert!(!track.is_attached(k[0], root));
    assert!(track.is_attached(r[0], root));
    assert_closed(&track, root);
}

#[test]
fn mutate_clears_partners_without_a_matching_heading() {
    let (mut track, root) = Track::from_pieces(&[Piece::right(2); 4]);
    track.install_default_symmetry(root);
    let k = kids(&track, root);
    let mut inv = stock();
    let replacement = track.chain_of(&[Piece::right(4), Piece::right(2), Piece::right(4)]);
    let r = kids(&track, replacement);
    let displaced = track.try_mutate(root, replacement, &mut inv);
    assert_eq!(displaced, Some(vec![k[0], k[1]]));
    // k[0] ended south; nothing in the replacement does
    assert_eq!(track.symmetric(k[2]), None);
    // k[1] ended west, as does the replacement's tail
    assert_eq!(track.symmetric(k[3]), Some(r[2]));
    assert_closed(&track, root);
}

#[test]
fn mutate_without_match_leaves_the_chain_alone() {
    let (mut track, root) = Track::from_pieces(&[Piece::L1, Piece::L1]);
    let mut inv = stock();
    let turn = track.leaf(Piece::right(4));
    assert_eq!(track.try_mutate(root, turn, &mut inv), None);
    assert_eq!(track.pieces(root), vec![Piece::L1, Piece::L1]);
    assert_eq!(inv.count(Piece::L1), 10);
}

#[test]
fn empty_scope_accepts_a_closed_replacement() {
    let mut track = Track::new();
    let scope = track.chain();
    let mut inv = stock();
    let ring = track.chain_of(&[Piece::right(4); 8]);
    assert_eq!(track.try_mutate(scope, ring, &mut inv), Some(Vec::new()));
    assert_eq!(track.head(scope), Some(ring));
    assert_eq!(track.pieces(scope).len(), 8);
}

#[test]
fn clone_and_compact_preserve_content() {
    let (mut track, root) = circle();
    let copy = track.clone_subtree(root);
    assert_eq!(track.pieces(copy), track.pieces(root));
    assert!(!track.is_attached(copy, root));
    let ck = kids(&track, copy);
    assert_eq!(track.symmetric(ck[5]), Some(ck[1]));

    assert!(track.len() > track.live_count(root));
    let remap = track.compact(root);
    let root = remap.get(root).unwrap_or(root);
    assert_eq!(root, NodeId(0));
    assert_eq!(track.len(), track.live_count(root));
    assert_eq!(remap.get(copy), None);
    assert_closed(&track, root);
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        (1u8..=4).prop_map(Piece::Straight),
        Just(Piece::Bridge),
        prop_oneof![Just(2u8), Just(4), Just(8)].prop_map(Piece::right),
        prop_oneof![Just(2u8), Just(4), Just(8)].prop_map(Piece::left),
    ]
}

proptest! {
    #[test]
    fn chain_transform_composes_children(
        left in proptest::collection::vec(piece_strategy(), 1..8),
        right in proptest::collection::vec(piece_strategy(), 1..8),
    ) {
        let mut track = Track::new();
        let root = track.chain();
        let a = track.chain_of(&left);
        let b = track.chain_of(&right);
        track.push(root, a);
        track.push(root, b);
        let composed = track.transform(a).then(&track.transform(b));
        prop_assert!(track.transform(root).approx_eq(&composed));

        let leaves = left.iter().chain(right.iter()).fold(Transform::identity(), |acc, p| {
            let single = Position::origin().transform_to(&crate::geom::step(Position::origin(), *p, p.turn()));
            acc.then(&single)
        });
        prop_assert!(track.transform(root).approx_eq(&leaves));
    }
}
