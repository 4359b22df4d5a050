//! Pattern search, direction index, scaling, and mutation.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::arena::{NodeId, Track};
use crate::geom::{Cardinal, Transform};
use crate::layout::{Inventory, Piece};

/// Direct children of a chain bucketed by the cardinal heading of their end.
#[derive(Clone, Debug, Default)]
pub struct Directions {
    buckets: [Vec<NodeId>; 4],
    unaligned: Vec<NodeId>,
}

impl Directions {
    #[inline]
    pub fn get(&self, dir: Cardinal) -> &[NodeId] {
        &self.buckets[dir.index()]
    }

    #[inline]
    pub fn first(&self, dir: Cardinal) -> Option<NodeId> {
        self.buckets[dir.index()].first().copied()
    }

    /// Children whose end heading is not axis-aligned.
    #[inline]
    pub fn unaligned(&self) -> &[NodeId] {
        &self.unaligned
    }
}

impl Track {
    /// Cardinal bucket of the end heading of `id`.
    #[inline]
    pub fn end_cardinal(&self, id: NodeId) -> Option<Cardinal> {
        Cardinal::of(self.end(id).angle)
    }

    /// Index the direct children of `id`; a leaf indexes itself.
    pub fn directions(&self, id: NodeId) -> Directions {
        let members: Vec<NodeId> = if self.is_chain(id) {
            self.children(id).collect()
        } else {
            vec![id]
        };
        let mut out = Directions::default();
        for m in members {
            match self.end_cardinal(m) {
                Some(c) => out.buckets[c.index()].push(m),
                None => out.unaligned.push(m),
            }
        }
        out
    }

    /// Cross-link the first N child with the first S child, and the first W
    /// child with the first E child.
    pub fn install_default_symmetry(&mut self, chain: NodeId) {
        let dirs = self.directions(chain);
        for (a, b) in [
            (Cardinal::North, Cardinal::South),
            (Cardinal::West, Cardinal::East),
        ] {
            if let (Some(x), Some(y)) = (dirs.first(a), dirs.first(b)) {
                if x != y {
                    self.link_symmetric(x, y);
                }
            }
        }
    }

    // --- pattern search ---------------------------------------------------

    fn ranges(&self, chain: NodeId, target: &Transform) -> impl Iterator<Item = (usize, usize)> + '_ {
        let kids: Vec<NodeId> = self.children(chain).collect();
        let target = *target;
        let n = kids.len();
        (0..n)
            .flat_map(move |i| (i..n).map(move |j| (i, j)))
            .filter(move |&(i, j)| self.range_transform(kids[i], kids[j]).approx_eq(&target))
    }

    /// Shortest sibling range of `chain`'s children whose output transform
    /// equals `target`; ties go to the first found scanning starts in order.
    pub fn find_sub_template(&self, chain: NodeId, target: &Transform) -> Option<(NodeId, NodeId)> {
        let kids: Vec<NodeId> = self.children(chain).collect();
        let mut best: Option<(usize, usize)> = None;
        for (i, j) in self.ranges(chain, target) {
            if best.map_or(true, |(bi, bj)| j - i < bj - bi) {
                best = Some((i, j));
            }
        }
        best.map(|(i, j)| (kids[i], kids[j]))
    }

    /// Every matching sibling range, in chain order.
    pub fn find_all_sub_templates(&self, chain: NodeId, target: &Transform) -> Vec<(NodeId, NodeId)> {
        let kids: Vec<NodeId> = self.children(chain).collect();
        self.ranges(chain, target)
            .map(|(i, j)| (kids[i], kids[j]))
            .collect()
    }

    // --- scaling ----------------------------------------------------------

    fn scale_candidates(&self, scope: NodeId, dir: Option<Cardinal>) -> Vec<NodeId> {
        let root = self.root_of(scope);
        self.subtree(scope)
            .into_iter()
            .skip(1)
            .filter(|&n| match self.symmetric(n) {
                Some(p) => p != n && self.parent(p).is_some() && self.is_attached(p, root),
                None => false,
            })
            .filter(|&n| dir.map_or(true, |d| self.end_cardinal(n) == Some(d)))
            .collect()
    }

    /// True when some node below `scope` has a live symmetric partner (and, if
    /// given, ends heading `dir`).
    pub fn can_scale(&self, scope: NodeId, dir: Option<Cardinal>) -> bool {
        !self.scale_candidates(scope, dir).is_empty()
    }

    /// Insert two copies of `prototype` (one `L1` by default): one after a
    /// random candidate and one after its partner, then pair the copies.
    ///
    /// Both copies are taken from `inv` up front; on failure nothing is taken.
    pub fn try_scale<R: Rng + ?Sized>(
        &mut self,
        scope: NodeId,
        dir: Option<Cardinal>,
        prototype: Option<NodeId>,
        inv: &mut Inventory,
        rng: &mut R,
    ) -> bool {
        let candidates = self.scale_candidates(scope, dir);
        let Some(&cand) = candidates.choose(rng) else {
            return false;
        };
        let Some(partner) = self.symmetric(cand) else {
            return false;
        };
        let one = match prototype {
            Some(p) => self.pieces(p),
            None => vec![Piece::L1],
        };
        let both: Vec<Piece> = one.iter().chain(one.iter()).copied().collect();
        if !inv.take_all(&both) {
            return false;
        }
        let (a, b) = match prototype {
            Some(p) => (self.clone_subtree(p), self.clone_subtree(p)),
            None => (self.leaf(Piece::L1), self.leaf(Piece::L1)),
        };
        self.append(cand, a);
        self.append(partner, b);
        self.link_symmetric(a, b);
        true
    }

    // --- mutation ---------------------------------------------------------

    /// Whether `scope` could take a replacement with transform `t`.
    /// Without a transform this is always permitted.
    pub fn can_mutate(&self, scope: NodeId, t: Option<&Transform>) -> bool {
        match t {
            None => true,
            Some(t) => {
                self.transform(scope).approx_eq(t) || self.find_sub_template(scope, t).is_some()
            }
        }
    }

    /// Splice detached `replacement` over the shortest matching range of
    /// `scope`'s children and re-pair symmetry onto it.
    ///
    /// Displaced pieces go back into `inv`. Returns the displaced nodes, or
    /// `None` when no range matches (the replacement stays detached and its
    /// pieces stay with the caller).
    pub fn try_mutate(&mut self, scope: NodeId, replacement: NodeId, inv: &mut Inventory) -> Option<Vec<NodeId>> {
        if !self.is_chain(scope) {
            return None;
        }
        let t = self.transform(replacement);
        if self.head(scope).is_none() {
            if !t.approx_eq(&Transform::identity()) {
                return None;
            }
            self.push(scope, replacement);
            return Some(Vec::new());
        }
        let (first, last) = self.find_sub_template(scope, &t)?;

        let span: Vec<NodeId> =
            std::iter::successors(Some(first), |&c| if c == last { None } else { self.next(c) })
                .collect();
        let obligations: Vec<(NodeId, Option<Cardinal>)> = span
            .iter()
            .filter_map(|&d| self.symmetric(d).map(|p| (p, self.end_cardinal(d))))
            .collect();

        let displaced = self.replace_range(first, last, replacement);
        let gone: HashSet<NodeId> = displaced.iter().flat_map(|&d| self.subtree(d)).collect();
        for &d in &displaced {
            let pieces = self.pieces(d);
            inv.put_back_all(&pieces);
        }

        let dirs = self.directions(replacement);
        let mut used: HashSet<NodeId> = HashSet::new();
        for (partner, dir) in obligations {
            if gone.contains(&partner) {
                continue;
            }
            let target = dir.and_then(|c| dirs.get(c).iter().copied().find(|n| !used.contains(n)));
            match target {
                Some(n) if n != partner => {
                    used.insert(n);
                    self.link_symmetric(n, partner);
                }
                _ => self.clear_symmetric(partner),
            }
        }
        for &g in &gone {
            if self.symmetric(g).is_some_and(|p| !gone.contains(&p)) {
                self.clear_symmetric(g);
            }
        }
        Some(displaced)
    }
}
