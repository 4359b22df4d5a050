//! Arena storage, navigation, geometry, and the splice primitives.

use std::collections::HashMap;

use crate::geom::{step, Position, Transform};
use crate::layout::{Inventory, Layout, Piece, Waypoint};

/// Stable handle into a `Track`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Node content: one piece, or an ordered chain of child templates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    Leaf {
        piece: Piece,
    },
    Chain {
        head: Option<NodeId>,
        tail: Option<NodeId>,
    },
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    start: Position,
    next: Option<NodeId>,
    prev: Option<NodeId>,
    parent: Option<NodeId>,
    symmetric: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            start: Position::origin(),
            next: None,
            prev: None,
            parent: None,
            symmetric: None,
        }
    }
}

/// Old-to-new handle map produced by [`Track::compact`].
#[derive(Clone, Debug, Default)]
pub struct Remap(HashMap<NodeId, NodeId>);

impl Remap {
    #[inline]
    pub fn get(&self, old: NodeId) -> Option<NodeId> {
        self.0.get(&old).copied()
    }
}

/// Template arena.
#[derive(Clone, Debug, Default)]
pub struct Track {
    nodes: Vec<Node>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh arena holding one flat chain of `pieces`, started at the origin.
    pub fn from_pieces(pieces: &[Piece]) -> (Track, NodeId) {
        let mut track = Track::new();
        let root = track.chain_of(pieces);
        (track, root)
    }

    /// Allocated nodes, reachable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// New detached single-piece template.
    pub fn leaf(&mut self, piece: Piece) -> NodeId {
        self.alloc(NodeKind::Leaf { piece })
    }

    /// New detached empty chain.
    pub fn chain(&mut self) -> NodeId {
        self.alloc(NodeKind::Chain {
            head: None,
            tail: None,
        })
    }

    /// New detached chain of one leaf per piece, started at the origin.
    pub fn chain_of(&mut self, pieces: &[Piece]) -> NodeId {
        let chain = self.chain();
        let kids: Vec<NodeId> = pieces.iter().map(|p| self.leaf(*p)).collect();
        for w in kids.windows(2) {
            self.nodes[w[0].0].next = Some(w[1]);
            self.nodes[w[1].0].prev = Some(w[0]);
        }
        for k in &kids {
            self.nodes[k.0].parent = Some(chain);
        }
        self.nodes[chain.0].kind = NodeKind::Chain {
            head: kids.first().copied(),
            tail: kids.last().copied(),
        };
        self.set_start(chain, Position::origin());
        chain
    }

    // --- navigation -------------------------------------------------------

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    #[inline]
    pub fn piece(&self, id: NodeId) -> Option<Piece> {
        match self.nodes[id.0].kind {
            NodeKind::Leaf { piece } => Some(piece),
            NodeKind::Chain { .. } => None,
        }
    }

    #[inline]
    pub fn is_chain(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Chain { .. })
    }

    #[inline]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    #[inline]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    pub fn symmetric(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].symmetric
    }

    #[inline]
    pub fn head(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id.0].kind {
            NodeKind::Chain { head, .. } => head,
            NodeKind::Leaf { .. } => None,
        }
    }

    #[inline]
    pub fn tail(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id.0].kind {
            NodeKind::Chain { tail, .. } => tail,
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Direct children of a chain in order (empty for leaves).
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.head(id), move |&c| self.next(c))
    }

    /// `id` and all its descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            let kids: Vec<NodeId> = self.children(cur).collect();
            stack.extend(kids.into_iter().rev());
        }
        out
    }

    /// Pieces of the leaves under `id`, in track order.
    pub fn pieces(&self, id: NodeId) -> Vec<Piece> {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.piece(n))
            .collect()
    }

    /// Topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    /// True when `id` is `root` or hangs below it.
    pub fn is_attached(&self, id: NodeId, root: NodeId) -> bool {
        self.root_of(id) == root
    }

    // --- geometry ---------------------------------------------------------

    #[inline]
    pub fn start(&self, id: NodeId) -> Position {
        self.nodes[id.0].start
    }

    /// Derived end: last leaf's step, or the start of an empty chain.
    pub fn end(&self, id: NodeId) -> Position {
        let mut cur = id;
        loop {
            let node = &self.nodes[cur.0];
            match node.kind {
                NodeKind::Leaf { piece } => return step(node.start, piece, piece.turn()),
                NodeKind::Chain { tail: Some(t), .. } => cur = t,
                NodeKind::Chain { tail: None, .. } => return node.start,
            }
        }
    }

    /// Output transform of `id` in its own start frame.
    #[inline]
    pub fn transform(&self, id: NodeId) -> Transform {
        self.start(id).transform_to(&self.end(id))
    }

    /// Output transform of the sibling range `first..=last`.
    #[inline]
    pub fn range_transform(&self, first: NodeId, last: NodeId) -> Transform {
        self.start(first).transform_to(&self.end(last))
    }

    /// Set the start of `id` and cascade through its whole subtree.
    ///
    /// Siblings after `id` are not touched; see `reflow_after`.
    pub fn set_start(&mut self, id: NodeId, start: Position) {
        let mut cursor = start;
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            self.nodes[cur.0].start = cursor;
            match self.nodes[cur.0].kind {
                NodeKind::Leaf { piece } => cursor = step(cursor, piece, piece.turn()),
                NodeKind::Chain { .. } => {
                    let kids: Vec<NodeId> = self.children(cur).collect();
                    stack.extend(kids.into_iter().rev());
                }
            }
        }
    }

    /// Re-splice every later sibling of `id` onto its predecessor's end, then
    /// repeat one level up for each enclosing chain.
    fn reflow_after(&mut self, id: NodeId) {
        let mut cur = id;
        loop {
            let mut pos = self.end(cur);
            let mut sib = self.next(cur);
            while let Some(s) = sib {
                self.set_start(s, pos);
                pos = self.end(s);
                sib = self.next(s);
            }
            match self.parent(cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
    }

    // --- structure --------------------------------------------------------

    fn set_head(&mut self, chain: NodeId, new: Option<NodeId>) {
        if let NodeKind::Chain { head, .. } = &mut self.nodes[chain.0].kind {
            *head = new;
        }
    }

    fn set_tail(&mut self, chain: NodeId, new: Option<NodeId>) {
        if let NodeKind::Chain { tail, .. } = &mut self.nodes[chain.0].kind {
            *tail = new;
        }
    }

    /// Insert detached `new` right after `cur`, keeping what followed `cur`
    /// after `new`. `new` starts at `cur`'s end and everything downstream moves.
    pub fn append(&mut self, cur: NodeId, new: NodeId) {
        let after = self.nodes[cur.0].next;
        let parent = self.nodes[cur.0].parent;
        {
            let n = &mut self.nodes[new.0];
            n.prev = Some(cur);
            n.next = after;
            n.parent = parent;
        }
        self.nodes[cur.0].next = Some(new);
        match (after, parent) {
            (Some(a), _) => self.nodes[a.0].prev = Some(new),
            (None, Some(p)) => self.set_tail(p, Some(new)),
            (None, None) => {}
        }
        let pos = self.end(cur);
        self.set_start(new, pos);
        self.reflow_after(new);
    }

    /// Add detached `child` as the last child of `chain`.
    pub fn push(&mut self, chain: NodeId, child: NodeId) {
        match self.tail(chain) {
            Some(t) => self.append(t, child),
            None => {
                self.nodes[child.0].parent = Some(chain);
                self.nodes[child.0].prev = None;
                self.nodes[child.0].next = None;
                self.set_head(chain, Some(child));
                self.set_tail(chain, Some(child));
                let pos = self.start(chain);
                self.set_start(child, pos);
                self.reflow_after(child);
            }
        }
    }

    /// Replace the sibling range `first..=last` by detached `replacement`
    /// (relinking `first.prev`, `replacement`, and `last.next`).
    ///
    /// Returns the displaced nodes in order; they become detached.
    /// Symmetry links are left as they were (see `try_mutate`).
    pub fn replace_range(&mut self, first: NodeId, last: NodeId, replacement: NodeId) -> Vec<NodeId> {
        let displaced: Vec<NodeId> =
            std::iter::successors(Some(first), |&c| if c == last { None } else { self.next(c) })
                .collect();
        let before = self.prev(first);
        let after = self.next(last);
        let parent = self.parent(first);
        let start = self.start(first);
        {
            let r = &mut self.nodes[replacement.0];
            r.prev = before;
            r.next = after;
            r.parent = parent;
        }
        match (before, parent) {
            (Some(b), _) => self.nodes[b.0].next = Some(replacement),
            (None, Some(p)) => self.set_head(p, Some(replacement)),
            (None, None) => {}
        }
        match (after, parent) {
            (Some(a), _) => self.nodes[a.0].prev = Some(replacement),
            (None, Some(p)) => self.set_tail(p, Some(replacement)),
            (None, None) => {}
        }
        for d in &displaced {
            self.nodes[d.0].parent = None;
        }
        self.nodes[first.0].prev = None;
        self.nodes[last.0].next = None;
        self.set_start(replacement, start);
        self.reflow_after(replacement);
        displaced
    }

    /// Pair `a` and `b`, dropping any previous partner of either.
    pub fn link_symmetric(&mut self, a: NodeId, b: NodeId) {
        self.clear_symmetric(a);
        self.clear_symmetric(b);
        self.nodes[a.0].symmetric = Some(b);
        self.nodes[b.0].symmetric = Some(a);
    }

    /// Drop `a`'s partner link on both sides.
    pub fn clear_symmetric(&mut self, a: NodeId) {
        if let Some(p) = self.nodes[a.0].symmetric.take() {
            if self.nodes[p.0].symmetric == Some(a) {
                self.nodes[p.0].symmetric = None;
            }
        }
    }

    // --- copies -----------------------------------------------------------

    /// Copy the subtree `order[0]` (pre-order) to fresh handles starting at
    /// `base`. Links leaving the subtree are dropped.
    fn copy_nodes(&self, order: &[NodeId], base: usize) -> (Vec<Node>, HashMap<NodeId, NodeId>) {
        let index: HashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(k, &old)| (old, NodeId(base + k)))
            .collect();
        let remap = |o: Option<NodeId>| o.and_then(|x| index.get(&x).copied());
        let nodes = order
            .iter()
            .map(|&old| {
                let src = &self.nodes[old.0];
                let kind = match src.kind {
                    NodeKind::Chain { head, tail } => NodeKind::Chain {
                        head: remap(head),
                        tail: remap(tail),
                    },
                    leaf => leaf,
                };
                Node {
                    kind,
                    start: src.start,
                    next: remap(src.next),
                    prev: remap(src.prev),
                    parent: remap(src.parent),
                    symmetric: remap(src.symmetric),
                }
            })
            .collect();
        (nodes, index)
    }

    /// Deep copy of `id` inside this arena (detached). Symmetry links inside the
    /// copied subtree are mirrored onto the copy; links leaving it are dropped.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let order = self.subtree(id);
        let base = self.nodes.len();
        let (copies, _) = self.copy_nodes(&order, base);
        self.nodes.extend(copies);
        NodeId(base)
    }

    /// Rebuild the arena with only the nodes reachable from `root`.
    pub fn compact(&mut self, root: NodeId) -> Remap {
        let order = self.subtree(root);
        let (nodes, index) = self.copy_nodes(&order, 0);
        self.nodes = nodes;
        Remap(index)
    }

    /// Nodes reachable from `root` (including it).
    pub fn live_count(&self, root: NodeId) -> usize {
        self.subtree(root).len()
    }

    /// Interchange form of the loop rooted at `root`.
    pub fn to_layout(&self, root: NodeId, inventory: Inventory, waypoints: Vec<Waypoint>) -> Layout {
        Layout::closed_loop(inventory, waypoints, self.pieces(root))
    }
}
