//! One genetic-search agent walking and reshaping its own template tree.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace as trace_log;

use super::dna::{wrap, Instruction};
use super::GeneticCfg;
use crate::blueprint::Blueprint;
use crate::layout::{Inventory, Piece, Waypoint};
use crate::price::{Pricer, Scored};
use crate::template::{NodeId, Track};
use crate::trace::trace;

/// Everything a step reads but does not own.
pub struct Env<'a> {
    pub waypoints: &'a [Waypoint],
    pub library: &'a [Blueprint],
    pub pricer: &'a dyn Pricer,
    pub cfg: &'a GeneticCfg,
}

/// Why a bot stopped for this generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Death {
    RetriesExhausted,
    BrokenTrace,
    BelowFloor,
    Stagnant,
    /// A step panicked; the bot's state is no longer trusted.
    Fault,
}

#[derive(Clone, Debug)]
pub struct Bot {
    pub dna: Vec<Instruction>,
    cursor: usize,
    track: Track,
    root: NodeId,
    pointer: NodeId,
    ancestors: Vec<NodeId>,
    inventory: Inventory,
    current: Scored,
    best: Scored,
    death: Option<Death>,
    /// DNA was mutated when this bot was bred.
    pub mutated: bool,
    /// Structure changed since `current` was priced.
    dirty: bool,
    stagnant: u32,
}

impl Bot {
    /// Bot starting from `start` (a flat chain of its pieces with default
    /// symmetry). `start.layout.inventory` is the stock still available.
    pub fn new(dna: Vec<Instruction>, start: &Scored) -> Self {
        let (mut track, root) = Track::from_pieces(&start.layout.pieces);
        track.install_default_symmetry(root);
        Self {
            dna,
            cursor: 0,
            track,
            root,
            pointer: root,
            ancestors: Vec::new(),
            inventory: start.layout.inventory.clone(),
            current: start.clone(),
            best: start.clone(),
            death: None,
            mutated: false,
            dirty: false,
            stagnant: 0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.death.is_some()
    }

    #[inline]
    pub fn death(&self) -> Option<Death> {
        self.death
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Node the next navigation or edit starts from.
    #[inline]
    pub fn pointer(&self) -> NodeId {
        self.pointer
    }

    #[inline]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn current(&self) -> &Scored {
        &self.current
    }

    /// Best layout this bot has produced.
    #[inline]
    pub fn best(&self) -> &Scored {
        &self.best
    }

    #[inline]
    pub fn stagnant_steps(&self) -> u32 {
        self.stagnant
    }

    #[inline]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Chain that scale/mutate act on: the pointer if it is a chain, else its
    /// parent, else the root.
    fn scope(&self) -> NodeId {
        if self.track.is_chain(self.pointer) {
            self.pointer
        } else {
            self.track.parent(self.pointer).unwrap_or(self.root)
        }
    }

    /// Run the instruction under the cursor. Returns the freshly priced layout
    /// while the bot is alive, `None` once it is dead.
    pub fn step<R: Rng + ?Sized>(&mut self, env: &Env<'_>, rng: &mut R) -> Option<&Scored> {
        if self.death.is_some() {
            return None;
        }
        let Some(&ins) = self.dna.get(self.cursor) else {
            return self.kill(Death::Stagnant);
        };
        let ok = match ins {
            Instruction::Idle | Instruction::Jump(_) => true,
            Instruction::Prev => {
                if let Some(p) = self.track.prev(self.pointer) {
                    self.pointer = p;
                }
                true
            }
            Instruction::Next => {
                if let Some(n) = self.track.next(self.pointer) {
                    self.pointer = n;
                }
                true
            }
            Instruction::Enter => {
                if let Some(h) = self.track.head(self.pointer) {
                    self.ancestors.push(self.pointer);
                    self.pointer = h;
                }
                true
            }
            Instruction::Exit => {
                if let Some(a) = self.ancestors.pop() {
                    self.pointer = a;
                }
                true
            }
            Instruction::Scale(dir, len) => self.retry(env.cfg.retries, |bot| {
                let scope = bot.scope();
                let proto = len.map(|n| bot.track.leaf(Piece::Straight(n)));
                bot.track
                    .try_scale(scope, Some(dir), proto, &mut bot.inventory, &mut *rng)
            }),
            Instruction::Mutate => self.retry(env.cfg.retries, |bot| bot.mutate(env.library, &mut *rng)),
        };
        if !ok {
            return self.kill(Death::RetriesExhausted);
        }
        self.cursor = wrap(self.cursor, ins.advance(), self.dna.len());
        self.reprice(env)
    }

    /// Attempt `f` up to `retries` times, restoring stock after each failure.
    fn retry(&mut self, retries: u32, mut f: impl FnMut(&mut Self) -> bool) -> bool {
        for _ in 0..retries.max(1) {
            let snapshot = self.inventory.clone();
            if f(self) {
                self.dirty = true;
                self.maybe_compact();
                return true;
            }
            self.inventory = snapshot;
        }
        false
    }

    fn mutate<R: Rng + ?Sized>(&mut self, library: &[Blueprint], rng: &mut R) -> bool {
        let Some(bp) = library.choose(rng) else {
            return false;
        };
        let scope = self.scope();
        let Ok(replacement) = bp.build(&mut self.track, &mut self.inventory) else {
            return false;
        };
        if self.track.try_mutate(scope, replacement, &mut self.inventory).is_none() {
            return false;
        }
        trace_log!("mutated scope {:?} with {bp}", scope);
        if !self.track.is_attached(self.pointer, self.root)
            || self
                .ancestors
                .iter()
                .any(|&a| !self.track.is_attached(a, self.root))
        {
            self.pointer = replacement;
            self.ancestors = self.path_to(replacement);
        }
        true
    }

    /// Chains enclosing `id`, outermost first.
    fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = std::iter::successors(self.track.parent(id), |&p| self.track.parent(p)).collect();
        path.reverse();
        path
    }

    fn maybe_compact(&mut self) {
        if self.track.len() <= 2 * self.track.live_count(self.root) {
            return;
        }
        let remap = self.track.compact(self.root);
        let map = |id: NodeId| remap.get(id).unwrap_or(NodeId(0));
        self.root = map(self.root);
        self.pointer = map(self.pointer);
        self.ancestors = self.ancestors.iter().map(|&a| map(a)).collect();
    }

    pub(crate) fn kill(&mut self, why: Death) -> Option<&Scored> {
        trace_log!("bot died: {why:?} at cursor {}", self.cursor);
        self.death = Some(why);
        None
    }

    fn reprice(&mut self, env: &Env<'_>) -> Option<&Scored> {
        let previous = self.current.price;
        if self.dirty {
            let layout = self
                .track
                .to_layout(self.root, self.inventory.clone(), env.waypoints.to_vec());
            if !trace(&layout).is_valid() {
                return self.kill(Death::BrokenTrace);
            }
            self.current = Scored::new(layout, env.pricer);
            self.dirty = false;
        }
        let price = self.current.price;
        if price < env.cfg.price_floor {
            return self.kill(Death::BelowFloor);
        }
        if (price - previous).abs() < env.cfg.stagnation_eps {
            self.stagnant += 1;
        } else {
            self.stagnant = 0;
        }
        if self.stagnant > env.cfg.stagnation_limit {
            return self.kill(Death::Stagnant);
        }
        if price > self.best.price {
            self.best = self.current.clone();
        }
        Some(&self.current)
    }
}
