//! Layout Model: inventory, waypoints, ordered pieces, and topology edges.
//!
//! Purpose
//! - Hold one buildable layout in its position-independent interchange form.
//!   Coordinates are never stored here; `crate::trace` derives them.
//!
//! Conventions
//! - `pieces[i]` is the piece at index `i`; edges refer to pieces by index.
//! - A closed loop of `n` pieces has edges `i -> i+1` plus the closing edge
//!   `n-1 -> 0`; piece 0 ends at the implicit origin.
//! - `inventory` carries the counts still available after the pieces are laid
//!   (solvers reset it to the starting counts when reporting).
//!
//! Code cross-refs: `trace::trace`, `template::Track::to_layout`.

mod inventory;
mod piece;

pub use inventory::{Inventory, Stock, StockRow};
pub use piece::{Hand, Piece, PieceParseError, Turn};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Fixed profit point near the track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub price: f64,
}

impl Waypoint {
    #[inline]
    pub fn new(x: f64, y: f64, price: f64) -> Self {
        Self { x, y, price }
    }

    #[inline]
    pub fn pos(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Topology edge: piece `to` is laid after piece `from` with the given turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub turn: Turn,
}

/// One concrete track arrangement (or a partial problem: inventory + waypoints).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub inventory: Inventory,
    pub waypoints: Vec<Waypoint>,
    pub pieces: Vec<Piece>,
    pub edges: Vec<Edge>,
}

impl Layout {
    /// Partial problem: no pieces laid yet.
    pub fn problem(inventory: Inventory, waypoints: Vec<Waypoint>) -> Self {
        Self {
            inventory,
            waypoints,
            pieces: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Interchange form of a simple closed loop over `pieces` in order.
    pub fn closed_loop(inventory: Inventory, waypoints: Vec<Waypoint>, pieces: Vec<Piece>) -> Self {
        let n = pieces.len();
        let edges = if n < 2 {
            Vec::new()
        } else {
            (0..n)
                .map(|i| {
                    let to = (i + 1) % n;
                    Edge {
                        from: i,
                        to,
                        turn: pieces[to].turn(),
                    }
                })
                .collect()
        };
        Self {
            inventory,
            waypoints,
            pieces,
            edges,
        }
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// True when `a` and `b` share a topology edge.
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.edges
            .iter()
            .any(|e| (e.from == a && e.to == b) || (e.from == b && e.to == a))
    }
}
