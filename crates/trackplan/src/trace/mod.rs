//! Trace Engine: resolve piece coordinates by walking topology edges.
//!
//! Purpose
//! - Turn the position-independent interchange form (`Layout`) into concrete
//!   coordinates, the total piece price, and a list of structural errors.
//!
//! Model
//! - Piece `i`'s resolved position is the position at its end. Piece 0 ends at
//!   the implicit origin, so the closing edge of a loop re-derives piece 0 and
//!   doubles as the closure check.
//! - Edges are processed in stored order, not by geometric adjacency. The first
//!   structural error halts processing; the partial result is still returned
//!   and unresolved pieces stay `None`.
//!
//! Code cross-refs: `geom::step`, `crossing::self_intersects`, `price::WaypointPricer`.

mod crossing;

pub use crossing::{segments_cross, self_intersects};

use std::fmt;

use nalgebra::Vector2;

use crate::geom::{cfg::POSITION_EPS, sample, step, Position};
use crate::layout::{Layout, Turn};

/// Structural inconsistency found while tracing (edge index included).
#[derive(Clone, Debug, PartialEq)]
pub enum TraceError {
    IndexOutOfRange {
        edge: usize,
        index: usize,
    },
    SourceUnresolved {
        edge: usize,
        source: usize,
    },
    Conflict {
        edge: usize,
        piece: usize,
        resolved: Position,
        derived: Position,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { edge, index } => {
                write!(f, "edge {edge}: piece index {index} out of range")
            }
            Self::SourceUnresolved { edge, source } => {
                write!(f, "edge {edge}: source piece {source} has no position yet")
            }
            Self::Conflict {
                edge,
                piece,
                resolved,
                derived,
            } => write!(
                f,
                "edge {edge}: piece {piece} already at ({:.6}, {:.6}, {:.6}), edge derives ({:.6}, {:.6}, {:.6})",
                resolved.p.x, resolved.p.y, resolved.angle, derived.p.x, derived.p.y, derived.angle
            ),
        }
    }
}

impl std::error::Error for TraceError {}

/// Resolved geometry of a layout.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    /// End position per piece index.
    pub ends: Vec<Option<Position>>,
    /// Start position per piece index (the source end of its incoming edge).
    pub starts: Vec<Option<Position>>,
    /// Turn sign of the edge that set `starts[i]`.
    pub turns: Vec<Option<Turn>>,
    /// Summed unit price of every referenced piece.
    pub price: f64,
    pub errors: Vec<TraceError>,
}

impl Trace {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Sampled polyline per piece (empty for pieces without a resolved start).
    /// Turns bend the way their incoming edge says, as in `trace`.
    pub fn polylines(&self, layout: &Layout) -> Vec<Vec<Vector2<f64>>> {
        layout
            .pieces
            .iter()
            .zip(self.starts.iter().zip(&self.turns))
            .map(|(piece, entry)| match entry {
                (Some(s), Some(turn)) => sample(*s, *piece, *turn),
                _ => Vec::new(),
            })
            .collect()
    }
}

/// Walk the topology of `layout` from the implicit origin.
pub fn trace(layout: &Layout) -> Trace {
    let n = layout.pieces.len();
    let mut out = Trace {
        ends: vec![None; n],
        starts: vec![None; n],
        turns: vec![None; n],
        price: layout
            .pieces
            .iter()
            .map(|p| layout.inventory.price(*p))
            .sum(),
        errors: Vec::new(),
    };
    if n == 0 {
        return out;
    }
    out.ends[0] = Some(Position::origin());
    for (k, e) in layout.edges.iter().enumerate() {
        if let Some(&index) = [e.from, e.to].iter().find(|&&i| i >= n) {
            out.errors.push(TraceError::IndexOutOfRange { edge: k, index });
            break;
        }
        let Some(src) = out.ends[e.from] else {
            out.errors.push(TraceError::SourceUnresolved {
                edge: k,
                source: e.from,
            });
            break;
        };
        let derived = step(src, layout.pieces[e.to], e.turn);
        match out.ends[e.to] {
            Some(resolved) if !resolved.approx_eq(&derived, POSITION_EPS) => {
                out.errors.push(TraceError::Conflict {
                    edge: k,
                    piece: e.to,
                    resolved,
                    derived,
                });
                break;
            }
            Some(_) => {}
            None => out.ends[e.to] = Some(derived),
        }
        if out.starts[e.to].is_none() {
            out.starts[e.to] = Some(src);
            out.turns[e.to] = Some(e.turn);
        }
    }
    out
}
