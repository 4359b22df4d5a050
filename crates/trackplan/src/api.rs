//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI,
//!   benches, and experiments. Breaking changes are allowed and expected.

// Geometry
pub use crate::geom::{angle_diff, normalize_angle, step, step_back, Cardinal, Position, Transform};
// Layout model
pub use crate::layout::{Edge, Hand, Inventory, Layout, Piece, PieceParseError, Stock, Turn, Waypoint};
// Tracing and crossings
pub use crate::trace::{self_intersects, trace, Trace, TraceError};
// Pricing
pub use crate::price::{FnPricer, Pricer, Scored, WaypointPricer};
// Templates and blueprints
pub use crate::blueprint::{circle, parse_all, Blueprint, BlueprintError, LIBRARY, SEEDS};
pub use crate::template::{Directions, NodeId, NodeKind, Track};
// Search engines
pub use crate::solve::genetic::{Bot, Death, Instruction};
pub use crate::solve::{
    is_sound, start, Amplifier, AmplifierCfg, Control, Genetic, GeneticCfg, SharedBest, Solver,
};
