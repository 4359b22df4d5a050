//! Track layout search: geometry, templates, and two search engines.
//!
//! Layers, leaves first
//! - `geom`: positions, piece steps, output transforms.
//! - `layout`: pieces, inventory, waypoints, and the interchange form.
//! - `trace`: resolve piece positions from the topology; crossing detector.
//! - `price`: the pricing oracle and scored layouts.
//! - `template`: the symmetry-annotated template arena.
//! - `blueprint`: pattern strings compiled against an inventory.
//! - `solve`: solver contract, Amplifier, Genetic.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - `api` is the curated import surface for the CLI and benches.

pub mod api;
pub mod blueprint;
pub mod geom;
pub mod layout;
pub mod price;
pub mod solve;
pub mod template;
pub mod trace;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::blueprint::Blueprint;
    pub use crate::geom::{Cardinal, Position, Transform};
    pub use crate::layout::{Inventory, Layout, Piece, Waypoint};
    pub use crate::price::{Pricer, Scored, WaypointPricer};
    pub use crate::solve::{Control, Solver};
    pub use crate::template::{NodeId, Track};
    pub use nalgebra::Vector2 as Vec2;
}
