//! Template Structure: a doubly-linked, symmetry-annotated track arena.
//!
//! Purpose
//! - Represent partially or fully built track as composable templates (single
//!   pieces and chains of templates behave uniformly) that can be spliced,
//!   scaled, and pattern-substituted in place.
//!
//! Model
//! - `Track` is an arena; `NodeId` handles are stable for the arena's lifetime.
//!   Spliced-out nodes stay allocated but unreachable (`Track::compact` drops them).
//! - `next`/`prev` link siblings inside one chain; a chain owns `head`/`tail`
//!   into its children, and navigation never crosses a chain boundary: from the
//!   outside a chain is one node.
//! - Every node stores its own start; the end is derived from start and content
//!   and can never be set directly.
//! - `symmetric` is a non-owning partner handle used by scaling; it may be absent.
//!
//! Code cross-refs: `geom::{step, Transform, Cardinal}`, `blueprint::Blueprint::build`.

mod arena;
mod edit;

pub use arena::{NodeId, NodeKind, Remap, Track};
pub use edit::Directions;

#[cfg(test)]
mod tests;
