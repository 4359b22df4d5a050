//! Geometry Engine: positions, output transforms, and piece steps.
//!
//! Purpose
//! - Pure, stateless functions that advance a position over one piece and
//!   compare the net effect of piece sequences.
//!
//! Conventions
//! - Heading 0 faces +x (East) and grows counter-clockwise; headings are
//!   always renormalized into [0, 2π).
//! - A positive turn sign is a right-hand turn: the piece bends to the right
//!   of the heading and the heading decreases by the turn angle π/class.
//! - Equality of positions and transforms is tolerance-based (`cfg`).
//!
//! Code cross-refs: `layout::Piece`, `trace::trace`, `template::Track`.

pub mod cfg;
mod step;
mod types;

pub use step::{
    angle_diff, distance, normalize_angle, rotate, sample, segment_distance, step, step_back,
};
pub use types::{Cardinal, Position, Transform};

#[cfg(test)]
mod tests;
