//! Geometry constants (track units and tolerances).
//!
//! Policy
//! - Fixed constants, not runtime configuration: every piece of a physical
//!   set shares one radius and one bridge span.

/// Radius shared by every turn class.
pub const TURN_RADIUS: f64 = 4.0;
/// Forward advance of a bridge piece.
pub const BRIDGE_LENGTH: f64 = 4.0;
/// Heading tolerance for cardinal buckets and heading comparisons.
pub const ANGLE_EPS: f64 = 1e-6;
/// Tolerance on Δx/Δy when comparing output transforms.
pub const TRANSFORM_EPS: f64 = 1e-6;
/// Tolerance on coordinates when the trace checks for conflicting positions.
pub const POSITION_EPS: f64 = 1e-6;
/// Maximum arc swept by one polyline segment when sampling turns.
pub const SAMPLE_ARC: f64 = std::f64::consts::PI / 16.0;
