//! Pricing oracle and scored layouts.
//!
//! - `Pricer`: opaque collaborator mapping a layout to a signed value.
//! - `WaypointPricer`: income from waypoints (inversely related to distance
//!   from the track) minus the price of every piece laid.
//! - `Scored`: a layout plus its price, totally ordered by price.

use std::cmp::Ordering;

use nalgebra::Vector2;
use serde::Serialize;

use crate::geom::{distance, segment_distance};
use crate::layout::Layout;
use crate::trace::trace;

/// Pricing oracle. Called once per candidate by the search engines.
pub trait Pricer: Sync {
    fn price(&self, layout: &Layout) -> f64;
}

/// Adapter turning a closure into a `Pricer`.
pub struct FnPricer<F>(pub F);

impl<F> Pricer for FnPricer<F>
where
    F: Fn(&Layout) -> f64 + Sync,
{
    fn price(&self, layout: &Layout) -> f64 {
        (self.0)(layout)
    }
}

/// Default oracle: Σ price_w / (1 + d_w) − Σ piece prices.
///
/// `d_w` is the distance from waypoint `w` to the nearest point of the sampled
/// track polylines.
/// Layouts with structural trace errors are worth `-∞`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaypointPricer;

impl Pricer for WaypointPricer {
    fn price(&self, layout: &Layout) -> f64 {
        let t = trace(layout);
        if !t.is_valid() {
            return f64::NEG_INFINITY;
        }
        let lines = t.polylines(layout);
        let income: f64 = layout
            .waypoints
            .iter()
            .map(|w| {
                let d = lines
                    .iter()
                    .map(|line| nearest(line, w.pos()))
                    .fold(f64::INFINITY, f64::min);
                w.price / (1.0 + d)
            })
            .sum();
        income - t.price
    }
}

fn nearest(line: &[Vector2<f64>], p: Vector2<f64>) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => distance(*only, p),
        _ => line
            .windows(2)
            .map(|s| segment_distance(p, s[0], s[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// A layout with its computed price; ordered by price only.
#[derive(Clone, Debug, Serialize)]
pub struct Scored {
    pub layout: Layout,
    pub price: f64,
}

impl Scored {
    pub fn new(layout: Layout, pricer: &dyn Pricer) -> Self {
        let price = pricer.price(&layout);
        Self { layout, price }
    }
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price.total_cmp(&other.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Inventory, Piece, Waypoint};

    fn circle(waypoints: Vec<Waypoint>) -> Layout {
        let inv = Inventory::new().with(Piece::right(4), 8, 1.5);
        Layout::closed_loop(inv, waypoints, vec![Piece::right(4); 8])
    }

    #[test]
    fn empty_track_is_worth_nothing() {
        let l = Layout::problem(Inventory::new(), vec![Waypoint::new(1.0, 1.0, 10.0)]);
        assert_eq!(WaypointPricer.price(&l), 0.0);
    }

    #[test]
    fn cost_is_subtracted_and_near_waypoints_pay_more() {
        let far = WaypointPricer.price(&circle(vec![Waypoint::new(100.0, 100.0, 10.0)]));
        let near = WaypointPricer.price(&circle(vec![Waypoint::new(0.0, 0.0, 10.0)]));
        assert!(near > far);
        // the waypoint sits on the track: full income minus 8 * 1.5
        assert!((near - (10.0 - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn waypoint_beside_a_long_straight_is_on_the_track() {
        let inv = Inventory::new()
            .with(Piece::Straight(4), 2, 0.0)
            .with(Piece::right(4), 8, 0.0);
        let mut pieces = vec![Piece::Straight(4)];
        pieces.extend([Piece::right(4); 4]);
        pieces.push(Piece::Straight(4));
        pieces.extend([Piece::right(4); 4]);
        // piece 0 runs from (-4, 0) to the origin; its middle has no sample point
        let l = Layout::closed_loop(inv, vec![Waypoint::new(-2.0, 0.0, 10.0)], pieces);
        assert!((WaypointPricer.price(&l) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn broken_topology_is_worthless() {
        use crate::layout::{Edge, Turn};
        let mut l = circle(Vec::new());
        l.pieces.push(Piece::L1);
        l.edges.push(Edge {
            from: 7,
            to: 8,
            turn: Turn::Straight,
        });
        l.edges.push(Edge {
            from: 8,
            to: 0,
            turn: Turn::Right,
        });
        assert_eq!(WaypointPricer.price(&l), f64::NEG_INFINITY);
    }

    #[test]
    fn scored_orders_by_price() {
        let a = Scored {
            layout: Layout::default(),
            price: 1.0,
        };
        let b = Scored {
            layout: Layout::default(),
            price: f64::NEG_INFINITY,
        };
        assert!(a > b);
        assert_eq!(std::cmp::max(a.clone(), b).price, 1.0);
        let p = FnPricer(|l: &Layout| l.pieces.len() as f64);
        assert_eq!(Scored::new(circle(Vec::new()), &p).price, 8.0);
    }
}
