//! Engine timing probe on a fixed waypoint problem.
//!
//! Purpose
//! - Reproducible data point for "how long does each engine take to settle on
//!   a small problem, and how good is the answer?"
//!
//! Why this shape
//! - The amplifier stops on its own at a fixed point; the genetic engine is
//!   bounded by a generation limit so both finish without a timer.
//!
//! Code: crates/trackplan/src/solve/{amplifier.rs, genetic/mod.rs}

use std::time::Instant;

use trackplan::api::{
    start, Amplifier, Control, Genetic, GeneticCfg, Inventory, Layout, Piece, Solver, Waypoint,
    WaypointPricer,
};

fn main() {
    let problem = Layout::problem(
        Inventory::new()
            .with(Piece::right(4), 16, 1.0)
            .with(Piece::left(4), 8, 1.0)
            .with(Piece::right(8), 8, 0.6)
            .with(Piece::L1, 16, 0.2)
            .with(Piece::Straight(2), 8, 0.3)
            .with(Piece::Straight(4), 8, 0.5)
            .with(Piece::Bridge, 1, 2.0),
        vec![
            Waypoint::new(6.0, 14.0, 40.0),
            Waypoint::new(-10.0, -6.0, 30.0),
            Waypoint::new(18.0, -12.0, 25.0),
        ],
    );
    let baseline = start(&problem, &WaypointPricer);
    println!("start: price={:.4} pieces={}", baseline.price, baseline.layout.piece_count());

    let engines: Vec<Box<dyn Solver>> = vec![
        Box::new(Amplifier::default()),
        Box::new(Genetic::new(GeneticCfg {
            max_generations: Some(20),
            ..GeneticCfg::default()
        })),
    ];
    for engine in engines {
        let t0 = Instant::now();
        let best = engine.solve(&problem, &WaypointPricer, &Control::new());
        println!(
            "{}: price={:.4} pieces={} time_ms={:.2}",
            engine.name(),
            best.price,
            best.layout.piece_count(),
            t0.elapsed().as_secs_f64() * 1e3
        );
    }
}
