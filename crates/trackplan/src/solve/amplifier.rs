//! Amplifier: exhaustive parallel template substitution.
//!
//! Each pass runs one unit per blueprint (library probes plus seed patterns)
//! in parallel. A unit rebuilds the current best as a flat chain, finds every
//! child range whose output transform matches the blueprint, and tries each
//! substitution in chain order. Passes repeat until one brings no improvement.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{finish, panic_message, start, Control, SharedBest, Solver};
use crate::blueprint::{parse_all, Blueprint, LIBRARY, SEEDS};
use crate::layout::{Inventory, Layout, Piece};
use crate::price::{Pricer, Scored};
use crate::template::{NodeId, Track};
use crate::trace::{self_intersects, trace};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmplifierCfg {
    /// Upper bound on passes; `None` runs until a fixed point or cancellation.
    pub max_passes: Option<usize>,
    /// Extra patterns run next to the fixed library.
    pub seeds: Vec<String>,
}

impl Default for AmplifierCfg {
    fn default() -> Self {
        Self {
            max_passes: Some(64),
            seeds: SEEDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Amplifier {
    pub cfg: AmplifierCfg,
}

impl Amplifier {
    pub fn new(cfg: AmplifierCfg) -> Self {
        Self { cfg }
    }

    fn blueprints(&self) -> Vec<Blueprint> {
        parse_all(
            LIBRARY
                .iter()
                .copied()
                .chain(self.cfg.seeds.iter().map(String::as_str)),
        )
    }
}

impl Solver for Amplifier {
    fn name(&self) -> &'static str {
        "amplifier"
    }

    fn solve(&self, problem: &Layout, pricer: &dyn Pricer, control: &Control) -> Scored {
        let original = problem.inventory.clone();
        let shared = SharedBest::new(start(problem, pricer), control);
        let units = self.blueprints();
        info!(
            "amplifier: {} units, start price {:.4}",
            units.len(),
            shared.price()
        );

        let mut passes = 0usize;
        loop {
            if control.is_cancelled() {
                info!("amplifier: cancelled after {passes} passes");
                break;
            }
            if self.cfg.max_passes.is_some_and(|m| passes >= m) {
                info!("amplifier: pass limit {passes} reached");
                break;
            }
            let before = shared.price();
            let accepted: usize = units
                .par_iter()
                .map(|bp| {
                    catch_unwind(AssertUnwindSafe(|| unit(bp, &original, &shared, pricer)))
                        .unwrap_or_else(|payload| {
                            error!("amplifier unit {bp} panicked: {}", panic_message(&*payload));
                            0
                        })
                })
                .sum();
            passes += 1;
            debug!("amplifier pass {passes}: {accepted} offers accepted");
            if shared.price() <= before {
                info!("amplifier: fixed point after {passes} passes");
                break;
            }
        }
        finish(shared.into_inner(), &original)
    }
}

/// Try every substitution of `bp` into the current best; returns the number
/// of offers the shared best accepted.
pub(crate) fn unit(bp: &Blueprint, original: &Inventory, shared: &SharedBest<'_>, pricer: &dyn Pricer) -> usize {
    let best = shared.snapshot();
    let (mut track, root) = Track::from_pieces(&best.layout.pieces);

    // The probe only provides the matching key.
    let mut probe_stock = original.clone();
    let probe = match bp.build(&mut track, &mut probe_stock) {
        Ok(p) => p,
        Err(e) => {
            debug!("unit {bp}: {e}");
            return 0;
        }
    };
    let target = track.transform(probe);
    let kids: Vec<NodeId> = track.children(root).collect();
    let index = |id: NodeId| kids.iter().position(|&k| k == id);

    let mut accepted = 0;
    for (first, last) in track.find_all_sub_templates(root, &target) {
        let (Some(i), Some(j)) = (index(first), index(last)) else {
            continue;
        };
        let kept: Vec<Piece> = best.layout.pieces[..i]
            .iter()
            .chain(&best.layout.pieces[j + 1..])
            .copied()
            .collect();
        let mut inv = original.without(&kept);
        let mut candidate = track.clone();
        let Ok(replacement) = bp.build(&mut candidate, &mut inv) else {
            continue;
        };
        candidate.replace_range(first, last, replacement);
        let layout = candidate.to_layout(root, inv, best.layout.waypoints.clone());
        let t = trace(&layout);
        if !t.is_valid() {
            continue;
        }
        let price = pricer.price(&layout);
        if price <= shared.price() || self_intersects(&layout, &t) {
            continue;
        }
        if shared.offer(Scored { layout, price }) {
            accepted += 1;
        }
    }
    accepted
}
