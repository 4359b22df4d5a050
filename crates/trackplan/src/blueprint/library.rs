//! Fixed pattern library, seed loops, and the circle start.

use tracing::warn;

use super::{Blueprint, BlueprintError};
use crate::layout::Inventory;
use crate::template::{NodeId, Track};

/// Four right-hand quarter turns: the smallest closed loop.
pub const CIRCLE: &str = "T2T2T2T2";
const CIRCLE_LEFT: &str = "t2t2t2t2";

/// Substitution probes. Each one replaces any chain range with the same
/// output transform.
pub const LIBRARY: &[&str] = &[
    // straight runs and their splits
    "L1",
    "L2",
    "L3",
    "L4",
    "L1L1",
    "L2L2",
    // bridge spans the same distance as L4
    "B1",
    // single turns and their finer decompositions
    "T2",
    "t2",
    "T4",
    "t4",
    "T8",
    "t8",
    "T8T8",
    "t8t8",
    // S-bends
    "T4t4",
    "t4T4",
    // U-bends
    "T1",
    "t1",
    // mirrored bumps
    "t4T2t4",
    "T4t2T4",
    "t4L1T2L1t4",
    "T4L1t2L1T4",
    // straight/turn swaps
    "L2T2",
    "T2L2",
    "L2t2",
    "t2L2",
];

/// Hand-authored closed loops offered as starting points alongside the circle.
pub const SEEDS: &[&str] = &[
    "T2L4T2T2L4T2",
    "L2T2L2T2L2T2L2T2",
    "L8T2T2L8T2T2",
    "t2L4t2t2L4t2",
];

/// Parse every pattern, logging and skipping the malformed ones.
pub fn parse_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<Blueprint> {
    texts
        .into_iter()
        .filter_map(|t| match Blueprint::parse(t) {
            Ok(bp) => Some(bp),
            Err(e) => {
                warn!("skipping blueprint {t:?}: {e}");
                None
            }
        })
        .collect()
}

/// Build the circle start, falling back to left-hand stock. On failure the
/// inventory is left as it was.
pub fn circle(track: &mut Track, inv: &mut Inventory) -> Result<NodeId, BlueprintError> {
    let snapshot = inv.clone();
    let mut first = None;
    for text in [CIRCLE, CIRCLE_LEFT] {
        let bp = Blueprint::parse(text)?;
        match bp.build(track, inv) {
            Ok(root) => return Ok(root),
            Err(e) => {
                *inv = snapshot.clone();
                first.get_or_insert(e);
            }
        }
    }
    Err(first.unwrap_or(BlueprintError::Shortfall {
        token: CIRCLE.to_string(),
        missing: 0,
    }))
}
