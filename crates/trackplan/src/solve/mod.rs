//! Search engines behind one solver contract.
//!
//! Purpose
//! - `Solver` is the boundary every strategy implements: take a problem (an
//!   inventory plus waypoints), a pricing oracle, and a `Control`, and return
//!   the best layout found.
//! - `SharedBest` is the only state shared between concurrent search units.
//!   Compare-and-replace and the observer call happen under one lock, so
//!   notifications are ordered with respect to updates.
//!
//! Conventions
//! - Cancellation is advisory and observed only between whole units of work.
//! - Reported answers carry the problem's original inventory, never the stock
//!   left over inside the search.
//! - A candidate may only become the shared best if it traces cleanly and
//!   does not cross itself.
//!
//! Code cross-refs: `template::Track`, `blueprint::Blueprint`, `price::Pricer`.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::blueprint::{circle, parse_all, SEEDS};
use crate::layout::{Inventory, Layout};
use crate::price::{Pricer, Scored};
use crate::template::Track;
use crate::trace::{self_intersects, trace};

pub mod amplifier;
pub mod genetic;

pub use amplifier::{Amplifier, AmplifierCfg};
pub use genetic::{Genetic, GeneticCfg};

/// Common contract of all solving strategies.
pub trait Solver {
    fn name(&self) -> &'static str;

    /// Best effort: always returns a layout, even when cancelled immediately.
    fn solve(&self, problem: &Layout, pricer: &dyn Pricer, control: &Control) -> Scored;
}

type Observer = Arc<dyn Fn(&Scored) + Send + Sync>;

/// Cooperative cancellation flag plus an optional step observer.
#[derive(Clone, Default)]
pub struct Control {
    cancel: Arc<AtomicBool>,
    observer: Option<Observer>,
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("cancelled", &self.is_cancelled())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with every new shared best.
    pub fn with_observer(mut self, f: impl Fn(&Scored) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(f));
        self
    }

    /// Handle that can cancel the run from another thread.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn notify(&self, best: &Scored) {
        if let Some(f) = &self.observer {
            f(best);
        }
    }
}

/// Best answer so far, shared by all units of one run.
pub struct SharedBest<'c> {
    best: Mutex<Scored>,
    control: &'c Control,
}

impl<'c> SharedBest<'c> {
    pub fn new(initial: Scored, control: &'c Control) -> Self {
        Self {
            best: Mutex::new(initial),
            control,
        }
    }

    /// Current best price.
    pub fn price(&self) -> f64 {
        self.best.lock().unwrap_or_else(PoisonError::into_inner).price
    }

    pub fn snapshot(&self) -> Scored {
        self.best.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the best with `candidate` if it is strictly better; notifies
    /// the observer before releasing the lock.
    pub fn offer(&self, candidate: Scored) -> bool {
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if candidate.price <= best.price {
            return false;
        }
        info!(
            "new best {:.4} (was {:.4}, {} pieces)",
            candidate.price,
            best.price,
            candidate.layout.piece_count()
        );
        *best = candidate;
        self.control.notify(&best);
        true
    }

    pub fn into_inner(self) -> Scored {
        self.best.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Traces cleanly and does not cross itself.
pub fn is_sound(layout: &Layout) -> bool {
    let t = trace(layout);
    t.is_valid() && !self_intersects(layout, &t)
}

/// Best sound loop among the circle start and the seed loops, built against
/// the problem's stock. Falls back to the bare problem when none can be built.
pub fn start(problem: &Layout, pricer: &dyn Pricer) -> Scored {
    let mut found: Vec<Scored> = Vec::new();
    let mut track = Track::new();

    let mut inv = problem.inventory.clone();
    match circle(&mut track, &mut inv) {
        Ok(root) => found.push(Scored::new(
            track.to_layout(root, inv, problem.waypoints.clone()),
            pricer,
        )),
        Err(e) => debug!("circle start unavailable: {e}"),
    }
    for bp in parse_all(SEEDS.iter().copied()) {
        let mut inv = problem.inventory.clone();
        match bp.build(&mut track, &mut inv) {
            Ok(root) => found.push(Scored::new(
                track.to_layout(root, inv, problem.waypoints.clone()),
                pricer,
            )),
            Err(e) => debug!("seed {bp} unavailable: {e}"),
        }
    }
    found
        .into_iter()
        .filter(|s| is_sound(&s.layout))
        .max()
        .unwrap_or_else(|| Scored::new(problem.clone(), pricer))
}

/// Report `best` with the problem's original stock.
pub(crate) fn finish(mut best: Scored, original: &Inventory) -> Scored {
    best.layout.inventory = original.clone();
    best
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
