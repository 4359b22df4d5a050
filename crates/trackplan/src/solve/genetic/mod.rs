//! Genetic search: a population of bots driven by byte-coded instruction tapes.
//!
//! Purpose
//! - Explore layouts by letting each bot walk its own template tree and apply
//!   scale/mutate instructions, then breed the tapes of the best bots.
//!
//! Model
//! - Bots step sequentially, one pass over the population at a time. A pass is
//!   the unit of cancellation.
//! - When every bot is dead, the top `survivors` bots by best-ever price
//!   are cloned round-robin into a new population; each clone may get a few
//!   random genes. New bots start from the shared best.
//!
//! Code cross-refs: `dna::Instruction`, `bot::Bot`, `super::SharedBest`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{finish, panic_message, start, Control, SharedBest, Solver};
use crate::blueprint::{parse_all, Blueprint, LIBRARY};
use crate::layout::Layout;
use crate::price::{Pricer, Scored};
use crate::trace::{self_intersects, trace};

mod bot;
mod dna;

pub use bot::{Bot, Death, Env};
pub use dna::{random_dna, wrap, Instruction};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticCfg {
    pub population: usize,
    pub survivors: usize,
    pub dna_len: usize,
    /// Attempts per scale/mutate instruction before the bot dies.
    pub retries: u32,
    /// Bots priced below this die.
    pub price_floor: f64,
    /// Price changes smaller than this count as a stagnant step.
    pub stagnation_eps: f64,
    /// Bots die on the first stagnant step beyond this many in a row.
    pub stagnation_limit: u32,
    /// Chance that a bred clone gets mutated genes.
    pub mutation_rate: f64,
    /// `None` runs until cancelled.
    pub max_generations: Option<u64>,
    pub seed: u64,
}

impl Default for GeneticCfg {
    fn default() -> Self {
        Self {
            population: 24,
            survivors: 8,
            dna_len: 64,
            retries: 10,
            price_floor: -1000.0,
            stagnation_eps: 1e-9,
            stagnation_limit: 100,
            mutation_rate: 0.35,
            max_generations: None,
            seed: 0x5eed,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Genetic {
    pub cfg: GeneticCfg,
}

impl Genetic {
    pub fn new(cfg: GeneticCfg) -> Self {
        Self { cfg }
    }

    fn spawn<R: Rng + ?Sized>(&self, from: &Scored, rng: &mut R) -> Vec<Bot> {
        (0..self.cfg.population.max(1))
            .map(|_| Bot::new(random_dna(self.cfg.dna_len.max(1), rng), from))
            .collect()
    }
}

/// Next population: top `survivors` tapes by best-ever price, cloned
/// round-robin; each clone mutates 1..=len/8 genes with `mutation_rate`.
pub fn breed<R: Rng + ?Sized>(population: &[Bot], cfg: &GeneticCfg, from: &Scored, rng: &mut R) -> Vec<Bot> {
    let mut ranked: Vec<&Bot> = population.iter().collect();
    ranked.sort_by(|a, b| b.best().price.total_cmp(&a.best().price));
    let parents = &ranked[..cfg.survivors.max(1).min(ranked.len())];
    if parents.is_empty() {
        return Vec::new();
    }
    (0..cfg.population.max(1))
        .map(|k| {
            let mut dna = parents[k % parents.len()].dna.clone();
            let mutated = rng.gen_bool(cfg.mutation_rate.clamp(0.0, 1.0));
            if mutated && !dna.is_empty() {
                let genes = rng.gen_range(1..=(dna.len() / 8).max(1));
                for _ in 0..genes {
                    let at = rng.gen_range(0..dna.len());
                    dna[at] = Instruction::random(rng);
                }
            }
            let mut bot = Bot::new(dna, from);
            bot.mutated = mutated;
            bot
        })
        .collect()
}

impl Solver for Genetic {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn solve(&self, problem: &Layout, pricer: &dyn Pricer, control: &Control) -> Scored {
        let original = problem.inventory.clone();
        let first = start(problem, pricer);
        let shared = SharedBest::new(first.clone(), control);
        let library: Vec<Blueprint> = parse_all(LIBRARY.iter().copied());
        let env = Env {
            waypoints: &problem.waypoints,
            library: &library,
            pricer,
            cfg: &self.cfg,
        };
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        let mut population = self.spawn(&first, &mut rng);
        let mut generation: u64 = 0;
        info!(
            "genetic: population {} start price {:.4}",
            population.len(),
            first.price
        );

        loop {
            if control.is_cancelled() {
                info!("genetic: cancelled in generation {generation}");
                break;
            }
            if pass(&mut population, &env, &shared, &mut rng) > 0 {
                continue;
            }
            generation += 1;
            if self.cfg.max_generations.is_some_and(|m| generation >= m) {
                info!("genetic: generation limit {generation} reached");
                break;
            }
            let from = shared.snapshot();
            population = breed(&population, &self.cfg, &from, &mut rng);
            info!(
                "genetic: generation {generation}, best {:.4}, {} mutated",
                from.price,
                population.iter().filter(|b| b.mutated).count()
            );
        }
        finish(shared.into_inner(), &original)
    }
}

/// Step every live bot once; offer sound improvements. Returns the number of
/// bots still alive. A bot whose step panics dies with `Death::Fault`; the
/// rest of the population keeps going.
pub fn pass<R: Rng + ?Sized>(population: &mut [Bot], env: &Env<'_>, shared: &SharedBest<'_>, rng: &mut R) -> usize {
    let mut alive = 0;
    for (k, bot) in population.iter_mut().enumerate() {
        if bot.is_dead() {
            continue;
        }
        let run = catch_unwind(AssertUnwindSafe(|| {
            improvement(&mut *bot, env, shared, &mut *rng)
        }));
        match run {
            Ok(Some(candidate)) => {
                shared.offer(candidate);
            }
            Ok(None) => {}
            Err(payload) => {
                error!("bot {k} panicked: {}", panic_message(&*payload));
                bot.kill(Death::Fault);
            }
        }
        if !bot.is_dead() {
            alive += 1;
        }
    }
    alive
}

/// Step `bot`; its new layout if it beats the shared best without crossing itself.
fn improvement<R: Rng + ?Sized>(bot: &mut Bot, env: &Env<'_>, shared: &SharedBest<'_>, rng: &mut R) -> Option<Scored> {
    let current = bot.step(env, rng)?;
    if current.price <= shared.price() {
        return None;
    }
    let t = trace(&current.layout);
    if self_intersects(&current.layout, &t) {
        debug!("bot layout at {:.4} crosses itself", current.price);
        return None;
    }
    Some(current.clone())
}
