use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;
use trackplan::api::{
    self_intersects, trace, Amplifier, AmplifierCfg, Control, Genetic, GeneticCfg, Layout, Pricer,
    Scored, Solver, WaypointPricer,
};

mod provenance;

#[derive(Parser)]
#[command(name = "trackplan-cli")]
#[command(about = "Search closed track layouts that pay off near waypoints")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    Amplifier,
    Genetic,
}

#[derive(Subcommand)]
enum Action {
    /// Solve a problem (inventory + waypoints) and write the best layout
    Solve {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Engine::Amplifier)]
        engine: Engine,
        #[arg(long)]
        out: PathBuf,
        /// JSON file with the engine's config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cancel the search after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
        /// Genetic engine seed
        #[arg(long)]
        seed: Option<u64>,
        /// Genetic engine generation limit
        #[arg(long)]
        generations: Option<u64>,
    },
    /// Trace a layout and print positions, price, and structural errors
    Trace {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Solve {
            input,
            engine,
            out,
            config,
            seconds,
            seed,
            generations,
        } => solve(&input, engine, &out, config.as_deref(), seconds, seed, generations),
        Action::Trace { input } => trace_cmd(&input),
        Action::Report => report(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn solve(
    input: &Path,
    engine: Engine,
    out: &Path,
    config: Option<&Path>,
    seconds: Option<u64>,
    seed: Option<u64>,
    generations: Option<u64>,
) -> Result<()> {
    let problem: Layout = read_json(input)?;
    tracing::info!(input = %input.display(), engine = ?engine, "solve");

    let (solver, params): (Box<dyn Solver>, serde_json::Value) = match engine {
        Engine::Amplifier => {
            let cfg: AmplifierCfg = match config {
                Some(p) => read_json(p)?,
                None => AmplifierCfg::default(),
            };
            let params = serde_json::to_value(&cfg)?;
            (Box::new(Amplifier::new(cfg)), params)
        }
        Engine::Genetic => {
            let mut cfg: GeneticCfg = match config {
                Some(p) => read_json(p)?,
                None => GeneticCfg::default(),
            };
            if let Some(s) = seed {
                cfg.seed = s;
            }
            if generations.is_some() {
                cfg.max_generations = generations;
            }
            if cfg.max_generations.is_none() && seconds.is_none() {
                bail!("the genetic engine needs --seconds or --generations to stop");
            }
            let params = serde_json::to_value(&cfg)?;
            (Box::new(Genetic::new(cfg)), params)
        }
    };

    let control = Control::new().with_observer(|best: &Scored| {
        tracing::debug!(price = best.price, pieces = best.layout.piece_count(), "step");
    });
    if let Some(secs) = seconds {
        let flag = control.cancel_flag();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            flag.store(true, std::sync::atomic::Ordering::Relaxed);
        });
    }

    let best = solver.solve(&problem, &WaypointPricer, &control);
    tracing::info!(price = best.price, pieces = best.layout.piece_count(), "done");
    write_json(out, &best.layout)?;

    let payload = provenance::Payload::new(
        solver.name(),
        json!({
            "input": input.to_string_lossy(),
            "seconds": seconds,
            "config": params,
        }),
    )
    .with_price(best.price);
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(sidecar = %sidecar.display(), "provenance");
    Ok(())
}

fn trace_cmd(input: &Path) -> Result<()> {
    let layout: Layout = read_json(input)?;
    let t = trace(&layout);
    let positions: Vec<_> = t
        .ends
        .iter()
        .map(|e| e.map(|p| [p.p.x, p.p.y, p.angle]))
        .collect();
    let errors: Vec<String> = t.errors.iter().map(ToString::to_string).collect();
    let doc = json!({
        "positions": positions,
        "piece_price": t.price,
        "errors": errors,
        "self_intersects": t.is_valid() && self_intersects(&layout, &t),
        "price": WaypointPricer.price(&layout),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report() -> Result<()> {
    let payload = provenance::Payload::new("none", json!({}));
    println!(
        "{}",
        serde_json::to_string_pretty(&provenance::block(&payload, &[]))?
    );
    Ok(())
}
