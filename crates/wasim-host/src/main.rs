//! Runs the conway and worms simulations on fixed-period render loops.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use wasim_core::{HostConfig, SimulationKind};
use wasim_engine::{ConwayGrid, SteppableGrid, WormsGrid};
use wasim_host::{telemetry, BinaryPainter, Driver, GrayscalePainter, Painter, Rgb, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sim {
    Conway,
    Worms,
    Both,
}

impl Sim {
    fn kinds(self) -> Vec<SimulationKind> {
        match self {
            Sim::Conway => vec![SimulationKind::Conway],
            Sim::Worms => vec![SimulationKind::Worms],
            Sim::Both => vec![SimulationKind::Conway, SimulationKind::Worms],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "wasim", version, about = "Game of Life and worms cellular simulations")]
struct Args {
    /// Which simulation(s) to run
    #[arg(long, value_enum, default_value_t = Sim::Both)]
    sim: Sim,

    /// Frames to render per simulation; 0 runs until Ctrl+C
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// JSON host configuration; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed both simulations for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Seed the conway grid with a named pattern instead of noise
    #[arg(long)]
    pattern: Option<String>,

    /// Directory to write the last frame of each simulation to, as PPM
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    telemetry::init_telemetry(args.json_logs)?;

    let mut config = match &args.config {
        Some(path) => HostConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HostConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.conway.grid.seed = Some(seed);
        config.worms.grid.seed = Some(seed);
    }
    if let Some(pattern) = &args.pattern {
        config.conway.grid.pattern = Some(pattern.clone());
    }
    config.validate()?;

    info!(sim = ?args.sim, frames = args.frames, "Starting wasim");

    let max_frames = (args.frames > 0).then_some(args.frames);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut handles = Vec::new();

    for kind in args.sim.kinds() {
        let rx = shutdown_rx.clone();
        let snapshot = args.snapshot.clone();

        let handle = match kind {
            SimulationKind::Conway => {
                let grid = ConwayGrid::from_config(&config.conway.grid)
                    .context("creating conway simulation")?;
                let painter = BinaryPainter::new(&config.conway.render);
                let driver = Driver::new(kind.to_string(), grid, painter, config.conway.driver.clone())?;
                tokio::spawn(run_driver(driver, max_frames, rx, snapshot))
            }
            SimulationKind::Worms => {
                let grid = WormsGrid::from_config(&config.worms.grid)
                    .context("creating worms simulation")?;
                let painter = GrayscalePainter::new(&config.worms.render);
                let driver = Driver::new(kind.to_string(), grid, painter, config.worms.driver.clone())?;
                tokio::spawn(run_driver(driver, max_frames, rx, snapshot))
            }
        };
        handles.push(handle);
    }

    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        // Receivers may already be gone when every loop finished on its own
        let _ = shutdown_tx.send(true);
    });

    let mut summaries: Vec<RunSummary> = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(summary)) => summaries.push(summary),
            Ok(Err(e)) => error!("Simulation failed: {:#}", e),
            Err(e) => error!("Simulation task panicked: {}", e),
        }
    }
    signal_task.abort();

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    info!("Shutting down");

    Ok(())
}

async fn run_driver<G, P>(
    mut driver: Driver<G, P>,
    max_frames: Option<u64>,
    shutdown: watch::Receiver<bool>,
    snapshot: Option<PathBuf>,
) -> Result<RunSummary>
where
    G: SteppableGrid + Send,
    P: Painter<Cell = G::Cell> + Send,
{
    let summary = driver.run(max_frames, shutdown).await;

    if let Some(dir) = snapshot {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        let path = dir.join(format!("{}-{:06}.ppm", summary.simulation, summary.generation));
        driver
            .surface()
            .write_ppm(&path, Rgb::WHITE)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!(path = %path.display(), "Snapshot written");
    }

    Ok(summary)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
