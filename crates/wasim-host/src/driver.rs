//! Fixed-period render loop.
//!
//! A [`Driver`] owns one simulation and one painter. Each frame ticks the
//! simulation once and paints the settled generation. Stopping only ever
//! happens between frames, so the grid is never left half-computed.
//!
//! Frames are CPU-bound. On the multi-thread runtime each frame runs under
//! `block_in_place` so other tasks keep their worker; on a current-thread
//! runtime the frame runs inline and the loop only yields at the ticker.

use crate::painter::Painter;
use crate::surface::Surface;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument};
use wasim_core::{DriverConfig, Result};
use wasim_engine::SteppableGrid;

/// Timing accumulated over a window of frames
#[derive(Debug, Clone, Default)]
struct FrameWindow {
    frames: u64,
    tick_time: Duration,
    render_time: Duration,
    started: Option<Instant>,
}

impl FrameWindow {
    fn reset(&mut self, now: Instant) {
        *self = Self {
            started: Some(now),
            ..Default::default()
        };
    }

    fn record(&mut self, start: Instant, tick_time: Duration, render_time: Duration) {
        if self.started.is_none() {
            self.reset(start);
        }
        self.frames += 1;
        self.tick_time += tick_time;
        self.render_time += render_time;
    }

    fn stats(&self, now: Instant) -> WindowStats {
        let elapsed = self
            .started
            .map(|s| now.saturating_duration_since(s))
            .unwrap_or_default()
            .as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.frames as f64 / elapsed
        } else {
            0.0
        };
        let n = self.frames.max(1) as f64;

        WindowStats {
            fps,
            tick_ms: self.tick_time.as_secs_f64() * 1000.0 / n,
            render_ms: self.render_time.as_secs_f64() * 1000.0 / n,
        }
    }
}

/// Rates over one window
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowStats {
    fps: f64,
    tick_ms: f64,
    render_ms: f64,
}

/// What a finished run looked like
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub simulation: String,
    pub frames: u64,
    pub generation: u64,
    pub elapsed_ms: f64,
    pub mean_tick_ms: f64,
    pub mean_render_ms: f64,
    /// Grid activity after the last frame
    pub activity: f64,
}

pub struct Driver<G, P> {
    name: String,
    grid: G,
    painter: P,
    surface: Surface,
    config: DriverConfig,
    frames: u64,
    total_tick: Duration,
    total_render: Duration,
    window: FrameWindow,
}

impl<G, P> Driver<G, P>
where
    G: SteppableGrid,
    P: Painter<Cell = G::Cell>,
{
    pub fn new(name: impl Into<String>, grid: G, painter: P, config: DriverConfig) -> Result<Self> {
        let name = name.into();
        let (width, height) = painter.surface_size(grid.dimensions());
        let surface = Surface::new(width, height)?;

        info!(
            simulation = %name,
            grid = %grid.dimensions(),
            surface_width = width,
            surface_height = height,
            period_ms = config.period_ms,
            "Driver created"
        );

        Ok(Self {
            name,
            grid,
            painter,
            surface,
            config,
            frames: 0,
            total_tick: Duration::ZERO,
            total_render: Duration::ZERO,
            window: FrameWindow::default(),
        })
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Paint the current generation without advancing it
    pub fn render(&mut self) {
        self.painter
            .paint(self.grid.cells(), self.grid.dimensions(), &mut self.surface);
    }

    /// Advance one generation and paint it
    pub fn frame(&mut self) {
        let start = Instant::now();
        self.grid.tick();
        let ticked = Instant::now();
        self.render();
        let rendered = Instant::now();

        let tick_time = ticked - start;
        let render_time = rendered - ticked;
        self.frames += 1;
        self.total_tick += tick_time;
        self.total_render += render_time;

        self.window.record(start, tick_time, render_time);

        let every = self.config.perf_log_every;
        if every > 0 && self.window.frames >= every {
            self.log_window(rendered);
        }
    }

    fn log_window(&mut self, now: Instant) {
        let stats = self.window.stats(now);

        info!(
            event = "frame_stats",
            simulation = %self.name,
            generation = self.grid.generation(),
            fps = format!("{:.1}", stats.fps),
            tick_ms = format!("{:.2}", stats.tick_ms),
            render_ms = format!("{:.2}", stats.render_ms),
            activity = format!("{:.4}", self.grid.activity()),
            "Frame statistics"
        );

        self.window.reset(now);
    }

    fn frame_off_reactor(&mut self) {
        match Handle::try_current().map(|h| h.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| self.frame()),
            _ => self.frame(),
        }
    }

    /// Drive frames on the configured period until `max_frames` have run or
    /// `shutdown` flips to `true`. `None` runs until shutdown.
    #[instrument(skip(self, shutdown), fields(simulation = %self.name))]
    pub async fn run(&mut self, max_frames: Option<u64>, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let started = Instant::now();
        let mut ticker = interval(Duration::from_millis(self.config.period_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Show the seed generation before the first tick
        self.render();
        info!(max_frames = ?max_frames, "Starting render loop");

        let mut remaining = max_frames;
        loop {
            if remaining == Some(0) || *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    // A dropped sender also ends the loop
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Shutdown requested");
                        break;
                    }
                    continue;
                }
            }

            self.frame_off_reactor();
            remaining = remaining.map(|n| n - 1);
        }

        let summary = self.summary(started.elapsed());
        info!(
            event = "run_complete",
            frames = summary.frames,
            generation = summary.generation,
            activity = summary.activity,
            "Render loop stopped"
        );
        summary
    }

    pub fn summary(&self, elapsed: Duration) -> RunSummary {
        let n = self.frames.max(1) as f64;
        RunSummary {
            simulation: self.name.clone(),
            frames: self.frames,
            generation: self.grid.generation(),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            mean_tick_ms: self.total_tick.as_secs_f64() * 1000.0 / n,
            mean_render_ms: self.total_render.as_secs_f64() * 1000.0 / n,
            activity: self.grid.activity(),
        }
    }
}
