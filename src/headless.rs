//! Windowless run: load one product's sequence to completion and report
//! which tier served each slot. Used by `--check` to verify an asset tree.

use anyhow::{Context, Result, bail};
use log::info;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use crate::config::ViewerSettings;
use crate::core::{EventBus, Player, PlayerEmitter, SequenceLoader, Workers};
use crate::entities::{FitRect, Frame, FrameOrigin, FrameRenderer, FsImageSource, ImageSource, WorkerPool};

/// Surface of fixed size that only remembers the last draw
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: (f32, f32),
    last: Option<(usize, FitRect)>,
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { size: (width, height), last: None }
    }

    pub fn last_draw(&self) -> Option<(usize, FitRect)> {
        self.last
    }
}

impl FrameRenderer for HeadlessSurface {
    fn surface_size(&self) -> (f32, f32) {
        self.size
    }

    fn clear(&mut self) {
        self.last = None;
    }

    fn draw(&mut self, index: usize, _frame: &Frame, dest: FitRect) {
        self.last = Some((index, dest));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub product: String,
    pub total: usize,
    pub loaded: usize,
    pub canonical: usize,
    pub generic: usize,
    pub placeholder: usize,
    pub elapsed: Duration,
    pub rendered: Option<(usize, FitRect)>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "product:     {}", self.product)?;
        writeln!(f, "frames:      {}/{}", self.loaded, self.total)?;
        writeln!(f, "canonical:   {}", self.canonical)?;
        writeln!(f, "generic:     {}", self.generic)?;
        writeln!(f, "placeholder: {}", self.placeholder)?;
        write!(f, "elapsed:     {:.1} ms", self.elapsed.as_secs_f64() * 1000.0)
    }
}

/// Load `product` from the configured asset root and wait for Ready.
pub fn check(settings: &ViewerSettings, product: &str, timeout: Duration) -> Result<CheckReport> {
    let epoch = Arc::new(AtomicU64::new(0));
    let threads = settings.worker_threads.unwrap_or_else(Workers::default_threads);
    let workers = Arc::new(Workers::new(threads, Arc::clone(&epoch)).context("Failed to start loader threads")?);
    let source = Arc::new(FsImageSource::new(&settings.asset_root));
    check_with(settings, product, timeout, workers, source, epoch)
}

/// `check` with injected pool and image source
pub fn check_with(
    settings: &ViewerSettings,
    product: &str,
    timeout: Duration,
    pool: Arc<dyn WorkerPool>,
    source: Arc<dyn ImageSource>,
    epoch: Arc<AtomicU64>,
) -> Result<CheckReport> {
    let loader = SequenceLoader::new(pool, source, settings.asset_policy(), epoch);
    let bus = EventBus::new();
    let mut player = Player::new(
        settings.player_settings(),
        loader,
        HeadlessSurface::new(settings.placeholder_size as f32, settings.placeholder_size as f32),
        PlayerEmitter::from_emitter(bus.emitter()),
    );

    let started = Instant::now();
    player.open(product, started);
    player.set_auto_rotate(false, started);

    while !player.is_ready() {
        let remaining = timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() || !player.pump(remaining) {
            let p = player.progress();
            bail!("Timed out loading '{}' after {:?} ({}/{} frames)", product, timeout, p.loaded, p.total);
        }
    }
    let elapsed = started.elapsed();
    player.close();

    let Some(seq) = player.sequence() else {
        bail!("No sequence loaded for '{}'", product);
    };
    let report = CheckReport {
        product: product.to_string(),
        total: seq.total(),
        loaded: seq.progress().loaded,
        canonical: seq.count_origin(FrameOrigin::Canonical),
        generic: seq.count_origin(FrameOrigin::Generic),
        placeholder: seq.count_origin(FrameOrigin::Placeholder),
        elapsed,
        rendered: player.renderer().last_draw(),
    };
    info!(
        "Check '{}': {} canonical, {} generic, {} placeholder in {:?}",
        product, report.canonical, report.generic, report.placeholder, elapsed
    );
    // Drain so nothing lingers in the bus
    bus.poll();
    Ok(report)
}
