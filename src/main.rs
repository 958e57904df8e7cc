use turntable::cli::Args;
use turntable::config::{self, ViewerSettings};
use turntable::core::{EventBus, Player, PlayerEmitter, SequenceLoader, Workers};
use turntable::entities::{Catalog, FsImageSource, Product};
use turntable::headless;
use turntable::widgets::status::StatusBar;
use turntable::widgets::viewer::{self, EguiSurface};

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

/// How long `--check` waits for a sequence
const CHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// Repaint cadence while frames are still arriving
const LOADING_REPAINT: Duration = Duration::from_millis(16);

/// UI state persisted by eframe between runs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct PersistedState {
    last_product: Option<String>,
    show_details: bool,
}

impl PersistedState {
    /// A closed viewer is not reopened on the next start
    fn capture(selected: Option<&str>, viewer_open: bool, show_details: bool) -> Self {
        Self {
            last_product: selected.filter(|_| viewer_open).map(str::to_string),
            show_details,
        }
    }
}

/// Main application state
struct TurntableApp {
    player: Player<EguiSurface>,
    catalog: Catalog,
    /// Catalog id, or a bare product kind opened from the command line
    selected: Option<String>,
    event_bus: EventBus,
    status_bar: StatusBar,
    show_details: bool,
    is_fullscreen: bool,
}

impl TurntableApp {
    fn new(settings: &ViewerSettings, catalog: Catalog, persisted: PersistedState) -> Result<Self> {
        let epoch = Arc::new(AtomicU64::new(0));
        let threads = settings.worker_threads.unwrap_or_else(Workers::default_threads);
        let workers = Arc::new(Workers::new(threads, Arc::clone(&epoch)).context("Failed to start loader threads")?);
        let source = Arc::new(FsImageSource::new(&settings.asset_root));
        info!("Asset root: {}", settings.asset_root.display());

        let loader = SequenceLoader::new(workers, source, settings.asset_policy(), epoch);
        let event_bus = EventBus::new();
        let player = Player::new(
            settings.player_settings(),
            loader,
            EguiSurface::new(),
            PlayerEmitter::from_emitter(event_bus.emitter()),
        );

        Ok(Self {
            player,
            catalog,
            selected: None,
            event_bus,
            status_bar: StatusBar::new(),
            show_details: persisted.show_details,
            is_fullscreen: false,
        })
    }

    fn selected_product(&self) -> Option<&Product> {
        self.selected.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// Open the viewer for a catalog id or product kind
    fn open_product(&mut self, key: &str) {
        let (id, kind) = match self.catalog.find(key) {
            Some(product) => (product.id.clone(), product.kind.clone()),
            None => {
                warn!("'{}' not in catalog, opening as product kind", key);
                (key.to_string(), key.to_string())
            }
        };
        info!("Opening viewer: {} ({})", id, kind);
        self.selected = Some(id);
        self.player.open(&kind, Instant::now());
    }

    fn close_viewer(&mut self, ctx: &egui::Context) {
        self.player.close();
        if self.is_fullscreen {
            self.set_fullscreen(ctx, false);
        }
    }

    fn set_fullscreen(&mut self, ctx: &egui::Context, enabled: bool) {
        self.is_fullscreen = enabled;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(enabled));
        debug!("Fullscreen: {}", enabled);
    }

    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.player.is_open() {
            return;
        }
        let (left, right, escape, space, home, f) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::Home),
                i.key_pressed(egui::Key::F),
            )
        });

        if left {
            self.player.step_frame(-1);
        }
        if right {
            self.player.step_frame(1);
        }
        if space {
            self.player.toggle_auto_rotate(now);
        }
        if home {
            self.player.reset();
        }
        if f {
            self.set_fullscreen(ctx, !self.is_fullscreen);
        }
        if escape {
            self.close_viewer(ctx);
        }
    }

    fn product_panel(&mut self, ctx: &egui::Context) {
        let mut clicked = None;
        egui::SidePanel::left("products")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Collection");
                ui.separator();
                for product in &self.catalog.products {
                    let selected = self.player.is_open() && self.selected.as_deref() == Some(product.id.as_str());
                    let text = format!("{}\n{}", product.name, product.price);
                    if ui.selectable_label(selected, text).clicked() {
                        clicked = Some(product.id.clone());
                    }
                }
                ui.separator();
                ui.checkbox(&mut self.show_details, "Show details");
            });
        if let Some(id) = clicked {
            self.open_product(&id);
        }
    }

    fn details_panel(&self, ctx: &egui::Context) {
        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                let Some(product) = self.selected_product() else {
                    ui.label("No details available");
                    return;
                };
                ui.heading(&product.name);
                if !product.price.is_empty() {
                    ui.label(&product.price);
                }
                ui.separator();
                if product.details.is_empty() {
                    ui.label("No details available");
                } else {
                    egui::Grid::new("product_details").num_columns(2).striped(true).show(ui, |ui| {
                        for detail in &product.details {
                            ui.strong(&detail.label);
                            ui.label(&detail.value);
                            ui.end_row();
                        }
                    });
                }
            });
    }
}

impl eframe::App for TurntableApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.player.update(now);

        for event in self.event_bus.poll() {
            self.status_bar.handle_event(&event);
        }

        self.handle_keys(ctx, now);

        if !self.is_fullscreen {
            self.product_panel(ctx);
            self.status_bar.render(ctx);
            if self.show_details && self.player.is_open() {
                self.details_panel(ctx);
            }
        }

        let mut actions = viewer::ViewerActions::default();
        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            if self.player.is_open() {
                let product = self.selected.as_deref().and_then(|id| self.catalog.get(id));
                actions = viewer::render(ui, &mut self.player, product, true);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Select a piece to view it in 360°");
                });
            }
        });

        if actions.toggle_fullscreen {
            self.set_fullscreen(ctx, !self.is_fullscreen);
        }
        if actions.close {
            self.close_viewer(ctx);
        }

        // Paint-synchronized: repaint when the next auto-rotate tick is due
        if let Some(delay) = self.player.next_wake(Instant::now()) {
            ctx.request_repaint_after(delay);
        } else if self.player.is_open() && !self.player.is_ready() {
            ctx.request_repaint_after(LOADING_REPAINT);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState::capture(self.selected.as_deref(), self.player.is_open(), self.show_details);
        if let Ok(json) = serde_json::to_string(&state) {
            storage.set_string(eframe::APP_KEY, json);
            debug!("App state saved: {:?}", state);
        }
    }
}

fn init_logging(args: &Args, path_config: &config::PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn load_settings(args: &Args, path_config: &config::PathConfig) -> ViewerSettings {
    let path = config::config_file(config::SETTINGS_FILE, path_config);
    info!("Config path: {}", path.display());

    let settings = match ViewerSettings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{:#}; using defaults", e);
            ViewerSettings::default()
        }
    };
    if !path.exists()
        && let Err(e) = settings.save(&path)
    {
        warn!("Could not write default settings: {:#}", e);
    }
    args.apply(settings)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logging(&args, &path_config)?;
    info!("Turntable viewer starting...");
    debug!("Command-line args: {:?}", args);

    let settings = load_settings(&args, &path_config);
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    info!("Catalog: {} products", catalog.products.len());

    if args.check {
        let key = args.product.as_deref().unwrap_or(turntable::entities::image_source::DEFAULT_PRODUCT);
        let kind = catalog.find(key).map_or(key, |p| p.kind.as_str());
        let report = headless::check(&settings, kind, CHECK_TIMEOUT)?;
        println!("{report}");
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Turntable v{} • drag to rotate", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1200.0, 800.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(config::data_file("turntable_ui.ron", &path_config)),
        ..Default::default()
    };

    let start_product = args.product.clone();
    eframe::run_native(
        "Turntable",
        native_options,
        Box::new(move |cc| {
            let persisted: PersistedState = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();

            let reopen = start_product.clone().or_else(|| persisted.last_product.clone());
            let mut app = TurntableApp::new(&settings, catalog, persisted)?;
            if let Some(key) = reopen {
                app.open_product(&key);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_viewer_not_persisted() {
        let state = PersistedState::capture(Some("diamond-ring"), false, true);
        assert_eq!(state.last_product, None);
        assert!(state.show_details);
    }

    #[test]
    fn test_open_viewer_persisted() {
        let state = PersistedState::capture(Some("diamond-ring"), true, false);
        assert_eq!(state.last_product.as_deref(), Some("diamond-ring"));

        let json = serde_json::to_string(&state).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.last_product.as_deref(), Some("diamond-ring"));
        assert!(!restored.show_details);
    }

    #[test]
    fn test_nothing_selected() {
        assert_eq!(PersistedState::capture(None, true, false).last_product, None);
    }
}
