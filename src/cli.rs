use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerSettings;

/// 360° product viewer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Product id or kind to open on startup (e.g. "ring")
    #[arg(value_name = "PRODUCT")]
    pub product: Option<String>,

    /// Directory holding the images/ asset tree
    #[arg(short = 'a', long = "assets", value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Product catalog JSON (default: built-in catalog)
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Frames per revolution
    #[arg(short = 'n', long = "frames", value_name = "N")]
    pub frames: Option<usize>,

    /// Auto-rotate rate in frames per second
    #[arg(long = "fps", value_name = "FPS")]
    pub fps: Option<f32>,

    /// Drag distance per frame in pixels (lower = more sensitive)
    #[arg(long = "sensitivity", value_name = "PX")]
    pub sensitivity: Option<f32>,

    /// Start with auto-rotate off
    #[arg(long = "no-autorotate")]
    pub no_autorotate: bool,

    /// Skip per-frame assets and use the generic product image directly
    #[arg(long = "skip-canonical")]
    pub skip_canonical: bool,

    /// Load PRODUCT without a window, print a report and exit
    #[arg(long = "check")]
    pub check: bool,

    /// Enable debug logging to file (default: turntable.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Overlay command-line values on persisted settings
    pub fn apply(&self, settings: ViewerSettings) -> ViewerSettings {
        let mut s = settings;
        if let Some(dir) = &self.assets {
            s.asset_root = dir.clone();
        }
        if let Some(n) = self.frames {
            s.total_frames = n;
        }
        if let Some(fps) = self.fps {
            s.rotate_fps = fps;
        }
        if let Some(px) = self.sensitivity {
            s.drag_sensitivity = px;
        }
        if self.no_autorotate {
            s.auto_rotate = false;
        }
        if self.skip_canonical {
            s.skip_canonical = true;
        }
        s.validated()
    }
}
