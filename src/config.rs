//! Application paths and persisted viewer settings.

use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::player::{DEFAULT_SENSITIVITY, DEFAULT_TOTAL_FRAMES, PlayerSettings};
use crate::core::tick::DEFAULT_FPS;
use crate::entities::AssetPolicy;

/// Environment override for the config directory
pub const CONFIG_DIR_ENV: &str = "TURNTABLE_CONFIG_DIR";

pub const SETTINGS_FILE: &str = "turntable.json";
pub const LOG_FILE: &str = "turntable.log";

const APP_DIR: &str = "turntable";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (TURNTABLE_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. TURNTABLE_CONFIG_DIR environment variable
/// 3. Local folder IF turntable files exist there (turntable.json, turntable.log)
/// 4. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/turntable/{name}
/// - macOS: ~/Library/Application Support/turntable/{name}
/// - Windows: %APPDATA%\turntable\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir()).join(name)
}

/// Get path to a data file (logs). Same priority as [`config_file`], with the
/// platform data directory as default.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir()).join(name)
}

/// Ensure that configuration and data directories exist
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir());
    let data_dir = resolve_dir(config, dirs_next::data_dir());

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir()
        && has_local_files(&current_dir)
    {
        return current_dir;
    }

    match platform {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from("."),
    }
}

/// Viewer settings, persisted as `turntable.json`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub total_frames: usize,
    /// Pixels of horizontal drag per frame
    pub drag_sensitivity: f32,
    pub rotate_fps: f32,
    /// Auto-rotate state on open
    pub auto_rotate: bool,
    /// Directory holding `images/`
    pub asset_root: PathBuf,
    /// Go straight to the generic image (no per-frame assets deployed)
    pub skip_canonical: bool,
    /// Product kind → generic image path, relative to `asset_root`
    pub generic_fallbacks: BTreeMap<String, String>,
    pub placeholder_size: u32,
    /// Loader threads; default is 3/4 of the cores
    pub worker_threads: Option<usize>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            total_frames: DEFAULT_TOTAL_FRAMES,
            drag_sensitivity: DEFAULT_SENSITIVITY,
            rotate_fps: DEFAULT_FPS,
            auto_rotate: true,
            asset_root: PathBuf::from("."),
            skip_canonical: false,
            generic_fallbacks: BTreeMap::new(),
            placeholder_size: 800,
            worker_threads: None,
        }
    }
}

impl ViewerSettings {
    /// Read settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings.validated())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }

    /// Replace out-of-range values with defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.total_frames == 0 {
            warn!("total_frames must be at least 1, using {}", defaults.total_frames);
            self.total_frames = defaults.total_frames;
        }
        if !(self.drag_sensitivity.is_finite() && self.drag_sensitivity > 0.0) {
            warn!(
                "drag_sensitivity {} invalid, using {}",
                self.drag_sensitivity, defaults.drag_sensitivity
            );
            self.drag_sensitivity = defaults.drag_sensitivity;
        }
        if !(self.rotate_fps.is_finite() && self.rotate_fps > 0.0) {
            warn!("rotate_fps {} invalid, using {}", self.rotate_fps, defaults.rotate_fps);
            self.rotate_fps = defaults.rotate_fps;
        }
        if self.placeholder_size == 0 {
            warn!("placeholder_size must be positive, using {}", defaults.placeholder_size);
            self.placeholder_size = defaults.placeholder_size;
        }
        if self.worker_threads == Some(0) {
            warn!("worker_threads 0 ignored");
            self.worker_threads = None;
        }
        self
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            total_frames: self.total_frames,
            sensitivity: self.drag_sensitivity,
            fps: self.rotate_fps,
            auto_rotate: self.auto_rotate,
        }
    }

    pub fn asset_policy(&self) -> AssetPolicy {
        AssetPolicy {
            try_canonical: !self.skip_canonical,
            generic_overrides: self.generic_fallbacks.clone(),
            placeholder_size: self.placeholder_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("turntable_cfg_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig { config_dir: Some(PathBuf::from("/custom")) };
        assert_eq!(config_file("test.json", &config), PathBuf::from("/custom/test.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/turntable.log"));
    }

    #[test]
    fn test_cli_dir_beats_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_platform_dir_fallback() {
        let path = resolve_dir(&PathConfig::default(), Some(PathBuf::from("/platform")));
        // Unless the test runs from a directory holding turntable files
        if !has_local_files(&std::env::current_dir().unwrap()) {
            assert_eq!(path, PathBuf::from("/platform/turntable"));
        }
    }

    #[test]
    fn test_ensure_dirs_creates() {
        let dir = temp_dir("ensure").join("nested");
        let config = PathConfig { config_dir: Some(dir.clone()) };
        ensure_dirs(&config).unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let dir = temp_dir("missing");
        let s = ViewerSettings::load(&dir.join(SETTINGS_FILE)).unwrap();
        assert_eq!(s, ViewerSettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_load_and_partial_json() {
        let dir = temp_dir("roundtrip");
        let path = dir.join(SETTINGS_FILE);

        let mut s = ViewerSettings { total_frames: 24, skip_canonical: true, ..ViewerSettings::default() };
        s.generic_fallbacks.insert("ring".into(), "images/rings/solitaire.jpg".into());
        s.save(&path).unwrap();
        assert_eq!(ViewerSettings::load(&path).unwrap(), s);

        std::fs::write(&path, r#"{ "rotate_fps": 12.5 }"#).unwrap();
        let partial = ViewerSettings::load(&path).unwrap();
        assert_eq!(partial.rotate_fps, 12.5);
        assert_eq!(partial.total_frames, DEFAULT_TOTAL_FRAMES);

        std::fs::write(&path, "not json").unwrap();
        assert!(ViewerSettings::load(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_validated_clamps() {
        let s = ViewerSettings {
            total_frames: 0,
            drag_sensitivity: 0.0,
            rotate_fps: f32::NAN,
            placeholder_size: 0,
            worker_threads: Some(0),
            ..ViewerSettings::default()
        }
        .validated();
        assert_eq!(s, ViewerSettings::default());
    }

    #[test]
    fn test_asset_policy_mapping() {
        let mut s = ViewerSettings { skip_canonical: true, placeholder_size: 64, ..ViewerSettings::default() };
        s.generic_fallbacks.insert("ring".into(), "images/ring-alt.jpg".into());
        let policy = s.asset_policy();
        assert!(!policy.try_canonical);
        assert_eq!(policy.placeholder_size, 64);
        assert_eq!(policy.generic_for("ring"), "images/ring-alt.jpg");

        let p = s.player_settings();
        assert_eq!(p.total_frames, DEFAULT_TOTAL_FRAMES);
        assert!(p.auto_rotate);
    }
}
