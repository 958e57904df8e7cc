//! Frame asset resolution: path convention, filesystem source and the
//! three-tier fallback chain.
//!
//! # Resolution order (per slot)
//!
//! 1. Canonical per-frame asset: `images/360/{product}/frame_{index:03}.jpg`
//!    (skipped when `AssetPolicy::try_canonical` is off)
//! 2. Generic product image: `images/{product}.jpg` (`default` for an empty
//!    product), or a per-product override
//! 3. Synthesized placeholder (never fails)
//!
//! Every attempt is one `ImageSource::fetch` call; a failed attempt is logged
//! and the next tier runs. The chain always produces exactly one outcome.

use log::{debug, trace};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::frame::{Frame, FrameError};
use super::placeholder;
use super::sequence::{FrameOrigin, SlotOutcome};
use super::traits::ImageSource;

/// Product type used when none is given
pub const DEFAULT_PRODUCT: &str = "default";

/// Canonical per-frame asset path
pub fn canonical_path(product: &str, index: usize) -> String {
    format!("images/360/{}/frame_{:03}.jpg", product_or_default(product), index)
}

/// Generic per-product fallback asset path
pub fn generic_path(product: &str) -> String {
    format!("images/{}.jpg", product_or_default(product))
}

fn product_or_default(product: &str) -> &str {
    let trimmed = product.trim();
    if trimmed.is_empty() { DEFAULT_PRODUCT } else { trimmed }
}

/// Fallback chain configuration
#[derive(Debug, Clone)]
pub struct AssetPolicy {
    /// Attempt tier 1 (per-frame photography)
    pub try_canonical: bool,
    /// Product type -> generic image path, replacing `images/{product}.jpg`
    pub generic_overrides: BTreeMap<String, String>,
    /// Edge length of synthesized placeholders
    pub placeholder_size: u32,
}

impl Default for AssetPolicy {
    fn default() -> Self {
        Self {
            try_canonical: true,
            generic_overrides: BTreeMap::new(),
            placeholder_size: 800,
        }
    }
}

impl AssetPolicy {
    /// Generic asset path for `product`, honoring overrides
    pub fn generic_for(&self, product: &str) -> String {
        self.generic_overrides
            .get(product_or_default(product))
            .cloned()
            .unwrap_or_else(|| generic_path(product))
    }
}

/// Resolve one slot through the fallback chain.
pub fn resolve_slot(
    source: &dyn ImageSource,
    policy: &AssetPolicy,
    product: &str,
    index: usize,
    total: usize,
) -> SlotOutcome {
    if policy.try_canonical {
        let path = canonical_path(product, index);
        match source.fetch(&path) {
            Ok(frame) => {
                trace!("Slot {} resolved from {}", index, path);
                return SlotOutcome { frame, origin: FrameOrigin::Canonical };
            }
            Err(e) => debug!("Slot {}: canonical asset unavailable ({})", index, e),
        }
    }

    let path = policy.generic_for(product);
    match source.fetch(&path) {
        Ok(frame) => {
            trace!("Slot {} resolved from generic {}", index, path);
            return SlotOutcome { frame, origin: FrameOrigin::Generic };
        }
        Err(e) => debug!("Slot {}: generic asset unavailable ({})", index, e),
    }

    trace!("Slot {}: synthesizing placeholder", index);
    SlotOutcome {
        frame: placeholder::synthesize(index, total, product, policy.placeholder_size),
        origin: FrameOrigin::Placeholder,
    }
}

/// Image source reading assets from a directory tree
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, path: &str) -> Result<Frame, FrameError> {
        Frame::load(&self.root.join(path))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory source; records every attempted path
    #[derive(Default)]
    pub(crate) struct MapSource {
        pub frames: HashMap<String, Frame>,
        pub attempts: Mutex<Vec<String>>,
    }

    impl MapSource {
        pub fn with(mut self, path: &str, frame: Frame) -> Self {
            self.frames.insert(path.to_string(), frame);
            self
        }
    }

    impl ImageSource for MapSource {
        fn fetch(&self, path: &str) -> Result<Frame, FrameError> {
            self.attempts.lock().unwrap().push(path.to_string());
            self.frames
                .get(path)
                .cloned()
                .ok_or_else(|| FrameError::NotFound(PathBuf::from(path)))
        }
    }

    fn small_policy() -> AssetPolicy {
        AssetPolicy { placeholder_size: 16, ..AssetPolicy::default() }
    }

    #[test]
    fn test_path_convention() {
        assert_eq!(canonical_path("ring", 7), "images/360/ring/frame_007.jpg");
        assert_eq!(canonical_path("ring", 123), "images/360/ring/frame_123.jpg");
        assert_eq!(generic_path("necklace"), "images/necklace.jpg");
        assert_eq!(generic_path(""), "images/default.jpg");
    }

    #[test]
    fn test_canonical_tier_wins() {
        let red = Frame::solid(2, 2, [255, 0, 0, 255]);
        let source = MapSource::default()
            .with("images/360/ring/frame_003.jpg", red.clone())
            .with("images/ring.jpg", Frame::solid(2, 2, [0, 0, 255, 255]));

        let out = resolve_slot(&source, &small_policy(), "ring", 3, 36);
        assert_eq!(out.origin, FrameOrigin::Canonical);
        assert!(out.frame.ptr_eq(&red));
        assert_eq!(source.attempts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_generic_tier_after_canonical_miss() {
        let blue = Frame::solid(2, 2, [0, 0, 255, 255]);
        let source = MapSource::default().with("images/ring.jpg", blue.clone());

        let out = resolve_slot(&source, &small_policy(), "ring", 3, 36);
        assert_eq!(out.origin, FrameOrigin::Generic);
        assert!(out.frame.ptr_eq(&blue));
        assert_eq!(
            *source.attempts.lock().unwrap(),
            vec!["images/360/ring/frame_003.jpg".to_string(), "images/ring.jpg".to_string()]
        );
    }

    #[test]
    fn test_placeholder_when_nothing_exists() {
        let source = MapSource::default();
        let out = resolve_slot(&source, &small_policy(), "ring", 3, 36);
        assert_eq!(out.origin, FrameOrigin::Placeholder);
        assert_eq!(out.frame.resolution(), (16, 16));
        assert_eq!(source.attempts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_skip_canonical() {
        let source = MapSource::default();
        let policy = AssetPolicy { try_canonical: false, ..small_policy() };
        resolve_slot(&source, &policy, "ring", 0, 36);
        assert_eq!(*source.attempts.lock().unwrap(), vec!["images/ring.jpg".to_string()]);
    }

    #[test]
    fn test_generic_override() {
        let shared = Frame::solid(2, 2, [9, 9, 9, 255]);
        let source = MapSource::default().with("images/img_1.jpg", shared.clone());
        let mut policy = small_policy();
        policy.generic_overrides.insert("bracelet".into(), "images/img_1.jpg".into());

        let out = resolve_slot(&source, &policy, "bracelet", 0, 36);
        assert_eq!(out.origin, FrameOrigin::Generic);
        assert!(out.frame.ptr_eq(&shared));
    }

    #[test]
    fn test_fs_source_reads_under_root() {
        let root = std::env::temp_dir().join(format!("turntable_fs_{}", std::process::id()));
        let dir = root.join("images/360/ring");
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([7, 7, 7, 255]))
            .save(dir.join("frame_000.png"))
            .unwrap();

        let source = FsImageSource::new(&root);
        let frame = source.fetch("images/360/ring/frame_000.png").unwrap();
        assert_eq!(frame.resolution(), (4, 4));
        assert!(matches!(
            source.fetch("images/360/ring/frame_001.jpg"),
            Err(FrameError::NotFound(_))
        ));

        let _ = std::fs::remove_dir_all(&root);
    }
}
